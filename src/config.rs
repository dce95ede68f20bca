//! Configuration loader and application settings.

use crate::errors::{AppError, Result};
use crate::feed::{HttpSource, MockConfig, OfferSource};
use crate::market::{PriceGrouping, PriceTick};
use crate::models::{MAX_SCALE, check_magnitude};
use bigdecimal::BigDecimal;
use num_traits::Zero;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Consolidated application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Where offers come from (`OFFERS_SOURCE`).
    pub source: OfferSource,
    /// Refresh loop settings.
    pub aggregator: AggregatorSettings,
}

/// Settings for the periodic aggregation task.
#[derive(Debug, Clone)]
pub struct AggregatorSettings {
    pub refresh_interval: Duration,
    pub grouping: PriceGrouping,
    /// Price tick applied to mock batches between refreshes.
    pub tick: PriceTick,
    /// Seed for mock data; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Log a heartbeat every this many ticks.
    pub heartbeat_every: u64,
    /// Write every published snapshot to this JSON file (`SNAPSHOT_EXPORT`).
    pub export_path: Option<PathBuf>,
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(30),
            grouping: PriceGrouping::Exact,
            tick: PriceTick {
                max_step: dec_const("0.02"),
                low: dec_const("6.80"),
                high: dec_const("7.00"),
            },
            seed: None,
            heartbeat_every: 5,
            export_path: None,
        }
    }
}

fn dec_const(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).unwrap_or_default()
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key/value lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AggregatorSettings::default();
        let mock_defaults = MockConfig::default();

        let http_timeout = Duration::from_secs(parse_or(&lookup, "HTTP_TIMEOUT_SECS", 10u64)?);
        let mock = MockConfig {
            buy_count: parse_or(&lookup, "MOCK_BUY_COUNT", mock_defaults.buy_count)?,
            sell_count: parse_or(&lookup, "MOCK_SELL_COUNT", mock_defaults.sell_count)?,
            base_price: parse_or(&lookup, "MOCK_BASE_PRICE", mock_defaults.base_price)?,
            price_spread: parse_or(&lookup, "MOCK_PRICE_SPREAD", mock_defaults.price_spread)?,
            ..mock_defaults
        };
        mock.validate()?;
        let source = parse_source(lookup("OFFERS_SOURCE").as_deref(), mock, http_timeout)?;

        let refresh_secs: u64 = parse_or(&lookup, "REFRESH_INTERVAL_SECS", 30)?;
        if refresh_secs == 0 {
            return Err(AppError::Config(
                "REFRESH_INTERVAL_SECS must be at least 1".into(),
            ));
        }

        let grouping = match parse_opt::<i64, _>(&lookup, "PRICE_GROUPING_SCALE")? {
            Some(scale) if (0..=MAX_SCALE).contains(&scale) => PriceGrouping::RoundedTo(scale),
            Some(scale) => {
                return Err(AppError::Config(format!(
                    "PRICE_GROUPING_SCALE must be between 0 and {MAX_SCALE}, got {scale}"
                )));
            }
            None => PriceGrouping::Exact,
        };

        let tick = PriceTick {
            max_step: parse_or(&lookup, "TICK_MAX_STEP", defaults.tick.max_step.clone())?,
            low: parse_or(&lookup, "TICK_PRICE_LOW", defaults.tick.low.clone())?,
            high: parse_or(&lookup, "TICK_PRICE_HIGH", defaults.tick.high.clone())?,
        };
        for (key, value) in [
            ("TICK_MAX_STEP", &tick.max_step),
            ("TICK_PRICE_LOW", &tick.low),
            ("TICK_PRICE_HIGH", &tick.high),
        ] {
            check_magnitude(key, value).map_err(AppError::Config)?;
        }
        if tick.max_step < BigDecimal::zero() {
            return Err(AppError::Config(format!(
                "TICK_MAX_STEP must not be negative, got {}",
                tick.max_step
            )));
        }
        if tick.low > tick.high {
            return Err(AppError::Config(format!(
                "TICK_PRICE_LOW {} is above TICK_PRICE_HIGH {}",
                tick.low, tick.high
            )));
        }

        Ok(Self {
            source,
            aggregator: AggregatorSettings {
                refresh_interval: Duration::from_secs(refresh_secs),
                grouping,
                tick,
                seed: parse_opt(&lookup, "MOCK_SEED")?,
                heartbeat_every: defaults.heartbeat_every,
                export_path: parse_opt(&lookup, "SNAPSHOT_EXPORT")?,
            },
        })
    }
}

/// `mock` (or unset), `file:<path>`, or an `http(s)://` URL.
fn parse_source(raw: Option<&str>, mock: MockConfig, timeout: Duration) -> Result<OfferSource> {
    let raw = raw.map(str::trim).unwrap_or("mock");
    if raw.is_empty() || raw.eq_ignore_ascii_case("mock") {
        return Ok(OfferSource::Mock(mock));
    }
    if let Some(path) = raw.strip_prefix("file:") {
        return Ok(OfferSource::File(PathBuf::from(path)));
    }
    if raw.starts_with("http://") || raw.starts_with("https://") {
        let url = Url::parse(raw)?;
        return Ok(OfferSource::Http(HttpSource::new(url, timeout)?));
    }
    Err(AppError::Config(format!(
        "OFFERS_SOURCE must be `mock`, `file:<path>` or an http(s) URL, got `{raw}`"
    )))
}

fn parse_opt<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| AppError::Config(format!("{key}={raw:?}: {e}"))),
        _ => Ok(None),
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    Ok(parse_opt(lookup, key)?.unwrap_or(default))
}

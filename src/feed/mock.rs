//! Synthetic offers for demos and tests.

use crate::errors::{AppError, Result, ValidationError};
use crate::market::PRICE_SCALE;
use crate::models::{Currency, Offer, Side};
use bigdecimal::{BigDecimal, RoundingMode};
use num_traits::FromPrimitive;
use rand::Rng;
use rand::seq::SliceRandom;

/// Handles used for generated offers.
pub const MOCK_USERS: &[&str] = &[
    "CryptoTrader_BO",
    "BolivianExchange",
    "P2P_Master",
    "TradingPro_LP",
    "CoinDealer",
    "DigitalMoney_BO",
    "FastTrade",
    "SecureExchange",
    "QuickBuy_Bolivia",
    "TrustTrader",
    "ReliableP2P",
    "SwiftExchange",
    "SafeTrade_LP",
    "PremiumDealer",
    "ExpressP2P",
    "TopExchange",
    "FlashTrade",
    "UltraFast",
    "MegaTrader",
    "EliteExchange",
];

#[derive(Debug, Clone, PartialEq)]
pub struct MockConfig {
    /// Offers generated on the buy side.
    pub buy_count: usize,
    /// Offers generated on the sell side.
    pub sell_count: usize,
    /// Centre of the generated price band, BOB per USDT.
    pub base_price: f64,
    /// Full width of the price band around `base_price`.
    pub price_spread: f64,
    pub min_liquidity: f64,
    pub liquidity_range: f64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            buy_count: 50,
            sell_count: 45,
            base_price: 6.96,
            price_spread: 0.2,
            min_liquidity: 100.0,
            liquidity_range: 1000.0,
        }
    }
}

impl MockConfig {
    pub fn count(&self) -> usize {
        self.buy_count + self.sell_count
    }

    /// Every generated price must round to a positive value and every
    /// liquidity to a non-negative one.
    pub fn validate(&self) -> Result<()> {
        let finite = [
            ("base_price", self.base_price),
            ("price_spread", self.price_spread),
            ("min_liquidity", self.min_liquidity),
            ("liquidity_range", self.liquidity_range),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(AppError::Config(format!(
                    "mock {name} must be finite, got {value}"
                )));
            }
        }
        if self.price_spread < 0.0 || self.min_liquidity < 0.0 || self.liquidity_range < 0.0 {
            return Err(AppError::Config(
                "mock price_spread, min_liquidity and liquidity_range must not be negative".into(),
            ));
        }
        let lowest = self.base_price - self.price_spread / 2.0;
        if lowest < MIN_MOCK_PRICE {
            return Err(AppError::Config(format!(
                "mock base_price {} with spread {} can produce prices below {MIN_MOCK_PRICE}",
                self.base_price, self.price_spread
            )));
        }
        Ok(())
    }
}

/// Lowest price a mock offer may be generated at.
const MIN_MOCK_PRICE: f64 = 0.01;

/// Generate the buy book (best price first, i.e. descending) followed by the
/// sell book (ascending).
///
/// Prices land in `base_price ± price_spread / 2` rounded to [`PRICE_SCALE`];
/// liquidity lands in `[min_liquidity, min_liquidity + liquidity_range)`.
pub fn generate_mock_offers<R: Rng + ?Sized>(
    config: &MockConfig,
    rng: &mut R,
) -> Result<Vec<Offer>> {
    config.validate()?;

    let mut buys = generate_side(config, Side::Buy, config.buy_count, rng)?;
    buys.sort_by(|a, b| b.price().cmp(a.price()));
    let mut sells = generate_side(config, Side::Sell, config.sell_count, rng)?;
    sells.sort_by(|a, b| a.price().cmp(b.price()));

    buys.extend(sells);
    Ok(buys)
}

fn generate_side<R: Rng + ?Sized>(
    config: &MockConfig,
    side: Side,
    count: usize,
    rng: &mut R,
) -> Result<Vec<Offer>> {
    (0..count)
        .map(|index| -> Result<Offer> {
            let variation = (rng.r#gen::<f64>() - 0.5) * config.price_spread;
            let price = to_decimal("price", config.base_price + variation, PRICE_SCALE)?;
            let liquidity = to_decimal(
                "liquidity",
                config.min_liquidity + rng.r#gen::<f64>() * config.liquidity_range,
                2,
            )?;
            let currency = if rng.gen_bool(0.5) {
                Currency::Usdt
            } else {
                Currency::Usdc
            };
            let user = MOCK_USERS.choose(&mut *rng).copied().unwrap_or("Anonymous");
            let offer =
                Offer::new(user, price, liquidity, Some(currency)).map_err(|e| e.at(index))?;
            Ok(offer.with_side(Some(side)))
        })
        .collect()
}

fn to_decimal(name: &'static str, value: f64, scale: i64) -> Result<BigDecimal> {
    BigDecimal::from_f64(value)
        .map(|d| d.with_scale_round(scale, RoundingMode::HalfUp))
        .ok_or_else(|| {
            ValidationError::parameter(name, format!("{value} is not a finite number")).into()
        })
}

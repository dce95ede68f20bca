//! Miscellaneous helper utilities.

use crate::market::MarketSnapshot;
use bigdecimal::RoundingMode;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

/// Initialize `tracing` subscriber with env-based filter.
///
/// If `RUST_LOG` is not set, defaults to `info` level.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

/// Emit one snapshot as structured log lines: the summary, then the top rows
/// of the price table.
pub fn log_snapshot(snapshot: &MarketSnapshot, max_rows: usize) {
    let stats = &snapshot.stats;
    let avg = stats
        .weighted_average_price
        .as_ref()
        .map(|p| p.with_scale_round(4, RoundingMode::HalfUp).to_string())
        .unwrap_or_else(|| "n/a".into());
    info!(
        offers = stats.total_offer_count,
        users = snapshot.by_user.len(),
        price_levels = snapshot.by_price.len(),
        min_price = %stats.min_price,
        max_price = %stats.max_price,
        weighted_avg = %avg,
        total_usdt = %stats.total_liquidity,
        best_user = snapshot.best_offer.user(),
        "[MARKET] snapshot"
    );
    for side in [&snapshot.buy, &snapshot.sell].into_iter().flatten() {
        info!(
            side = %side.side,
            offers = side.offer_count,
            min_price = %side.min_price,
            max_price = %side.max_price,
            avg_price = %side.average_price.with_scale_round(4, RoundingMode::HalfUp),
            total_usdt = %side.total_liquidity,
            "[SIDE] book summary"
        );
    }
    for level in snapshot.by_price.iter().take(max_rows) {
        info!(
            price = %level.price,
            usdt = %level.total_liquidity,
            offers = level.offer_count,
            value_bob = %level.total_value,
            "[BOOK] price level"
        );
    }
}

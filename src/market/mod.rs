//! Aggregation engine: pure functions from a batch of offers to the
//! by-user table, the by-price table and the market summary.

pub mod engine;
pub mod ticker;
pub mod types;

pub use engine::{
    best_offer, build_snapshot, compute_market_stats, compute_side_stats, group_by_price,
    group_by_user, weighted_average_price,
};
pub use ticker::{PRICE_SCALE, refresh_market_price, refresh_offer_prices};
pub use types::{
    MarketSnapshot, MarketStats, PriceAggregate, PriceGrouping, PriceTick, SideStats,
    UserAggregate,
};

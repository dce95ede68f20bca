use crate::models::{Offer, Side};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// How `group_by_price` derives its bucket key from an offer price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriceGrouping {
    /// One bucket per distinct decimal value (`6.90` and `6.9` are equal).
    #[default]
    Exact,
    /// Round half-up to this many decimal places before bucketing.
    RoundedTo(i64),
}

/// Per-user row of the "offers by user" table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserAggregate {
    pub user: String,
    /// `None` when the user's total liquidity is zero.
    pub weighted_average_price: Option<BigDecimal>,
    pub total_liquidity: BigDecimal,
    pub offer_count: usize,
}

/// Per-price row of the "offers by price" table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceAggregate {
    pub price: BigDecimal,
    pub total_liquidity: BigDecimal,
    pub offer_count: usize,
    /// Sum of `price * liquidity` over the bucket, in BOB.
    pub total_value: BigDecimal,
}

/// Market-wide summary of one batch of offers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketStats {
    pub min_price: BigDecimal,
    pub max_price: BigDecimal,
    /// `None` when every offer has zero liquidity.
    pub weighted_average_price: Option<BigDecimal>,
    pub total_liquidity: BigDecimal,
    pub total_offer_count: usize,
}

/// Price range and averages of one side of the book.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SideStats {
    pub side: Side,
    pub min_price: BigDecimal,
    pub max_price: BigDecimal,
    /// Plain mean of the side's prices.
    pub average_price: BigDecimal,
    /// `None` when the side's total liquidity is zero.
    pub weighted_average_price: Option<BigDecimal>,
    pub total_liquidity: BigDecimal,
    pub offer_count: usize,
}

/// Everything the renderer needs for one refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketSnapshot {
    pub by_user: Vec<UserAggregate>,
    pub by_price: Vec<PriceAggregate>,
    pub stats: MarketStats,
    /// `None` when no offer is tagged with that side.
    pub buy: Option<SideStats>,
    pub sell: Option<SideStats>,
    pub best_offer: Offer,
    pub generated_at: DateTime<Utc>,
}

/// Parameters of the simulated price tick.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTick {
    pub max_step: BigDecimal,
    pub low: BigDecimal,
    pub high: BigDecimal,
}

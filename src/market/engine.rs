use super::types::{
    MarketSnapshot, MarketStats, PriceAggregate, PriceGrouping, SideStats, UserAggregate,
};
use crate::errors::{AppError, Result};
use crate::models::{Offer, Side};
use bigdecimal::{BigDecimal, RoundingMode};
use num_traits::Zero;
use std::collections::{BTreeMap, HashMap};

/// Decimal places kept on weighted averages.
pub const AVERAGE_SCALE: i64 = 8;

/// `Σ(price·liquidity) / Σ liquidity`, or `None` when total liquidity is zero.
pub fn weighted_average_price<'a, I>(offers: I) -> Option<BigDecimal>
where
    I: IntoIterator<Item = &'a Offer>,
{
    let (value, liquidity) = offers.into_iter().fold(
        (BigDecimal::zero(), BigDecimal::zero()),
        |(value, liquidity), offer| (value + offer.notional(), liquidity + offer.liquidity()),
    );
    ratio(&value, &liquidity)
}

fn ratio(value: &BigDecimal, liquidity: &BigDecimal) -> Option<BigDecimal> {
    if liquidity.is_zero() {
        return None;
    }
    Some((value / liquidity).with_scale_round(AVERAGE_SCALE, RoundingMode::HalfUp))
}

/// Group offers by user. Rows come back in first-appearance order.
pub fn group_by_user(offers: &[Offer]) -> Vec<UserAggregate> {
    struct Acc<'a> {
        user: &'a str,
        value: BigDecimal,
        liquidity: BigDecimal,
        count: usize,
    }

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut accs: Vec<Acc<'_>> = Vec::new();

    for offer in offers {
        let slot = *index.entry(offer.user()).or_insert_with(|| {
            accs.push(Acc {
                user: offer.user(),
                value: BigDecimal::zero(),
                liquidity: BigDecimal::zero(),
                count: 0,
            });
            accs.len() - 1
        });
        let acc = &mut accs[slot];
        acc.value += offer.notional();
        acc.liquidity += offer.liquidity();
        acc.count += 1;
    }

    accs.into_iter()
        .map(|acc| UserAggregate {
            user: acc.user.to_string(),
            weighted_average_price: ratio(&acc.value, &acc.liquidity),
            total_liquidity: acc.liquidity,
            offer_count: acc.count,
        })
        .collect()
}

/// Group offers by price, sorted ascending.
///
/// With [`PriceGrouping::Exact`] two offers share a bucket only when their
/// decimal prices are numerically equal. [`PriceGrouping::RoundedTo`] buckets
/// on the rounded price instead.
pub fn group_by_price(offers: &[Offer], grouping: PriceGrouping) -> Vec<PriceAggregate> {
    let mut buckets: BTreeMap<BigDecimal, PriceAggregate> = BTreeMap::new();

    for offer in offers {
        let key = bucket_key(offer.price(), grouping);
        let bucket = buckets
            .entry(key.clone())
            .or_insert_with(|| PriceAggregate {
                price: key,
                total_liquidity: BigDecimal::zero(),
                offer_count: 0,
                total_value: BigDecimal::zero(),
            });
        bucket.total_liquidity += offer.liquidity();
        bucket.total_value += offer.notional();
        bucket.offer_count += 1;
    }

    buckets.into_values().collect()
}

fn bucket_key(price: &BigDecimal, grouping: PriceGrouping) -> BigDecimal {
    match grouping {
        PriceGrouping::Exact => price.normalized(),
        PriceGrouping::RoundedTo(scale) => price.with_scale_round(scale, RoundingMode::HalfUp),
    }
}

/// Summary statistics over the whole batch.
pub fn compute_market_stats(offers: &[Offer]) -> Result<MarketStats> {
    let first = offers.first().ok_or(AppError::EmptyInput)?;

    let mut min_price = first.price();
    let mut max_price = first.price();
    let mut total_value = BigDecimal::zero();
    let mut total_liquidity = BigDecimal::zero();

    for offer in offers {
        if offer.price() < min_price {
            min_price = offer.price();
        }
        if offer.price() > max_price {
            max_price = offer.price();
        }
        total_value += offer.notional();
        total_liquidity += offer.liquidity();
    }

    Ok(MarketStats {
        min_price: min_price.clone(),
        max_price: max_price.clone(),
        weighted_average_price: ratio(&total_value, &total_liquidity),
        total_liquidity,
        total_offer_count: offers.len(),
    })
}

/// Range and averages of the offers tagged with `side`, or `None` if there
/// are none.
pub fn compute_side_stats(offers: &[Offer], side: Side) -> Option<SideStats> {
    let on_side: Vec<&Offer> = offers.iter().filter(|o| o.side() == Some(side)).collect();
    let first = on_side.first()?;

    let mut min_price = first.price();
    let mut max_price = first.price();
    let mut price_sum = BigDecimal::zero();
    let mut total_liquidity = BigDecimal::zero();
    for offer in &on_side {
        min_price = min_price.min(offer.price());
        max_price = max_price.max(offer.price());
        price_sum += offer.price();
        total_liquidity += offer.liquidity();
    }
    let count = BigDecimal::from(on_side.len() as u64);

    Some(SideStats {
        side,
        min_price: min_price.clone(),
        max_price: max_price.clone(),
        average_price: (price_sum / count).with_scale_round(AVERAGE_SCALE, RoundingMode::HalfUp),
        weighted_average_price: weighted_average_price(on_side.iter().copied()),
        total_liquidity,
        offer_count: on_side.len(),
    })
}

/// Cheapest offer; the earliest one wins a tie.
pub fn best_offer(offers: &[Offer]) -> Option<&Offer> {
    offers.iter().fold(None, |best: Option<&Offer>, offer| match best {
        Some(b) if b.price() <= offer.price() => Some(b),
        _ => Some(offer),
    })
}

/// Run every aggregation over one batch.
pub fn build_snapshot(offers: &[Offer], grouping: PriceGrouping) -> Result<MarketSnapshot> {
    let stats = compute_market_stats(offers)?;
    let best = best_offer(offers).ok_or(AppError::EmptyInput)?;
    Ok(MarketSnapshot {
        by_user: group_by_user(offers),
        by_price: group_by_price(offers, grouping),
        stats,
        buy: compute_side_stats(offers, Side::Buy),
        sell: compute_side_stats(offers, Side::Sell),
        best_offer: best.clone(),
        generated_at: chrono::Utc::now(),
    })
}

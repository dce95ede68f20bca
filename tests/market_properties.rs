use bigdecimal::{BigDecimal, RoundingMode};
use num_traits::Zero;
use p2p_market_aggregator::errors::AppError;
use p2p_market_aggregator::market::engine::AVERAGE_SCALE;
use p2p_market_aggregator::market::{
    PriceGrouping, compute_market_stats, group_by_price, group_by_user, refresh_market_price,
};
use p2p_market_aggregator::models::Offer;
use quickcheck_macros::quickcheck;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::str::FromStr;

/// Build offers from arbitrary tuples: five users, prices 6.80..7.19 BOB,
/// liquidity up to 10 000.00 USDT.
fn offers_from(raw: &[(u8, u16, u32)]) -> Vec<Offer> {
    raw.iter()
        .map(|&(user, price, liquidity)| {
            let price = BigDecimal::new((680 + i64::from(price % 40)).into(), 2);
            let liquidity = BigDecimal::new(i64::from(liquidity % 1_000_001).into(), 2);
            Offer::new(format!("user_{}", user % 5), price, liquidity, None).unwrap()
        })
        .collect()
}

fn sum<'a>(values: impl Iterator<Item = &'a BigDecimal>) -> BigDecimal {
    values.fold(BigDecimal::zero(), |acc, v| acc + v)
}

#[quickcheck]
fn liquidity_is_conserved_across_groupings(raw: Vec<(u8, u16, u32)>) -> bool {
    let offers = offers_from(&raw);
    let by_user = sum(group_by_user(&offers).iter().map(|r| &r.total_liquidity));
    let by_price = sum(
        group_by_price(&offers, PriceGrouping::Exact)
            .iter()
            .map(|r| &r.total_liquidity),
    );
    let by_rounded = sum(
        group_by_price(&offers, PriceGrouping::RoundedTo(1))
            .iter()
            .map(|r| &r.total_liquidity),
    );
    match compute_market_stats(&offers) {
        Ok(stats) => {
            by_user == stats.total_liquidity
                && by_price == stats.total_liquidity
                && by_rounded == stats.total_liquidity
        }
        Err(AppError::EmptyInput) => offers.is_empty() && by_user.is_zero() && by_price.is_zero(),
        Err(_) => false,
    }
}

#[quickcheck]
fn price_table_is_sorted_and_counts_every_offer(raw: Vec<(u8, u16, u32)>) -> bool {
    let offers = offers_from(&raw);
    let rows = group_by_price(&offers, PriceGrouping::Exact);
    let counted: usize = rows.iter().map(|r| r.offer_count).sum();
    rows.windows(2).all(|w| w[0].price < w[1].price) && counted == offers.len()
}

/// `Σ(price·liquidity) / Σ liquidity` rounded half-up to 8 places, computed
/// in integer cents straight from the generator input.
fn expected_mean(raw: &[(u16, u32)]) -> Option<BigDecimal> {
    let (value, liquidity) = raw.iter().fold((0i128, 0i128), |(v, l), &(price, liq)| {
        let price = 680 + i128::from(price % 40);
        let liq = i128::from(liq % 1_000_001);
        (v + price * liq, l + liq)
    });
    if liquidity == 0 {
        return None;
    }
    // value has 4 decimals, liquidity 2: mean = value / (liquidity * 100).
    let denominator = liquidity * 100;
    let scaled = (2 * value * 100_000_000 + denominator) / (2 * denominator);
    Some(BigDecimal::new(scaled.into(), AVERAGE_SCALE))
}

#[quickcheck]
fn single_user_aggregate_matches_weighted_mean(raw: Vec<(u16, u32)>) -> bool {
    let tuples: Vec<(u8, u16, u32)> = raw.iter().map(|&(p, l)| (0, p, l)).collect();
    let offers = offers_from(&tuples);
    let rows = group_by_user(&offers);
    if offers.is_empty() {
        return rows.is_empty();
    }
    let total_cents: u64 = raw.iter().map(|&(_, l)| u64::from(l % 1_000_001)).sum();
    rows.len() == 1
        && rows[0].weighted_average_price == expected_mean(&raw)
        && rows[0].total_liquidity == BigDecimal::new(total_cents.into(), 2)
}

#[test]
fn weighted_mean_rounds_half_up_at_eight_places() {
    // (6.81 * 2 + 6.80 * 1) / 3 = 6.806666...
    let raw = [(1u16, 200u32), (0, 100)];
    let tuples: Vec<(u8, u16, u32)> = raw.iter().map(|&(p, l)| (0, p, l)).collect();
    let rows = group_by_user(&offers_from(&tuples));
    let expected = BigDecimal::from_str("6.80666667").unwrap();
    assert_eq!(expected_mean(&raw), Some(expected.clone()));
    assert_eq!(rows[0].weighted_average_price, Some(expected));
}

#[quickcheck]
fn stats_average_lies_between_min_and_max(raw: Vec<(u8, u16, u32)>) -> bool {
    let offers = offers_from(&raw);
    let Ok(stats) = compute_market_stats(&offers) else {
        return offers.is_empty();
    };
    match stats.weighted_average_price {
        Some(avg) => stats.min_price <= avg && avg <= stats.max_price,
        None => stats.total_liquidity.is_zero(),
    }
}

#[test]
fn refreshed_price_never_leaves_bounds() {
    let mut rng = StdRng::seed_from_u64(0xB0B);
    let low = BigDecimal::new(680.into(), 2);
    let high = BigDecimal::new(700.into(), 2);
    let step = BigDecimal::new(25.into(), 2);
    let mut current = BigDecimal::new(692.into(), 2);
    for trial in 0..10_000 {
        // Every 100th trial restarts far outside the band.
        if trial % 100 == 0 {
            current = BigDecimal::new((trial as i64).into(), 2);
        }
        current = refresh_market_price(&current, &step, (&low, &high), &mut rng).unwrap();
        assert!(current >= low && current <= high, "trial {trial}: {current}");
        assert_eq!(current, current.with_scale_round(2, RoundingMode::HalfUp));
    }
}

#[test]
fn dashboard_scenario() {
    let offers = offers_from(&[(0, 10, 10_000), (0, 12, 20_000), (1, 15, 5_000)]);
    let users = group_by_user(&offers);
    assert_eq!(users.len(), 2);
    assert_eq!(
        users[0]
            .weighted_average_price
            .as_ref()
            .map(|p| p.with_scale_round(4, RoundingMode::HalfUp)),
        Some(BigDecimal::new(69133.into(), 4))
    );
    assert_eq!(users[0].total_liquidity, BigDecimal::from(300));
    assert_eq!(
        users[1].weighted_average_price,
        Some(BigDecimal::new(695.into(), 2))
    );

    let levels = group_by_price(&offers, PriceGrouping::Exact);
    assert_eq!(levels.len(), 3);
    assert!(levels.iter().all(|l| l.offer_count == 1));

    assert!(group_by_user(&[]).is_empty());
    assert!(group_by_price(&[], PriceGrouping::Exact).is_empty());
    assert!(matches!(compute_market_stats(&[]), Err(AppError::EmptyInput)));
}

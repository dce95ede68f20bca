//! Simulated price ticks for demo data.

use super::types::PriceTick;
use crate::errors::{Result, ValidationError};
use crate::models::Offer;
use bigdecimal::{BigDecimal, RoundingMode};
use num_traits::{FromPrimitive, Zero};
use rand::Rng;

/// Currency precision of a BOB price.
pub const PRICE_SCALE: i64 = 2;

/// Perturb `current` by a uniform delta in `[-max_step, +max_step]`, clamp it
/// into `[low, high]` and round to [`PRICE_SCALE`] places.
///
/// The rounded value is clamped a second time, so bounds that are not
/// themselves on the 2-decimal grid are still honoured.
pub fn refresh_market_price<R: Rng + ?Sized>(
    current: &BigDecimal,
    max_step: &BigDecimal,
    bounds: (&BigDecimal, &BigDecimal),
    rng: &mut R,
) -> Result<BigDecimal> {
    let (low, high) = bounds;
    if *max_step < BigDecimal::zero() {
        return Err(ValidationError::parameter(
            "max_step",
            format!("must not be negative, got {max_step}"),
        )
        .into());
    }
    if low > high {
        return Err(ValidationError::parameter(
            "bounds",
            format!("low {low} is above high {high}"),
        )
        .into());
    }

    let unit: f64 = rng.gen_range(-1.0..=1.0);
    let unit = BigDecimal::from_f64(unit).unwrap_or_else(BigDecimal::zero);
    let moved = current + max_step * unit;

    let rounded = clamp(moved, low, high).with_scale_round(PRICE_SCALE, RoundingMode::HalfUp);
    Ok(clamp(rounded, low, high))
}

fn clamp(value: BigDecimal, low: &BigDecimal, high: &BigDecimal) -> BigDecimal {
    if value < *low {
        low.clone()
    } else if value > *high {
        high.clone()
    } else {
        value
    }
}

/// Apply one tick to every offer, returning a fresh batch.
pub fn refresh_offer_prices<R: Rng + ?Sized>(
    offers: &[Offer],
    tick: &PriceTick,
    rng: &mut R,
) -> Result<Vec<Offer>> {
    offers
        .iter()
        .enumerate()
        .map(|(index, offer)| -> Result<Offer> {
            let price =
                refresh_market_price(offer.price(), &tick.max_step, (&tick.low, &tick.high), rng)?;
            Ok(offer.with_price(price).map_err(|e| e.at(index))?)
        })
        .collect()
}

//! Shared data structures used throughout the application.

use crate::errors::ValidationError;
use bigdecimal::BigDecimal;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stablecoin an offer is denominated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usdt,
    Usdc,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Usdt => "USDT",
            Currency::Usdc => "USDC",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USDT" => Ok(Currency::Usdt),
            "USDC" => Ok(Currency::Usdc),
            other => Err(format!("unknown currency `{other}`")),
        }
    }
}

/// Which book an offer sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        })
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(Side::Buy),
            "sell" => Ok(Side::Sell),
            other => Err(format!("unknown side `{other}`")),
        }
    }
}

/// Largest number of decimal places accepted on a price or liquidity.
pub const MAX_SCALE: i64 = 18;
/// Largest number of significant digits accepted on a price or liquidity.
pub const MAX_DIGITS: u64 = 38;

/// Reject decimals whose exponent or precision would make arithmetic on them
/// blow up (`1e20000000` is a valid decimal literal).
pub fn check_magnitude(field: &str, value: &BigDecimal) -> Result<(), String> {
    let (_, scale) = value.as_bigint_and_exponent();
    if scale.abs() > MAX_SCALE {
        return Err(format!("{field} has exponent {scale}, outside ±{MAX_SCALE}"));
    }
    if value.digits() > MAX_DIGITS {
        return Err(format!(
            "{field} has {} significant digits, more than {MAX_DIGITS}",
            value.digits()
        ));
    }
    Ok(())
}

fn check_price(price: &BigDecimal) -> Result<(), String> {
    check_magnitude("price", price)?;
    if *price <= BigDecimal::zero() {
        return Err(format!("price must be positive, got {price}"));
    }
    Ok(())
}

fn check_liquidity(liquidity: &BigDecimal) -> Result<(), String> {
    check_magnitude("liquidity", liquidity)?;
    if *liquidity < BigDecimal::zero() {
        return Err(format!("liquidity must not be negative, got {liquidity}"));
    }
    Ok(())
}

/// A single validated P2P listing.
///
/// Invariants: `user` is non-empty, `price > 0`, `liquidity >= 0`, and both
/// decimals stay within [`MAX_SCALE`] / [`MAX_DIGITS`].
/// The only way to obtain an `Offer` is through [`Offer::new`], so downstream
/// aggregation never sees malformed values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Offer {
    user: String,
    /// BOB per USDT.
    price: BigDecimal,
    /// USDT available at `price`.
    liquidity: BigDecimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    currency: Option<Currency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    side: Option<Side>,
}

impl Offer {
    pub fn new(
        user: impl Into<String>,
        price: BigDecimal,
        liquidity: BigDecimal,
        currency: Option<Currency>,
    ) -> Result<Self, ValidationError> {
        let user = user.into().trim().to_string();
        if user.is_empty() {
            return Err(ValidationError::offer(0, "user must not be empty"));
        }
        check_price(&price).map_err(|reason| ValidationError::offer(0, reason))?;
        check_liquidity(&liquidity).map_err(|reason| ValidationError::offer(0, reason))?;
        Ok(Self {
            user,
            price,
            liquidity,
            currency,
            side: None,
        })
    }

    /// Place the offer on one side of the book.
    pub fn with_side(mut self, side: Option<Side>) -> Self {
        self.side = side;
        self
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn price(&self) -> &BigDecimal {
        &self.price
    }

    pub fn liquidity(&self) -> &BigDecimal {
        &self.liquidity
    }

    pub fn currency(&self) -> Option<Currency> {
        self.currency
    }

    pub fn side(&self) -> Option<Side> {
        self.side
    }

    /// `price * liquidity`, the BOB value of the listing.
    pub fn notional(&self) -> BigDecimal {
        &self.price * &self.liquidity
    }

    /// Copy of this offer quoted at a different price.
    pub fn with_price(&self, price: BigDecimal) -> Result<Self, ValidationError> {
        check_price(&price).map_err(|reason| ValidationError::offer(0, reason))?;
        Ok(Self {
            price,
            ..self.clone()
        })
    }
}

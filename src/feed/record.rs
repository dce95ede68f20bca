//! Wire shape of an offer record and its validation into [`Offer`].

use crate::errors::{AppError, Result, ValidationError};
use crate::models::{Currency, Offer, Side, check_magnitude};
use bigdecimal::BigDecimal;
use serde::Deserialize;
use std::str::FromStr;

/// Decimal that may arrive as a JSON number or as a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawDecimal {
    Number(serde_json::Number),
    Text(String),
}

impl RawDecimal {
    fn parse(&self, field: &str) -> std::result::Result<BigDecimal, String> {
        let text = match self {
            RawDecimal::Number(n) => n.to_string(),
            RawDecimal::Text(s) => s.trim().to_string(),
        };
        let value = BigDecimal::from_str(&text)
            .map_err(|_| format!("`{field}` is not a decimal: {text:?}"))?;
        check_magnitude(field, &value)?;
        Ok(value)
    }
}

/// One record as published by the data source.
#[derive(Debug, Clone, Deserialize)]
pub struct RawOffer {
    #[serde(rename = "usuario", default)]
    pub user: Option<String>,
    #[serde(rename = "precio", default)]
    pub price: Option<RawDecimal>,
    #[serde(rename = "usdtDisponible", default)]
    pub liquidity: Option<RawDecimal>,
    #[serde(default)]
    pub currency: Option<String>,
    /// `buy` or `sell`; older feeds call this field `type`.
    #[serde(alias = "type", default)]
    pub side: Option<String>,
}

impl RawOffer {
    fn validate(&self) -> std::result::Result<Offer, String> {
        let user = self.user.as_deref().ok_or("missing `usuario`")?;
        let price = self
            .price
            .as_ref()
            .ok_or("missing `precio`")?
            .parse("precio")?;
        let liquidity = self
            .liquidity
            .as_ref()
            .ok_or("missing `usdtDisponible`")?
            .parse("usdtDisponible")?;
        let currency = self
            .currency
            .as_deref()
            .map(Currency::from_str)
            .transpose()?;
        let side = self.side.as_deref().map(Side::from_str).transpose()?;
        let offer = Offer::new(user, price, liquidity, currency).map_err(|e| match e {
            ValidationError::Offer { reason, .. } => reason,
            other => other.to_string(),
        })?;
        Ok(offer.with_side(side))
    }
}

/// Validate a whole batch; the first bad record rejects it.
pub fn validate_batch(raw: &[RawOffer]) -> Result<Vec<Offer>> {
    raw.iter()
        .enumerate()
        .map(|(index, record)| {
            record
                .validate()
                .map_err(|reason| AppError::from(ValidationError::offer(index, reason)))
        })
        .collect()
}

/// Parse a JSON array of records and validate it.
///
/// Text that is not a JSON array is a fetch failure. An element that does not
/// have the record shape is a validation failure at its index.
pub fn parse_offers(json: &str) -> Result<Vec<Offer>> {
    let values: Vec<serde_json::Value> = serde_json::from_str(json)
        .map_err(|e| AppError::Fetch(format!("malformed offer JSON: {e}")))?;
    let raw = values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            serde_json::from_value::<RawOffer>(value)
                .map_err(|e| ValidationError::offer(index, e.to_string()))
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;
    validate_batch(&raw)
}

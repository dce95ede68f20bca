use super::record::parse_offers;
use crate::errors::{AppError, Result};
use crate::models::Offer;
use std::path::Path;
use tracing::debug;

/// Read and validate a static JSON offer file.
pub async fn read_offers(path: &Path) -> Result<Vec<Offer>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AppError::Fetch(format!("cannot read {}: {e}", path.display())))?;
    let offers = parse_offers(&text)?;
    debug!(path = %path.display(), count = offers.len(), "[FEED] offers read from file");
    Ok(offers)
}

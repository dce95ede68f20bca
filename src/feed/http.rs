use super::record::parse_offers;
use crate::errors::{AppError, Result};
use crate::models::Offer;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// HTTP endpoint serving a JSON array of offer records.
#[derive(Debug, Clone)]
pub struct HttpSource {
    url: Url,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(url: Url, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { url, client })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// One GET; transport failures, non-2xx and bad JSON all surface as `Fetch`.
    pub async fn fetch_offers(&self) -> Result<Vec<Offer>> {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| AppError::Fetch(format!("GET {} failed: {e}", self.url)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Fetch(format!("GET {} returned {status}", self.url)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::Fetch(format!("reading body of {} failed: {e}", self.url)))?;
        let offers = parse_offers(&body)?;
        debug!(url = %self.url, count = offers.len(), "[FEED] offers fetched");
        Ok(offers)
    }
}

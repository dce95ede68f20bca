//! Offer feeds.
//!
//! Responsibilities:
//! • Fetch raw offer records from a JSON file or HTTP endpoint, or generate them.
//! • Validate every record into an [`Offer`] before it reaches the engine.
//! • Surface source failures to the caller instead of yielding an empty batch.

pub mod file;
pub mod http;
pub mod mock;
pub mod record;

pub use http::HttpSource;
pub use mock::{MockConfig, generate_mock_offers};
pub use record::{RawOffer, parse_offers, validate_batch};

use crate::errors::Result;
use crate::models::Offer;
use rand::rngs::StdRng;
use std::fmt;
use std::path::PathBuf;

/// Where the aggregator gets its offers from.
#[derive(Debug, Clone)]
pub enum OfferSource {
    File(PathBuf),
    Http(HttpSource),
    Mock(MockConfig),
}

impl OfferSource {
    /// Load one batch. `rng` is only drawn from by the mock source.
    pub async fn load_offers(&self, rng: &mut StdRng) -> Result<Vec<Offer>> {
        match self {
            OfferSource::File(path) => file::read_offers(path).await,
            OfferSource::Http(source) => source.fetch_offers().await,
            OfferSource::Mock(config) => generate_mock_offers(config, rng),
        }
    }

    pub fn is_mock(&self) -> bool {
        matches!(self, OfferSource::Mock(_))
    }
}

impl fmt::Display for OfferSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OfferSource::File(path) => write!(f, "file:{}", path.display()),
            OfferSource::Http(source) => write!(f, "{}", source.url()),
            OfferSource::Mock(config) => write!(f, "mock({} offers)", config.count()),
        }
    }
}

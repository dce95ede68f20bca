use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Empty input: market stats need at least one offer")]
    EmptyInput,

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

/// A record (or parameter) rejected at the ingestion boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("offer #{index}: {reason}")]
    Offer { index: usize, reason: String },

    #[error("invalid parameter `{name}`: {reason}")]
    Parameter { name: &'static str, reason: String },
}

impl ValidationError {
    pub fn offer(index: usize, reason: impl Into<String>) -> Self {
        Self::Offer {
            index,
            reason: reason.into(),
        }
    }

    /// Re-point an offer error at its position in the input batch.
    pub fn at(self, index: usize) -> Self {
        match self {
            Self::Offer { reason, .. } => Self::Offer { index, reason },
            other => other,
        }
    }

    pub fn parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::Parameter {
            name,
            reason: reason.into(),
        }
    }
}

impl AppError {
    /// True for errors produced by the data source rather than by the data itself.
    pub fn is_fetch(&self) -> bool {
        matches!(self, AppError::Fetch(_) | AppError::Http(_))
    }
}

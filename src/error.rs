use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Feed Errors
    #[error("Feed request failed: {0}")]
    Fetch(String),

    #[error("Feed returned HTTP status {0}")]
    HttpStatus(u16),

    #[error("Feed document malformed: {0}")]
    Parse(String),

    // Snapshot Errors
    #[error("Invalid rate entry for {code}: {reason}")]
    InvalidRateEntry {
        code: String,
        reason: String,
    },

    // Delivery Errors
    #[error("Delivery to {target} failed: {reason}")]
    Delivery {
        target: String,
        reason: String,
    },

    #[error("Sink task panicked: {0}")]
    SinkPanicked(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // System Errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Errors the monitor absorbs as "fetch failed": logged, never published.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, Error::Fetch(_) | Error::HttpStatus(_) | Error::Parse(_))
    }

    pub fn delivery(target: impl Into<String>, reason: impl ToString) -> Self {
        Error::Delivery {
            target: target.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

use thiserror::Error;
use std::io;

#[derive(Error, Debug)]
pub enum NewsPulseError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("no news found for symbol: {0}")]
    NotFound(String),

    #[error("News feed error: {0}")]
    Feed(String),

    #[error("Classifier error: {0}")]
    Classifier(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Malformed cache payload: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("Malformed cache record: {0}")]
    MalformedRecord(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl NewsPulseError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn not_found(symbol: impl Into<String>) -> Self {
        Self::NotFound(symbol.into())
    }

    pub fn feed_error(msg: impl Into<String>) -> Self {
        Self::Feed(msg.into())
    }

    pub fn classifier_error(msg: impl Into<String>) -> Self {
        Self::Classifier(msg.into())
    }

    pub fn malformed_record(msg: impl Into<String>) -> Self {
        Self::MalformedRecord(msg.into())
    }

    /// True for the one failure the boundary reports as "not found" rather
    /// than as an internal error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, NewsPulseError>;

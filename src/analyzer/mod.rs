pub mod orchestrator;

pub use orchestrator::SentimentAnalyzer;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::sentiment::Sentiment;

/// One classified headline. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Headline {
    pub title: String,
    pub sentiment: Sentiment,
}

/// The full analysis for a symbol: what gets cached and what the caller sees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub symbol: String,
    pub timestamp: String,
    pub headlines: Vec<Headline>,
    pub overall_sentiment: Sentiment,
}

/// Fixed-width UTC ISO-8601 rendering. Every stored timestamp uses this
/// format so the cache freshness predicate can compare strings directly.
pub fn iso_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Micros, true)
}

use chrono::Utc;
use tracing::info;

use super::{iso_timestamp, AnalysisResult, Headline};
use crate::error::{NewsPulseError, Result};
use crate::news::NewsSource;
use crate::sentiment::{aggregate, SentimentClassifier};
use crate::storage::ResultCache;

/// Request-level workflow: cache lookup, fetch, classify, aggregate, persist.
pub struct SentimentAnalyzer {
    cache: ResultCache,
    source: Box<dyn NewsSource>,
    classifier: Box<dyn SentimentClassifier>,
}

impl SentimentAnalyzer {
    pub fn new(
        cache: ResultCache,
        source: Box<dyn NewsSource>,
        classifier: Box<dyn SentimentClassifier>,
    ) -> Self {
        Self {
            cache,
            source,
            classifier,
        }
    }

    pub async fn analyze(&self, symbol: &str) -> Result<AnalysisResult> {
        // Lookup uses the caller's symbol as given, while stored records
        // carry the upper-cased form. Mixed-case requests therefore never
        // hit the cache; matching the original service's observable
        // behavior takes precedence over tidying this up.
        if let Some(cached) = self.cache.get_cached(symbol)? {
            info!("Serving cached result for {}", symbol);
            return Ok(cached);
        }

        info!("Cache miss for {}, fetching fresh news", symbol);
        let titles = self.source.fetch_headlines(symbol).await?;
        if titles.is_empty() {
            return Err(NewsPulseError::not_found(symbol));
        }

        let mut headlines = Vec::with_capacity(titles.len());
        for title in titles {
            let sentiment = self.classifier.classify(&title)?;
            headlines.push(Headline { title, sentiment });
        }

        let labels: Vec<_> = headlines.iter().map(|h| h.sentiment).collect();
        let overall_sentiment = aggregate(&labels);

        let result = AnalysisResult {
            symbol: symbol.to_uppercase(),
            timestamp: iso_timestamp(Utc::now()),
            headlines,
            overall_sentiment,
        };

        self.cache.cache_result(&result)?;
        info!(
            "Analyzed {} headlines for {}: {}",
            result.headlines.len(),
            result.symbol,
            result.overall_sentiment
        );
        Ok(result)
    }

    /// Stored analysis history for a symbol, newest first.
    pub fn history(&self, symbol: &str, limit: usize) -> Result<Vec<AnalysisResult>> {
        self.cache.history(symbol, limit)
    }
}

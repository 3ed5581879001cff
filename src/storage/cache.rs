use chrono::{Duration, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use crate::analyzer::{iso_timestamp, AnalysisResult, Headline};
use crate::error::{NewsPulseError, Result};
use crate::sentiment::{aggregate, Sentiment};

/// Append-only cache of analysis results, keyed by symbol with a freshness
/// window. Records are never updated or pruned; `get_cached` only ever sees
/// the newest one inside the window.
///
/// The handle is constructed once at startup and shared; the connection is
/// serialized by the mutex, concurrent writers simply append.
#[derive(Clone)]
pub struct ResultCache {
    db: Arc<Mutex<Connection>>,
    ttl_minutes: i64,
}

impl ResultCache {
    pub fn open(path: &Path, ttl_minutes: i64) -> Result<Self> {
        info!("Opening cache database at: {}", path.display());
        let conn = Connection::open(path)?;
        Self::from_connection(conn, ttl_minutes)
    }

    /// In-memory cache, used by tests and throwaway runs.
    pub fn open_in_memory(ttl_minutes: i64) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn, ttl_minutes)
    }

    fn from_connection(conn: Connection, ttl_minutes: i64) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS news (
                id INTEGER PRIMARY KEY,
                symbol TEXT,
                timestamp TEXT,
                headlines TEXT,
                sentiments TEXT
            )",
            [],
        )?;

        Ok(Self {
            db: Arc::new(Mutex::new(conn)),
            ttl_minutes,
        })
    }

    /// Returns the newest stored result for `symbol` whose timestamp is
    /// strictly inside the freshness window, or `None`.
    ///
    /// The overall sentiment is recomputed from the stored labels rather
    /// than read back; only the parallel title/label arrays are persisted.
    pub fn get_cached(&self, symbol: &str) -> Result<Option<AnalysisResult>> {
        let cutoff = iso_timestamp(Utc::now() - Duration::minutes(self.ttl_minutes));
        debug!("Cache lookup for {} with cutoff {}", symbol, cutoff);

        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare(
            "SELECT symbol, timestamp, headlines, sentiments FROM news
             WHERE symbol = ?1 AND timestamp > ?2
             ORDER BY timestamp DESC
             LIMIT 1",
        )?;

        let row = stmt.query_row(params![symbol, cutoff], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        });

        match row {
            Ok((symbol, timestamp, headlines_json, sentiments_json)) => {
                let result =
                    rebuild_result(symbol, timestamp, &headlines_json, &sentiments_json)?;
                Ok(Some(result))
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Appends a record unconditionally; no overwrite, no deduplication.
    pub fn cache_result(&self, result: &AnalysisResult) -> Result<()> {
        let titles: Vec<&str> = result.headlines.iter().map(|h| h.title.as_str()).collect();
        let labels: Vec<Sentiment> = result.headlines.iter().map(|h| h.sentiment).collect();

        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT INTO news (symbol, timestamp, headlines, sentiments)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                result.symbol,
                result.timestamp,
                serde_json::to_string(&titles)?,
                serde_json::to_string(&labels)?,
            ],
        )?;

        debug!("Cached result for {} at {}", result.symbol, result.timestamp);
        Ok(())
    }

    /// All stored records for `symbol`, newest first, fresh or not.
    /// Storage is append-only so this is the full analysis history.
    pub fn history(&self, symbol: &str, limit: usize) -> Result<Vec<AnalysisResult>> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare(
            "SELECT symbol, timestamp, headlines, sentiments FROM news
             WHERE symbol = ?1
             ORDER BY timestamp DESC
             LIMIT ?2",
        )?;

        let rows = stmt.query_map(params![symbol, limit as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut results = Vec::new();
        for row in rows {
            let (symbol, timestamp, headlines_json, sentiments_json) = row?;
            results.push(rebuild_result(
                symbol,
                timestamp,
                &headlines_json,
                &sentiments_json,
            )?);
        }
        Ok(results)
    }
}

/// Reconstructs a result from the persisted parallel arrays, validating the
/// schema on read. The two arrays must zip positionally into headline pairs.
fn rebuild_result(
    symbol: String,
    timestamp: String,
    headlines_json: &str,
    sentiments_json: &str,
) -> Result<AnalysisResult> {
    let titles: Vec<String> = serde_json::from_str(headlines_json)?;
    let labels: Vec<Sentiment> = serde_json::from_str(sentiments_json)?;

    if titles.len() != labels.len() {
        return Err(NewsPulseError::malformed_record(format!(
            "{} titles but {} sentiment labels for {}",
            titles.len(),
            labels.len(),
            symbol
        )));
    }

    let overall_sentiment = aggregate(&labels);
    let headlines = titles
        .into_iter()
        .zip(labels)
        .map(|(title, sentiment)| Headline { title, sentiment })
        .collect();

    Ok(AnalysisResult {
        symbol,
        timestamp,
        headlines,
        overall_sentiment,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::Sentiment::{Negative, Neutral, Positive};

    fn result_at(symbol: &str, timestamp: String) -> AnalysisResult {
        AnalysisResult {
            symbol: symbol.to_string(),
            timestamp,
            headlines: vec![
                Headline {
                    title: format!("{} soars on record profits", symbol),
                    sentiment: Positive,
                },
                Headline {
                    title: format!("{} beats estimates", symbol),
                    sentiment: Positive,
                },
                Headline {
                    title: format!("Analysts warn of {} headwinds", symbol),
                    sentiment: Negative,
                },
            ],
            overall_sentiment: Positive,
        }
    }

    fn fresh_result(symbol: &str) -> AnalysisResult {
        result_at(symbol, iso_timestamp(Utc::now()))
    }

    #[test]
    fn store_then_get_round_trips_pairs_in_order() {
        let cache = ResultCache::open_in_memory(10).unwrap();
        let stored = fresh_result("TCS");
        cache.cache_result(&stored).unwrap();

        let read = cache.get_cached("TCS").unwrap().unwrap();
        assert_eq!(read, stored);
    }

    #[test]
    fn missing_symbol_is_absent() {
        let cache = ResultCache::open_in_memory(10).unwrap();
        assert!(cache.get_cached("NOPE").unwrap().is_none());
    }

    #[test]
    fn expired_record_is_not_returned() {
        let cache = ResultCache::open_in_memory(10).unwrap();
        let stale = result_at("TCS", iso_timestamp(Utc::now() - Duration::minutes(11)));
        cache.cache_result(&stale).unwrap();

        assert!(cache.get_cached("TCS").unwrap().is_none());
    }

    #[test]
    fn record_inside_window_is_returned() {
        let cache = ResultCache::open_in_memory(10).unwrap();
        let recent = result_at("TCS", iso_timestamp(Utc::now() - Duration::minutes(8)));
        cache.cache_result(&recent).unwrap();

        assert!(cache.get_cached("TCS").unwrap().is_some());
    }

    #[test]
    fn newest_qualifying_record_wins() {
        let cache = ResultCache::open_in_memory(10).unwrap();
        let older = result_at("TCS", iso_timestamp(Utc::now() - Duration::minutes(5)));
        let mut newer = result_at("TCS", iso_timestamp(Utc::now() - Duration::minutes(1)));
        newer.headlines = vec![Headline {
            title: "TCS unchanged in flat trading".to_string(),
            sentiment: Neutral,
        }];
        newer.overall_sentiment = Neutral;

        cache.cache_result(&older).unwrap();
        cache.cache_result(&newer).unwrap();

        let read = cache.get_cached("TCS").unwrap().unwrap();
        assert_eq!(read.timestamp, newer.timestamp);
        assert_eq!(read.overall_sentiment, Neutral);
    }

    #[test]
    fn lookup_is_case_sensitive_as_stored() {
        let cache = ResultCache::open_in_memory(10).unwrap();
        cache.cache_result(&fresh_result("TCS")).unwrap();

        assert!(cache.get_cached("tcs").unwrap().is_none());
        assert!(cache.get_cached("TCS").unwrap().is_some());
    }

    #[test]
    fn overall_sentiment_is_recomputed_on_read() {
        let cache = ResultCache::open_in_memory(10).unwrap();
        // Stored verdict disagrees with the labels; the read side must
        // trust the labels.
        let mut stored = fresh_result("TCS");
        stored.overall_sentiment = Negative;
        cache.cache_result(&stored).unwrap();

        let read = cache.get_cached("TCS").unwrap().unwrap();
        assert_eq!(read.overall_sentiment, Positive);
    }

    #[test]
    fn corrupt_payload_is_a_deserialization_error() {
        let cache = ResultCache::open_in_memory(10).unwrap();
        {
            let db = cache.db.lock().unwrap();
            db.execute(
                "INSERT INTO news (symbol, timestamp, headlines, sentiments)
                 VALUES (?1, ?2, ?3, ?4)",
                params!["TCS", iso_timestamp(Utc::now()), "not json", "[]"],
            )
            .unwrap();
        }

        let err = cache.get_cached("TCS").unwrap_err();
        assert!(matches!(err, NewsPulseError::Deserialization(_)));
    }

    #[test]
    fn mismatched_array_lengths_are_rejected() {
        let cache = ResultCache::open_in_memory(10).unwrap();
        {
            let db = cache.db.lock().unwrap();
            db.execute(
                "INSERT INTO news (symbol, timestamp, headlines, sentiments)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    "TCS",
                    iso_timestamp(Utc::now()),
                    r#"["a", "b"]"#,
                    r#"["positive"]"#
                ],
            )
            .unwrap();
        }

        let err = cache.get_cached("TCS").unwrap_err();
        assert!(matches!(err, NewsPulseError::MalformedRecord(_)));
    }

    #[test]
    fn history_returns_all_records_newest_first() {
        let cache = ResultCache::open_in_memory(10).unwrap();
        let old = result_at("TCS", iso_timestamp(Utc::now() - Duration::minutes(30)));
        let new = result_at("TCS", iso_timestamp(Utc::now()));
        cache.cache_result(&old).unwrap();
        cache.cache_result(&new).unwrap();

        let history = cache.history("TCS", 10).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].timestamp, new.timestamp);
        assert_eq!(history[1].timestamp, old.timestamp);
    }
}

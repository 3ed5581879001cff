use once_cell::sync::Lazy;
use std::collections::HashMap;
use tracing::debug;

use crate::error::Result;
use super::Sentiment;

/// Maps a single piece of text to a sentiment label.
pub trait SentimentClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Result<Sentiment>;
}

/// Word polarity scores, -1.0 to 1.0. Zero-scored entries keep genuinely
/// flat wording from counting as unmatched.
static LEXICON: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        // Positive
        ("soars", 0.5),
        ("soar", 0.5),
        ("surges", 0.5),
        ("surge", 0.5),
        ("rally", 0.4),
        ("rallies", 0.4),
        ("jumps", 0.4),
        ("climbs", 0.3),
        ("rises", 0.3),
        ("record", 0.3),
        ("profit", 0.4),
        ("profits", 0.4),
        ("gain", 0.4),
        ("gains", 0.4),
        ("beat", 0.4),
        ("beats", 0.5),
        ("strong", 0.4),
        ("growth", 0.3),
        ("upgrade", 0.5),
        ("upgraded", 0.5),
        ("upgrades", 0.5),
        ("wins", 0.4),
        ("expands", 0.3),
        ("boost", 0.3),
        ("boosts", 0.3),
        ("bullish", 0.6),
        ("outperforms", 0.5),
        ("optimistic", 0.4),
        ("success", 0.4),
        // Negative
        ("plunges", -0.3),
        ("plunge", -0.3),
        ("falls", -0.3),
        ("fall", -0.2),
        ("drops", -0.3),
        ("slides", -0.25),
        ("tumbles", -0.4),
        ("slump", -0.4),
        ("slumps", -0.4),
        ("loss", -0.3),
        ("losses", -0.4),
        ("miss", -0.3),
        ("misses", -0.4),
        ("weak", -0.3),
        ("downgrade", -0.5),
        ("downgraded", -0.5),
        ("downgrades", -0.5),
        ("crash", -0.6),
        ("crashes", -0.6),
        ("cut", -0.2),
        ("cuts", -0.3),
        ("lawsuit", -0.4),
        ("probe", -0.3),
        ("warns", -0.3),
        ("warning", -0.3),
        ("layoffs", -0.5),
        ("decline", -0.3),
        ("declines", -0.3),
        ("fears", -0.3),
        ("headwinds", -0.3),
        ("bearish", -0.6),
        // Flat
        ("unchanged", 0.0),
        ("flat", 0.0),
        ("steady", 0.0),
        ("holds", 0.0),
    ])
});

/// Lexicon-backed classifier. Scores a headline as the mean polarity of its
/// recognized words; polarity above 0.1 is positive, below -0.1 negative,
/// anything in between neutral.
pub struct LexiconClassifier;

impl LexiconClassifier {
    pub fn new() -> Self {
        Self
    }

    fn polarity(&self, text: &str) -> f64 {
        let lowered = text.to_lowercase();
        let scores: Vec<f64> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .filter_map(|w| LEXICON.get(w).copied())
            .collect();

        if scores.is_empty() {
            return 0.0;
        }
        scores.iter().sum::<f64>() / scores.len() as f64
    }
}

impl Default for LexiconClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentClassifier for LexiconClassifier {
    fn classify(&self, text: &str) -> Result<Sentiment> {
        let polarity = self.polarity(text);
        debug!("Polarity {:.2} for: {}", polarity, text);

        let label = if polarity > 0.1 {
            Sentiment::Positive
        } else if polarity < -0.1 {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        };
        Ok(label)
    }
}

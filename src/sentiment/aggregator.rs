use std::collections::HashMap;

use super::Sentiment;

/// Majority vote over an ordered sequence of labels.
///
/// Returns `Neutral` for an empty sequence. When two or more labels share the
/// maximum count, the one that appears first in the input wins; scanning in
/// input order and only replacing the leader on a strictly higher count keeps
/// the tie-break deterministic.
pub fn aggregate(labels: &[Sentiment]) -> Sentiment {
    let Some(&first) = labels.first() else {
        return Sentiment::Neutral;
    };

    let mut counts: HashMap<Sentiment, usize> = HashMap::new();
    for label in labels {
        *counts.entry(*label).or_insert(0) += 1;
    }

    let mut winner = first;
    let mut winner_count = counts[&first];
    for label in labels {
        let count = counts[label];
        if count > winner_count {
            winner = *label;
            winner_count = count;
        }
    }
    winner
}

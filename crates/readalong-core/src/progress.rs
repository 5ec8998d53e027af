//! Completion percentage of the active sentence.

use crate::estimator::Position;
use crate::text_utils;
use std::collections::BTreeMap;

/// `(word_idx + 1) / words_in_sentence * 100`, clamped to `[0, 100]`.
///
/// `None` when nothing is active or the position does not address a sentence
/// with words in `sentences`.
pub fn progress_for<S: AsRef<str>>(position: Position, sentences: &[S]) -> Option<f64> {
    let sentence_idx = position.sentence_idx?;
    let word_idx = position.word_idx?;
    let word_count = text_utils::word_count(sentences.get(sentence_idx)?.as_ref());
    if word_count == 0 {
        return None;
    }
    let pct = (word_idx as f64 + 1.0) / word_count as f64 * 100.0;
    Some(pct.clamp(0.0, 100.0))
}

/// Progress keyed by the active sentence index; empty when nothing is active.
pub fn sentence_progress<S: AsRef<str>>(position: Position, sentences: &[S]) -> BTreeMap<usize, f64> {
    let mut map = BTreeMap::new();
    if let (Some(sentence_idx), Some(pct)) = (position.sentence_idx, progress_for(position, sentences)) {
        map.insert(sentence_idx, pct);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: [&str; 2] = ["one two three four", "five six"];

    #[test]
    fn computes_percentage_of_active_sentence() {
        assert_eq!(progress_for(Position::at(0, 0), &PAGE), Some(25.0));
        assert_eq!(progress_for(Position::at(0, 3), &PAGE), Some(100.0));
        assert_eq!(progress_for(Position::at(1, 0), &PAGE), Some(50.0));
    }

    #[test]
    fn word_index_past_sentence_is_clamped() {
        assert_eq!(progress_for(Position::at(1, 9), &PAGE), Some(100.0));
    }

    #[test]
    fn nothing_active_means_no_progress() {
        assert_eq!(progress_for(Position::NONE, &PAGE), None);
        assert_eq!(progress_for(Position::at(5, 0), &PAGE), None);
        assert_eq!(progress_for(Position::at(0, 0), &["   "]), None);
        assert!(sentence_progress(Position::NONE, &PAGE).is_empty());
    }

    #[test]
    fn monotonic_within_sentence_and_resets_on_next() {
        let mut last = 0.0;
        for word_idx in 0..4 {
            let pct = progress_for(Position::at(0, word_idx), &PAGE).expect("progress");
            assert!(pct >= last);
            last = pct;
        }
        let next = progress_for(Position::at(1, 0), &PAGE).expect("progress");
        assert!(next < last);
    }

    #[test]
    fn map_is_keyed_by_active_sentence() {
        let map = sentence_progress(Position::at(1, 1), &PAGE);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&1), Some(&100.0));
    }
}

//! Open-loop estimate of the narrated sentence and word.
//!
//! The estimate only uses elapsed playback time and an assumed speaking rate;
//! nothing from the audio itself feeds back into it. Drift against the real
//! narration is expected. The clamping rules below are what callers and
//! fixtures rely on:
//!
//! - an estimate past the end of the page sticks to the last word of the last
//!   sentence;
//! - the word index is always inside the active sentence.

use crate::speaking_rate::SpeakingRateModel;
use crate::sync_state::SyncState;
use crate::text_utils;
use serde::Serialize;
use tracing::trace;
use ts_rs::TS;

/// Elapsed fraction and total length of the narration track.
///
/// Both values come from the audio element and are clamped on construction:
/// the fraction into `[0, 1]`, the duration to a finite non-negative number.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, TS)]
#[ts(export)]
pub struct PlaybackProgress {
    pub fraction: f64,
    pub duration_secs: f64,
}

impl PlaybackProgress {
    pub fn new(fraction: f64, duration_secs: f64) -> Self {
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        let duration_secs = if duration_secs.is_finite() {
            duration_secs.max(0.0)
        } else {
            0.0
        };
        Self {
            fraction,
            duration_secs,
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.fraction * self.duration_secs
    }

    pub fn with_fraction(self, fraction: f64) -> Self {
        Self::new(fraction, self.duration_secs)
    }
}

/// Highlighted sentence and word, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, TS)]
#[ts(export)]
pub struct Position {
    pub sentence_idx: Option<usize>,
    pub word_idx: Option<usize>,
}

impl Position {
    pub const NONE: Position = Position {
        sentence_idx: None,
        word_idx: None,
    };

    pub fn at(sentence_idx: usize, word_idx: usize) -> Self {
        Self {
            sentence_idx: Some(sentence_idx),
            word_idx: Some(word_idx),
        }
    }

    pub fn is_none(&self) -> bool {
        self.sentence_idx.is_none()
    }
}

/// Estimate the narrated position for one tick.
///
/// Test mode returns its cursor verbatim. Idle, single-sentence playback and a
/// zero-length track produce no position. Whole-page playback converts elapsed
/// time into a word count using `language`'s rate and locates it in
/// `sentences`.
pub fn estimate<S: AsRef<str>>(
    state: SyncState,
    progress: PlaybackProgress,
    sentences: &[S],
    rates: &SpeakingRateModel,
    language: &str,
) -> Position {
    match state {
        SyncState::TestMode {
            sentence_idx,
            word_idx,
        } => return Position::at(sentence_idx, word_idx),
        SyncState::Idle => {
            trace!("Not playing audio; no position");
            return Position::NONE;
        }
        SyncState::PlayingSentence { sentence_idx } => {
            trace!(sentence_idx, "Individual sentence is playing; no position");
            return Position::NONE;
        }
        SyncState::PlayingWhole => {}
    }

    if progress.duration_secs <= 0.0 {
        trace!("Audio duration is zero; no position");
        return Position::NONE;
    }

    let wpm = rates.rate_for(language);
    let expected_words = expected_words_spoken(progress, wpm);
    let position = locate_word(sentences, expected_words);
    trace!(
        fraction = progress.fraction,
        duration_secs = progress.duration_secs,
        elapsed_secs = progress.elapsed_secs(),
        wpm,
        %language,
        expected_words,
        sentence_idx = ?position.sentence_idx,
        word_idx = ?position.word_idx,
        "Estimated narration position"
    );
    position
}

/// `floor(elapsed / 60 * wpm)`, never negative.
pub fn expected_words_spoken(progress: PlaybackProgress, wpm: u32) -> usize {
    let words = (progress.elapsed_secs() / 60.0 * f64::from(wpm)).floor();
    if words.is_nan() || words <= 0.0 {
        return 0;
    }
    // Saturates at usize::MAX for huge or infinite products.
    words as usize
}

/// Locate the `expected_words`-th word (zero-based) across `sentences` with a
/// running partial sum. Overshooting the page clamps to its last word.
pub fn locate_word<S: AsRef<str>>(sentences: &[S], expected_words: usize) -> Position {
    if text_utils::total_words(sentences) == 0 {
        return Position::NONE;
    }

    let mut words_so_far = 0usize;
    for (sentence_idx, sentence) in sentences.iter().enumerate() {
        let count = text_utils::word_count(sentence.as_ref());
        if words_so_far + count > expected_words {
            return Position::at(sentence_idx, expected_words - words_so_far);
        }
        words_so_far += count;
    }

    let last_idx = sentences.len() - 1;
    let last_count = text_utils::word_count(sentences[last_idx].as_ref());
    Position::at(last_idx, last_count.saturating_sub(1))
}

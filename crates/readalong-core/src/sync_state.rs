//! Playback state of a synchronization session.
//!
//! Audio playback and test mode are stored separately because test mode only
//! shadows audio; it never tears it down. Once per tick the two are folded into
//! a single [`SyncState`] with test mode taking precedence.

use serde::Serialize;
use ts_rs::TS;

/// Audio-driven part of the state. Whole-page and single-sentence narration
/// are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AudioState {
    #[default]
    Idle,
    PlayingWhole,
    PlayingSentence {
        sentence_idx: usize,
    },
}

impl AudioState {
    pub fn is_playing(self) -> bool {
        !matches!(self, AudioState::Idle)
    }
}

/// Synthetic cursor advanced by the test-mode timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TestCursor {
    pub sentence_idx: usize,
    pub word_idx: usize,
}

impl TestCursor {
    /// Move one word forward. Past `word_wrap` words the cursor wraps to the
    /// next sentence, cycling through the first `sentence_cycle` sentences.
    pub fn advance(self, word_wrap: usize, sentence_cycle: usize) -> Self {
        let word_idx = (self.word_idx + 1) % word_wrap.max(1);
        let sentence_idx = if word_idx == 0 {
            match sentence_cycle {
                0 => 0,
                cycle => (self.sentence_idx + 1) % cycle,
            }
        } else {
            self.sentence_idx
        };
        Self {
            sentence_idx,
            word_idx,
        }
    }
}

/// The single effective state the estimator sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum SyncState {
    #[default]
    Idle,
    PlayingWhole,
    PlayingSentence {
        sentence_idx: usize,
    },
    TestMode {
        sentence_idx: usize,
        word_idx: usize,
    },
}

impl SyncState {
    /// Fold audio and test state; an active test cursor always wins.
    pub fn resolve(audio: AudioState, test: Option<TestCursor>) -> Self {
        if let Some(cursor) = test {
            return SyncState::TestMode {
                sentence_idx: cursor.sentence_idx,
                word_idx: cursor.word_idx,
            };
        }
        match audio {
            AudioState::Idle => SyncState::Idle,
            AudioState::PlayingWhole => SyncState::PlayingWhole,
            AudioState::PlayingSentence { sentence_idx } => {
                SyncState::PlayingSentence { sentence_idx }
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SyncState::Idle => "idle",
            SyncState::PlayingWhole => "playing_whole",
            SyncState::PlayingSentence { .. } => "playing_sentence",
            SyncState::TestMode { .. } => "test_mode",
        }
    }
}

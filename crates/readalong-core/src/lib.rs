//! Read-along synchronization engine.
//!
//! Splits page text into sentences, estimates which word a narrator is
//! speaking from playback progress alone, and derives per-word highlight tags
//! for the original text and its translations.

pub mod bindings;
pub mod cancellation;
pub mod config;
pub mod estimator;
pub mod highlight;
pub mod languages;
pub mod page;
pub mod progress;
pub mod segmenter;
pub mod session;
pub mod speaking_rate;
pub mod sync_state;
pub mod text_utils;
pub mod ticker;

pub use bindings::export_ts_bindings;
pub use estimator::{PlaybackProgress, Position};
pub use highlight::{RenderedSentence, WordSegment, WordTag};
pub use languages::ReadingMode;
pub use page::PageText;
pub use session::{
    SessionCommand, SessionEffect, SessionEvent, SessionSetup, SyncFrame, SyncSession,
    SyncSnapshot, TickInput,
};
pub use sync_state::SyncState;

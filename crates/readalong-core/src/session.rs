//! Synchronization session: playback state plus the derived highlight frame.
//!
//! A session belongs to exactly one page. It owns the audio and test-mode
//! state, and after every stimulus (command, progress tick, test-mode tick)
//! recomputes a [`SyncFrame`] in dependency order: estimator, then progress,
//! then rendering. Consumers only ever see the latest frame.
//!
//! The session never starts threads itself. Starting or stopping test mode
//! returns a [`SessionEffect`] asking the caller to schedule or cancel a timer;
//! the timer feeds [`TickInput::TestTimer`] back in. Ticks carrying a
//! generation other than the active one are ignored.

use crate::config::{AppConfig, TestModeSettings};
use crate::estimator::{self, PlaybackProgress, Position};
use crate::highlight::{self, RenderedSentence};
use crate::languages::{ReadingMode, language as supported_language, normalize_code};
use crate::page::PageText;
use crate::progress;
use crate::speaking_rate::SpeakingRateModel;
use crate::sync_state::{AudioState, SyncState, TestCursor};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};
use ts_rs::TS;

/// Test-timer generations are unique per process so a timer left running for
/// one session can never match another session's generation.
static NEXT_TEST_GENERATION: AtomicU64 = AtomicU64::new(1);

fn next_test_generation() -> u64 {
    NEXT_TEST_GENERATION.fetch_add(1, Ordering::Relaxed)
}

/// Who is reading what, fixed for the session's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSetup {
    pub reading_mode: ReadingMode,
    pub primary_language: String,
    /// Requested target languages, in display order.
    pub languages: Vec<String>,
}

impl SessionSetup {
    pub fn from_config(config: &AppConfig, languages: &[String]) -> Self {
        Self {
            reading_mode: config.reading_mode,
            primary_language: config.primary_language.clone(),
            languages: languages.to_vec(),
        }
    }
}

/// External stimuli that only move time forward.
#[derive(Debug, Clone, PartialEq)]
pub enum TickInput {
    /// Playback progress reported by the audio element.
    Progress { fraction: f64, duration_secs: f64 },
    /// A test-mode timer fired.
    TestTimer { generation: u64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    GetSnapshot,
    PlayWhole,
    PlaySentence { sentence_idx: usize },
    Pause,
    Stop,
    PlaybackEnded,
    Seek { fraction: f64 },
    Tick(TickInput),
    StartTestMode,
    StopTestMode,
    ToggleTestMode,
    SelectNarrationLanguage { language: String },
}

impl SessionCommand {
    pub fn action(&self) -> &'static str {
        match self {
            Self::GetSnapshot => "sync_get_snapshot",
            Self::PlayWhole => "sync_play_whole",
            Self::PlaySentence { .. } => "sync_play_sentence",
            Self::Pause => "sync_pause",
            Self::Stop => "sync_stop",
            Self::PlaybackEnded => "sync_playback_ended",
            Self::Seek { .. } => "sync_seek",
            Self::Tick(TickInput::Progress { .. }) => "sync_progress_tick",
            Self::Tick(TickInput::TestTimer { .. }) => "sync_test_tick",
            Self::StartTestMode => "sync_start_test_mode",
            Self::StopTestMode => "sync_stop_test_mode",
            Self::ToggleTestMode => "sync_toggle_test_mode",
            Self::SelectNarrationLanguage { .. } => "sync_select_narration_language",
        }
    }
}

/// Work the caller has to carry out on the session's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEffect {
    StartTestTimer { generation: u64, interval: Duration },
    CancelTestTimer { generation: u64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct RenderedTranslation {
    pub language: String,
    pub sentences: Vec<RenderedSentence>,
    pub phonetic: Vec<RenderedSentence>,
}

/// Everything derived from one tick.
///
/// Word-level tags are applied to the narrated sentence list only; every other
/// list (original text, other translations, phonetics) gets the active
/// sentence highlighted without a current word, because word indices do not
/// carry over between languages.
#[derive(Debug, Clone, PartialEq, Default, Serialize, TS)]
#[ts(export)]
pub struct SyncFrame {
    pub state: SyncState,
    pub position: Position,
    pub sentence_progress: BTreeMap<usize, f64>,
    pub narration_language: String,
    /// `None` when the original text is narrated.
    pub narrated_translation: Option<String>,
    pub original: Vec<RenderedSentence>,
    pub translations: Vec<RenderedTranslation>,
}

/// Inputs of [`derive_frame`].
#[derive(Debug, Clone, Copy)]
pub struct FrameInputs<'a> {
    pub state: SyncState,
    pub progress: PlaybackProgress,
    pub page: &'a PageText,
    pub narration_language: &'a str,
    pub rates: &'a SpeakingRateModel,
}

/// Pure derivation of a frame. Runs estimator, progress and rendering in that
/// order so the rendered output always matches this tick's estimate.
pub fn derive_frame(inputs: FrameInputs<'_>) -> SyncFrame {
    let narrated_translation = inputs
        .page
        .translation(inputs.narration_language)
        .map(|_| normalize_code(inputs.narration_language));
    let narrated = inputs.page.narrated(inputs.narration_language);

    let position = estimator::estimate(
        inputs.state,
        inputs.progress,
        narrated,
        inputs.rates,
        inputs.narration_language,
    );
    let sentence_progress = progress::sentence_progress(position, narrated);

    let sentence_only = Position {
        sentence_idx: position.sentence_idx,
        word_idx: None,
    };
    let position_for = |is_narrated: bool| if is_narrated { position } else { sentence_only };

    let original = highlight::render_sentences(
        inputs.page.original(),
        position_for(narrated_translation.is_none()),
    );
    let translations = inputs
        .page
        .translations()
        .iter()
        .map(|(language, translation)| RenderedTranslation {
            language: language.clone(),
            sentences: highlight::render_sentences(
                &translation.sentences,
                position_for(narrated_translation.as_deref() == Some(language.as_str())),
            ),
            phonetic: highlight::render_sentences(&translation.phonetic, sentence_only),
        })
        .collect();

    SyncFrame {
        state: inputs.state,
        position,
        sentence_progress,
        narration_language: normalize_code(inputs.narration_language),
        narrated_translation,
        original,
        translations,
    }
}

/// Read model handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct SyncSnapshot {
    pub reading_mode: ReadingMode,
    pub primary_language: String,
    pub languages: Vec<String>,
    pub narration_language: String,
    pub progress: PlaybackProgress,
    pub test_mode_active: bool,
    pub frame: SyncFrame,
}

#[derive(Debug, Clone)]
pub struct SessionEvent {
    pub action: &'static str,
    pub snapshot: SyncSnapshot,
    pub effects: Vec<SessionEffect>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Track {
    Whole,
    Sentence(usize),
}

#[derive(Debug, Clone, Copy)]
struct TestMode {
    generation: u64,
    cursor: TestCursor,
}

#[derive(Debug, Clone)]
pub struct SyncSession {
    reading_mode: ReadingMode,
    primary_language: String,
    languages: Vec<String>,
    narration_language: String,
    rates: SpeakingRateModel,
    test_settings: TestModeSettings,
    page: PageText,
    audio: AudioState,
    loaded_track: Option<Track>,
    progress: PlaybackProgress,
    test_mode: Option<TestMode>,
    frame: SyncFrame,
}

impl SyncSession {
    pub fn new(setup: SessionSetup, page: PageText, config: &AppConfig) -> Self {
        Self::with_parts(setup, page, config.rate_model(), config.test_mode())
    }

    pub fn with_parts(
        setup: SessionSetup,
        page: PageText,
        rates: SpeakingRateModel,
        test_settings: TestModeSettings,
    ) -> Self {
        let primary_language = normalize_code(&setup.primary_language);
        let mut languages: Vec<String> = Vec::new();
        for language in &setup.languages {
            let code = normalize_code(language);
            if code.is_empty() || languages.contains(&code) {
                continue;
            }
            if code != primary_language && supported_language(&code).is_none() {
                warn!(%code, "Requested language is not in the supported table");
            }
            languages.push(code);
        }
        if languages.is_empty() && !primary_language.is_empty() {
            languages.push(primary_language.clone());
        }

        let mut session = Self {
            reading_mode: setup.reading_mode,
            narration_language: primary_language.clone(),
            primary_language,
            languages,
            rates,
            test_settings,
            page,
            audio: AudioState::Idle,
            loaded_track: None,
            progress: PlaybackProgress::default(),
            test_mode: None,
            frame: SyncFrame::default(),
        };
        session.narration_language = session.default_narration_language();
        info!(
            mode = %session.reading_mode,
            primary = %session.primary_language,
            languages = ?session.languages,
            narration = %session.narration_language,
            sentences = session.page.original().len(),
            "Created synchronization session"
        );
        session.refresh();
        session
    }

    pub fn page(&self) -> &PageText {
        &self.page
    }

    pub fn frame(&self) -> &SyncFrame {
        &self.frame
    }

    pub fn sync_state(&self) -> SyncState {
        SyncState::resolve(self.audio, self.test_mode.map(|mode| mode.cursor))
    }

    pub fn narration_language(&self) -> &str {
        &self.narration_language
    }

    pub fn progress(&self) -> PlaybackProgress {
        self.progress
    }

    pub fn is_test_mode_active(&self) -> bool {
        self.test_mode.is_some()
    }

    /// Generation of the running test timer, if test mode is on.
    pub fn test_generation(&self) -> Option<u64> {
        self.test_mode.map(|mode| mode.generation)
    }

    pub fn snapshot(&self) -> SyncSnapshot {
        SyncSnapshot {
            reading_mode: self.reading_mode,
            primary_language: self.primary_language.clone(),
            languages: self.languages.clone(),
            narration_language: self.narration_language.clone(),
            progress: self.progress,
            test_mode_active: self.test_mode.is_some(),
            frame: self.frame.clone(),
        }
    }

    pub fn apply_command(&mut self, command: SessionCommand) -> SessionEvent {
        let action = command.action();
        let effects = match command {
            SessionCommand::GetSnapshot => Vec::new(),
            SessionCommand::PlayWhole => {
                self.play_whole();
                Vec::new()
            }
            SessionCommand::PlaySentence { sentence_idx } => {
                self.play_sentence(sentence_idx);
                Vec::new()
            }
            SessionCommand::Pause => {
                self.pause();
                Vec::new()
            }
            SessionCommand::Stop => {
                self.stop();
                Vec::new()
            }
            SessionCommand::PlaybackEnded => {
                self.playback_ended();
                Vec::new()
            }
            SessionCommand::Seek { fraction } => {
                self.seek(fraction);
                Vec::new()
            }
            SessionCommand::Tick(input) => {
                self.tick(input);
                Vec::new()
            }
            SessionCommand::StartTestMode => self.start_test_mode(),
            SessionCommand::StopTestMode => self.stop_test_mode(),
            SessionCommand::ToggleTestMode => self.toggle_test_mode(),
            SessionCommand::SelectNarrationLanguage { language } => {
                self.select_narration_language(&language);
                Vec::new()
            }
        };
        SessionEvent {
            action,
            snapshot: self.snapshot(),
            effects,
        }
    }

    /// Feed one tick and return the recomputed frame.
    pub fn tick(&mut self, input: TickInput) -> &SyncFrame {
        match input {
            TickInput::Progress {
                fraction,
                duration_secs,
            } => {
                if !self.audio.is_playing() {
                    debug!(fraction, "Ignoring progress tick while audio is idle");
                    return &self.frame;
                }
                self.progress = PlaybackProgress::new(fraction, duration_secs);
            }
            TickInput::TestTimer { generation } => {
                if !self.advance_test_cursor(generation) {
                    return &self.frame;
                }
            }
        }
        self.refresh();
        &self.frame
    }

    pub fn play_whole(&mut self) {
        if let AudioState::PlayingSentence { sentence_idx } = self.audio {
            info!(sentence_idx, "Stopping sentence narration before whole-page playback");
            self.audio = AudioState::Idle;
        }
        if self.loaded_track != Some(Track::Whole) {
            self.progress = PlaybackProgress::default();
            self.loaded_track = Some(Track::Whole);
        }
        self.audio = AudioState::PlayingWhole;
        info!(narration = %self.narration_language, "Whole-page narration playing");
        self.refresh();
    }

    pub fn play_sentence(&mut self, sentence_idx: usize) {
        let count = self.page.narrated(&self.narration_language).len();
        if count == 0 {
            warn!(sentence_idx, "No sentences on page; ignoring sentence playback");
            return;
        }
        let sentence_idx = sentence_idx.min(count - 1);
        if self.audio == AudioState::PlayingWhole {
            info!(sentence_idx, "Stopping whole-page narration before sentence playback");
            self.audio = AudioState::Idle;
        }
        if self.loaded_track != Some(Track::Sentence(sentence_idx)) {
            self.progress = PlaybackProgress::default();
            self.loaded_track = Some(Track::Sentence(sentence_idx));
        }
        self.audio = AudioState::PlayingSentence { sentence_idx };
        info!(sentence_idx, "Sentence narration playing");
        self.refresh();
    }

    /// Go idle but keep the loaded track and its progress for resuming.
    pub fn pause(&mut self) {
        if self.audio.is_playing() {
            info!("Narration paused");
        }
        self.audio = AudioState::Idle;
        self.refresh();
    }

    pub fn stop(&mut self) {
        if self.audio.is_playing() {
            info!("Narration stopped");
        }
        self.reset_audio();
        self.refresh();
    }

    pub fn playback_ended(&mut self) {
        info!(state = self.sync_state().label(), "Narration finished");
        self.reset_audio();
        self.refresh();
    }

    /// Move the playhead without changing the playback state.
    ///
    /// Seeking before anything was played cues the whole-page track, so the
    /// next whole-page play starts from the sought position.
    pub fn seek(&mut self, fraction: f64) {
        if self.loaded_track.is_none() {
            self.loaded_track = Some(Track::Whole);
        }
        self.progress = self.progress.with_fraction(fraction);
        debug!(fraction = self.progress.fraction, "Seeked narration");
        self.refresh();
    }

    pub fn start_test_mode(&mut self) -> Vec<SessionEffect> {
        if let Some(mode) = self.test_mode {
            debug!(generation = mode.generation, "Test mode already active");
            return Vec::new();
        }
        let generation = next_test_generation();
        self.test_mode = Some(TestMode {
            generation,
            cursor: TestCursor::default(),
        });
        info!(generation, "Test mode started");
        self.refresh();
        vec![SessionEffect::StartTestTimer {
            generation,
            interval: self.test_settings.tick_interval,
        }]
    }

    /// Leave test mode. The cursor is discarded, so the next start begins at
    /// the first word of the first sentence again.
    pub fn stop_test_mode(&mut self) -> Vec<SessionEffect> {
        let Some(mode) = self.test_mode.take() else {
            return Vec::new();
        };
        info!(generation = mode.generation, "Test mode stopped");
        self.refresh();
        vec![SessionEffect::CancelTestTimer {
            generation: mode.generation,
        }]
    }

    pub fn toggle_test_mode(&mut self) -> Vec<SessionEffect> {
        if self.test_mode.is_some() {
            self.stop_test_mode()
        } else {
            self.start_test_mode()
        }
    }

    /// Switch which requested language is narrated in sentence mode.
    pub fn select_narration_language(&mut self, language: &str) {
        let code = normalize_code(language);
        if self.reading_mode != ReadingMode::Sentence {
            warn!(%code, "Narration language is fixed in paragraph mode");
            return;
        }
        if !self.languages.contains(&code) {
            warn!(%code, languages = ?self.languages, "Ignoring narration language that was not requested");
            return;
        }
        if code != self.narration_language {
            info!(from = %self.narration_language, to = %code, "Narration language changed");
            self.narration_language = code;
            self.refresh();
        }
    }

    fn default_narration_language(&self) -> String {
        match self.reading_mode {
            ReadingMode::Paragraph => self.primary_language.clone(),
            ReadingMode::Sentence => self
                .languages
                .iter()
                .find(|language| self.page.has_translation(language))
                .or_else(|| self.languages.first())
                .cloned()
                .unwrap_or_else(|| self.primary_language.clone()),
        }
    }

    fn advance_test_cursor(&mut self, generation: u64) -> bool {
        let Some(mode) = self.test_mode.as_mut() else {
            debug!(generation, "Ignoring test-mode tick after test mode stopped");
            return false;
        };
        if mode.generation != generation {
            debug!(
                generation,
                current = mode.generation,
                "Ignoring stale test-mode tick"
            );
            return false;
        }
        let sentences = self.page.narrated(&self.narration_language).len();
        let cycle = sentences.min(self.test_settings.sentence_cycle);
        mode.cursor = mode.cursor.advance(self.test_settings.word_wrap, cycle);
        true
    }

    fn reset_audio(&mut self) {
        self.audio = AudioState::Idle;
        self.loaded_track = None;
        self.progress = PlaybackProgress::default();
    }

    fn refresh(&mut self) {
        self.frame = derive_frame(FrameInputs {
            state: self.sync_state(),
            progress: self.progress,
            page: &self.page,
            narration_language: &self.narration_language,
            rates: &self.rates,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::WordTag;

    fn settings() -> TestModeSettings {
        TestModeSettings {
            tick_interval: Duration::from_secs(1),
            word_wrap: 10,
            sentence_cycle: 3,
        }
    }

    fn build_test_session(mode: ReadingMode, sentences: &[&str]) -> SyncSession {
        SyncSession::with_parts(
            SessionSetup {
                reading_mode: mode,
                primary_language: "en".to_string(),
                languages: vec!["en".to_string()],
            },
            PageText::from_sentences(sentences),
            SpeakingRateModel::default(),
            settings(),
        )
    }

    fn multilingual_session() -> SyncSession {
        let page = PageText::new(Some("The cat sleeps. The dog barks loudly."))
            .with_translation("fr", Some("Le chat dort. Le chien aboie fort."), None)
            .with_translation(
                "de",
                Some("Die Katze schläft tief. Der Hund bellt."),
                Some("Dee Katse. Dare Hunt."),
            );
        SyncSession::with_parts(
            SessionSetup {
                reading_mode: ReadingMode::Sentence,
                primary_language: "en".to_string(),
                languages: vec!["fr".to_string(), "de".to_string(), "FR".to_string()],
            },
            page,
            SpeakingRateModel::default(),
            settings(),
        )
    }

    fn started_generation(effects: &[SessionEffect]) -> u64 {
        match effects {
            [SessionEffect::StartTestTimer { generation, .. }] => *generation,
            other => panic!("expected a single timer start, got {other:?}"),
        }
    }

    #[test]
    fn new_session_is_idle_without_position() {
        let session = build_test_session(ReadingMode::Paragraph, &["One two.", "Three."]);
        assert_eq!(session.sync_state(), SyncState::Idle);
        assert_eq!(session.frame().position, Position::NONE);
        assert!(session.frame().sentence_progress.is_empty());
        assert!(
            session.frame().original[0]
                .words
                .iter()
                .all(|word| word.tag == WordTag::Inactive)
        );
    }

    #[test]
    fn whole_page_playback_starts_at_first_word() {
        let mut session = build_test_session(ReadingMode::Paragraph, &["One two.", "Three."]);
        session.play_whole();
        let frame = session.tick(TickInput::Progress {
            fraction: 0.0,
            duration_secs: 60.0,
        });
        assert_eq!(frame.state, SyncState::PlayingWhole);
        assert_eq!(frame.position, Position::at(0, 0));
        assert_eq!(frame.sentence_progress.get(&0), Some(&50.0));
        assert_eq!(frame.original[0].words[0].tag, WordTag::Current);
    }

    #[test]
    fn progress_ticks_move_the_highlight() {
        // 180 wpm on a 60 s track: fraction 0.0125 is 0.75 s, i.e. 2 words.
        let mut session =
            build_test_session(ReadingMode::Paragraph, &["One two.", "Three four five."]);
        session.play_whole();
        let frame = session.tick(TickInput::Progress {
            fraction: 0.0125,
            duration_secs: 60.0,
        });
        assert_eq!(frame.position, Position::at(1, 0));
        let tags: Vec<WordTag> = frame.original[1].words.iter().map(|w| w.tag).collect();
        assert_eq!(
            tags,
            vec![WordTag::Current, WordTag::ActiveSentence, WordTag::ActiveSentence]
        );
        assert!(
            frame.original[0]
                .words
                .iter()
                .all(|word| word.tag == WordTag::Inactive)
        );
    }

    #[test]
    fn progress_ticks_while_idle_are_ignored() {
        let mut session = build_test_session(ReadingMode::Paragraph, &["One two."]);
        let before = session.snapshot();
        session.tick(TickInput::Progress {
            fraction: 0.5,
            duration_secs: 10.0,
        });
        assert_eq!(session.snapshot(), before);
    }

    #[test]
    fn sentence_playback_suspends_whole_page_estimation() {
        let mut session = build_test_session(ReadingMode::Paragraph, &["A b.", "C d.", "E f."]);
        session.play_whole();
        session.tick(TickInput::Progress {
            fraction: 0.5,
            duration_secs: 4.0,
        });
        assert!(session.frame().position.sentence_idx.is_some());

        session.play_sentence(1);
        assert_eq!(
            session.sync_state(),
            SyncState::PlayingSentence { sentence_idx: 1 }
        );
        assert_eq!(session.progress(), PlaybackProgress::default());
        let frame = session.tick(TickInput::Progress {
            fraction: 0.5,
            duration_secs: 2.0,
        });
        assert_eq!(frame.position, Position::NONE);
        assert!(frame.sentence_progress.is_empty());
    }

    #[test]
    fn switching_tracks_forces_idle_in_between() {
        let mut session = build_test_session(ReadingMode::Paragraph, &["A b.", "C d."]);
        session.play_sentence(9);
        assert_eq!(
            session.sync_state(),
            SyncState::PlayingSentence { sentence_idx: 1 }
        );
        session.play_whole();
        assert_eq!(session.sync_state(), SyncState::PlayingWhole);
        assert_eq!(session.progress(), PlaybackProgress::default());
    }

    #[test]
    fn pause_keeps_progress_and_stop_resets_it() {
        let mut session = build_test_session(ReadingMode::Paragraph, &["A b c d.", "E f."]);
        session.play_whole();
        session.tick(TickInput::Progress {
            fraction: 0.25,
            duration_secs: 4.0,
        });
        session.pause();
        assert_eq!(session.sync_state(), SyncState::Idle);
        assert_eq!(session.frame().position, Position::NONE);
        assert_eq!(session.progress().fraction, 0.25);

        session.play_whole();
        assert_eq!(session.progress().fraction, 0.25);

        session.stop();
        assert_eq!(session.sync_state(), SyncState::Idle);
        assert_eq!(session.progress(), PlaybackProgress::default());
    }

    #[test]
    fn playback_end_returns_to_idle() {
        let mut session = build_test_session(ReadingMode::Paragraph, &["A b."]);
        session.play_whole();
        session.playback_ended();
        assert_eq!(session.sync_state(), SyncState::Idle);
        assert_eq!(session.frame().position, Position::NONE);
    }

    #[test]
    fn seek_clamps_and_reestimates() {
        let mut session = build_test_session(ReadingMode::Paragraph, &["A b c.", "D e f."]);
        session.play_whole();
        session.tick(TickInput::Progress {
            fraction: 0.0,
            duration_secs: 60.0,
        });
        session.seek(7.0);
        assert_eq!(session.progress().fraction, 1.0);
        assert_eq!(session.frame().position, Position::at(1, 2));
    }

    #[test]
    fn seek_before_first_play_is_kept() {
        let mut session = build_test_session(ReadingMode::Paragraph, &["A b c.", "D e f."]);
        session.seek(0.5);
        assert_eq!(session.sync_state(), SyncState::Idle);
        assert_eq!(session.frame().position, Position::NONE);

        session.play_whole();
        assert_eq!(session.progress().fraction, 0.5);

        // A sentence track replaces the cued whole-page position.
        session.stop();
        session.seek(0.25);
        session.play_sentence(0);
        assert_eq!(session.progress(), PlaybackProgress::default());
    }

    #[test]
    fn test_mode_shadows_audio_and_cycles() {
        let sentences = ["a b c d e f g h i j k.", "l m.", "n o.", "p q."];
        let mut session = build_test_session(ReadingMode::Paragraph, &sentences);
        session.play_whole();
        let generation = started_generation(&session.start_test_mode());

        assert_eq!(
            session.sync_state(),
            SyncState::TestMode {
                sentence_idx: 0,
                word_idx: 0
            }
        );
        for _ in 0..10 {
            session.tick(TickInput::TestTimer { generation });
        }
        assert_eq!(session.frame().position, Position::at(1, 0));
        for _ in 0..20 {
            session.tick(TickInput::TestTimer { generation });
        }
        // Only the first three sentences take part in the cycle.
        assert_eq!(session.frame().position, Position::at(0, 0));

        // Audio state survived underneath.
        session.stop_test_mode();
        assert_eq!(session.sync_state(), SyncState::PlayingWhole);
    }

    #[test]
    fn stale_test_ticks_are_no_ops() {
        let mut session = build_test_session(ReadingMode::Paragraph, &["A b c.", "D e."]);
        let generation = started_generation(&session.start_test_mode());
        session.tick(TickInput::TestTimer { generation });
        assert_eq!(session.frame().position, Position::at(0, 1));

        let effects = session.stop_test_mode();
        assert_eq!(effects, vec![SessionEffect::CancelTestTimer { generation }]);
        assert_eq!(session.frame().position, Position::NONE);
        let before = session.snapshot();
        session.tick(TickInput::TestTimer { generation });
        assert_eq!(session.snapshot(), before);

        let restarted = started_generation(&session.start_test_mode());
        assert_ne!(restarted, generation);
        session.tick(TickInput::TestTimer { generation });
        assert_eq!(session.frame().position, Position::at(0, 0));
    }

    #[test]
    fn toggle_test_mode_round_trips() {
        let mut session = build_test_session(ReadingMode::Paragraph, &["A b."]);
        assert_eq!(session.toggle_test_mode().len(), 1);
        assert!(session.is_test_mode_active());
        assert!(session.start_test_mode().is_empty());
        assert!(matches!(
            session.toggle_test_mode().as_slice(),
            [SessionEffect::CancelTestTimer { .. }]
        ));
        assert!(!session.is_test_mode_active());
        assert!(session.stop_test_mode().is_empty());
    }

    #[test]
    fn test_mode_on_empty_page_stays_at_origin() {
        let mut session = build_test_session(ReadingMode::Paragraph, &[]);
        let generation = started_generation(&session.start_test_mode());
        for _ in 0..25 {
            session.tick(TickInput::TestTimer { generation });
        }
        assert_eq!(session.frame().position.sentence_idx, Some(0));
        assert!(session.frame().sentence_progress.is_empty());
        assert!(session.frame().original.is_empty());
    }

    #[test]
    fn sentence_mode_defaults_to_first_translated_language() {
        let session = multilingual_session();
        assert_eq!(session.narration_language(), "fr");
        assert_eq!(session.snapshot().languages, vec!["fr", "de"]);
        assert_eq!(session.frame().narrated_translation.as_deref(), Some("fr"));
    }

    #[test]
    fn narration_language_switch_changes_rate_and_sentences() {
        let mut session = multilingual_session();
        session.play_whole();
        // 4 s: French 170 wpm -> 11 words (past the 7-word page),
        // German 150 wpm -> 10 words.
        session.tick(TickInput::Progress {
            fraction: 0.5,
            duration_secs: 8.0,
        });
        assert_eq!(session.frame().position, Position::at(1, 3));

        session.select_narration_language("de");
        assert_eq!(session.sync_state(), SyncState::PlayingWhole);
        assert_eq!(session.frame().narration_language, "de");
        assert_eq!(session.frame().position, Position::at(1, 2));

        let german = session
            .frame()
            .translations
            .iter()
            .find(|translation| translation.language == "de")
            .expect("german rendering");
        assert_eq!(german.sentences[1].words[2].tag, WordTag::Current);
        assert!(
            german.phonetic[1]
                .words
                .iter()
                .all(|word| word.tag == WordTag::ActiveSentence)
        );
        // The original prose only gets the sentence-level highlight.
        assert!(
            session.frame().original[1]
                .words
                .iter()
                .all(|word| word.tag == WordTag::ActiveSentence)
        );
    }

    #[test]
    fn unknown_or_paragraph_mode_language_switch_is_ignored() {
        let mut session = multilingual_session();
        session.select_narration_language("ja");
        assert_eq!(session.narration_language(), "fr");

        let mut paragraph = build_test_session(ReadingMode::Paragraph, &["A."]);
        paragraph.select_narration_language("en");
        assert_eq!(paragraph.narration_language(), "en");
    }

    #[test]
    fn command_dispatch_emits_action_snapshot_and_effects() {
        let mut session = build_test_session(ReadingMode::Paragraph, &["A b.", "C d."]);

        let event = session.apply_command(SessionCommand::PlayWhole);
        assert_eq!(event.action, "sync_play_whole");
        assert!(event.effects.is_empty());
        assert_eq!(event.snapshot.frame.state, SyncState::PlayingWhole);

        let event = session.apply_command(SessionCommand::Tick(TickInput::Progress {
            fraction: 0.0,
            duration_secs: 30.0,
        }));
        assert_eq!(event.action, "sync_progress_tick");
        assert_eq!(event.snapshot.frame.position, Position::at(0, 0));

        let event = session.apply_command(SessionCommand::ToggleTestMode);
        assert_eq!(event.action, "sync_toggle_test_mode");
        assert!(event.snapshot.test_mode_active);
        assert!(matches!(
            event.effects.as_slice(),
            [SessionEffect::StartTestTimer { interval, .. }] if *interval == Duration::from_secs(1)
        ));
    }

    #[test]
    fn snapshot_serializes_for_the_presentation_layer() {
        let mut session = build_test_session(ReadingMode::Paragraph, &["Hi there."]);
        session.play_whole();
        session.tick(TickInput::Progress {
            fraction: 0.0,
            duration_secs: 10.0,
        });
        let json = serde_json::to_value(session.snapshot()).expect("serialize snapshot");
        assert_eq!(json["reading_mode"], "paragraph");
        assert_eq!(json["frame"]["state"]["kind"], "playing_whole");
        assert_eq!(json["frame"]["original"][0]["words"][0]["tag"], "current");
        assert_eq!(json["frame"]["sentence_progress"]["0"], 50.0);
    }
}

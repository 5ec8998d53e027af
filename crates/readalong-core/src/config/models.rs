use crate::languages::ReadingMode;
use crate::speaking_rate::SpeakingRateModel;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Shortest accepted test-mode tick.
const MIN_TEST_TICK_MS: u64 = 50;

/// High-level engine configuration.
///
/// The on-disk file groups these fields into tables (see `tables.rs`).
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub log_level: LogLevel,
    pub reading_mode: ReadingMode,
    pub primary_language: String,
    pub default_wpm: u32,
    pub speaking_rates: BTreeMap<String, u32>,
    pub test_tick_interval_ms: u64,
    pub test_word_wrap: usize,
    pub test_sentence_cycle: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        use crate::config::defaults;
        AppConfig {
            log_level: defaults::default_log_level(),
            reading_mode: defaults::default_reading_mode(),
            primary_language: defaults::default_primary_language(),
            default_wpm: defaults::default_wpm(),
            speaking_rates: defaults::default_speaking_rates(),
            test_tick_interval_ms: defaults::default_test_tick_interval_ms(),
            test_word_wrap: defaults::default_test_word_wrap(),
            test_sentence_cycle: defaults::default_test_sentence_cycle(),
        }
    }
}

impl AppConfig {
    pub fn rate_model(&self) -> SpeakingRateModel {
        SpeakingRateModel::with_overrides(self.default_wpm, &self.speaking_rates)
    }

    pub fn test_mode(&self) -> TestModeSettings {
        TestModeSettings {
            tick_interval: Duration::from_millis(self.test_tick_interval_ms.max(MIN_TEST_TICK_MS)),
            word_wrap: self.test_word_wrap.max(1),
            sentence_cycle: self.test_sentence_cycle.max(1),
        }
    }
}

/// Test-mode timer parameters, already clamped to usable values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestModeSettings {
    pub tick_interval: Duration,
    /// Words per sentence before the cursor moves to the next sentence.
    pub word_wrap: usize,
    /// How many leading sentences of the page the cursor cycles through.
    pub sentence_cycle: usize,
}

impl Default for TestModeSettings {
    fn default() -> Self {
        AppConfig::default().test_mode()
    }
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

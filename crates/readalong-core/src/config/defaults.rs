use crate::languages::ReadingMode;
use std::collections::BTreeMap;

pub(crate) fn default_log_level() -> crate::config::LogLevel {
    crate::config::LogLevel::Info
}

pub(crate) fn default_reading_mode() -> ReadingMode {
    ReadingMode::Paragraph
}

pub(crate) fn default_primary_language() -> String {
    "en".to_string()
}

pub(crate) fn default_wpm() -> u32 {
    crate::speaking_rate::DEFAULT_WPM
}

pub(crate) fn default_speaking_rates() -> BTreeMap<String, u32> {
    BTreeMap::new()
}

pub(crate) fn default_test_tick_interval_ms() -> u64 {
    1000
}

pub(crate) fn default_test_word_wrap() -> usize {
    10
}

pub(crate) fn default_test_sentence_cycle() -> usize {
    3
}

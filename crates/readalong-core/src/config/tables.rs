use super::defaults;
use super::models::{AppConfig, LogLevel};
use crate::languages::ReadingMode;
use serde::Deserialize;
use std::collections::BTreeMap;

/// On-disk layout of `config.toml`, grouped into tables.
#[derive(Debug, Clone, Default, Deserialize, serde::Serialize)]
pub(super) struct ConfigTables {
    #[serde(default)]
    logging: LoggingConfig,
    #[serde(default)]
    session: SessionConfig,
    #[serde(default)]
    speaking_rates: SpeakingRatesConfig,
    #[serde(default)]
    test_mode: TestModeConfig,
}

impl From<ConfigTables> for AppConfig {
    fn from(tables: ConfigTables) -> Self {
        AppConfig {
            log_level: tables.logging.log_level,
            reading_mode: tables.session.reading_mode,
            primary_language: tables.session.primary_language,
            default_wpm: tables.speaking_rates.default_wpm,
            speaking_rates: tables.speaking_rates.languages,
            test_tick_interval_ms: tables.test_mode.tick_interval_ms,
            test_word_wrap: tables.test_mode.word_wrap,
            test_sentence_cycle: tables.test_mode.sentence_cycle,
        }
    }
}

impl From<&AppConfig> for ConfigTables {
    fn from(config: &AppConfig) -> Self {
        ConfigTables {
            logging: LoggingConfig {
                log_level: config.log_level,
            },
            session: SessionConfig {
                reading_mode: config.reading_mode,
                primary_language: config.primary_language.clone(),
            },
            speaking_rates: SpeakingRatesConfig {
                default_wpm: config.default_wpm,
                languages: config.speaking_rates.clone(),
            },
            test_mode: TestModeConfig {
                tick_interval_ms: config.test_tick_interval_ms,
                word_wrap: config.test_word_wrap,
                sentence_cycle: config.test_sentence_cycle,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct LoggingConfig {
    #[serde(default = "defaults::default_log_level")]
    log_level: LogLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            log_level: defaults::default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct SessionConfig {
    #[serde(default = "defaults::default_reading_mode")]
    reading_mode: ReadingMode,
    #[serde(default = "defaults::default_primary_language")]
    primary_language: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            reading_mode: defaults::default_reading_mode(),
            primary_language: defaults::default_primary_language(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct SpeakingRatesConfig {
    #[serde(default = "defaults::default_wpm")]
    default_wpm: u32,
    #[serde(default = "defaults::default_speaking_rates")]
    languages: BTreeMap<String, u32>,
}

impl Default for SpeakingRatesConfig {
    fn default() -> Self {
        SpeakingRatesConfig {
            default_wpm: defaults::default_wpm(),
            languages: defaults::default_speaking_rates(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct TestModeConfig {
    #[serde(default = "defaults::default_test_tick_interval_ms")]
    tick_interval_ms: u64,
    #[serde(default = "defaults::default_test_word_wrap")]
    word_wrap: usize,
    #[serde(default = "defaults::default_test_sentence_cycle")]
    sentence_cycle: usize,
}

impl Default for TestModeConfig {
    fn default() -> Self {
        TestModeConfig {
            tick_interval_ms: defaults::default_test_tick_interval_ms(),
            word_wrap: defaults::default_test_word_wrap(),
            sentence_cycle: defaults::default_test_sentence_cycle(),
        }
    }
}

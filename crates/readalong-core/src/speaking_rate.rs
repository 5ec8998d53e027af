//! Per-language speaking rates in words per minute.
//!
//! Lookups never fail: unknown codes resolve to the model's default rate.

use crate::languages::normalize_code;
use crate::text_utils;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::warn;

/// Rate used for any language missing from the table.
pub const DEFAULT_WPM: u32 = 170;

const BUILTIN_RATES: &[(&str, u32)] = &[
    ("en", 180),
    ("es", 160),
    ("fr", 170),
    ("de", 150),
    ("it", 175),
    ("pt", 165),
    ("ru", 155),
];

static BUILTIN_MODEL: Lazy<SpeakingRateModel> = Lazy::new(SpeakingRateModel::default);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeakingRateModel {
    rates: BTreeMap<String, u32>,
    default_wpm: u32,
}

impl Default for SpeakingRateModel {
    fn default() -> Self {
        Self {
            rates: BUILTIN_RATES
                .iter()
                .map(|(code, wpm)| (code.to_string(), *wpm))
                .collect(),
            default_wpm: DEFAULT_WPM,
        }
    }
}

impl SpeakingRateModel {
    /// Built-in table with configured overrides layered on top.
    ///
    /// Zero rates are dropped with a warning so every lookup stays positive.
    pub fn with_overrides(default_wpm: u32, overrides: &BTreeMap<String, u32>) -> Self {
        let mut model = Self::default();
        if default_wpm == 0 {
            warn!("Ignoring zero default speaking rate; keeping {DEFAULT_WPM} wpm");
        } else {
            model.default_wpm = default_wpm;
        }
        for (code, wpm) in overrides {
            let code = normalize_code(code);
            if code.is_empty() || *wpm == 0 {
                warn!(%code, wpm, "Ignoring invalid speaking rate override");
                continue;
            }
            model.rates.insert(code, *wpm);
        }
        model
    }

    pub fn default_wpm(&self) -> u32 {
        self.default_wpm
    }

    /// Words per minute for a language code, falling back to the default.
    pub fn rate_for(&self, language: &str) -> u32 {
        self.rates
            .get(&normalize_code(language))
            .copied()
            .unwrap_or(self.default_wpm)
    }

    /// Expected narration length for `text` at the language's rate.
    pub fn estimated_duration(&self, text: &str, language: &str) -> Duration {
        let words = text_utils::word_count(text) as f64;
        let wpm = f64::from(self.rate_for(language));
        Duration::from_secs_f64(words / wpm * 60.0)
    }
}

/// Rate lookup against the built-in table.
pub fn rate_for(language: &str) -> u32 {
    BUILTIN_MODEL.rate_for(language)
}

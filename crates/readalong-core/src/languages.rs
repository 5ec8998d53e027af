//! Supported target languages and reading modes.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use ts_rs::TS;

/// A target language offered for translation and narration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
    pub iso: &'static str,
}

pub const SUPPORTED_LANGUAGES: &[Language] = &[
    Language {
        code: "fr",
        name: "French",
        iso: "FRA",
    },
    Language {
        code: "de",
        name: "German",
        iso: "DEU",
    },
    Language {
        code: "es",
        name: "Spanish",
        iso: "ESP",
    },
    Language {
        code: "ru",
        name: "Russian",
        iso: "RUS",
    },
    Language {
        code: "it",
        name: "Italian",
        iso: "ITA",
    },
    Language {
        code: "pt",
        name: "Portuguese",
        iso: "POR",
    },
    Language {
        code: "zh",
        name: "Chinese",
        iso: "CHN",
    },
    Language {
        code: "ja",
        name: "Japanese",
        iso: "JPN",
    },
];

/// Look up a supported language by (normalized) code.
pub fn language(code: &str) -> Option<&'static Language> {
    let code = normalize_code(code);
    SUPPORTED_LANGUAGES.iter().find(|lang| lang.code == code)
}

/// Normalize a language tag to its lower-case primary subtag (`en-US` -> `en`).
pub fn normalize_code(code: &str) -> String {
    code.trim()
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

/// How the page is narrated.
///
/// `Paragraph` plays one track for the whole page in the primary language;
/// `Sentence` shows every requested translation and narrates one of them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ReadingMode {
    #[default]
    Paragraph,
    Sentence,
}

impl std::fmt::Display for ReadingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ReadingMode::Paragraph => "Paragraph",
            ReadingMode::Sentence => "Sentence",
        };
        write!(f, "{}", label)
    }
}

impl FromStr for ReadingMode {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "paragraph" => Ok(ReadingMode::Paragraph),
            "sentence" => Ok(ReadingMode::Sentence),
            other => Err(anyhow::anyhow!(
                "unknown reading mode {other:?}; expected paragraph or sentence"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_region_and_case() {
        assert_eq!(normalize_code(" en-US "), "en");
        assert_eq!(normalize_code("PT_br"), "pt");
        assert_eq!(normalize_code(""), "");
    }

    #[test]
    fn finds_supported_languages() {
        assert_eq!(language("DE").map(|lang| lang.name), Some("German"));
        assert_eq!(language("ja-JP").map(|lang| lang.iso), Some("JPN"));
        assert!(language("xx").is_none());
    }

    #[test]
    fn reading_mode_parses_and_displays() {
        assert_eq!("Sentence".parse::<ReadingMode>().ok(), Some(ReadingMode::Sentence));
        assert_eq!(" paragraph".parse::<ReadingMode>().ok(), Some(ReadingMode::Paragraph));
        assert!("page".parse::<ReadingMode>().is_err());
        assert_eq!(ReadingMode::Sentence.to_string(), "Sentence");
    }
}

//! Segmented text for one page: the original prose plus its translations.
//!
//! A `PageText` is built once when a page is fetched and is read-only for the
//! rest of the page's lifetime; loading another page replaces it wholesale.

use crate::languages::normalize_code;
use crate::segmenter;
use crate::text_utils;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Translation {
    pub sentences: Vec<String>,
    pub phonetic: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageText {
    original: Vec<String>,
    translations: BTreeMap<String, Translation>,
}

impl PageText {
    pub fn new(text: Option<&str>) -> Self {
        Self {
            original: segmenter::segment_opt(text),
            translations: BTreeMap::new(),
        }
    }

    /// Already segmented sentences, used by tests and callers that split text
    /// elsewhere. Blank entries are dropped.
    pub fn from_sentences<S: AsRef<str>>(sentences: &[S]) -> Self {
        Self {
            original: clean_sentences(sentences),
            translations: BTreeMap::new(),
        }
    }

    /// Attach a translation; empty text removes the language from the page.
    pub fn with_translation(
        mut self,
        language: &str,
        translated: Option<&str>,
        phonetic: Option<&str>,
    ) -> Self {
        self.set_translation(language, translated, phonetic);
        self
    }

    pub fn set_translation(
        &mut self,
        language: &str,
        translated: Option<&str>,
        phonetic: Option<&str>,
    ) {
        let code = normalize_code(language);
        let sentences = segmenter::segment_opt(translated);
        if sentences.is_empty() {
            self.translations.remove(&code);
            return;
        }
        self.translations.insert(
            code,
            Translation {
                sentences,
                phonetic: segmenter::segment_opt(phonetic),
            },
        );
    }

    pub fn original(&self) -> &[String] {
        &self.original
    }

    pub fn translation(&self, language: &str) -> Option<&Translation> {
        self.translations.get(&normalize_code(language))
    }

    pub fn translations(&self) -> &BTreeMap<String, Translation> {
        &self.translations
    }

    pub fn has_translation(&self, language: &str) -> bool {
        self.translation(language).is_some()
    }

    /// Sentences narrated in `language`, or the original prose when the page
    /// has no translation for it.
    pub fn narrated(&self, language: &str) -> &[String] {
        self.translation(language)
            .map(|translation| translation.sentences.as_slice())
            .unwrap_or(self.original.as_slice())
    }

    pub fn total_words(&self) -> usize {
        text_utils::total_words(&self.original)
    }

    pub fn is_empty(&self) -> bool {
        self.original.is_empty()
    }
}

fn clean_sentences<S: AsRef<str>>(sentences: &[S]) -> Vec<String> {
    sentences
        .iter()
        .map(|sentence| sentence.as_ref().trim())
        .filter(|sentence| !sentence.is_empty())
        .map(str::to_string)
        .collect()
}

//! Word-level highlight tagging.
//!
//! Output is plain tagged data; styling each tag is the presentation layer's
//! job.

use crate::estimator::Position;
use crate::text_utils;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum WordTag {
    /// The word being narrated.
    Current,
    /// Already narrated word of the active sentence.
    Past,
    /// Not yet reached word of the active sentence.
    ActiveSentence,
    /// Word of any other sentence.
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct WordSegment {
    pub text: String,
    pub sentence_idx: usize,
    pub word_idx: usize,
    pub tag: WordTag,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct RenderedSentence {
    pub sentence_idx: usize,
    pub text: String,
    pub words: Vec<WordSegment>,
}

/// Tag every word of `sentence`. Each word gets exactly one tag.
pub fn render(
    sentence: &str,
    sentence_idx: usize,
    active_sentence_idx: Option<usize>,
    active_word_idx: Option<usize>,
) -> Vec<WordSegment> {
    let is_active_sentence = active_sentence_idx == Some(sentence_idx);
    text_utils::words(sentence)
        .enumerate()
        .map(|(word_idx, word)| WordSegment {
            text: word.to_string(),
            sentence_idx,
            word_idx,
            tag: tag_for(is_active_sentence, word_idx, active_word_idx),
        })
        .collect()
}

fn tag_for(is_active_sentence: bool, word_idx: usize, active_word_idx: Option<usize>) -> WordTag {
    if !is_active_sentence {
        return WordTag::Inactive;
    }
    match active_word_idx {
        Some(active) if word_idx == active => WordTag::Current,
        Some(active) if word_idx < active => WordTag::Past,
        _ => WordTag::ActiveSentence,
    }
}

/// Render a whole sentence list against one position.
pub fn render_sentences<S: AsRef<str>>(sentences: &[S], position: Position) -> Vec<RenderedSentence> {
    sentences
        .iter()
        .enumerate()
        .map(|(sentence_idx, sentence)| {
            let sentence = sentence.as_ref();
            RenderedSentence {
                sentence_idx,
                text: sentence.to_string(),
                words: render(sentence, sentence_idx, position.sentence_idx, position.word_idx),
            }
        })
        .collect()
}

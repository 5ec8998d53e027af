//! Word tokenization shared by the estimator, progress calculator and renderer.
//!
//! A word is a maximal run of non-whitespace characters, so punctuation
//! attached to a word stays part of that word. All counting in the crate goes
//! through these helpers so word indices agree between components.

/// Iterate the words of a sentence in order.
pub fn words(sentence: &str) -> impl Iterator<Item = &str> {
    sentence.split_whitespace()
}

/// Number of words in a sentence.
pub fn word_count(sentence: &str) -> usize {
    words(sentence).count()
}

/// Total word count across all sentences.
pub fn total_words<S: AsRef<str>>(sentences: &[S]) -> usize {
    sentences
        .iter()
        .map(|sentence| word_count(sentence.as_ref()))
        .sum()
}

//! Sentence segmentation for page text.
//!
//! The scanner walks the text one character at a time with two states:
//! `Accumulating` while it copies characters into the running sentence, and
//! `TentativeBoundary` right after a `.`, `!` or `?`. A tentative boundary is
//! resolved by two independent checks, both public so they can be tested on
//! their own:
//!
//! - [`ends_with_abbreviation`]: the word in front of the punctuation is a
//!   known abbreviation, so the sentence keeps going.
//! - [`boundary_after`]: the text right after the punctuation looks like the
//!   start of a new sentence (end of text, a newline, or a single space
//!   followed by end of text or an ASCII letter of either case).
//!
//! Anything else (decimals like `3.5`, the inner dots of `...`, a closing
//! quote) leaves the punctuation inside the current sentence.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Words that never end a sentence when followed by a period.
///
/// Entries are matched exactly (case-sensitive) after trailing `.!?` are
/// stripped from the word, so `p.m.` is looked up as `p.m`.
pub const ABBREVIATIONS: &[&str] = &[
    // titles
    "Mr", "Mrs", "Ms", "Dr", "Prof", "Sr", "Jr",
    // addresses
    "St", "Ave", "Rd", "Blvd",
    // companies
    "Co", "Corp", "Inc", "Ltd",
    // latin
    "vs", "e.g", "i.e", "cf", "et al",
    // references and units
    "No", "Vol", "Ch", "pp", "Fig", "Ref",
    // months
    "Jan", "Feb", "Mar", "Apr", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    // weekdays
    "Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun",
    // meridiem
    "a.m", "p.m", "A.M", "P.M",
];

static ABBREVIATION_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ABBREVIATIONS.iter().copied().collect());

/// How the text after a terminal punctuation mark resolves a tentative boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// The sentence ends here. When `consume_separator` is set the following
    /// space or newline belongs to neither sentence and is skipped.
    Close { consume_separator: bool },
    /// The punctuation is sentence-internal.
    Continue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Accumulating,
    TentativeBoundary,
}

struct SentenceScanner<'a> {
    text: &'a str,
    state: ScanState,
    buffer: String,
    sentences: Vec<String>,
}

impl<'a> SentenceScanner<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            state: ScanState::Accumulating,
            buffer: String::new(),
            sentences: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<String> {
        let text = self.text;
        for (idx, ch) in text.char_indices() {
            match self.state {
                ScanState::Accumulating => self.accumulate(ch),
                ScanState::TentativeBoundary => self.resolve(ch, &text[idx..]),
            }
        }
        // A boundary still pending at end of text closes with the final flush.
        self.flush();
        self.sentences
    }

    /// Terminal punctuation that does not end an abbreviation opens a
    /// tentative boundary, decided on the next character.
    fn accumulate(&mut self, ch: char) {
        self.buffer.push(ch);
        self.state = if is_terminal(ch) && !ends_with_abbreviation(&self.buffer) {
            ScanState::TentativeBoundary
        } else {
            ScanState::Accumulating
        };
    }

    /// `rest` starts at `ch`, the first character after the punctuation.
    fn resolve(&mut self, ch: char, rest: &str) {
        if is_terminal(ch) {
            self.accumulate(ch);
            return;
        }
        self.state = ScanState::Accumulating;
        match boundary_after(rest) {
            Boundary::Close { consume_separator } => {
                self.flush();
                if !consume_separator {
                    self.buffer.push(ch);
                }
            }
            Boundary::Continue => self.buffer.push(ch),
        }
    }

    fn flush(&mut self) {
        let trimmed = self.buffer.trim();
        if !trimmed.is_empty() {
            self.sentences.push(trimmed.to_string());
        }
        self.buffer.clear();
    }
}

/// Split text into trimmed, non-empty sentences.
///
/// Empty or whitespace-only input yields an empty list. Text without terminal
/// punctuation comes back as a single sentence.
pub fn segment(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    SentenceScanner::new(text).run()
}

/// [`segment`] for text that may be absent.
pub fn segment_opt(text: Option<&str>) -> Vec<String> {
    text.map(segment).unwrap_or_default()
}

/// Whether `word` (without its trailing period) is a known abbreviation.
pub fn is_abbreviation(word: &str) -> bool {
    ABBREVIATION_SET.contains(word)
}

/// Whether the running sentence ends in a known abbreviation plus punctuation.
///
/// The last whitespace-delimited word is checked with its trailing `.!?`
/// stripped. The last two words are also checked together so multi-word
/// entries such as `et al.` are honoured.
pub fn ends_with_abbreviation(buffer: &str) -> bool {
    let mut tail = buffer.split_whitespace().rev();
    let Some(last) = tail.next() else {
        return false;
    };
    let last = strip_terminal(last);
    if is_abbreviation(last) {
        return true;
    }
    match tail.next() {
        Some(previous) => is_abbreviation(&format!("{previous} {last}")),
        None => false,
    }
}

/// Resolve a tentative boundary by looking at the text after the punctuation.
pub fn boundary_after(rest: &str) -> Boundary {
    let mut chars = rest.chars();
    match chars.next() {
        None => Boundary::Close {
            consume_separator: false,
        },
        Some('\n') => Boundary::Close {
            consume_separator: true,
        },
        Some(' ') => match chars.next() {
            None => Boundary::Close {
                consume_separator: true,
            },
            Some(next) if next.is_ascii_alphabetic() => Boundary::Close {
                consume_separator: true,
            },
            Some(_) => Boundary::Continue,
        },
        Some(_) => Boundary::Continue,
    }
}

fn is_terminal(ch: char) -> bool {
    matches!(ch, '.' | '!' | '?')
}

fn strip_terminal(word: &str) -> &str {
    word.trim_end_matches(is_terminal)
}

//! Case and accent folding
//!
//! Patterns are matched against a folded copy of the message (lowercase, no
//! diacritics). Captured values are mapped back to the original text so that
//! "estoy en Ciudad de México" yields "Ciudad de México", not the folded form.

use std::ops::Range;
use unicode_normalization::UnicodeNormalization;

/// Fold a single character: strip combining marks, then lowercase.
fn fold_char(c: char) -> char {
    let base = std::iter::once(c).nfd().next().unwrap_or(c);
    base.to_lowercase().next().unwrap_or(base)
}

/// Fold a whole string
pub fn fold(text: &str) -> String {
    text.chars().map(fold_char).collect()
}

/// Folded view of a message that remembers where each byte came from
#[derive(Debug)]
pub struct Folded<'a> {
    original: &'a str,
    text: String,
    /// `origin[i]` is the byte offset in `original` of the char that produced
    /// folded byte `i`; the extra trailing entry is `original.len()`.
    origin: Vec<usize>,
}

impl<'a> Folded<'a> {
    pub fn new(original: &'a str) -> Self {
        let mut text = String::with_capacity(original.len());
        let mut origin = Vec::with_capacity(original.len() + 1);
        for (offset, c) in original.char_indices() {
            let folded = fold_char(c);
            text.push(folded);
            origin.extend(std::iter::repeat_n(offset, folded.len_utf8()));
        }
        origin.push(original.len());
        Self {
            original,
            text,
            origin,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Original text for a byte range of the folded text
    pub fn original_span(&self, range: Range<usize>) -> &'a str {
        let start = self.origin.get(range.start).copied().unwrap_or(self.original.len());
        let end = self.origin.get(range.end).copied().unwrap_or(self.original.len());
        self.original.get(start..end).unwrap_or("")
    }
}

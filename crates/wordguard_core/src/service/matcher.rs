//! Matching of active words against host input text.
//!
//! # Invariants
//! - Only words with `matched == true` take part.
//! - A word matches as a whole token: it must not be glued to other word
//!   characters on either side. Comparison is case-sensitive.

use crate::model::word::Word;
use log::warn;
use regex::Regex;

/// Precompiled matcher over the active words of one snapshot.
pub struct WordMatcher {
    patterns: Vec<(Word, Regex)>,
}

impl WordMatcher {
    pub fn new(words: &[Word]) -> Self {
        let patterns = words
            .iter()
            .filter(|word| word.matched)
            .filter_map(|word| {
                let source = format!(r"(?:^|\W){}(?:\W|$)", regex::escape(&word.text));
                match Regex::new(&source) {
                    Ok(pattern) => Some((word.clone(), pattern)),
                    Err(err) => {
                        warn!(
                            "event=matcher_compile module=service status=error word_id={} error={}",
                            word.id, err
                        );
                        None
                    }
                }
            })
            .collect();
        Self { patterns }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Returns the active words found in `input`, in list order.
    pub fn find(&self, input: &str) -> Vec<&Word> {
        self.patterns
            .iter()
            .filter(|(_, pattern)| pattern.is_match(input))
            .map(|(word, _)| word)
            .collect()
    }
}

/// One-shot form of [`WordMatcher::find`].
pub fn find_matches(words: &[Word], input: &str) -> Vec<Word> {
    WordMatcher::new(words)
        .find(input)
        .into_iter()
        .cloned()
        .collect()
}

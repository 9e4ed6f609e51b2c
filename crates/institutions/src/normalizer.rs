//! Header line normalization
//!
//! A raw header line is lower-cased, split on single spaces and every word is
//! stripped of footnote marks, punctuation and affiliation digits. Empty
//! tokens are kept so `"a  b"` yields three tokens.

use crate::tables::LookupTables;
use std::collections::BTreeSet;

/// Characters removed from every word
pub const NOISE_CHARS: &[char] = &[
    '.', ',', ':', '´', '*', '∗', '†', '‡', '¨', '`', '§', '⇤', '£',
    '0', '1', '2', '3', '4', '5', '6',
];

/// Strip noise characters from one word, preserving case
pub fn clean_word(word: &str) -> String {
    word.chars().filter(|c| !NOISE_CHARS.contains(c)).collect()
}

/// Normalize a raw header line into tokens
pub fn normalize_line(line: &str) -> Vec<String> {
    line.to_lowercase().split(' ').map(clean_word).collect()
}

/// A header line after normalization, with its keyword matches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedLine {
    /// Normalized tokens, empties included
    pub tokens: Vec<String>,

    /// Tokens joined by single spaces, outer whitespace trimmed
    pub joined: String,
}

impl NormalizedLine {
    pub fn new(line: &str) -> Self {
        let tokens = normalize_line(line);
        let joined = tokens.join(" ").trim().to_string();
        Self { tokens, joined }
    }

    /// Institution keywords present among the tokens
    pub fn matched_keywords<'a>(&'a self, tables: &LookupTables) -> BTreeSet<&'a str> {
        self.tokens
            .iter()
            .map(String::as_str)
            .filter(|token| tables.is_keyword(token))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_noise() {
        assert_eq!(
            normalize_line("Stanford University†, Dept. 1"),
            vec!["stanford", "university", "dept", ""]
        );
        assert_eq!(clean_word("A.B:7"), "AB7");
    }

    #[test]
    fn test_empty_tokens_are_kept() {
        assert_eq!(normalize_line("MIT  CSAIL"), vec!["mit", "", "csail"]);
        assert_eq!(normalize_line(""), vec![""]);
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let lines = [
            "University of California, Berkeley¨",
            "Jane Doe1,2∗  John Roe3",
            "Max-Planck-Institut für Informatik 66123",
        ];
        for line in lines {
            for token in normalize_line(line) {
                assert_eq!(normalize_line(&token), vec![token.clone()]);
            }
            let once = NormalizedLine::new(line);
            let twice = NormalizedLine::new(&once.joined);
            assert_eq!(once.joined, twice.joined);
        }
    }

    #[test]
    fn test_matched_keywords() {
        let tables = LookupTables::builtin();
        let line = NormalizedLine::new("Google Research, Mountain View");
        let matched: Vec<&str> = line.matched_keywords(tables).into_iter().collect();
        assert_eq!(matched, vec!["google", "research"]);

        assert!(NormalizedLine::new("Jane Doe").matched_keywords(tables).is_empty());
    }
}

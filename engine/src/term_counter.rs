use crate::stopwords::StopWords;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref WORD: Regex = Regex::new(r"(?u)\p{L}[\p{L}\p{N}_']*").expect("valid regex");
}

/// Tokenize text into words using NFKC normalization and lowercasing.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = text.nfkc().collect::<String>().to_lowercase();
    WORD.find_iter(&normalized)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Term occurrence counts for a single document, tagged with its URL.
///
/// Produced once per fetched page, pushed into the index store, and then
/// discarded. Stored counts are always at least 1.
#[derive(Debug, Clone)]
pub struct TermCounter {
    label: String,
    counts: HashMap<String, u64>,
}

impl TermCounter {
    /// Count the terms in a document's content blocks, dropping stop words.
    ///
    /// A document with no indexable terms yields an empty counter; that is a
    /// valid result, not an error.
    pub fn count(label: &str, blocks: &[String], stop_words: &StopWords) -> Self {
        let mut counts = HashMap::new();
        for block in blocks {
            for token in tokenize(block) {
                if stop_words.contains(&token) {
                    continue;
                }
                *counts.entry(token).or_insert(0) += 1;
            }
        }
        Self { label: label.to_string(), counts }
    }

    /// URL of the document the counts belong to.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn get(&self, term: &str) -> Option<u64> {
        self.counts.get(term).copied()
    }

    pub fn counts(&self) -> &HashMap<String, u64> {
        &self.counts
    }

    /// Sum of all term counts.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

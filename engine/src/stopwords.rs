use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

const BUNDLED: &str = include_str!("../resources/stopwords.txt");

/// Stop words dropped during term counting.
///
/// Loaded once at startup from a flat comma- or line-delimited text file.
/// `StopWords::default()` parses the list bundled with the crate.
#[derive(Debug, Clone)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading stop words from {}", path.display()))?;
        Ok(Self::parse(&raw))
    }

    /// Parse a comma- and/or line-delimited word list.
    pub fn parse(raw: &str) -> Self {
        let words = raw
            .lines()
            .flat_map(|line| line.split(','))
            .map(|w| w.trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    /// A set that filters nothing.
    pub fn empty() -> Self {
        Self { words: HashSet::new() }
    }

    pub fn contains(&self, term: &str) -> bool {
        self.words.contains(term)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Default for StopWords {
    fn default() -> Self {
        Self::parse(BUNDLED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commas_and_lines() {
        let stop = StopWords::parse("a,b\nc\n d , e ");
        for w in ["a", "b", "c", "d", "e"] {
            assert!(stop.contains(w), "missing {w}");
        }
        assert_eq!(stop.len(), 5);
    }

    #[test]
    fn bundled_list_loads() {
        let stop = StopWords::default();
        assert!(stop.contains("the"));
        assert!(stop.contains("and"));
        assert!(!stop.contains("language"));
    }

    #[test]
    fn empty_set_filters_nothing() {
        assert!(!StopWords::empty().contains("the"));
    }
}

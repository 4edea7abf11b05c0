use crate::ranker::Ranker;
use crate::search::SearchResult;
use crate::stopwords::StopWords;
use crate::store::IndexStore;
use crate::term_counter::TermCounter;
use anyhow::{Context, Result};
use std::collections::{BTreeSet, HashMap};

/// Front door of the index: counts terms for fetched pages, pushes them
/// into the store, and computes per-term TF-IDF relevance for queries.
///
/// The backing store is chosen at construction; nothing else in the engine
/// dispatches on it.
pub struct Indexer {
    store: Box<dyn IndexStore>,
    stop_words: StopWords,
}

impl Indexer {
    pub fn new(store: Box<dyn IndexStore>, stop_words: StopWords) -> Self {
        Self { store, stop_words }
    }

    pub fn is_indexed(&self, url: &str) -> Result<bool> {
        self.store.is_indexed(url)
    }

    /// Count the terms of a page and replace its entry in the store.
    ///
    /// Re-indexing a URL overwrites the previous counts; it never merges
    /// with them.
    pub fn index_page(&mut self, url: &str, blocks: &[String]) -> Result<()> {
        let tc = TermCounter::count(url, blocks, &self.stop_words);
        self.store
            .push_term_counter(&tc)
            .with_context(|| format!("indexing {url}"))
    }

    /// TF-IDF relevance of every document containing `term`, boosted by the
    /// ranker's popularity count for the document when a ranker is given.
    ///
    /// Returns `None` when the term matches no indexed document or nothing
    /// has been indexed yet; an empty-but-valid result is never produced,
    /// so callers can tell "term unknown" apart from "term scored zero".
    pub fn relevance(&self, term: &str, ranker: Option<&Ranker>) -> Result<Option<SearchResult>> {
        let url_to_count = self.store.get_url_to_term_count(term)?;
        if url_to_count.is_empty() {
            return Ok(None);
        }

        let total_docs = self.store.term_counter_keys()?.len();
        if total_docs == 0 {
            return Ok(None);
        }
        let matching_docs = url_to_count.len();

        // neutral when the term occurs everywhere; ln(1) spelled out rather
        // than left to float behavior
        let idf = if matching_docs == total_docs {
            0.0
        } else {
            (total_docs as f64 / matching_docs as f64).ln()
        };

        let mut scores = HashMap::new();
        for (url, count) in url_to_count {
            let total_terms = self.store.get_total_term_count(&url)?;
            let tf = count as f64 / total_terms as f64;
            let mut score = round_to_tenth(tf * idf);
            if let Some(ranker) = ranker {
                score += ranker.linked_count(&url).unwrap_or(0) as f64;
            }
            scores.insert(url, score);
        }
        Ok(Some(SearchResult::new(scores)))
    }

    /// Every indexed term. Diagnostics.
    pub fn url_set_keys(&self) -> Result<BTreeSet<String>> {
        self.store.url_set_keys()
    }

    /// Every indexed URL. Diagnostics.
    pub fn term_counter_keys(&self) -> Result<BTreeSet<String>> {
        self.store.term_counter_keys()
    }

    pub fn get_count(&self, url: &str, term: &str) -> Result<Option<u64>> {
        self.store.get_count(url, term)
    }

    /// Documents containing `term`.
    pub fn get_urls(&self, term: &str) -> Result<BTreeSet<String>> {
        self.store.get_urls(term)
    }

    /// Administrative reset of the term-set map.
    pub fn delete_url_sets(&mut self) -> Result<()> {
        self.store.delete_url_sets()
    }

    /// Administrative reset of the forward map.
    pub fn delete_term_counters(&mut self) -> Result<()> {
        self.store.delete_term_counters()
    }

    /// Administrative reset of the backing store.
    pub fn delete_all_keys(&mut self) -> Result<()> {
        self.store.delete_all_keys()
    }
}

/// Round half-up to one decimal place. Relevance components are
/// non-negative, so `round`'s half-away-from-zero is half-up here.
fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_one_decimal_half_up() {
        assert_eq!(round_to_tenth(0.0693), 0.1);
        assert_eq!(round_to_tenth(0.04), 0.0);
        assert_eq!(round_to_tenth(0.05), 0.1);
        assert_eq!(round_to_tenth(1.25), 1.3);
    }
}

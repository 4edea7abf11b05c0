use crate::indexer::Indexer;
use crate::ranker::Ranker;
use anyhow::Result;
use std::cmp::Ordering;
use std::collections::HashMap;

/// The result of a query: a map from URL to relevance score.
///
/// One instance per query term before combination; the combination
/// operators are pure and build new results, never mutating an operand.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResult {
    scores: HashMap<String, f64>,
}

impl SearchResult {
    pub fn new(scores: HashMap<String, f64>) -> Self {
        Self { scores }
    }

    /// Relevance of a URL; 0 when it is not part of the result.
    pub fn relevance(&self, url: &str) -> f64 {
        self.scores.get(url).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.scores.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Union of both results; URLs present on both sides sum their scores.
    pub fn or(&self, that: &SearchResult) -> SearchResult {
        let mut scores = self.scores.clone();
        for (url, score) in &that.scores {
            *scores.entry(url.clone()).or_insert(0.0) += score;
        }
        SearchResult { scores }
    }

    /// Intersection of both results.
    ///
    /// The score of a shared URL is the sum of both sides, not a filter of
    /// the left side: documents matching several query terms accumulate
    /// relevance from each of them.
    pub fn and(&self, that: &SearchResult) -> SearchResult {
        let mut scores = HashMap::new();
        for (url, score) in &self.scores {
            if let Some(that_score) = that.scores.get(url) {
                scores.insert(url.clone(), score + that_score);
            }
        }
        SearchResult { scores }
    }

    /// URLs present here but absent from `that`, keeping their scores.
    pub fn minus(&self, that: &SearchResult) -> SearchResult {
        let scores = self
            .scores
            .iter()
            .filter(|(url, _)| !that.scores.contains_key(*url))
            .map(|(url, score)| (url.clone(), *score))
            .collect();
        SearchResult { scores }
    }

    /// Iterative left-fold of `and` across `results`, starting from `seed`.
    pub fn combine_all<'a, I>(seed: &SearchResult, results: I) -> SearchResult
    where
        I: IntoIterator<Item = &'a SearchResult>,
    {
        let mut combined = seed.clone();
        for result in results {
            combined = combined.and(result);
        }
        combined
    }

    /// Entries ordered by descending score, ties broken by URL so the order
    /// is deterministic.
    pub fn sort_descending(&self) -> Vec<(String, f64)> {
        let mut entries: Vec<(String, f64)> = self
            .scores
            .iter()
            .map(|(url, score)| (url.clone(), *score))
            .collect();
        entries.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        entries
    }
}

/// Relevance result for a single query term; `None` when the term matches
/// no indexed document.
pub fn search(term: &str, index: &Indexer, ranker: Option<&Ranker>) -> Result<Option<SearchResult>> {
    index.relevance(term, ranker)
}

/// AND-combination of several query terms.
///
/// Any term with no results short-circuits the whole query to `None`, as
/// does an empty term list.
pub fn search_all(
    terms: &[String],
    index: &Indexer,
    ranker: Option<&Ranker>,
) -> Result<Option<SearchResult>> {
    let mut results = Vec::with_capacity(terms.len());
    for term in terms {
        match search(term, index, ranker)? {
            Some(result) => results.push(result),
            None => return Ok(None),
        }
    }
    match results.split_first() {
        Some((seed, rest)) => Ok(Some(SearchResult::combine_all(seed, rest))),
        None => Ok(None),
    }
}

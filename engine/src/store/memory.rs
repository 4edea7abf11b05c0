use super::IndexStore;
use crate::term_counter::TermCounter;
use anyhow::{bail, Result};
use std::collections::{BTreeSet, HashMap};

/// Index store backed by in-process maps.
///
/// Nothing survives the process; intended for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    url_to_terms: HashMap<String, HashMap<String, u64>>,
    term_to_urls: HashMap<String, BTreeSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IndexStore for MemoryStore {
    fn is_indexed(&self, url: &str) -> Result<bool> {
        Ok(self.url_to_terms.contains_key(url))
    }

    fn push_term_counter(&mut self, tc: &TermCounter) -> Result<()> {
        let url = tc.label();
        if let Some(old) = self.url_to_terms.remove(url) {
            // drop the URL from sets of terms that disappeared
            for term in old.keys() {
                if tc.get(term).is_some() {
                    continue;
                }
                if let Some(urls) = self.term_to_urls.get_mut(term) {
                    urls.remove(url);
                    if urls.is_empty() {
                        self.term_to_urls.remove(term);
                    }
                }
            }
        }
        self.url_to_terms.insert(url.to_string(), tc.counts().clone());
        for term in tc.counts().keys() {
            self.term_to_urls
                .entry(term.clone())
                .or_default()
                .insert(url.to_string());
        }
        Ok(())
    }

    fn get_urls(&self, term: &str) -> Result<BTreeSet<String>> {
        Ok(self.term_to_urls.get(term).cloned().unwrap_or_default())
    }

    fn get_url_to_term_count(&self, term: &str) -> Result<HashMap<String, u64>> {
        let mut map = HashMap::new();
        for url in self.get_urls(term)? {
            if let Some(count) = self.url_to_terms.get(&url).and_then(|terms| terms.get(term)) {
                map.insert(url, *count);
            }
        }
        Ok(map)
    }

    fn get_total_term_count(&self, url: &str) -> Result<u64> {
        match self.url_to_terms.get(url) {
            Some(terms) => Ok(terms.values().sum()),
            None => bail!("total term count requested for unindexed url {url}"),
        }
    }

    fn get_count(&self, url: &str, term: &str) -> Result<Option<u64>> {
        Ok(self
            .url_to_terms
            .get(url)
            .and_then(|terms| terms.get(term))
            .copied())
    }

    fn url_set_keys(&self) -> Result<BTreeSet<String>> {
        Ok(self.term_to_urls.keys().cloned().collect())
    }

    fn term_counter_keys(&self) -> Result<BTreeSet<String>> {
        Ok(self.url_to_terms.keys().cloned().collect())
    }

    fn delete_url_sets(&mut self) -> Result<()> {
        self.term_to_urls.clear();
        Ok(())
    }

    fn delete_term_counters(&mut self) -> Result<()> {
        self.url_to_terms.clear();
        Ok(())
    }

    fn delete_all_keys(&mut self) -> Result<()> {
        self.term_to_urls.clear();
        self.url_to_terms.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stopwords::StopWords;

    fn counter(url: &str, text: &str) -> TermCounter {
        TermCounter::count(url, &[text.to_string()], &StopWords::empty())
    }

    #[test]
    fn unindexed_url_is_not_indexed() {
        let store = MemoryStore::new();
        assert!(!store.is_indexed("https://example.com/a").unwrap());
        assert!(store.get_urls("rust").unwrap().is_empty());
        assert_eq!(store.get_count("https://example.com/a", "rust").unwrap(), None);
    }

    #[test]
    fn push_populates_both_maps() {
        let mut store = MemoryStore::new();
        store
            .push_term_counter(&counter("https://example.com/a", "rust rust tools"))
            .unwrap();

        assert!(store.is_indexed("https://example.com/a").unwrap());
        assert!(store.get_urls("rust").unwrap().contains("https://example.com/a"));
        assert_eq!(store.get_count("https://example.com/a", "rust").unwrap(), Some(2));
        assert_eq!(store.get_total_term_count("https://example.com/a").unwrap(), 3);
    }

    #[test]
    fn repush_removes_stale_terms() {
        let mut store = MemoryStore::new();
        let url = "https://example.com/a";
        store.push_term_counter(&counter(url, "apple banana")).unwrap();
        store.push_term_counter(&counter(url, "banana cherry")).unwrap();

        assert!(store.get_urls("apple").unwrap().is_empty());
        assert_eq!(store.get_count(url, "apple").unwrap(), None);
        assert_eq!(store.get_count(url, "cherry").unwrap(), Some(1));
        let terms = store.url_set_keys().unwrap();
        assert!(!terms.contains("apple"));
        assert!(terms.contains("banana"));
        assert!(terms.contains("cherry"));
    }

    #[test]
    fn total_count_fails_for_unindexed_url() {
        let store = MemoryStore::new();
        assert!(store.get_total_term_count("https://example.com/a").is_err());
    }
}

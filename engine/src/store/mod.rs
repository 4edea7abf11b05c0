mod durable;
mod memory;

pub use durable::SledStore;
pub use memory::MemoryStore;

use crate::term_counter::TermCounter;
use anyhow::Result;
use std::collections::{BTreeSet, HashMap};

/// Persistence capability behind the index.
///
/// Two views of the same data: a forward map from URL to per-term counts and
/// a term-set map from term to the URLs containing it. A URL is "indexed"
/// iff it has a forward-map entry, and the two views stay consistent: a URL
/// is in a term's set exactly when its count for that term is present and
/// positive.
pub trait IndexStore {
    /// True iff a forward-map entry exists for `url`.
    fn is_indexed(&self, url: &str) -> Result<bool>;

    /// Replace the forward-map entry for the counter's URL and bring the
    /// term-set map in line with it, as a single atomic unit.
    ///
    /// Terms from an earlier push that no longer occur in `tc` must not keep
    /// the URL in their sets afterwards.
    fn push_term_counter(&mut self, tc: &TermCounter) -> Result<()>;

    /// URLs containing `term`. An unknown term yields an empty set.
    fn get_urls(&self, term: &str) -> Result<BTreeSet<String>>;

    /// Per-URL occurrence count of `term`, restricted to the URLs returned
    /// by `get_urls`.
    fn get_url_to_term_count(&self, term: &str) -> Result<HashMap<String, u64>>;

    /// Sum of all term counts for `url`.
    ///
    /// Fails when `url` is not indexed; callers must check `is_indexed`
    /// first.
    fn get_total_term_count(&self, url: &str) -> Result<u64>;

    /// Occurrences of `term` at `url`; `None` when the URL has none, which
    /// is distinct from a stored zero (never stored).
    fn get_count(&self, url: &str, term: &str) -> Result<Option<u64>>;

    /// Every indexed term. Diagnostics.
    fn url_set_keys(&self) -> Result<BTreeSet<String>>;

    /// Every indexed URL. Diagnostics.
    fn term_counter_keys(&self) -> Result<BTreeSet<String>>;

    /// Administrative reset of the term-set map.
    fn delete_url_sets(&mut self) -> Result<()>;

    /// Administrative reset of the forward map.
    fn delete_term_counters(&mut self) -> Result<()>;

    /// Administrative reset of everything.
    fn delete_all_keys(&mut self) -> Result<()>;
}

pub mod crawler;
pub mod fetch;
pub mod indexer;
pub mod ranker;
pub mod search;
pub mod stopwords;
pub mod store;
pub mod term_counter;

pub use crawler::{CrawlStats, Crawler};
pub use fetch::{Fetcher, Page, Throttle};
pub use indexer::Indexer;
pub use ranker::Ranker;
pub use search::SearchResult;
pub use stopwords::StopWords;
pub use store::{IndexStore, MemoryStore, SledStore};
pub use term_counter::TermCounter;

/// A discovered hyperlink waiting in the crawl queue.
///
/// Carries no identity beyond its URL string; the queue may transiently hold
/// the same URL at different depths, and already-indexed URLs are filtered
/// when they are dequeued, not when they are enqueued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub url: String,
    pub depth: u32,
}

impl Link {
    pub fn new(url: impl Into<String>, depth: u32) -> Self {
        Self { url: url.into(), depth }
    }
}

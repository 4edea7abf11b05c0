use crate::fetch::{Fetcher, Page};
use crate::indexer::Indexer;
use crate::ranker::Ranker;
use crate::Link;
use anyhow::{Context, Result};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use url::Url;

/// Counters reported at the end of a crawl.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CrawlStats {
    /// Pages fetched and indexed.
    pub indexed: usize,
    /// Dequeued links that were already in the index.
    pub skipped: usize,
    /// Dequeued links whose fetch yielded no content.
    pub missing: usize,
}

/// Breadth-first crawler over a link queue.
///
/// Every dequeued URL bumps the ranker, already-indexed URLs are skipped
/// without refetching, and internal links of an indexed page are enqueued
/// at depth+1 until the depth bound cuts the frontier off. Duplicates are
/// not filtered at enqueue time; the indexed-check at dequeue time handles
/// them.
pub struct Crawler<'a> {
    source: String,
    origin: Url,
    queue: VecDeque<Link>,
    index: &'a mut Indexer,
    ranker: &'a mut Ranker,
    fetcher: &'a Fetcher,
    cancelled: Arc<AtomicBool>,
}

impl<'a> Crawler<'a> {
    pub fn new(
        source: &str,
        index: &'a mut Indexer,
        ranker: &'a mut Ranker,
        fetcher: &'a Fetcher,
    ) -> Result<Self> {
        let origin = Url::parse(source).with_context(|| format!("invalid crawl source {source}"))?;
        let mut queue = VecDeque::new();
        queue.push_back(Link::new(source, 0));
        Ok(Self {
            source: source.to_string(),
            origin,
            queue,
            index,
            ranker,
            fetcher,
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Cooperative cancellation flag, checked at the top of the dequeue
    /// loop. Setting it stops the crawl before the next link.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    /// Links currently waiting in the frontier.
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Drain the queue breadth-first, indexing every page not seen before.
    ///
    /// Fetch failures for a single link are logged and treated as "no
    /// content"; they never abort the crawl. Store failures do.
    pub fn crawl_all(&mut self, max_depth: u32) -> Result<CrawlStats> {
        let mut stats = CrawlStats::default();
        // pages come from the local cache; flips to live fetching only if
        // the seed itself is not cached, and stays flipped
        let mut prefer_cache = true;

        loop {
            if self.cancelled.load(Ordering::Relaxed) {
                tracing::info!(pending = self.queue.len(), "crawl cancelled");
                break;
            }
            let link = match self.queue.pop_front() {
                Some(link) => link,
                None => break,
            };

            self.ranker.increment(&link.url);

            if self.index.is_indexed(&link.url)? {
                tracing::debug!(url = %link.url, "already indexed, skipping");
                stats.skipped += 1;
                continue;
            }

            let mut fetched = self.fetch_logged(&link.url, prefer_cache);
            if fetched.is_none() && prefer_cache && link.url == self.source {
                tracing::info!(url = %link.url, "seed not in local cache, switching to live fetching");
                prefer_cache = false;
                fetched = self.fetch_logged(&link.url, prefer_cache);
            }
            let page = match fetched {
                Some(page) => page,
                None => {
                    stats.missing += 1;
                    continue;
                }
            };

            tracing::info!(url = %link.url, depth = link.depth, "indexing");
            self.index.index_page(&link.url, &page.blocks)?;
            stats.indexed += 1;

            if link.depth + 1 <= max_depth {
                self.queue_internal_links(&page, link.depth + 1);
            }
        }

        tracing::info!(
            indexed = stats.indexed,
            skipped = stats.skipped,
            missing = stats.missing,
            "crawl finished"
        );
        Ok(stats)
    }

    /// Fetch one link, demoting errors to "no content" so a single bad page
    /// cannot abort the crawl.
    fn fetch_logged(&self, url: &str, prefer_cache: bool) -> Option<Page> {
        match self.fetcher.fetch(url, prefer_cache) {
            Ok(page) => page,
            Err(err) => {
                tracing::warn!(url, error = %format!("{err:#}"), "fetch failed");
                None
            }
        }
    }

    /// Enqueue every root-relative href of the page at `depth`, resolved
    /// against the crawl origin. No dedup here; already-indexed URLs are
    /// dropped when dequeued.
    fn queue_internal_links(&mut self, page: &Page, depth: u32) {
        for href in &page.hrefs {
            if !href.starts_with('/') {
                continue;
            }
            match self.origin.join(href) {
                Ok(absolute) => self.queue.push_back(Link::new(absolute.as_str(), depth)),
                Err(err) => {
                    tracing::debug!(href = %href, error = %err, "skipping unjoinable href")
                }
            }
        }
    }
}

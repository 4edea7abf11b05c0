use anyhow::{Context, Result};
use parking_lot::Mutex;
use scraper::{Html, Selector};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use url::Url;

const USER_AGENT: &str = "websearch-bot/0.1 (+https://example.com/bot)";
const FETCH_TIMEOUT: Duration = Duration::from_secs(12);

/// Process-wide throttle for live network fetches.
///
/// Enforces a minimum interval between requests; callers serialize through
/// the lock, so the interval holds globally rather than per caller. Owned
/// and injected explicitly so tests can disable it.
pub struct Throttle {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(min_interval: Duration) -> Self {
        Self { min_interval, last_request: Mutex::new(None) }
    }

    /// A throttle that never waits.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Block until the minimum interval since the previous call has passed,
    /// then stamp the current time.
    pub fn wait(&self) {
        let mut last = self.last_request.lock();
        if let Some(prev) = *last {
            let ready_at = prev + self.min_interval;
            let now = Instant::now();
            if now < ready_at {
                std::thread::sleep(ready_at - now);
            }
        }
        *last = Some(Instant::now());
    }
}

/// A fetched page: paragraph text blocks and the raw href attributes of the
/// anchors found inside those paragraphs.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub blocks: Vec<String>,
    pub hrefs: Vec<String>,
}

/// Document-fetching collaborator: resolves a URL to content blocks and
/// outbound links, either from a local page cache or over the network.
pub struct Fetcher {
    cache_root: PathBuf,
    throttle: Throttle,
    client: reqwest::blocking::Client,
}

impl Fetcher {
    pub fn new(cache_root: impl Into<PathBuf>, throttle: Throttle) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .build()
            .context("building http client")?;
        Ok(Self { cache_root: cache_root.into(), throttle, client })
    }

    /// Resolve a URL to a page.
    ///
    /// With `prefer_cache` the page is looked up in the local cache and a
    /// miss yields `Ok(None)`; otherwise it is fetched live through the
    /// throttle. A page with no paragraphs is still a page, not a miss.
    pub fn fetch(&self, url: &str, prefer_cache: bool) -> Result<Option<Page>> {
        if prefer_cache {
            self.fetch_cached(url)
        } else {
            self.fetch_live(url).map(Some)
        }
    }

    /// Local-cache lookup, keyed by host and path segments under the cache
    /// root.
    fn fetch_cached(&self, url: &str) -> Result<Option<Page>> {
        let parsed = Url::parse(url).with_context(|| format!("invalid url {url}"))?;
        let host = match parsed.host_str() {
            Some(host) => host,
            None => return Ok(None),
        };
        let mut path = self.cache_root.join(host);
        for segment in parsed.path().split('/').filter(|s| !s.is_empty()) {
            path.push(segment);
        }
        match fs::read_to_string(&path) {
            Ok(html) => Ok(Some(parse_page(&html))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => {
                Err(e).with_context(|| format!("reading cached page {}", path.display()))
            }
        }
    }

    /// Live fetch, serialized through the shared throttle.
    fn fetch_live(&self, url: &str) -> Result<Page> {
        self.throttle.wait();
        tracing::debug!(url, "live fetch");
        let response = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("fetching {url}"))?;
        let html = response
            .text()
            .with_context(|| format!("reading body of {url}"))?;
        Ok(parse_page(&html))
    }
}

/// Pull the paragraph blocks and their links out of an HTML document.
fn parse_page(html: &str) -> Page {
    let doc = Html::parse_document(html);
    let paragraph = Selector::parse("p").expect("valid selector");
    let anchor = Selector::parse("a[href]").expect("valid selector");

    let mut page = Page::default();
    for p in doc.select(&paragraph) {
        let text = p.text().collect::<String>();
        page.blocks.push(text.trim().to_string());
        for a in p.select(&anchor) {
            if let Some(href) = a.value().attr("href") {
                page.hrefs.push(href.to_string());
            }
        }
    }
    page
}

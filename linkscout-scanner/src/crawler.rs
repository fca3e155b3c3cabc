use crate::error::{Result, ScanError};
use crate::extract::{Document, extract};
use crate::fetch::{DEFAULT_TIMEOUT_SECS, Fetcher, HttpFetcher};
use crate::result::{CrawlResult, Edge, FetchFailure};
use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use url::Url;

/// Called with the number of pages visited so far and the URL just taken.
pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

/// The network location (host and explicit port) a crawl is confined to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlDomain {
    host: String,
    port: Option<u16>,
}

impl CrawlDomain {
    pub fn from_url(url: &Url) -> Option<Self> {
        Some(Self {
            host: url.host_str()?.to_string(),
            port: url.port(),
        })
    }

    pub fn contains(&self, url: &str) -> bool {
        match Url::parse(url) {
            Ok(parsed) => {
                parsed.host_str() == Some(self.host.as_str()) && parsed.port() == self.port
            }
            Err(_) => false,
        }
    }
}

impl fmt::Display for CrawlDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}:{}", self.host, port),
            None => write!(f, "{}", self.host),
        }
    }
}

/// Visited/pending bookkeeping plus the edge accumulator for one crawl run.
///
/// Knows nothing about HTTP or HTML: it hands out URLs to fetch and is told
/// what each fetched page referenced.
#[derive(Debug)]
pub struct Frontier {
    domain: CrawlDomain,
    pending: VecDeque<String>,
    visited: HashSet<String>,
    targets: HashSet<String>,
    result: CrawlResult,
}

impl Frontier {
    pub fn new(domain: CrawlDomain, seed: String) -> Self {
        let mut pending = VecDeque::new();
        pending.push_back(seed.clone());

        Self {
            domain,
            pending,
            visited: HashSet::new(),
            targets: HashSet::new(),
            result: CrawlResult::new(seed),
        }
    }

    pub fn domain(&self) -> &CrawlDomain {
        &self.domain
    }

    /// Take the next URL that has not been visited yet and mark it visited.
    pub fn next_url(&mut self) -> Option<String> {
        while let Some(url) = self.pending.pop_front() {
            if self.visited.insert(url.clone()) {
                self.result.visited.push(url.clone());
                return Some(url);
            }
        }
        None
    }

    /// Record that `target` was found on `origin`.
    ///
    /// Returns `true` when this is the first time `target` is seen anywhere in
    /// the crawl. Only first sightings inside the domain are queued.
    pub fn record(&mut self, origin: &str, target: String) -> bool {
        if !self.targets.insert(target.clone()) {
            return false;
        }

        if self.domain.contains(&target) && !self.visited.contains(&target) {
            self.pending.push_back(target.clone());
        }
        self.result.edges.push(Edge::new(origin, target));
        true
    }

    pub fn record_failure(&mut self, url: String, reason: String) {
        self.result.failures.push(FetchFailure { url, reason });
    }

    pub fn is_exhausted(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn into_result(self) -> CrawlResult {
        self.result
    }
}

pub struct Crawler<F: Fetcher = HttpFetcher> {
    fetcher: Arc<F>,
    timeout: Duration,
    progress_callback: Option<ProgressCallback>,
}

impl Crawler<HttpFetcher> {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        let fetcher = HttpFetcher::with_timeout(timeout_secs)?;
        Ok(Self::with_fetcher(fetcher).fetch_timeout(Duration::from_secs(timeout_secs)))
    }
}

impl<F: Fetcher> Crawler<F> {
    pub fn with_fetcher(fetcher: F) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            progress_callback: None,
        }
    }

    /// Upper bound on a single fetch, regardless of what the fetcher enforces.
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Crawl everything reachable from `seed` inside its network location.
    ///
    /// At most `workers` fetches are in flight at once; the frontier itself is
    /// only ever touched from this loop. The crawl ends once nothing is
    /// pending and nothing is in flight.
    pub async fn crawl(&self, seed: &str, workers: usize) -> Result<CrawlResult> {
        let seed_url =
            Url::parse(seed).map_err(|e| ScanError::InvalidUrl(format!("{}: {}", seed, e)))?;
        let domain = CrawlDomain::from_url(&seed_url)
            .ok_or_else(|| ScanError::InvalidUrl(format!("{} has no host", seed)))?;
        let workers = workers.max(1);

        info!("Starting crawl of {} with {} workers", domain, workers);

        let mut frontier = Frontier::new(domain, seed_url.to_string());
        let mut in_flight = JoinSet::new();

        loop {
            while in_flight.len() < workers {
                let Some(url) = frontier.next_url() else {
                    break;
                };

                info!("Visiting {}", url);
                if let Some(ref callback) = self.progress_callback {
                    callback(frontier.visited_count(), url.clone());
                }

                let fetcher = Arc::clone(&self.fetcher);
                let timeout = self.timeout;
                in_flight.spawn(async move {
                    let page = fetch_page(fetcher.as_ref(), &url, timeout).await;
                    (url, page)
                });
            }

            // Empty only when the frontier is exhausted as well
            let Some(joined) = in_flight.join_next().await else {
                break;
            };

            match joined {
                Ok((url, Ok(body))) => self.process_page(&mut frontier, url, &body),
                Ok((url, Err(e))) => {
                    warn!("Failed to fetch {}: {}", url, e);
                    frontier.record_failure(url, e.to_string());
                }
                Err(e) => {
                    warn!("Fetch task failed: {}", ScanError::from(e));
                }
            }
        }

        let result = frontier.into_result();
        info!(
            "Crawl complete. Visited {} pages, found {} links",
            result.visited.len(),
            result.edges.len()
        );
        Ok(result)
    }

    fn process_page(&self, frontier: &mut Frontier, url: String, body: &str) {
        let origin = match Url::parse(&url) {
            Ok(origin) => origin,
            Err(e) => {
                frontier.record_failure(url, e.to_string());
                return;
            }
        };

        let document = Document::parse(body);
        debug!("{} references on {}", document.references().len(), url);

        for target in extract(&origin, &document) {
            let in_scope = frontier.domain().contains(&target);
            if frontier.record(&url, target.clone()) {
                info!("Found link: {} (origin: {})", target, url);
                if in_scope {
                    debug!("  -> Same domain, queued ({} pending)", frontier.pending_len());
                }
            }
        }
    }
}

async fn fetch_page<F: Fetcher>(fetcher: &F, url: &str, timeout: Duration) -> Result<String> {
    let response = tokio::time::timeout(timeout, fetcher.fetch(url))
        .await
        .map_err(|_| ScanError::Timeout(timeout))??;

    if !response.is_ok() {
        return Err(ScanError::HttpStatus {
            url: url.to_string(),
            status: response.status,
        });
    }

    Ok(response.body)
}

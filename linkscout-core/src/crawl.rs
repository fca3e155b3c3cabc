use indicatif::{ProgressBar, ProgressStyle};
use linkscout_scanner::error::Result;
use linkscout_scanner::fetch::DEFAULT_TIMEOUT_SECS;
use linkscout_scanner::{CrawlDomain, CrawlResult, Crawler, Fetcher, HttpFetcher, ProgressCallback};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Options for configuring a crawl operation
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub url: String,
    pub threads: usize,
    pub timeout_secs: u64,
    pub show_progress_bars: bool,
}

impl CrawlOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            threads: 1,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            show_progress_bars: false,
        }
    }
}

/// Callback for reporting crawl progress
pub type CrawlProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() || path == "/" {
                "/".to_string()
            } else {
                path
            }
        })
        .unwrap_or_else(|| url.to_string())
}

/// Execute a crawl over HTTP with the given options
pub async fn execute_crawl(
    options: CrawlOptions,
    progress_callback: Option<CrawlProgressCallback>,
) -> Result<CrawlResult> {
    let fetcher = HttpFetcher::with_timeout(options.timeout_secs)?;
    execute_crawl_with(fetcher, options, progress_callback).await
}

/// Execute a crawl through any fetcher
pub async fn execute_crawl_with<F: Fetcher>(
    fetcher: F,
    options: CrawlOptions,
    progress_callback: Option<CrawlProgressCallback>,
) -> Result<CrawlResult> {
    let CrawlOptions {
        url,
        threads,
        timeout_secs,
        show_progress_bars,
    } = options;

    let progress_bar = if show_progress_bars {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap(),
        );
        pb.set_message("Starting crawl...");
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(Arc::new(pb))
    } else {
        None
    };

    let internal_progress_callback: ProgressCallback = {
        let pb_clone = progress_bar.clone();
        let external = progress_callback.clone();
        Arc::new(move |count: usize, url: String| {
            if let Some(ref pb) = pb_clone {
                pb.set_message(format!("Crawling... {} pages visited ({})", count, extract_url_path(&url)));
            }
            if let Some(ref callback) = external {
                callback(format!("[{}] {}", count, url));
            }
        })
    };

    let crawler = Crawler::with_fetcher(fetcher)
        .fetch_timeout(Duration::from_secs(timeout_secs))
        .with_progress_callback(internal_progress_callback);

    let result = crawler.crawl(&url, threads).await;

    if let Some(ref pb) = progress_bar {
        match &result {
            Ok(result) => pb.finish_with_message(format!(
                "Crawl complete! {} pages visited, {} links found",
                result.visited.len(),
                result.edges.len()
            )),
            Err(_) => pb.finish_and_clear(),
        }
    }

    result
}

/// Generate a plain-text summary of a crawl
pub fn generate_crawl_report(result: &CrawlResult) -> String {
    let domain = Url::parse(&result.seed)
        .ok()
        .and_then(|seed| CrawlDomain::from_url(&seed));

    let internal = result
        .targets()
        .filter(|target| domain.as_ref().is_some_and(|d| d.contains(target)))
        .count();

    let mut report = String::new();
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    report.push_str("# Summary:\n");
    report.push_str(&format!("  Seed: {}\n", result.seed));
    report.push_str(&format!("  Pages visited: {}\n", result.visited.len()));
    report.push_str(&format!("  Links found: {}\n", result.edges.len()));
    report.push_str(&format!("  Internal links: {}\n", internal));
    report.push_str(&format!("  External links: {}\n", result.edges.len() - internal));
    report.push_str(&format!("  Failed fetches: {}\n", result.failures.len()));

    report.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    // Group targets by host, sorted for stable output
    let mut by_host: BTreeMap<String, usize> = BTreeMap::new();
    for target in result.targets() {
        let host = Url::parse(target)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| "(no host)".to_string());
        *by_host.entry(host).or_default() += 1;
    }

    for (host, count) in &by_host {
        report.push_str(&format!("## {}\n", host));
        report.push_str(&format!("  {} links found\n\n", count));
    }

    if !result.failures.is_empty() {
        report.push_str("## Failed\n");
        for failure in &result.failures {
            report.push_str(&format!(
                "  {} {}\n",
                extract_url_path(&failure.url),
                failure.reason
            ));
        }
        report.push('\n');
    }

    report
}

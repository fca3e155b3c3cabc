pub mod crawler;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod result;

pub use crawler::{CrawlDomain, Crawler, Frontier, ProgressCallback};
pub use error::ScanError;
pub use extract::{Document, Reference, ReferenceKind, extract};
pub use fetch::{FetchResponse, Fetcher, HttpFetcher};
pub use result::{CrawlResult, Edge, FetchFailure};

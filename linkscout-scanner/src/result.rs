use serde::{Deserialize, Serialize};

/// A discovery: `target` was referenced on the page at `origin`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub origin: String,
    pub target: String,
}

impl Edge {
    pub fn new(origin: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            target: target.into(),
        }
    }
}

/// A URL whose fetch was attempted but contributed no links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchFailure {
    pub url: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlResult {
    pub seed: String,
    /// Edges in discovery order, at most one per target.
    pub edges: Vec<Edge>,
    /// URLs in the order they were taken off the frontier.
    pub visited: Vec<String>,
    pub failures: Vec<FetchFailure>,
}

impl CrawlResult {
    pub fn new(seed: String) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    pub fn seed_failed(&self) -> bool {
        self.failures.iter().any(|f| f.url == self.seed)
    }

    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.edges.iter().map(|e| e.target.as_str())
    }
}

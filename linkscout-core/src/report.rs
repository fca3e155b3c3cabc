// Export of crawl results to disk

use linkscout_scanner::error::Result;
use linkscout_scanner::{CrawlResult, Edge};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

pub const DEFAULT_OUTPUT_FILE: &str = "links_site.csv";

/// Column headers of the exported table.
pub const CSV_HEADERS: [&str; 2] = ["Origem", "URL Encontrada"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Csv,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Some(ReportFormat::Csv),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }

    /// Guess the format from a file extension, defaulting to CSV.
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_str)
            .unwrap_or(ReportFormat::Csv)
    }
}

/// Write `edges` as a two-column table. The header row is always written,
/// even when there are no edges.
pub fn write_csv<W: Write>(edges: &[Edge], writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(CSV_HEADERS)?;
    for edge in edges {
        writer.write_record([edge.origin.as_str(), edge.target.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn export_csv(edges: &[Edge], path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write_csv(edges, file)?;
    info!("Saved {} links to {}", edges.len(), path.display());
    Ok(())
}

pub fn export_json(result: &CrawlResult, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(result)
        .map_err(|e| linkscout_scanner::ScanError::Other(format!("JSON encoding failed: {}", e)))?;
    save_report(&json, path)?;
    info!("Saved {} links to {}", result.edges.len(), path.display());
    Ok(())
}

/// Export in whichever format `path` asks for.
pub fn export(result: &CrawlResult, path: &Path, format: ReportFormat) -> Result<()> {
    match format {
        ReportFormat::Csv => export_csv(&result.edges, path),
        ReportFormat::Json => export_json(result, path),
    }
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use colored::Colorize;
use linkscout_core::crawl::{CrawlOptions, execute_crawl, generate_crawl_report};
use linkscout_core::logging::{LoggingConfig, init_logging};
use linkscout_core::report::{self, ReportFormat};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::error;
use url::Url;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;

/// Everything a single run needs, resolved from the command line
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub seed: String,
    pub threads: usize,
    pub timeout_secs: u64,
    pub output: PathBuf,
    pub format: ReportFormat,
    pub quiet: bool,
}

impl RunConfig {
    pub fn from_matches(matches: &ArgMatches, seed: String) -> Self {
        let output = expand_path(
            matches
                .get_one::<String>("output")
                .map(String::as_str)
                .unwrap_or(report::DEFAULT_OUTPUT_FILE),
        );
        let format = matches
            .get_one::<String>("format")
            .and_then(|f| ReportFormat::from_str(f))
            .unwrap_or_else(|| ReportFormat::from_path(&output));

        Self {
            seed,
            threads: *matches.get_one::<usize>("threads").unwrap_or(&1),
            timeout_secs: *matches.get_one::<u64>("timeout").unwrap_or(&5),
            output,
            format,
            quiet: matches.get_flag("quiet"),
        }
    }
}

pub fn logging_config(matches: &ArgMatches) -> LoggingConfig {
    LoggingConfig {
        log_file: matches
            .get_one::<String>("log-file")
            .map(|path| expand_path(path)),
        console: !matches.get_flag("quiet"),
        ..LoggingConfig::default()
    }
}

fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

/// Parse the seed, adding `http://` when the scheme is missing
pub fn parse_seed(line: &str) -> Result<Url> {
    let line = line.trim();
    if line.is_empty() {
        bail!("No URL given");
    }

    if let Ok(url) = Url::parse(line)
        && matches!(url.scheme(), "http" | "https")
    {
        return Ok(url);
    }

    let with_scheme = format!("http://{}", line);
    match Url::parse(&with_scheme) {
        Ok(url) if url.host_str().is_some() => Ok(url),
        _ => bail!("Invalid URL '{}'", line),
    }
}

/// Ask for the seed URL on `output` and read one line from `input`
pub fn read_seed<R: BufRead, W: Write>(mut input: R, mut output: W) -> Result<String> {
    write!(output, "Enter the URL: ")?;
    output.flush()?;

    let mut line = String::new();
    let read = input.read_line(&mut line).context("Failed to read URL")?;
    if read == 0 {
        bail!("No URL given");
    }
    Ok(line.trim().to_string())
}

/// Crawl, summarize and export. Returns the process exit code.
pub async fn run(config: RunConfig) -> i32 {
    let seed = match parse_seed(&config.seed) {
        Ok(seed) => seed,
        Err(e) => {
            error!("{}", e);
            eprintln!("{} {}", "✗".red().bold(), e);
            return EXIT_FAILURE;
        }
    };

    let options = CrawlOptions {
        url: seed.to_string(),
        threads: config.threads,
        timeout_secs: config.timeout_secs,
        show_progress_bars: config.quiet,
    };

    let result = match execute_crawl(options, None).await {
        Ok(result) => result,
        Err(e) => {
            error!("Crawl failed: {}", e);
            eprintln!("{} Crawl failed: {}", "✗".red().bold(), e);
            return EXIT_FAILURE;
        }
    };

    if !config.quiet {
        print!("{}", generate_crawl_report(&result));
    }

    if result.seed_failed() {
        eprintln!(
            "{} Could not fetch {}, nothing to export",
            "✗".red().bold(),
            result.seed
        );
        return EXIT_FAILURE;
    }

    match report::export(&result, &config.output, config.format) {
        Ok(()) => {
            println!(
                "{} {} links saved to {}",
                "✓".green().bold(),
                result.edges.len().to_string().cyan(),
                config.output.display().to_string().bright_white()
            );
            EXIT_SUCCESS
        }
        Err(e) => {
            error!("Export to {} failed: {}", config.output.display(), e);
            eprintln!(
                "{} Could not write {}: {}",
                "✗".red().bold(),
                config.output.display(),
                e
            );
            EXIT_FAILURE
        }
    }
}

pub async fn handle_crawl(matches: &ArgMatches) -> i32 {
    // Logging problems must never stop a crawl
    let _guard = match init_logging(&logging_config(matches)) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{} {:#}", "⚠".yellow().bold(), e);
            None
        }
    };

    let seed = match matches.get_one::<String>("url") {
        Some(url) => url.clone(),
        None => match read_seed(io::stdin().lock(), io::stdout()) {
            Ok(line) => line,
            Err(e) => {
                eprintln!("{} {:#}", "✗".red().bold(), e);
                return EXIT_FAILURE;
            }
        },
    };

    run(RunConfig::from_matches(matches, seed)).await
}

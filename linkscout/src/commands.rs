use clap::{arg, value_parser};
use linkscout_core::logging::DEFAULT_LOG_FILE;
use linkscout_core::report::DEFAULT_OUTPUT_FILE;

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("linkscout")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("linkscout")
        .styles(CLAP_STYLING)
        .about(
            "Crawl every page of a site and list each link, stylesheet, script and image \
            it references.",
        )
        .arg(arg!(-q --"quiet" "Suppress banner and console logging, show a progress spinner").required(false))
        .arg(
            arg!(-u --"url" <URL>)
                .required(false)
                .help("The URL to start from (prompted for when omitted)"),
        )
        .arg(
            arg!(-o --"output" <PATH>)
                .required(false)
                .help("File the discovered links are written to")
                .default_value(DEFAULT_OUTPUT_FILE),
        )
        .arg(
            arg!(-f --"format" <FORMAT>)
                .required(false)
                .help("Output format (default: guessed from the output file extension)")
                .value_parser(["csv", "json"]),
        )
        .arg(
            arg!(-t --"threads" <NUM_WORKERS>)
                .required(false)
                .help("The number of pages fetched concurrently")
                .value_parser(value_parser!(usize))
                .default_value("1"),
        )
        .arg(
            arg!(--"timeout" <SECONDS>)
                .required(false)
                .help("Request timeout in seconds")
                .value_parser(value_parser!(u64))
                .default_value("5"),
        )
        .arg(
            arg!(--"log-file" <PATH>)
                .required(false)
                .help("Log file appended to on every run")
                .default_value(DEFAULT_LOG_FILE),
        )
}

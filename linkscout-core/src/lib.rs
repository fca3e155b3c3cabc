pub mod crawl;
pub mod logging;
pub mod report;

use colored::Colorize;

pub fn print_banner() {
    println!(
        "{} {}",
        "linkscout".bright_cyan().bold(),
        env!("CARGO_PKG_VERSION").bright_black()
    );
    println!("{}", "same-domain link crawler".bright_black());
    println!();
}

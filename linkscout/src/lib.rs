pub mod commands;
pub mod handlers;

pub use commands::command_argument_builder;
pub use handlers::{
    EXIT_FAILURE, EXIT_SUCCESS, RunConfig, handle_crawl, parse_seed, read_seed, run,
};

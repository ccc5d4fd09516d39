//! Engine module: CLI surface, progress display and key/filter helpers

pub mod arg_parser;
pub mod cli;
pub mod progress;
pub mod tools;

// Re-export commonly used functions
pub use arg_parser::Cli;
pub use cli::{handle_run, setup_opts};
pub use tools::{
    base_name, destination_key, glob_match, is_os_hidden_file, should_include_in_listing,
};

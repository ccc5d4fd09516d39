pub mod cancel;
pub mod config;
pub mod fanload_toml;
pub mod logger;

pub use cancel::{CancelToken, cancel_on_ctrlc};
pub use config::*;
pub use fanload_toml::{FanloadToml, apply_file_to_opts, load_fanload_toml, parse_fanload_toml};
pub use logger::setup_logging;

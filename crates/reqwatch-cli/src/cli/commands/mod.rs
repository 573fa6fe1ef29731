//! CLI command handlers, one per file.

mod check;
mod completions;
mod config_path;
mod watch;

pub use check::run_check;
pub use completions::run_completions;
pub use config_path::run_config_path;
pub use watch::run_watch;

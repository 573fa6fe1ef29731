pub mod config;
pub mod logging;

pub mod correlation;
pub mod model;
pub mod resolver;
pub mod rules;
pub mod watcher;

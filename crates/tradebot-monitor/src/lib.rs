//! Logging setup and session statistics.

mod logging;
mod stats;

pub use logging::setup_logging;
pub use stats::SessionStats;

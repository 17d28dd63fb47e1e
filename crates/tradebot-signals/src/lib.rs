//! Signal generation.
//!
//! A single-bar comparison of the latest close against its trailing simple
//! moving average, recomputed independently on every poll.

mod engine;

pub use engine::{compute_signal, SignalEngine, SignalEvaluation};

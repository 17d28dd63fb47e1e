//! Core data types.

mod interval;
mod ohlcv;
mod signal;

pub use interval::{FetchRequest, Interval, Range, Span};
pub use ohlcv::{closes, total_return_pct, Bar};
pub use signal::{Side, Signal};

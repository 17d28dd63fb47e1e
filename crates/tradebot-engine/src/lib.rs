//! The polling control loop.
//!
//! Each iteration fetches bars for every configured symbol, evaluates the
//! close-versus-SMA signal, gates it through the portfolio state, and hands
//! resulting trades to an execution adapter. State only advances when the
//! adapter confirms the trade.

mod control_loop;
mod retry;

pub use control_loop::{ControlLoop, IterationReport, StepError, StepKind, SymbolOutcome};
pub use retry::RetryPolicy;

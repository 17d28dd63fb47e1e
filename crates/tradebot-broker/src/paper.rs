//! Paper executor for dry runs and simulation.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use tracing::info;
use tradebot_core::error::ExecutionError;
use tradebot_core::traits::{ExecutionAdapter, ExecutionReport};
use tradebot_core::types::Side;
use uuid::Uuid;

#[derive(Debug, Default)]
struct PaperBook {
    positions: BTreeSet<String>,
    history: Vec<ExecutionReport>,
}

/// Executor that only records trades.
#[derive(Debug, Clone, Default)]
pub struct PaperExecutor {
    book: Arc<Mutex<PaperBook>>,
}

impl PaperExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// All executions so far, oldest first.
    pub fn history(&self) -> Vec<ExecutionReport> {
        self.book
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .history
            .clone()
    }

    /// Symbols bought and not yet sold.
    pub fn positions(&self) -> BTreeSet<String> {
        self.book
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .positions
            .clone()
    }
}

#[async_trait]
impl ExecutionAdapter for PaperExecutor {
    async fn execute(&self, symbol: &str, side: Side) -> Result<ExecutionReport, ExecutionError> {
        let mut book = self.book.lock().unwrap_or_else(|e| e.into_inner());

        match side {
            Side::Buy => {
                book.positions.insert(symbol.to_string());
            }
            Side::Sell => {
                if !book.positions.remove(symbol) {
                    return Err(ExecutionError::PositionNotFound(symbol.to_string()));
                }
            }
        }

        let report = ExecutionReport {
            id: Uuid::new_v4().to_string(),
            symbol: symbol.to_string(),
            side,
            adapter: self.name().to_string(),
            executed_at: Utc::now(),
            detail: None,
        };
        book.history.push(report.clone());

        info!(%symbol, %side, "Paper trade recorded");
        Ok(report)
    }

    fn name(&self) -> &str {
        "paper"
    }
}

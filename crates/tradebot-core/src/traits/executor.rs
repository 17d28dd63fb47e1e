//! Execution adapter trait definition.

use crate::error::ExecutionError;
use crate::types::Side;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Confirmation returned by an adapter after a trade was placed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionReport {
    /// Adapter-specific identifier for the trade
    pub id: String,
    pub symbol: String,
    pub side: Side,
    /// Name of the adapter that placed the trade
    pub adapter: String,
    pub executed_at: DateTime<Utc>,
    /// Free-form detail such as automation output or order status
    pub detail: Option<String>,
}

/// Performs the physical trade action for a symbol.
///
/// The control loop only commits its portfolio transition once this
/// returns `Ok`.
#[async_trait]
pub trait ExecutionAdapter: Send + Sync {
    /// Place a trade for `symbol` in the given direction.
    async fn execute(&self, symbol: &str, side: Side) -> Result<ExecutionReport, ExecutionError>;

    /// Get the adapter name.
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: ExecutionAdapter + ?Sized> ExecutionAdapter for Arc<T> {
    async fn execute(&self, symbol: &str, side: Side) -> Result<ExecutionReport, ExecutionError> {
        (**self).execute(symbol, side).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

//! Executor that delegates to an external automation program.
//!
//! The program drives the brokerage UI; this side only builds the command
//! line and interprets the exit status.

use async_trait::async_trait;
use chrono::Utc;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};
use tradebot_core::error::ExecutionError;
use tradebot_core::traits::{ExecutionAdapter, ExecutionReport};
use tradebot_core::types::Side;
use uuid::Uuid;

/// Runs `program args...` once per trade.
///
/// `{symbol}` and `{side}` in any argument are replaced before spawning.
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl CommandExecutor {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Result<Self, ExecutionError> {
        let program = program.into();
        if program.trim().is_empty() {
            return Err(ExecutionError::Configuration(
                "automation program must not be empty".into(),
            ));
        }
        Ok(Self {
            program,
            args,
            timeout: None,
        })
    }

    /// Kill the program if it runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn render_args(&self, symbol: &str, side: Side) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.replace("{symbol}", symbol).replace("{side}", side.as_str()))
            .collect()
    }
}

#[async_trait]
impl ExecutionAdapter for CommandExecutor {
    async fn execute(&self, symbol: &str, side: Side) -> Result<ExecutionReport, ExecutionError> {
        let args = self.render_args(symbol, side);
        debug!(program = %self.program, ?args, "Spawning automation");

        let child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| ExecutionError::Timeout(limit))??,
            None => child.wait_with_output().await?,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(%symbol, %side, status = %output.status, "Automation failed");
            return Err(ExecutionError::CommandFailed {
                status: output.status.to_string(),
                stderr,
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let detail = stdout
            .lines()
            .rev()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .map(str::to_string);

        info!(%symbol, %side, "Automation completed");
        Ok(ExecutionReport {
            id: Uuid::new_v4().to_string(),
            symbol: symbol.to_string(),
            side,
            adapter: self.name().to_string(),
            executed_at: Utc::now(),
            detail,
        })
    }

    fn name(&self) -> &str {
        "command"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell(script: &str) -> CommandExecutor {
        CommandExecutor::new("sh", vec!["-c".to_string(), script.to_string()]).unwrap()
    }

    #[test]
    fn test_placeholders() {
        let executor = CommandExecutor::new(
            "automate",
            vec!["--ticker={symbol}".to_string(), "{side}".to_string()],
        )
        .unwrap();
        assert_eq!(
            executor.render_args("AAPL", Side::Sell),
            vec!["--ticker=AAPL", "sell"]
        );
    }

    #[test]
    fn test_empty_program_rejected() {
        assert!(CommandExecutor::new(" ", vec![]).is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_success_reports_last_line() {
        let report = shell("echo start; echo {side} {symbol}")
            .execute("AAPL", Side::Buy)
            .await
            .unwrap();
        assert_eq!(report.detail.as_deref(), Some("buy AAPL"));
        assert_eq!(report.adapter, "command");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_fails() {
        let result = shell("echo element not found >&2; exit 3")
            .execute("AAPL", Side::Buy)
            .await;
        match result {
            Err(ExecutionError::CommandFailed { stderr, .. }) => {
                assert_eq!(stderr, "element not found")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout() {
        let result = shell("sleep 5")
            .with_timeout(Duration::from_millis(200))
            .execute("AAPL", Side::Buy)
            .await;
        match result {
            Err(err @ ExecutionError::Timeout(limit)) => {
                assert_eq!(limit, Duration::from_millis(200));
                assert_eq!(err.to_string(), "Execution timed out after 200ms");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_program() {
        let executor = CommandExecutor::new("/no/such/automation-binary", vec![]).unwrap();
        assert!(matches!(
            executor.execute("AAPL", Side::Buy).await,
            Err(ExecutionError::Io(_))
        ));
    }
}

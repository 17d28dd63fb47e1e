//! Polling control loop.

use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use tradebot_core::error::TradingError;
use tradebot_core::traits::{ExecutionAdapter, ExecutionReport, MarketDataSource};
use tradebot_core::types::{Bar, FetchRequest, Interval, Side, Signal, Span};
use tradebot_data::BarExporter;
use tradebot_monitor::SessionStats;
use tradebot_portfolio::{PortfolioState, TradeAction, TradeGate};
use tradebot_signals::{SignalEngine, SignalEvaluation};

use crate::retry::RetryPolicy;

/// Stage of per-symbol processing that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Fetch,
    Export,
    Execution,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepKind::Fetch => "fetch",
            StepKind::Export => "export",
            StepKind::Execution => "execution",
        };
        f.write_str(s)
    }
}

/// A failed step for one symbol.
#[derive(Debug, Error)]
#[error("{kind} failed for {symbol}: {source}")]
pub struct StepError {
    pub kind: StepKind,
    pub symbol: String,
    #[source]
    pub source: TradingError,
}

impl StepError {
    fn new(kind: StepKind, symbol: &str, source: impl Into<TradingError>) -> Self {
        Self {
            kind,
            symbol: symbol.to_string(),
            source: source.into(),
        }
    }
}

/// What happened to one symbol during an iteration.
#[derive(Debug, Clone)]
pub struct SymbolOutcome {
    pub symbol: String,
    pub evaluation: SignalEvaluation,
    pub action: TradeAction,
    /// Present when the adapter confirmed the trade
    pub execution: Option<ExecutionReport>,
}

/// Result of one pass over all symbols.
#[derive(Debug, Default)]
pub struct IterationReport {
    pub iteration: u64,
    pub outcomes: Vec<SymbolOutcome>,
    pub errors: Vec<StepError>,
}

impl IterationReport {
    /// True when any step failed.
    pub fn failed(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn outcome(&self, symbol: &str) -> Option<&SymbolOutcome> {
        self.outcomes.iter().find(|o| o.symbol == symbol)
    }

    pub fn errors_of(&self, kind: StepKind) -> impl Iterator<Item = &StepError> {
        self.errors.iter().filter(move |e| e.kind == kind)
    }
}

/// Fetch, evaluate, gate, and execute for a fixed list of symbols.
pub struct ControlLoop {
    source: Box<dyn MarketDataSource>,
    executor: Box<dyn ExecutionAdapter>,
    engine: SignalEngine,
    gate: TradeGate,
    symbols: Vec<String>,
    span: Span,
    interval: Interval,
    exporter: Option<BarExporter>,
    retry: RetryPolicy,
    initial_buy_pending: bool,
    consecutive_failures: u32,
    stats: SessionStats,
}

impl ControlLoop {
    pub fn new(
        source: impl MarketDataSource + 'static,
        executor: impl ExecutionAdapter + 'static,
        engine: SignalEngine,
        gate: TradeGate,
        symbols: Vec<String>,
    ) -> Self {
        Self {
            source: Box::new(source),
            executor: Box::new(executor),
            engine,
            gate,
            symbols,
            span: Span::default(),
            interval: Interval::Minute1,
            exporter: None,
            retry: RetryPolicy::default(),
            initial_buy_pending: false,
            consecutive_failures: 0,
            stats: SessionStats::new(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn with_interval(mut self, interval: Interval) -> Self {
        self.interval = interval;
        self
    }

    /// Overwrite `exporter` with the bars of every successful fetch.
    pub fn with_exporter(mut self, exporter: BarExporter) -> Self {
        self.exporter = Some(exporter);
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Treat the first evaluation of the process as BUY.
    pub fn with_force_initial_buy(mut self, enabled: bool) -> Self {
        self.initial_buy_pending = enabled;
        self
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Delay the loop waits before the next iteration.
    pub fn next_delay(&self) -> Duration {
        self.retry.delay(self.consecutive_failures)
    }

    fn request(&self, symbol: &str) -> FetchRequest {
        FetchRequest::new(symbol, self.span, self.interval).normalized()
    }

    /// Run iterations forever, sleeping per the retry policy in between.
    pub async fn run(&mut self, initial: PortfolioState) {
        if let Some(symbol) = self.symbols.first() {
            let request = self.request(symbol);
            if request.interval != self.interval {
                warn!(
                    requested = %self.interval,
                    using = %request.interval,
                    span = %self.span,
                    "Interval not available for span, falling back"
                );
            }
        }

        info!(
            symbols = ?self.symbols,
            window = self.engine.window_size(),
            trade_limit = self.gate.trade_limit,
            source = self.source.name(),
            executor = self.executor.name(),
            "Starting control loop"
        );

        let mut state = initial;
        loop {
            let (next, report) = self.tick(state).await;
            state = next;

            for err in &report.errors {
                error!(kind = %err.kind, symbol = %err.symbol, error = %err.source, "Step failed");
            }

            let delay = self.next_delay();
            debug!(delay_secs = delay.as_secs_f64(), "Sleeping until next iteration");
            tokio::time::sleep(delay).await;
        }
    }

    /// Run one iteration over all symbols without sleeping.
    ///
    /// Returns the state to carry into the next iteration. A trade's state
    /// transition is only kept if the adapter confirmed it.
    pub async fn tick(&mut self, state: PortfolioState) -> (PortfolioState, IterationReport) {
        self.stats.record_iteration();
        let mut report = IterationReport {
            iteration: self.stats.iterations,
            ..Default::default()
        };

        let mut state = state;
        let symbols = self.symbols.clone();
        for symbol in &symbols {
            state = self.process_symbol(state, symbol, &mut report).await;
        }

        if report.failed() {
            self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        } else {
            self.consecutive_failures = 0;
        }

        info!(
            iteration = report.iteration,
            portfolio = %state,
            stats = %self.stats,
            "Iteration complete"
        );
        (state, report)
    }

    async fn process_symbol(
        &mut self,
        state: PortfolioState,
        symbol: &str,
        report: &mut IterationReport,
    ) -> PortfolioState {
        let bars = match self.fetch(symbol).await {
            Ok(bars) => bars,
            Err(err) => {
                self.stats.record_fetch_failure();
                report.errors.push(err);
                return state;
            }
        };

        if let Err(err) = self.export(symbol, &bars) {
            self.stats.record_export_failure();
            report.errors.push(err);
        }

        let evaluation = self.evaluate(symbol, &bars);
        self.stats.record_signal(evaluation.signal);

        let (next, action) = state.apply_signal(evaluation.signal, symbol, &self.gate);
        let mut outcome = SymbolOutcome {
            symbol: symbol.to_string(),
            evaluation,
            action,
            execution: None,
        };

        let committed = match action.side() {
            None => state,
            Some(side) => match self.execute(symbol, side).await {
                Ok(execution) => {
                    self.stats.record_execution(side);
                    outcome.execution = Some(execution);
                    next
                }
                Err(err) => {
                    self.stats.record_execution_failure();
                    report.errors.push(err);
                    state
                }
            },
        };

        report.outcomes.push(outcome);
        committed
    }

    async fn fetch(&self, symbol: &str) -> Result<Vec<Bar>, StepError> {
        let request = self.request(symbol);
        let bars = self
            .source
            .fetch(&request)
            .await
            .map_err(|e| StepError::new(StepKind::Fetch, symbol, e))?;
        debug!(%symbol, bars = bars.len(), interval = %request.interval, "Fetched bars");
        Ok(bars)
    }

    fn export(&self, symbol: &str, bars: &[Bar]) -> Result<(), StepError> {
        match &self.exporter {
            Some(exporter) => exporter
                .write(symbol, bars)
                .map_err(|e| StepError::new(StepKind::Export, symbol, e)),
            None => Ok(()),
        }
    }

    fn evaluate(&mut self, symbol: &str, bars: &[Bar]) -> SignalEvaluation {
        let mut evaluation = self.engine.evaluate(bars);

        if self.initial_buy_pending {
            self.initial_buy_pending = false;
            if evaluation.signal != Signal::Buy {
                info!(%symbol, computed = %evaluation.signal, "Forcing initial BUY");
                evaluation = evaluation.overridden(Signal::Buy);
            }
        }

        match (evaluation.close, evaluation.moving_average) {
            (Some(close), Some(sma)) => info!(
                %symbol,
                %close,
                %sma,
                signal = %evaluation.signal,
                "Signal evaluated"
            ),
            _ => info!(
                %symbol,
                bars = evaluation.bars,
                window = self.engine.window_size(),
                signal = %evaluation.signal,
                "Insufficient history"
            ),
        }
        evaluation
    }

    async fn execute(&self, symbol: &str, side: Side) -> Result<ExecutionReport, StepError> {
        let execution = self
            .executor
            .execute(symbol, side)
            .await
            .map_err(|e| StepError::new(StepKind::Execution, symbol, e))?;
        info!(%symbol, %side, id = %execution.id, adapter = %execution.adapter, "Trade executed");
        Ok(execution)
    }
}

//! Alpaca executor for paper and live accounts.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{header, Client, StatusCode};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use tradebot_core::error::ExecutionError;
use tradebot_core::traits::{ExecutionAdapter, ExecutionReport};
use tradebot_core::types::Side;
use uuid::Uuid;

/// Alpaca API configuration.
#[derive(Debug, Clone)]
pub struct AlpacaConfig {
    pub api_key: String,
    pub api_secret: String,
    pub paper: bool,
    /// Shares bought on each BUY
    pub quantity: Decimal,
}

impl AlpacaConfig {
    /// Create config directly with key and secret.
    pub fn new(api_key: String, api_secret: String, paper: bool) -> Self {
        Self {
            api_key,
            api_secret,
            paper,
            quantity: dec!(1),
        }
    }

    pub fn with_quantity(mut self, quantity: Decimal) -> Self {
        self.quantity = quantity;
        self
    }

    /// Load keys from the named environment variables.
    pub fn from_env(key_var: &str, secret_var: &str, paper: bool) -> Result<Self, ExecutionError> {
        let api_key = std::env::var(key_var)
            .map_err(|_| ExecutionError::Configuration(format!("{} not set", key_var)))?;
        let api_secret = std::env::var(secret_var)
            .map_err(|_| ExecutionError::Configuration(format!("{} not set", secret_var)))?;

        Ok(Self::new(api_key, api_secret, paper))
    }

    pub fn base_url(&self) -> &str {
        if self.paper {
            "https://paper-api.alpaca.markets"
        } else {
            "https://api.alpaca.markets"
        }
    }
}

#[derive(Debug, Serialize)]
struct CreateOrderRequest {
    symbol: String,
    qty: String,
    side: String,
    #[serde(rename = "type")]
    order_type: String,
    time_in_force: String,
    client_order_id: String,
}

#[derive(Debug, Deserialize)]
struct AlpacaOrder {
    id: String,
    status: String,
    symbol: String,
}

/// Places market orders through the Alpaca REST API.
pub struct AlpacaExecutor {
    config: AlpacaConfig,
    client: Client,
}

impl AlpacaExecutor {
    /// Create a new Alpaca executor.
    pub fn new(config: AlpacaConfig) -> Result<Self, ExecutionError> {
        if config.quantity <= Decimal::ZERO {
            return Err(ExecutionError::Configuration(
                "order quantity must be positive".into(),
            ));
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(
            "APCA-API-KEY-ID",
            header::HeaderValue::from_str(&config.api_key)
                .map_err(|e| ExecutionError::Configuration(e.to_string()))?,
        );
        headers.insert(
            "APCA-API-SECRET-KEY",
            header::HeaderValue::from_str(&config.api_secret)
                .map_err(|e| ExecutionError::Configuration(e.to_string()))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ExecutionError::Connection(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn market_order(&self, symbol: &str, side: Side) -> CreateOrderRequest {
        CreateOrderRequest {
            symbol: symbol.to_string(),
            qty: self.config.quantity.to_string(),
            side: side.as_str().to_string(),
            order_type: "market".to_string(),
            time_in_force: "day".to_string(),
            client_order_id: Uuid::new_v4().to_string(),
        }
    }

    async fn read_order(
        resp: reqwest::Response,
        symbol: &str,
    ) -> Result<AlpacaOrder, ExecutionError> {
        let status = resp.status();
        if status.is_success() {
            return resp
                .json()
                .await
                .map_err(|e| ExecutionError::Api(e.to_string()));
        }

        let text = resp.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::NOT_FOUND => ExecutionError::PositionNotFound(symbol.to_string()),
            StatusCode::FORBIDDEN | StatusCode::UNPROCESSABLE_ENTITY => {
                ExecutionError::Rejected(text)
            }
            _ => ExecutionError::Api(format!("{}: {}", status, text)),
        })
    }
}

#[async_trait]
impl ExecutionAdapter for AlpacaExecutor {
    async fn execute(&self, symbol: &str, side: Side) -> Result<ExecutionReport, ExecutionError> {
        let request = match side {
            Side::Buy => {
                let url = format!("{}/v2/orders", self.config.base_url());
                let body = self.market_order(symbol, side);
                debug!(%symbol, qty = %body.qty, "Submitting market buy");
                self.client.post(&url).json(&body)
            }
            Side::Sell => {
                let url = format!("{}/v2/positions/{}", self.config.base_url(), symbol);
                debug!(%symbol, "Closing position");
                self.client.delete(&url)
            }
        };

        let resp = request
            .send()
            .await
            .map_err(|e| ExecutionError::Connection(e.to_string()))?;
        let order = Self::read_order(resp, symbol).await?;

        info!(
            %symbol,
            %side,
            order_id = %order.id,
            status = %order.status,
            "Alpaca order accepted"
        );
        Ok(ExecutionReport {
            id: order.id,
            symbol: order.symbol,
            side,
            adapter: self.name().to_string(),
            executed_at: Utc::now(),
            detail: Some(order.status),
        })
    }

    fn name(&self) -> &str {
        "alpaca"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn executor() -> AlpacaExecutor {
        AlpacaExecutor::new(
            AlpacaConfig::new("key".into(), "secret".into(), true).with_quantity(dec!(5)),
        )
        .unwrap()
    }

    #[test]
    fn test_base_url() {
        let paper = AlpacaConfig::new("k".into(), "s".into(), true);
        let live = AlpacaConfig::new("k".into(), "s".into(), false);
        assert_eq!(paper.base_url(), "https://paper-api.alpaca.markets");
        assert_eq!(live.base_url(), "https://api.alpaca.markets");
    }

    #[test]
    fn test_market_order_body() {
        let order = executor().market_order("AAPL", Side::Buy);
        let json = serde_json::to_value(&order).unwrap();

        assert_eq!(json["symbol"], "AAPL");
        assert_eq!(json["qty"], "5");
        assert_eq!(json["side"], "buy");
        assert_eq!(json["type"], "market");
        assert_eq!(json["time_in_force"], "day");
    }

    #[test]
    fn test_rejects_non_positive_quantity() {
        let config = AlpacaConfig::new("k".into(), "s".into(), true).with_quantity(Decimal::ZERO);
        assert!(AlpacaExecutor::new(config).is_err());
    }

    #[test]
    fn test_from_env_requires_keys() {
        let result = AlpacaConfig::from_env(
            "TRADEBOT_TEST_UNSET_KEY",
            "TRADEBOT_TEST_UNSET_SECRET",
            true,
        );
        assert!(matches!(result, Err(ExecutionError::Configuration(_))));
    }
}

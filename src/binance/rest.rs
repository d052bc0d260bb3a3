//! REST client for Binance spot market data

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::{debug, instrument};

use super::messages::{DailyCandle, RawKline, TickerPriceResponse};
use super::PriceSource;
use crate::common::errors::{AlerterError, Result};

/// REST client for the Binance spot API (public market-data endpoints only)
#[derive(Debug, Clone)]
pub struct BinanceRestClient {
    /// HTTP client
    client: Client,
    /// Base URL for the spot API
    base_url: String,
    /// Trading pair monitored by this client
    symbol: String,
}

impl BinanceRestClient {
    /// Create a new client with the default 10 s timeout
    pub fn new(base_url: &str, symbol: &str) -> Result<Self> {
        Self::with_timeout(base_url, symbol, Duration::from_secs(10))
    }

    /// Create a new client with a custom timeout
    pub fn with_timeout(base_url: &str, symbol: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(AlerterError::Transport)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            symbol: symbol.to_string(),
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Fetch the most recent `limit` daily candles, oldest first
    async fn fetch_daily_klines(&self, limit: u32) -> Result<Vec<RawKline>> {
        let url = format!(
            "{}/api/v3/klines?symbol={}&interval=1d&limit={}",
            self.base_url, self.symbol, limit
        );
        debug!("Fetching daily klines from: {}", url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AlerterError::InvalidResponse(format!(
                "Server returned status {}: {}",
                status, body
            )));
        }

        let klines: Vec<RawKline> = response.json().await?;
        Ok(klines)
    }
}

#[async_trait]
impl PriceSource for BinanceRestClient {
    /// Get the live spot price for the monitored symbol
    #[instrument(skip(self))]
    async fn current_price(&self) -> Result<Decimal> {
        let url = format!(
            "{}/api/v3/ticker/price?symbol={}",
            self.base_url, self.symbol
        );
        debug!("Fetching ticker price from: {}", url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AlerterError::InvalidResponse(format!(
                "Server returned status {}: {}",
                status, body
            )));
        }

        let ticker: TickerPriceResponse = response.json().await?;
        ticker
            .price
            .parse()
            .map_err(|e| AlerterError::InvalidResponse(format!("Invalid price: {}", e)))
    }

    /// Get the daily close from `days_ago` days back, with its date
    #[instrument(skip(self))]
    async fn daily_close(&self, days_ago: u32) -> Result<(Decimal, NaiveDate)> {
        let limit = days_ago + 1;
        let klines = self.fetch_daily_klines(limit).await?;

        if klines.len() < limit as usize {
            return Err(AlerterError::InvalidResponse(format!(
                "Expected {} daily candles, got {}",
                limit,
                klines.len()
            )));
        }

        let raw = &klines[klines.len() - limit as usize];
        let candle = DailyCandle::from_raw(raw)?;
        Ok((candle.close, candle.date()))
    }

    /// Get the latest fully closed daily candle, if one is available.
    ///
    /// The newest candle returned by the endpoint is the in-progress one;
    /// the candle before it is the most recent completed close. Returns
    /// `None` until that candle's close time has actually passed.
    #[instrument(skip(self))]
    async fn completed_daily_close(&self) -> Result<Option<(Decimal, NaiveDate)>> {
        let klines = self.fetch_daily_klines(2).await?;
        if klines.is_empty() {
            return Err(AlerterError::InvalidResponse(
                "klines endpoint returned no candles".to_string(),
            ));
        }

        // With two candles the first is the completed one; a single candle
        // (freshly listed market) may itself still be open
        let raw = if klines.len() >= 2 {
            &klines[klines.len() - 2]
        } else {
            &klines[0]
        };
        let candle = DailyCandle::from_raw(raw)?;

        if candle.close_time <= Utc::now() {
            Ok(Some((candle.close, candle.date())))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation_succeeds() {
        let client = BinanceRestClient::new("https://api.binance.com", "BTCUSDT");
        assert!(client.is_ok());
    }

    #[test]
    fn url_normalization_strips_trailing_slash() {
        let client = BinanceRestClient::new("https://api.binance.com/", "BTCUSDT").unwrap();
        assert!(!client.base_url.ends_with('/'));
    }
}

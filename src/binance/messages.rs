//! Binance spot API response types

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::common::errors::{AlerterError, Result};

/// Response from `GET /api/v3/ticker/price`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerPriceResponse {
    pub symbol: String,
    /// Decimal price as a string, e.g. "97123.45000000"
    pub price: String,
}

/// One candle from `GET /api/v3/klines`, as delivered on the wire.
///
/// The endpoint returns positional arrays:
/// `[open_time, open, high, low, close, volume, close_time, ...]`
/// with numeric fields encoded as strings. Kept loose so extra trailing
/// fields never break parsing.
pub type RawKline = Vec<serde_json::Value>;

/// A parsed daily candle with just the fields the alerter needs
#[derive(Debug, Clone, PartialEq)]
pub struct DailyCandle {
    pub open_time: DateTime<Utc>,
    pub close_time: DateTime<Utc>,
    pub close: Decimal,
}

impl DailyCandle {
    /// Extract a daily candle from the raw kline array
    pub fn from_raw(raw: &RawKline) -> Result<Self> {
        let open_time_ms = raw
            .first()
            .and_then(|v| v.as_i64())
            .ok_or_else(|| AlerterError::InvalidResponse("kline missing open time".to_string()))?;
        let close_str = raw
            .get(4)
            .and_then(|v| v.as_str())
            .ok_or_else(|| AlerterError::InvalidResponse("kline missing close price".to_string()))?;
        let close_time_ms = raw
            .get(6)
            .and_then(|v| v.as_i64())
            .ok_or_else(|| AlerterError::InvalidResponse("kline missing close time".to_string()))?;

        let close: Decimal = close_str.parse().map_err(|e| {
            AlerterError::InvalidResponse(format!("invalid kline close '{}': {}", close_str, e))
        })?;
        let open_time = DateTime::from_timestamp_millis(open_time_ms).ok_or_else(|| {
            AlerterError::InvalidResponse(format!("invalid kline open time {}", open_time_ms))
        })?;
        let close_time = DateTime::from_timestamp_millis(close_time_ms).ok_or_else(|| {
            AlerterError::InvalidResponse(format!("invalid kline close time {}", close_time_ms))
        })?;

        Ok(Self {
            open_time,
            close_time,
            close,
        })
    }

    /// UTC calendar date this daily candle belongs to
    pub fn date(&self) -> NaiveDate {
        self.open_time.date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    // 2025-06-14 daily candle, as Binance serializes it
    const KLINE: &str = r#"[
        1749859200000,
        "105100.00000000",
        "106000.00000000",
        "101500.00000000",
        "102345.67000000",
        "12345.678",
        1749945599999,
        "1300000000.0",
        987654,
        "6000.0",
        "630000000.0",
        "0"
    ]"#;

    #[test]
    fn parses_a_daily_candle() {
        let raw: RawKline = serde_json::from_str(KLINE).unwrap();
        let candle = DailyCandle::from_raw(&raw).unwrap();
        assert_eq!(candle.close, dec!(102345.67));
        assert_eq!(candle.date(), NaiveDate::from_ymd_opt(2025, 6, 14).unwrap());
        assert!(candle.close_time > candle.open_time);
    }

    #[test]
    fn short_array_is_an_invalid_response() {
        let raw: RawKline = serde_json::from_str(r#"[1749859200000, "1.0"]"#).unwrap();
        assert!(matches!(
            DailyCandle::from_raw(&raw),
            Err(AlerterError::InvalidResponse(_))
        ));
    }

    #[test]
    fn unparseable_close_is_an_invalid_response() {
        let raw: RawKline = serde_json::from_str(
            r#"[1749859200000, "1", "1", "1", "not-a-price", "1", 1749945599999]"#,
        )
        .unwrap();
        assert!(matches!(
            DailyCandle::from_raw(&raw),
            Err(AlerterError::InvalidResponse(_))
        ));
    }

    #[test]
    fn ticker_price_deserializes() {
        let response: TickerPriceResponse =
            serde_json::from_str(r#"{"symbol": "BTCUSDT", "price": "97000.12000000"}"#).unwrap();
        assert_eq!(response.symbol, "BTCUSDT");
        assert_eq!(response.price.parse::<Decimal>().unwrap(), dec!(97000.12));
    }
}

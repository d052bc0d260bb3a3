//! Binance module - price source for the monitored asset

pub mod messages;
pub mod rest;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::common::errors::Result;

/// Supplier of current and historical prices for the monitored asset.
///
/// Implementations may fail transiently; callers treat every error as
/// aborting only the current evaluation cycle.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Live price of the monitored asset
    async fn current_price(&self) -> Result<Decimal>;

    /// Daily close from `days_ago` days back and the date it belongs to.
    /// `days_ago = 1` is yesterday's close.
    async fn daily_close(&self, days_ago: u32) -> Result<(Decimal, NaiveDate)>;

    /// The most recent fully closed daily candle, or `None` if the current
    /// day's candle has not finished yet
    async fn completed_daily_close(&self) -> Result<Option<(Decimal, NaiveDate)>>;
}

pub use rest::BinanceRestClient;

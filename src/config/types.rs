//! Configuration types
//!
//! Everything the alerter can be tuned with lives here as explicit,
//! immutable configuration handed to components at construction time.
//! Defaults reproduce the strategy as it was originally run: −4.7%
//! intraday, −3.3% close-to-close, fifteen triggers, 60 s polling.

use std::path::PathBuf;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Price source configuration
    #[serde(default)]
    pub binance: BinanceConfig,
    /// Trigger thresholds and limits
    #[serde(default)]
    pub strategy: StrategyConfig,
    /// Notification delivery configuration
    #[serde(default)]
    pub notify: NotifyConfig,
    /// Buy-order allocation tables rendered into notifications
    #[serde(default)]
    pub allocations: AllocationConfig,
    /// General application settings
    #[serde(default)]
    pub settings: AppSettings,
}

/// Binance spot market data configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinanceConfig {
    /// Base URL for the spot REST API
    #[serde(default = "default_binance_rest_url")]
    pub rest_url: String,
    /// Trading pair to monitor
    #[serde(default = "default_symbol")]
    pub symbol: String,
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            rest_url: default_binance_rest_url(),
            symbol: default_symbol(),
        }
    }
}

fn default_binance_rest_url() -> String {
    "https://api.binance.com".to_string()
}

fn default_symbol() -> String {
    "BTCUSDT".to_string()
}

/// Trigger thresholds and the terminal trigger count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Intraday drop threshold as a signed percentage; fires at or below
    #[serde(default = "default_intraday_threshold")]
    pub intraday_threshold_percent: Decimal,
    /// Close-to-close drop threshold; shallower since it needs a full-day
    /// confirmation rather than a transient dip
    #[serde(default = "default_close_threshold")]
    pub close_threshold_percent: Decimal,
    /// Total number of triggers before the system is complete
    #[serde(default = "default_max_triggers")]
    pub max_triggers: u32,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            intraday_threshold_percent: default_intraday_threshold(),
            close_threshold_percent: default_close_threshold(),
            max_triggers: default_max_triggers(),
        }
    }
}

fn default_intraday_threshold() -> Decimal {
    dec!(-4.7)
}

fn default_close_threshold() -> Decimal {
    dec!(-3.3)
}

fn default_max_triggers() -> u32 {
    15
}

/// Notification delivery configuration
///
/// Messages go out through an HTTP mail API. With no token configured the
/// notifier logs what it would have sent instead of failing, so the state
/// machine can be exercised without credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Mail API endpoint receiving JSON `{from, to, subject, text}`
    #[serde(default = "default_mail_api_url")]
    pub mail_api_url: String,
    /// Bearer token for the mail API; absent = dry-run logging
    #[serde(default)]
    pub api_token: Option<String>,
    /// Sender address
    #[serde(default = "default_sender")]
    pub sender: String,
    /// Broker recipient for the buy-order message
    #[serde(default = "default_broker_recipient")]
    pub broker_recipient: String,
    /// Personal recipient for the action-required and completion messages
    #[serde(default = "default_personal_recipient")]
    pub personal_recipient: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            mail_api_url: default_mail_api_url(),
            api_token: None,
            sender: default_sender(),
            broker_recipient: default_broker_recipient(),
            personal_recipient: default_personal_recipient(),
        }
    }
}

fn default_mail_api_url() -> String {
    "https://api.mailgun.net/v3/example.com/messages".to_string()
}

fn default_sender() -> String {
    "alerts@example.com".to_string()
}

fn default_broker_recipient() -> String {
    "broker@example.com".to_string()
}

fn default_personal_recipient() -> String {
    "me@example.com".to_string()
}

/// One line item in a buy order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    /// Asset or ticker symbol
    pub symbol: String,
    /// Amount to deploy per trigger, in GBP
    pub amount_gbp: Decimal,
}

impl Allocation {
    fn new(symbol: &str, amount_gbp: Decimal) -> Self {
        Self {
            symbol: symbol.to_string(),
            amount_gbp,
        }
    }
}

/// Allocation tables rendered into the buy-order notifications
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationConfig {
    /// Core assets bought on every trigger
    #[serde(default = "default_core_allocations")]
    pub core: Vec<Allocation>,
    /// Speculative assets added only on every Nth trigger
    #[serde(default = "default_speculative_allocations")]
    pub speculative: Vec<Allocation>,
    /// Which triggers include the speculative assets (every Nth; 0 = never)
    #[serde(default = "default_speculative_every_nth")]
    pub speculative_every_nth: u32,
    /// Equity purchases executed manually by the operator
    #[serde(default = "default_equity_allocations")]
    pub equities: Vec<Allocation>,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            core: default_core_allocations(),
            speculative: default_speculative_allocations(),
            speculative_every_nth: default_speculative_every_nth(),
            equities: default_equity_allocations(),
        }
    }
}

fn default_core_allocations() -> Vec<Allocation> {
    vec![
        Allocation::new("LINK", dec!(666.67)),
        Allocation::new("ONDO", dec!(533.33)),
        Allocation::new("TAO", dec!(533.33)),
        Allocation::new("RENDER", dec!(533.33)),
        Allocation::new("TRAC", dec!(333.33)),
    ]
}

fn default_speculative_allocations() -> Vec<Allocation> {
    vec![
        Allocation::new("BANANA", dec!(100.00)),
        Allocation::new("BONK", dec!(100.00)),
    ]
}

fn default_speculative_every_nth() -> u32 {
    3
}

fn default_equity_allocations() -> Vec<Allocation> {
    vec![
        Allocation::new("COIN", dec!(233.33)),
        Allocation::new("NVDA", dec!(200.00)),
        Allocation::new("PLTR", dec!(166.67)),
    ]
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Path of the persisted trigger state document
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,
    /// Intraday polling interval in seconds
    #[serde(default = "default_check_interval")]
    pub check_interval_seconds: u64,
    /// Cron expression (sec min hour dom mon dow) for the daily
    /// close-to-close checkpoint; default 00:05 UTC, just after the daily
    /// candle closes
    #[serde(default = "default_daily_close_cron")]
    pub daily_close_cron: String,
    /// Request timeout in seconds for price source and notifier calls
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            state_file: default_state_file(),
            check_interval_seconds: default_check_interval(),
            daily_close_cron: default_daily_close_cron(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_state_file() -> PathBuf {
    PathBuf::from("dip_state.json")
}

fn default_check_interval() -> u64 {
    60
}

fn default_daily_close_cron() -> String {
    "0 5 0 * * *".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

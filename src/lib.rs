//! Dip Alerter Library
//!
//! Monitors a single asset's price feed and fires a bounded sequence of
//! buy-order notifications when drops cross configured thresholds, tracking
//! progress durably across restarts.
//!
//! The core is the trigger state machine in [`trigger`]: a pure evaluator
//! deciding whether a trigger fires, an executor that persists before it
//! notifies, and an atomic state store. Price feed, notification delivery
//! and scheduling are collaborators around it.

pub mod binance;
pub mod common;
pub mod config;
pub mod monitor;
pub mod notify;
pub mod trigger;

// Re-export commonly used types
pub use binance::{BinanceRestClient, PriceSource};
pub use common::clock::{Clock, SystemClock};
pub use common::errors::{AlerterError, Result};
pub use config::types::AppConfig;
pub use monitor::{CycleOutcome, Monitor, Scheduler};
pub use notify::{HttpEmailNotifier, Notifier};

// Trigger state machine types
pub use trigger::{
    Classification, Evaluation, FireDecision, JsonStateStore, NoFireReason, StateStore,
    TriggerEvaluator, TriggerExecutor, TriggerRecord, TriggerState,
};

//! Core types for the trigger state machine

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How a trigger was classified when it fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Live price dipped below the intraday threshold
    IntradayDip,
    /// A completed daily close fell below the close-to-close threshold
    CloseToClose,
    /// Operator-forced trigger, no threshold check
    Manual,
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Classification::IntradayDip => write!(f, "intraday dip"),
            Classification::CloseToClose => write!(f, "close-to-close"),
            Classification::Manual => write!(f, "manual"),
        }
    }
}

/// One counted fire of the buy/notify action. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerRecord {
    /// 1-based position in the trigger sequence
    pub sequence_number: u32,
    /// Instant the trigger fired
    pub fired_at: DateTime<Utc>,
    /// UTC calendar date of the fire (dedup key)
    pub fired_date: NaiveDate,
    /// Price observed at fire time
    pub observed_price: Decimal,
    /// Baseline close the drop was measured against
    pub reference_close: Decimal,
    /// Signed percentage change; negative = price below reference
    pub drop_percent: Decimal,
    /// What kind of check fired
    pub classification: Classification,
}

/// Durable record of trigger progress, persisted as a single JSON document.
///
/// Every field defaults so a file written by an older schema (or a fresh
/// install with no file at all) loads cleanly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriggerState {
    /// Number of triggers fired so far; monotonically non-decreasing
    #[serde(default)]
    pub trigger_count: u32,
    /// UTC date of the most recent fire, used for same-day dedup
    #[serde(default)]
    pub last_trigger_date: Option<NaiveDate>,
    /// Most recent daily close adopted as the drop baseline
    #[serde(default)]
    pub reference_close: Option<Decimal>,
    /// Date that close belongs to, used to detect staleness
    #[serde(default)]
    pub reference_close_date: Option<NaiveDate>,
    /// Append-only audit log; insertion order is chronological order
    #[serde(default)]
    pub trigger_history: Vec<TriggerRecord>,
}

impl TriggerState {
    /// True once the configured maximum number of triggers has fired
    pub fn is_complete(&self, max_triggers: u32) -> bool {
        self.trigger_count >= max_triggers
    }

    /// True if a trigger already fired on the given UTC date
    pub fn fired_on(&self, date: NaiveDate) -> bool {
        self.last_trigger_date == Some(date)
    }
}

/// Why the evaluator declined to fire
#[derive(Debug, Clone, PartialEq)]
pub enum NoFireReason {
    /// Maximum trigger count reached; the system is terminal
    Complete,
    /// A trigger already fired this UTC date
    AlreadyFiredToday,
    /// No valid baseline close is available
    MissingReference,
    /// Non-positive or otherwise malformed price input
    InvalidInput(String),
    /// Drop did not reach the threshold for this check
    ThresholdNotMet { drop_percent: Decimal },
}

impl std::fmt::Display for NoFireReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoFireReason::Complete => write!(f, "all triggers complete"),
            NoFireReason::AlreadyFiredToday => write!(f, "already fired today"),
            NoFireReason::MissingReference => write!(f, "no reference close available"),
            NoFireReason::InvalidInput(msg) => write!(f, "invalid input: {}", msg),
            NoFireReason::ThresholdNotMet { drop_percent } => {
                write!(f, "threshold not met (change {:.2}%)", drop_percent)
            }
        }
    }
}

/// A fire decision, carrying everything the executor needs to build the record
#[derive(Debug, Clone, PartialEq)]
pub struct FireDecision {
    pub observed_price: Decimal,
    pub reference_close: Decimal,
    pub drop_percent: Decimal,
    pub classification: Classification,
}

/// Evaluator output
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    /// Fire now; the executor applies the side effects
    Fire(FireDecision),
    /// No action, with the reason for the audit log
    NoFire(NoFireReason),
}

impl Evaluation {
    /// Returns true if this is a Fire decision
    pub fn is_fire(&self) -> bool {
        matches!(self, Evaluation::Fire(_))
    }
}

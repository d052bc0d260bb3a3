//! Trigger state machine
//!
//! The core of the alerter. Three pieces with sharp boundaries:
//!
//! - [`TriggerEvaluator`]: pure decision function — given an observation,
//!   a baseline close and the persisted state, does a new trigger fire?
//! - [`TriggerExecutor`]: applies a fire decision — counts it, appends the
//!   audit record, persists, then notifies. Persist-before-notify is the
//!   durability guarantee.
//! - [`StateStore`]: loads and saves [`TriggerState`] as one atomic unit.
//!
//! Invariants held after every successful write: `trigger_count` equals the
//! history length, at most one record per UTC date, sequence numbers run
//! 1..=N, and a count at the maximum is terminal.

mod evaluator;
mod executor;
mod store;
mod types;

pub use evaluator::TriggerEvaluator;
pub use executor::TriggerExecutor;
pub use store::{JsonStateStore, StateStore};
pub use types::{
    Classification, Evaluation, FireDecision, NoFireReason, TriggerRecord, TriggerState,
};

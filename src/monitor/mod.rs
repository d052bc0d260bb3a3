//! Monitor module - evaluation cycles and their scheduling

pub mod cycle;
pub mod scheduler;

pub use cycle::{CycleOutcome, Monitor};
pub use scheduler::Scheduler;

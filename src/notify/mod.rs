//! Notification module - renders and delivers trigger messages
//!
//! The notifier is a collaborator of the trigger executor: by the time it
//! runs, the trigger is already committed. A failed delivery is logged and
//! surfaced, never allowed to corrupt the persisted state.

pub mod email;
pub mod render;

use async_trait::async_trait;

use crate::common::errors::Result;
use crate::trigger::TriggerRecord;

/// Sink for trigger notifications
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver the messages for one fired trigger
    async fn notify(&self, record: &TriggerRecord) -> Result<()>;

    /// Deliver the one-time completion summary once all triggers have fired
    async fn notify_completion(&self, history: &[TriggerRecord]) -> Result<()>;
}

pub use email::HttpEmailNotifier;
pub use render::Message;

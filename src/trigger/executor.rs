//! Side-effect orchestration for fire decisions
//!
//! The executor turns a [`FireDecision`] into a committed trigger: count,
//! record, dedup date and history are built as one candidate state and
//! persisted before any notification goes out. A crash between the save and
//! the send loses at most the notification, never the count.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::common::clock::Clock;
use crate::common::errors::Result;
use crate::notify::Notifier;
use crate::trigger::store::StateStore;
use crate::trigger::types::{FireDecision, TriggerRecord, TriggerState};

/// Applies the side effects of a fire decision atomically with respect to
/// the persisted state
pub struct TriggerExecutor {
    store: Arc<dyn StateStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    max_triggers: u32,
}

impl TriggerExecutor {
    pub fn new(
        store: Arc<dyn StateStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        max_triggers: u32,
    ) -> Self {
        Self {
            store,
            notifier,
            clock,
            max_triggers,
        }
    }

    /// Commit a fire decision and send its notifications.
    ///
    /// On persistence failure the caller's state is left untouched and the
    /// error propagates; the next cycle retries from the last committed
    /// state. Notification failures are logged and surfaced through the
    /// return value of the notifier only — the trigger has already happened.
    pub async fn execute(
        &self,
        state: &mut TriggerState,
        decision: FireDecision,
    ) -> Result<TriggerRecord> {
        let fired_at = self.clock.now();
        let fired_date = fired_at.date_naive();

        let mut next = state.clone();
        next.trigger_count += 1;
        let record = TriggerRecord {
            sequence_number: next.trigger_count,
            fired_at,
            fired_date,
            observed_price: decision.observed_price,
            reference_close: decision.reference_close,
            drop_percent: decision.drop_percent,
            classification: decision.classification,
        };
        next.trigger_history.push(record.clone());
        next.last_trigger_date = Some(fired_date);

        // Durability first: the trigger exists once this write lands
        self.store.save(&next)?;
        *state = next;

        info!(
            sequence = record.sequence_number,
            max = self.max_triggers,
            classification = %record.classification,
            price = %record.observed_price,
            reference = %record.reference_close,
            drop_percent = %record.drop_percent,
            "trigger fired"
        );

        if let Err(err) = self.notifier.notify(&record).await {
            warn!(
                sequence = record.sequence_number,
                error = %err,
                "trigger notification failed; state is committed, operator re-send required"
            );
        }

        if state.trigger_count == self.max_triggers {
            info!(
                max = self.max_triggers,
                "all triggers complete, monitoring will stop"
            );
            if let Err(err) = self.notifier.notify_completion(&state.trigger_history).await {
                error!(error = %err, "completion notification failed");
            }
        }

        Ok(record)
    }
}

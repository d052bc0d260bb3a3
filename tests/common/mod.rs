//! Common test utilities and fixtures

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use dip_alerter::{AlerterError, Clock, Notifier, Result, TriggerRecord, TriggerState};
use rust_decimal_macros::dec;

/// Starting instant used by the lifecycle tests: mid-morning UTC
pub fn start_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 10, 30, 0).unwrap()
}

/// A clock the tests can roll forward to simulate date changes
pub struct SteppingClock {
    current: Mutex<DateTime<Utc>>,
}

impl SteppingClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    pub fn advance_days(&self, days: i64) {
        let mut current = self.current.lock().unwrap();
        *current += Duration::days(days);
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        *self.current.lock().unwrap()
    }
}

/// Notifier double that counts deliveries and can be told to fail
#[derive(Default)]
pub struct RecordingNotifier {
    pub notified: Mutex<Vec<TriggerRecord>>,
    pub completions: AtomicUsize,
    pub fail_notify: AtomicBool,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, record: &TriggerRecord) -> Result<()> {
        if self.fail_notify.load(Ordering::SeqCst) {
            return Err(AlerterError::Notification("delivery refused".to_string()));
        }
        self.notified.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn notify_completion(&self, _history: &[TriggerRecord]) -> Result<()> {
        self.completions.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A state that has already fired `count` triggers, one per day, the most
/// recent on `last_date`
pub fn state_after(count: u32, last_date: NaiveDate) -> TriggerState {
    let history: Vec<TriggerRecord> = (1..=count)
        .map(|sequence_number| {
            let offset = i64::from(count - sequence_number);
            let fired_date = last_date - Duration::days(offset);
            TriggerRecord {
                sequence_number,
                fired_at: fired_date.and_hms_opt(12, 0, 0).unwrap().and_utc(),
                fired_date,
                observed_price: dec!(95000),
                reference_close: dec!(100000),
                drop_percent: dec!(-5),
                classification: dip_alerter::Classification::IntradayDip,
            }
        })
        .collect();

    TriggerState {
        trigger_count: count,
        last_trigger_date: history.last().map(|r| r.fired_date),
        reference_close: Some(dec!(100000)),
        reference_close_date: Some(last_date),
        trigger_history: history,
    }
}

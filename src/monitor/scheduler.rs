//! Serialized polling loop
//!
//! One logical cycle runs to completion before the next is considered.
//! Intraday checks ride a skip-on-miss interval; the close-to-close check
//! runs at a fixed daily checkpoint from a cron schedule. The loop exits on
//! operator signal or as soon as the terminal state is observed.

use std::str::FromStr;
use std::time::Duration;

use cron::Schedule;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::common::errors::{AlerterError, Result};
use crate::config::types::AppSettings;
use crate::monitor::cycle::{CycleOutcome, Monitor};

/// Which check a scheduler iteration is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CycleKind {
    Intraday,
    DailyClose,
}

/// Runs the monitor on a fixed cadence plus a daily checkpoint
pub struct Scheduler {
    monitor: Monitor,
    poll_interval: Duration,
    daily_schedule: Schedule,
}

impl Scheduler {
    pub fn new(monitor: Monitor, settings: &AppSettings) -> Result<Self> {
        let daily_schedule = Schedule::from_str(&settings.daily_close_cron).map_err(|e| {
            AlerterError::Configuration(format!(
                "invalid daily close cron '{}': {}",
                settings.daily_close_cron, e
            ))
        })?;

        Ok(Self {
            monitor,
            poll_interval: Duration::from_secs(settings.check_interval_seconds.max(1)),
            daily_schedule,
        })
    }

    /// Sleep duration until the next daily checkpoint
    fn until_next_checkpoint(&self) -> Duration {
        match self.daily_schedule.upcoming(chrono::Utc).next() {
            Some(next) => (next - chrono::Utc::now())
                .to_std()
                .unwrap_or(Duration::ZERO),
            // A recurring schedule always has an upcoming tick; fall back to
            // re-checking in an hour rather than busy-looping
            None => Duration::from_secs(3600),
        }
    }

    async fn run_cycle(&mut self, kind: CycleKind) {
        let result = match kind {
            CycleKind::Intraday => self.monitor.run_intraday_cycle().await,
            CycleKind::DailyClose => self.monitor.run_daily_close_cycle().await,
        };

        match result {
            Ok(CycleOutcome::Fired(record)) => {
                info!(
                    sequence = record.sequence_number,
                    classification = %record.classification,
                    "cycle fired a trigger"
                );
            }
            Ok(_) => {}
            Err(err) if err.is_transient() => {
                warn!(?kind, error = %err, "transient fetch error, retrying next tick");
            }
            Err(err) => {
                error!(?kind, error = %err, "cycle aborted");
            }
        }
    }

    /// Run until all triggers have fired or the operator interrupts.
    ///
    /// Cycles are serialized by construction: each `select!` arm awaits its
    /// cycle to completion before the loop comes back around, so no two
    /// cycles ever mutate state concurrently.
    pub async fn run(mut self) -> Result<()> {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            poll_interval_seconds = self.poll_interval.as_secs(),
            "scheduler started; daily close check per cron schedule"
        );

        loop {
            if self.monitor.is_complete() {
                info!("all triggers complete, shutting down");
                break;
            }

            let checkpoint = tokio::time::sleep(self.until_next_checkpoint());

            tokio::select! {
                _ = ticker.tick() => {
                    self.run_cycle(CycleKind::Intraday).await;
                }
                _ = checkpoint => {
                    self.run_cycle(CycleKind::DailyClose).await;
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("received shutdown signal, cleaning up...");
                    break;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cron_parses_and_targets_00_05() {
        let settings = AppSettings::default();
        let schedule = Schedule::from_str(&settings.daily_close_cron).unwrap();
        let next = schedule.upcoming(chrono::Utc).next().unwrap();
        assert_eq!(next.format("%H:%M:%S").to_string(), "00:05:00");
    }

    #[test]
    fn bad_cron_is_a_configuration_error() {
        let settings = AppSettings {
            daily_close_cron: "not a cron".to_string(),
            ..Default::default()
        };
        // Scheduler::new needs a monitor; validate the expression directly
        let parsed = Schedule::from_str(&settings.daily_close_cron);
        assert!(parsed.is_err());
    }
}

//! One evaluation cycle: fetch, evaluate, maybe execute
//!
//! The monitor owns the in-memory [`TriggerState`] and is the boundary
//! where price-source errors stop: a failed fetch aborts the cycle and the
//! next scheduled tick retries from the last committed state.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info, instrument};

use crate::binance::PriceSource;
use crate::common::clock::Clock;
use crate::common::errors::Result;
use crate::config::AppConfig;
use crate::notify::Notifier;
use crate::trigger::{
    Evaluation, JsonStateStore, NoFireReason, StateStore, TriggerEvaluator, TriggerExecutor,
    TriggerRecord, TriggerState,
};

/// Result of one evaluation cycle
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// A trigger fired and was committed
    Fired(TriggerRecord),
    /// Evaluated without firing
    NoFire(NoFireReason),
    /// Nothing to evaluate yet (e.g. the daily candle is still open)
    NotReady,
}

/// Drives the evaluator and executor over the persisted state
pub struct Monitor {
    price_source: Arc<dyn PriceSource>,
    store: Arc<dyn StateStore>,
    evaluator: TriggerEvaluator,
    executor: TriggerExecutor,
    clock: Arc<dyn Clock>,
    state: TriggerState,
    max_triggers: u32,
}

impl Monitor {
    /// Build a monitor from pre-wired collaborators, loading the persisted
    /// state so a restart resumes from the committed trigger count
    pub fn new(
        price_source: Arc<dyn PriceSource>,
        store: Arc<dyn StateStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        config: &AppConfig,
    ) -> Result<Self> {
        let state = store.load()?;
        info!(
            trigger_count = state.trigger_count,
            max = config.strategy.max_triggers,
            "loaded trigger state"
        );

        let evaluator = TriggerEvaluator::new(config.strategy.clone());
        let executor = TriggerExecutor::new(
            store.clone(),
            notifier,
            clock.clone(),
            config.strategy.max_triggers,
        );

        Ok(Self {
            price_source,
            store,
            evaluator,
            executor,
            clock,
            state,
            max_triggers: config.strategy.max_triggers,
        })
    }

    /// Convenience constructor wiring the default file store
    pub fn with_json_store(
        price_source: Arc<dyn PriceSource>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        config: &AppConfig,
    ) -> Result<Self> {
        let store = Arc::new(JsonStateStore::new(config.settings.state_file.clone()));
        Self::new(price_source, store, notifier, clock, config)
    }

    /// Read-only view of the current state
    pub fn state(&self) -> &TriggerState {
        &self.state
    }

    /// True once no further triggers can ever fire
    pub fn is_complete(&self) -> bool {
        self.state.is_complete(self.max_triggers)
    }

    /// Adopt a newer reference close before evaluation. This is the only
    /// state mutation that happens outside a full executor fire.
    fn refresh_reference(&mut self, close: Decimal, date: NaiveDate) -> Result<()> {
        if self.state.reference_close_date == Some(date) {
            return Ok(());
        }
        let mut next = self.state.clone();
        next.reference_close = Some(close);
        next.reference_close_date = Some(date);
        self.store.save(&next)?;
        self.state = next;
        info!(reference_close = %close, date = %date, "reference close updated");
        Ok(())
    }

    /// Intraday polling cycle: live price against the stored reference close
    #[instrument(skip(self))]
    pub async fn run_intraday_cycle(&mut self) -> Result<CycleOutcome> {
        let today = self.clock.today();

        if self.is_complete() {
            debug!("max triggers reached, nothing to do");
            return Ok(CycleOutcome::NoFire(NoFireReason::Complete));
        }
        if self.state.fired_on(today) {
            debug!(%today, "already fired today, skipping fetch");
            return Ok(CycleOutcome::NoFire(NoFireReason::AlreadyFiredToday));
        }

        let (yesterday_close, close_date) = self.price_source.daily_close(1).await?;
        self.refresh_reference(yesterday_close, close_date)?;

        let current_price = self.price_source.current_price().await?;
        let evaluation = self.evaluator.evaluate_intraday(
            current_price,
            self.state.reference_close,
            today,
            &self.state,
        );

        info!(
            price = %current_price,
            reference = %yesterday_close,
            fired_today = self.state.fired_on(today),
            outcome = ?evaluation,
            "intraday check"
        );

        self.apply(evaluation).await
    }

    /// Daily checkpoint: the just-completed close against the close before it
    #[instrument(skip(self))]
    pub async fn run_daily_close_cycle(&mut self) -> Result<CycleOutcome> {
        let today = self.clock.today();

        if self.is_complete() {
            return Ok(CycleOutcome::NoFire(NoFireReason::Complete));
        }
        if self.state.fired_on(today) {
            return Ok(CycleOutcome::NoFire(NoFireReason::AlreadyFiredToday));
        }

        let completed = match self.price_source.completed_daily_close().await? {
            Some((close, date)) => (close, date),
            None => {
                debug!("daily candle not closed yet");
                return Ok(CycleOutcome::NotReady);
            }
        };

        // Baseline for close-to-close is the close prior to the completed one
        let (prior_close, prior_date) = self.price_source.daily_close(2).await?;
        let evaluation = self.evaluator.evaluate_daily_close(
            completed.0,
            Some(prior_close),
            today,
            &self.state,
        );

        info!(
            completed_close = %completed.0,
            completed_date = %completed.1,
            prior_close = %prior_close,
            prior_date = %prior_date,
            outcome = ?evaluation,
            "daily close check"
        );

        self.apply(evaluation).await
    }

    /// Operator-forced trigger. Routed through the evaluator and executor so
    /// terminal/dedup guards and all invariants still hold.
    #[instrument(skip(self))]
    pub async fn run_manual_trigger(&mut self) -> Result<CycleOutcome> {
        let today = self.clock.today();

        let (yesterday_close, close_date) = self.price_source.daily_close(1).await?;
        self.refresh_reference(yesterday_close, close_date)?;

        let current_price = self.price_source.current_price().await?;
        let evaluation = self.evaluator.evaluate_manual(
            current_price,
            self.state.reference_close,
            today,
            &self.state,
        );

        info!(price = %current_price, outcome = ?evaluation, "manual trigger requested");

        self.apply(evaluation).await
    }

    async fn apply(&mut self, evaluation: Evaluation) -> Result<CycleOutcome> {
        match evaluation {
            Evaluation::Fire(decision) => {
                let record = self.executor.execute(&mut self.state, decision).await?;
                Ok(CycleOutcome::Fired(record))
            }
            Evaluation::NoFire(reason) => Ok(CycleOutcome::NoFire(reason)),
        }
    }
}

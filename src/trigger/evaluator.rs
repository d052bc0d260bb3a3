//! Pure trigger decision logic
//!
//! The evaluator maps (observation, baseline, persisted state) to a
//! fire/no-fire outcome. It mutates nothing and performs no I/O; the
//! executor applies side effects, and the monitor cycle owns fetching.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::config::types::StrategyConfig;
use crate::trigger::types::{
    Classification, Evaluation, FireDecision, NoFireReason, TriggerState,
};

/// Which threshold (if any) an observation is evaluated against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Check {
    Intraday,
    DailyClose,
    Manual,
}

/// Pure decision function for the trigger state machine
#[derive(Debug, Clone)]
pub struct TriggerEvaluator {
    config: StrategyConfig,
}

impl TriggerEvaluator {
    pub fn new(config: StrategyConfig) -> Self {
        Self { config }
    }

    /// Evaluate a live price tick against the intraday threshold
    pub fn evaluate_intraday(
        &self,
        current_price: Decimal,
        reference_close: Option<Decimal>,
        today: NaiveDate,
        state: &TriggerState,
    ) -> Evaluation {
        self.evaluate(current_price, reference_close, today, state, Check::Intraday)
    }

    /// Evaluate a just-completed daily close against the close-to-close
    /// threshold. The "current price" here is the finished candle's close,
    /// not a live tick.
    pub fn evaluate_daily_close(
        &self,
        completed_close: Decimal,
        reference_close: Option<Decimal>,
        today: NaiveDate,
        state: &TriggerState,
    ) -> Evaluation {
        self.evaluate(
            completed_close,
            reference_close,
            today,
            state,
            Check::DailyClose,
        )
    }

    /// Evaluate an operator-forced trigger. Skips the threshold compare but
    /// keeps every other guard, so a manual fire still counts, dedups and
    /// records a real drop.
    pub fn evaluate_manual(
        &self,
        current_price: Decimal,
        reference_close: Option<Decimal>,
        today: NaiveDate,
        state: &TriggerState,
    ) -> Evaluation {
        self.evaluate(current_price, reference_close, today, state, Check::Manual)
    }

    fn evaluate(
        &self,
        price: Decimal,
        reference_close: Option<Decimal>,
        today: NaiveDate,
        state: &TriggerState,
        check: Check,
    ) -> Evaluation {
        // Terminal state wins over everything else
        if state.is_complete(self.config.max_triggers) {
            return Evaluation::NoFire(NoFireReason::Complete);
        }

        // At most one fire per UTC calendar day, however often we are polled
        if state.fired_on(today) {
            return Evaluation::NoFire(NoFireReason::AlreadyFiredToday);
        }

        if price <= Decimal::ZERO {
            return Evaluation::NoFire(NoFireReason::InvalidInput(format!(
                "non-positive price {}",
                price
            )));
        }

        let reference = match reference_close {
            Some(reference) => reference,
            None => return Evaluation::NoFire(NoFireReason::MissingReference),
        };
        if reference <= Decimal::ZERO {
            return Evaluation::NoFire(NoFireReason::InvalidInput(format!(
                "non-positive reference close {}",
                reference
            )));
        }

        let drop_percent = (price - reference) / reference * dec!(100);

        let (threshold, classification) = match check {
            Check::Intraday => (
                Some(self.config.intraday_threshold_percent),
                Classification::IntradayDip,
            ),
            Check::DailyClose => (
                Some(self.config.close_threshold_percent),
                Classification::CloseToClose,
            ),
            Check::Manual => (None, Classification::Manual),
        };

        // Inclusive boundary: a drop exactly at the threshold fires
        if let Some(threshold) = threshold {
            if drop_percent > threshold {
                return Evaluation::NoFire(NoFireReason::ThresholdNotMet { drop_percent });
            }
        }

        Evaluation::Fire(FireDecision {
            observed_price: price,
            reference_close: reference,
            drop_percent,
            classification,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn evaluator() -> TriggerEvaluator {
        TriggerEvaluator::new(StrategyConfig::default())
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    #[test]
    fn complete_state_never_fires() {
        let state = TriggerState {
            trigger_count: 15,
            ..Default::default()
        };
        // A drop far beyond both thresholds must still be ignored
        let outcome = evaluator().evaluate_intraday(dec!(50000), Some(dec!(100000)), today(), &state);
        assert_eq!(outcome, Evaluation::NoFire(NoFireReason::Complete));
    }

    #[test]
    fn same_day_dedup_beats_any_drop() {
        let state = TriggerState {
            trigger_count: 3,
            last_trigger_date: Some(today()),
            ..Default::default()
        };
        let outcome = evaluator().evaluate_intraday(dec!(50000), Some(dec!(100000)), today(), &state);
        assert_eq!(outcome, Evaluation::NoFire(NoFireReason::AlreadyFiredToday));
    }

    #[test]
    fn dedup_only_applies_to_the_same_date() {
        let state = TriggerState {
            trigger_count: 3,
            last_trigger_date: Some(today().pred_opt().unwrap()),
            ..Default::default()
        };
        let outcome = evaluator().evaluate_intraday(dec!(90000), Some(dec!(100000)), today(), &state);
        assert!(outcome.is_fire());
    }

    #[test]
    fn missing_reference_never_fires() {
        let outcome =
            evaluator().evaluate_intraday(dec!(90000), None, today(), &TriggerState::default());
        assert_eq!(outcome, Evaluation::NoFire(NoFireReason::MissingReference));
    }

    #[test]
    fn non_positive_inputs_are_rejected() {
        let state = TriggerState::default();
        let ev = evaluator();
        assert!(matches!(
            ev.evaluate_intraday(dec!(0), Some(dec!(100)), today(), &state),
            Evaluation::NoFire(NoFireReason::InvalidInput(_))
        ));
        assert!(matches!(
            ev.evaluate_intraday(dec!(-1), Some(dec!(100)), today(), &state),
            Evaluation::NoFire(NoFireReason::InvalidInput(_))
        ));
        assert!(matches!(
            ev.evaluate_intraday(dec!(95), Some(dec!(0)), today(), &state),
            Evaluation::NoFire(NoFireReason::InvalidInput(_))
        ));
    }

    #[test]
    fn intraday_boundary_is_inclusive() {
        let state = TriggerState::default();
        let ev = evaluator();

        // 100 -> 95.3 is exactly -4.7%
        let outcome = ev.evaluate_intraday(dec!(95.3), Some(dec!(100)), today(), &state);
        match outcome {
            Evaluation::Fire(decision) => {
                assert_eq!(decision.classification, Classification::IntradayDip);
                assert_eq!(decision.drop_percent, dec!(-4.7));
            }
            other => panic!("expected fire, got {:?}", other),
        }

        // 100 -> 95.31 is -4.69%, just shy of the threshold
        let outcome = ev.evaluate_intraday(dec!(95.31), Some(dec!(100)), today(), &state);
        assert_eq!(
            outcome,
            Evaluation::NoFire(NoFireReason::ThresholdNotMet {
                drop_percent: dec!(-4.69)
            })
        );
    }

    #[test]
    fn close_to_close_uses_the_shallower_threshold() {
        let state = TriggerState::default();
        let ev = evaluator();

        // -3.3% close-to-close fires, though it would not fire intraday
        let outcome = ev.evaluate_daily_close(dec!(96.7), Some(dec!(100)), today(), &state);
        match outcome {
            Evaluation::Fire(decision) => {
                assert_eq!(decision.classification, Classification::CloseToClose);
                assert_eq!(decision.drop_percent, dec!(-3.3));
            }
            other => panic!("expected fire, got {:?}", other),
        }

        let outcome = ev.evaluate_intraday(dec!(96.7), Some(dec!(100)), today(), &state);
        assert!(!outcome.is_fire());
    }

    #[test]
    fn manual_bypasses_threshold_but_not_guards() {
        let ev = evaluator();

        // Price above the reference still fires manually
        let outcome =
            ev.evaluate_manual(dec!(105), Some(dec!(100)), today(), &TriggerState::default());
        match outcome {
            Evaluation::Fire(decision) => {
                assert_eq!(decision.classification, Classification::Manual);
                assert_eq!(decision.drop_percent, dec!(5));
            }
            other => panic!("expected fire, got {:?}", other),
        }

        // Terminal and dedup guards still hold
        let complete = TriggerState {
            trigger_count: 15,
            ..Default::default()
        };
        assert_eq!(
            ev.evaluate_manual(dec!(105), Some(dec!(100)), today(), &complete),
            Evaluation::NoFire(NoFireReason::Complete)
        );

        let fired = TriggerState {
            trigger_count: 1,
            last_trigger_date: Some(today()),
            ..Default::default()
        };
        assert_eq!(
            ev.evaluate_manual(dec!(105), Some(dec!(100)), today(), &fired),
            Evaluation::NoFire(NoFireReason::AlreadyFiredToday)
        );
    }

    #[test]
    fn rising_price_does_not_fire() {
        let outcome = evaluator().evaluate_intraday(
            dec!(104),
            Some(dec!(100)),
            today(),
            &TriggerState::default(),
        );
        assert_eq!(
            outcome,
            Evaluation::NoFire(NoFireReason::ThresholdNotMet {
                drop_percent: dec!(4)
            })
        );
    }
}

//! Plain-text rendering of trigger notifications

use rust_decimal::Decimal;

use crate::config::types::{Allocation, AllocationConfig};
use crate::trigger::TriggerRecord;

/// A rendered message ready for delivery
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub subject: String,
    pub body: String,
}

/// Whether the speculative allocations ride along on this trigger
fn includes_speculative(sequence_number: u32, every_nth: u32) -> bool {
    every_nth != 0 && sequence_number % every_nth == 0
}

fn order_lines(allocations: &[Allocation]) -> (String, Decimal) {
    let mut lines = String::new();
    let mut total = Decimal::ZERO;
    for allocation in allocations {
        lines.push_str(&format!(
            "- {}: £{:.2}\n",
            allocation.symbol, allocation.amount_gbp
        ));
        total += allocation.amount_gbp;
    }
    (lines, total)
}

/// Crypto allocations for a given trigger: core, plus speculative on every Nth
fn crypto_order(config: &AllocationConfig, sequence_number: u32) -> Vec<Allocation> {
    let mut order = config.core.clone();
    if includes_speculative(sequence_number, config.speculative_every_nth) {
        order.extend(config.speculative.iter().cloned());
    }
    order
}

/// Buy-order message for the broker
pub fn broker_message(
    record: &TriggerRecord,
    config: &AllocationConfig,
    max_triggers: u32,
) -> Message {
    let order = crypto_order(config, record.sequence_number);
    let (lines, total) = order_lines(&order);

    let subject = format!(
        "BUY ORDER - Dip Trigger #{} of {}",
        record.sequence_number, max_triggers
    );

    let mut body = format!(
        "This is an automated buy order from the red-day accumulation strategy.\n\n\
         TRIGGER DETAILS\n\
         - Trigger number: {} of {}\n\
         - Classification: {}\n\
         - Price: ${:.2}\n\
         - Reference close: ${:.2}\n\
         - Change: {:.2}%\n\
         - Fired at: {}\n\n\
         BUY ORDER (total £{:.2})\n\
         Please process with immediate effect, using available USDT or fiat balance:\n{}",
        record.sequence_number,
        max_triggers,
        record.classification,
        record.observed_price,
        record.reference_close,
        record.drop_percent,
        record.fired_at.format("%Y-%m-%d %H:%M UTC"),
        total,
        lines,
    );

    if includes_speculative(record.sequence_number, config.speculative_every_nth) {
        body.push_str(&format!(
            "\nNote: trigger #{} is an every-{} trigger - speculative assets included.\n",
            record.sequence_number, config.speculative_every_nth
        ));
    }
    body.push_str("\nPlease confirm execution once complete.\n");

    Message { subject, body }
}

/// Action-required message for the operator's own equity purchases
pub fn personal_message(
    record: &TriggerRecord,
    config: &AllocationConfig,
    max_triggers: u32,
) -> Message {
    let (equity_lines, equity_total) = order_lines(&config.equities);
    let crypto = crypto_order(config, record.sequence_number);
    let (crypto_lines, crypto_total) = order_lines(&crypto);
    let remaining = max_triggers.saturating_sub(record.sequence_number);

    let subject = format!(
        "ACTION REQUIRED: equity purchase - trigger #{} of {}",
        record.sequence_number, max_triggers
    );

    let body = format!(
        "Trigger #{} of {} fired: {} ({:.2}%).\n\
         Price ${:.2} against reference close ${:.2} at {}.\n\n\
         EQUITY ACTION REQUIRED (total £{:.2})\n\
         Execute the following purchases manually:\n{}\n\
         BROKER ORDER SENT (total £{:.2})\n\
         The broker has been sent this crypto order:\n{}\n\
         PROGRESS\n\
         Triggers completed: {} of {}\n\
         Remaining: {}\n",
        record.sequence_number,
        max_triggers,
        record.classification,
        record.drop_percent,
        record.observed_price,
        record.reference_close,
        record.fired_at.format("%Y-%m-%d %H:%M UTC"),
        equity_total,
        equity_lines,
        crypto_total,
        crypto_lines,
        record.sequence_number,
        max_triggers,
        remaining,
    );

    Message { subject, body }
}

/// One-time summary sent when the final trigger fires
pub fn completion_message(
    history: &[TriggerRecord],
    config: &AllocationConfig,
    max_triggers: u32,
) -> Message {
    let subject = format!("Dip strategy complete - all {} triggers executed", max_triggers);

    let mut rows = String::new();
    for record in history {
        rows.push_str(&format!(
            "  #{:<3} {}  ${:.2}  {:.2}%  ({})\n",
            record.sequence_number,
            record.fired_date,
            record.observed_price,
            record.drop_percent,
            record.classification,
        ));
    }

    let core_total: Decimal = config.core.iter().map(|a| a.amount_gbp).sum();
    let speculative_total: Decimal = config.speculative.iter().map(|a| a.amount_gbp).sum();
    let equity_total: Decimal = config.equities.iter().map(|a| a.amount_gbp).sum();
    let count = Decimal::from(history.len() as u64);
    let speculative_count = Decimal::from(
        history
            .iter()
            .filter(|r| includes_speculative(r.sequence_number, config.speculative_every_nth))
            .count() as u64,
    );
    let crypto_deployed = core_total * count + speculative_total * speculative_count;
    let equities_deployed = equity_total * count;

    let body = format!(
        "All {} triggers have been executed.\n\n\
         TRIGGER HISTORY\n{}\n\
         TOTAL DEPLOYED\n\
         - Crypto (via broker): £{:.2}\n\
         - Equities (manual): £{:.2}\n\n\
         The monitoring system will now stop checking for triggers.\n",
        max_triggers, rows, crypto_deployed, equities_deployed,
    );

    Message { subject, body }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trigger::Classification;
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn record(sequence_number: u32) -> TriggerRecord {
        TriggerRecord {
            sequence_number,
            fired_at: Utc.with_ymd_and_hms(2025, 6, 15, 14, 30, 0).unwrap(),
            fired_date: NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
            observed_price: dec!(95000),
            reference_close: dec!(100000),
            drop_percent: dec!(-5),
            classification: Classification::IntradayDip,
        }
    }

    #[test]
    fn broker_message_lists_core_assets() {
        let message = broker_message(&record(1), &AllocationConfig::default(), 15);
        assert!(message.subject.contains("#1 of 15"));
        assert!(message.body.contains("LINK: £666.67"));
        assert!(message.body.contains("TRAC: £333.33"));
        // Not a third trigger: no speculative assets
        assert!(!message.body.contains("BANANA"));
        assert!(message.body.contains("total £2599.99"));
    }

    #[test]
    fn every_third_trigger_includes_speculative_assets() {
        let message = broker_message(&record(3), &AllocationConfig::default(), 15);
        assert!(message.body.contains("BANANA: £100.00"));
        assert!(message.body.contains("BONK: £100.00"));
        assert!(message.body.contains("total £2799.99"));
        assert!(message.body.contains("every-3 trigger"));

        let sixth = broker_message(&record(6), &AllocationConfig::default(), 15);
        assert!(sixth.body.contains("BANANA"));

        let fourth = broker_message(&record(4), &AllocationConfig::default(), 15);
        assert!(!fourth.body.contains("BANANA"));
    }

    #[test]
    fn zero_every_nth_never_includes_speculative() {
        let config = AllocationConfig {
            speculative_every_nth: 0,
            ..Default::default()
        };
        let message = broker_message(&record(3), &config, 15);
        assert!(!message.body.contains("BANANA"));
    }

    #[test]
    fn personal_message_reports_progress() {
        let message = personal_message(&record(4), &AllocationConfig::default(), 15);
        assert!(message.body.contains("Triggers completed: 4 of 15"));
        assert!(message.body.contains("Remaining: 11"));
        assert!(message.body.contains("COIN: £233.33"));
        assert!(message.body.contains("total £600.00"));
    }

    #[test]
    fn completion_message_summarizes_history_and_totals() {
        let history: Vec<TriggerRecord> = (1..=15).map(record).collect();
        let message = completion_message(&history, &AllocationConfig::default(), 15);

        assert!(message.subject.contains("all 15 triggers"));
        assert!(message.body.contains("#1 "));
        assert!(message.body.contains("#15 "));
        // 15 core buys plus 5 speculative buys (triggers 3, 6, 9, 12, 15)
        // 2599.99 * 15 + 200 * 5 = 39999.85
        assert!(message.body.contains("£39999.85"));
        // 600.00 * 15
        assert!(message.body.contains("£9000.00"));
    }
}

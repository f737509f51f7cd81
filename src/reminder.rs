// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::mailer::Mailer;
use crate::models::{Transaction, TxKind};
use crate::projection::planned_amount;
use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

pub const DUE_SOON_DAYS: u64 = 3;

pub const NO_DESCRIPTION: &str = "(no description)";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DueBill {
    pub id: i64,
    pub description: String,
    pub due: NaiveDate,
    pub amount: Decimal,
}

impl DueBill {
    pub fn line(&self) -> String {
        format!(
            "{} (due {}): {:.2}",
            self.description,
            self.due.format("%Y-%m-%d"),
            self.amount
        )
    }
}

// Unpaid expenses due within [today, today + 3 days], earliest first.
pub fn due_soon(transactions: &[Transaction], today: NaiveDate) -> Vec<DueBill> {
    let horizon = today
        .checked_add_days(Days::new(DUE_SOON_DAYS))
        .unwrap_or(NaiveDate::MAX);
    let mut out: Vec<DueBill> = transactions
        .iter()
        .filter(|tx| tx.kind == Some(TxKind::Expense) && !tx.is_paid)
        .filter_map(|tx| {
            let due = tx.due_or_occurred()?;
            if due < today || due > horizon {
                return None;
            }
            Some(DueBill {
                id: tx.id,
                description: tx
                    .description
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .unwrap_or(NO_DESCRIPTION)
                    .to_string(),
                due,
                amount: planned_amount(tx).unwrap_or(Decimal::ZERO).abs(),
            })
        })
        .collect();
    out.sort_by_key(|b| b.due);
    out
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReminderState {
    pub last_notified: Option<NaiveDate>,
}

impl ReminderState {
    pub fn new(last_notified: Option<NaiveDate>) -> Self {
        Self { last_notified }
    }

    pub fn notified_on(&self, today: NaiveDate) -> bool {
        self.last_notified == Some(today)
    }

    pub fn claim(&mut self, today: NaiveDate) -> bool {
        if self.notified_on(today) {
            return false;
        }
        self.last_notified = Some(today);
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderOutcome {
    AlreadyNotified,
    NothingDue,
    Sent(Vec<DueBill>),
    SendFailed(Vec<DueBill>),
}

pub fn subject(count: usize) -> String {
    if count == 1 {
        "1 bill due in the next days".to_string()
    } else {
        format!("{} bills due in the next days", count)
    }
}

pub fn body(bills: &[DueBill]) -> String {
    let mut out = String::from("Pending bills:\n");
    for b in bills {
        out.push_str("- ");
        out.push_str(&b.line());
        out.push('\n');
    }
    out
}

/// Runs the daily reminder. `persist` stores the claimed day and must succeed
/// before anything is sent; a failed send is not retried on the same day.
pub fn run_reminder<P>(
    state: &mut ReminderState,
    transactions: &[Transaction],
    today: NaiveDate,
    mailer: &dyn Mailer,
    recipients: &[String],
    persist: P,
) -> Result<ReminderOutcome>
where
    P: FnOnce(NaiveDate) -> Result<()>,
{
    if !state.claim(today) {
        debug!("Reminder already handled for {}", today);
        return Ok(ReminderOutcome::AlreadyNotified);
    }
    persist(today).context("Could not record today's reminder; nothing sent")?;

    let bills = due_soon(transactions, today);
    if bills.is_empty() {
        debug!("No bills due between {} and +{} days", today, DUE_SOON_DAYS);
        return Ok(ReminderOutcome::NothingDue);
    }
    match mailer.send(recipients, &subject(bills.len()), &body(&bills)) {
        Ok(()) => {
            info!("Sent reminder for {} bill(s)", bills.len());
            Ok(ReminderOutcome::Sent(bills))
        }
        Err(e) => {
            warn!("Reminder mail failed: {e:#}");
            Ok(ReminderOutcome::SendFailed(bills))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recording {
        sent: RefCell<Vec<(Vec<String>, String, String)>>,
    }

    impl Mailer for Recording {
        fn send(&self, to: &[String], subject: &str, body: &str) -> Result<()> {
            self.sent
                .borrow_mut()
                .push((to.to_vec(), subject.to_string(), body.to_string()));
            Ok(())
        }
    }

    struct Down;

    impl Mailer for Down {
        fn send(&self, _: &[String], _: &str, _: &str) -> Result<()> {
            bail!("relay unreachable")
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn keep(_: NaiveDate) -> Result<()> {
        Ok(())
    }

    fn bill(id: i64, due: &str, planned: &str) -> Transaction {
        Transaction {
            id,
            kind: Some(TxKind::Expense),
            description: Some(format!("bill {}", id)),
            amount: Some(planned.parse().unwrap()),
            occurred_at: Some(date("2024-05-20")),
            due_date: Some(date(due)),
            ..Default::default()
        }
    }

    #[test]
    fn window_is_today_through_three_days() {
        let txs = vec![
            bill(1, "2024-05-31", "10"),
            bill(2, "2024-06-01", "20"),
            bill(3, "2024-06-04", "30"),
            bill(4, "2024-06-05", "40"),
        ];
        let ids: Vec<i64> = due_soon(&txs, date("2024-06-01")).iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn skips_paid_and_income() {
        let mut paid = bill(1, "2024-06-02", "10");
        paid.is_paid = true;
        let mut income = bill(2, "2024-06-02", "10");
        income.kind = Some(TxKind::Income);
        assert!(due_soon(&[paid, income], date("2024-06-01")).is_empty());
    }

    #[test]
    fn uses_planned_amount_and_placeholder_description() {
        let mut t = bill(1, "2024-06-02", "120");
        t.planned_amount = Some("99.9".parse().unwrap());
        t.paid_amount = Some("1".parse().unwrap());
        t.description = Some("  ".into());
        let got = due_soon(&[t], date("2024-06-01"));
        assert_eq!(got[0].amount, "99.9".parse::<Decimal>().unwrap());
        assert_eq!(got[0].line(), "(no description) (due 2024-06-02): 99.90");
    }

    #[test]
    fn undated_due_falls_back_to_occurred() {
        let mut t = bill(1, "2024-06-02", "5");
        t.due_date = None;
        t.occurred_at = Some(date("2024-06-03"));
        assert_eq!(due_soon(&[t], date("2024-06-01")).len(), 1);
    }

    #[test]
    fn second_run_same_day_sends_nothing() {
        let txs = vec![bill(1, "2024-06-02", "50")];
        let mailer = Recording::default();
        let to = vec!["home@example.com".to_string()];
        let mut state = ReminderState::default();

        let first = run_reminder(&mut state, &txs, date("2024-06-01"), &mailer, &to, keep).unwrap();
        assert!(matches!(first, ReminderOutcome::Sent(ref b) if b.len() == 1));
        let second = run_reminder(&mut state, &txs, date("2024-06-01"), &mailer, &to, keep).unwrap();
        assert_eq!(second, ReminderOutcome::AlreadyNotified);
        assert_eq!(mailer.sent.borrow().len(), 1);
        assert!(mailer.sent.borrow()[0].2.contains("bill 1 (due 2024-06-02): 50.00"));

        let next_day = run_reminder(&mut state, &txs, date("2024-06-02"), &mailer, &to, keep).unwrap();
        assert!(matches!(next_day, ReminderOutcome::Sent(_)));
    }

    #[test]
    fn failed_send_still_sets_marker() {
        let txs = vec![bill(1, "2024-06-02", "50")];
        let mut state = ReminderState::default();
        let out = run_reminder(&mut state, &txs, date("2024-06-01"), &Down, &[], keep).unwrap();
        assert!(matches!(out, ReminderOutcome::SendFailed(_)));
        assert_eq!(state.last_notified, Some(date("2024-06-01")));
        let again = run_reminder(&mut state, &txs, date("2024-06-01"), &Down, &[], keep).unwrap();
        assert_eq!(again, ReminderOutcome::AlreadyNotified);
    }

    #[test]
    fn nothing_is_sent_when_the_day_cannot_be_recorded() {
        let txs = vec![bill(1, "2024-06-02", "50")];
        let mailer = Recording::default();
        for _ in 0..3 {
            let mut state = ReminderState::default();
            let out = run_reminder(&mut state, &txs, date("2024-06-01"), &mailer, &[], |_| {
                bail!("database is read-only")
            });
            assert!(out.is_err());
        }
        assert!(mailer.sent.borrow().is_empty());
    }

    #[test]
    fn nothing_due_still_claims_the_day() {
        let mut state = ReminderState::default();
        let mailer = Recording::default();
        let out = run_reminder(&mut state, &[], date("2024-06-01"), &mailer, &[], keep).unwrap();
        assert_eq!(out, ReminderOutcome::NothingDue);
        assert!(state.notified_on(date("2024-06-01")));
        assert!(mailer.sent.borrow().is_empty());
    }
}

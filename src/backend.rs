// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::TxKind;
use crate::projection::planned_amount;
use chrono::{Months, NaiveDate};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ProcedureError {
    #[error("transaction {0} not found")]
    NotFound(i64),

    #[error("transaction {0} is already paid")]
    AlreadyPaid(i64),

    #[error("invalid installment plan: {0}")]
    InvalidPlan(String),

    #[error("invalid budget: {0}")]
    InvalidBudget(String),

    #[error("database error: {0}")]
    Sql(#[from] rusqlite::Error),
}

pub type ProcedureResult<T> = std::result::Result<T, ProcedureError>;

#[derive(Debug, Clone, Default)]
pub struct InstallmentPlan {
    pub kind: Option<TxKind>,
    pub description: String,
    pub total: Decimal,
    pub count: u32,
    pub first_due: Option<NaiveDate>,
    pub occurred_at: Option<NaiveDate>,
    pub member_id: Option<i64>,
    pub category_id: Option<i64>,
    pub account_id: Option<i64>,
    pub card_id: Option<i64>,
}

impl InstallmentPlan {
    // Rounding remainder goes to the first installment.
    pub fn split(&self) -> ProcedureResult<Vec<Decimal>> {
        if self.count == 0 {
            return Err(ProcedureError::InvalidPlan("count must be at least 1".into()));
        }
        if self.total <= Decimal::ZERO {
            return Err(ProcedureError::InvalidPlan("total must be positive".into()));
        }
        let total = self.total.round_dp(2);
        let n = Decimal::from(self.count);
        let part = (total / n).round_dp_with_strategy(2, RoundingStrategy::ToZero);
        let first = total - part * (n - Decimal::ONE);
        let mut out = vec![part; self.count as usize];
        out[0] = first;
        Ok(out)
    }
}

pub trait Procedures {
    fn create_installments(&self, plan: &InstallmentPlan) -> ProcedureResult<Vec<i64>>;

    fn mark_paid(
        &self,
        id: i64,
        paid_amount: Option<Decimal>,
        paid_on: NaiveDate,
    ) -> ProcedureResult<Decimal>;

    fn upsert_budget(&self, month: &str, category_id: i64, amount: Decimal) -> ProcedureResult<()>;
}

pub struct SqliteProcedures<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteProcedures<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl Procedures for SqliteProcedures<'_> {
    fn create_installments(&self, plan: &InstallmentPlan) -> ProcedureResult<Vec<i64>> {
        let parts = plan.split()?;
        let first_due = plan
            .first_due
            .ok_or_else(|| ProcedureError::InvalidPlan("first due date is required".into()))?;
        let kind = plan.kind.unwrap_or(TxKind::Expense);
        let occurred = plan.occurred_at.unwrap_or(first_due);
        let count = parts.len();

        let tx = self.conn.unchecked_transaction()?;
        let mut ids = Vec::with_capacity(count);
        let mut group: Option<i64> = None;
        for (i, amount) in parts.iter().enumerate() {
            let due = first_due
                .checked_add_months(Months::new(i as u32))
                .ok_or_else(|| ProcedureError::InvalidPlan("due date out of range".into()))?;
            tx.execute(
                "INSERT INTO transactions(type, description, amount, planned_amount, is_paid,
                     occurred_at, due_date, member_id, category_id, account_id, card_id,
                     installment_of, installment_no, installment_count)
                 VALUES (?1, ?2, ?3, ?3, 0, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    kind.as_str(),
                    format!("{} ({}/{})", plan.description.trim(), i + 1, count),
                    amount.to_string(),
                    occurred.to_string(),
                    due.to_string(),
                    plan.member_id,
                    plan.category_id,
                    plan.account_id,
                    plan.card_id,
                    group,
                    (i + 1) as i64,
                    count as i64,
                ],
            )?;
            let id = tx.last_insert_rowid();
            if group.is_none() {
                tx.execute(
                    "UPDATE transactions SET installment_of=?1 WHERE id=?1",
                    params![id],
                )?;
                group = Some(id);
            }
            ids.push(id);
        }
        tx.commit()?;
        info!(
            "Created {} installments of '{}' starting {}",
            count, plan.description, first_due
        );
        Ok(ids)
    }

    fn mark_paid(
        &self,
        id: i64,
        paid_amount: Option<Decimal>,
        paid_on: NaiveDate,
    ) -> ProcedureResult<Decimal> {
        let current =
            crate::db::load_transaction(self.conn, id)?.ok_or(ProcedureError::NotFound(id))?;
        if current.is_paid {
            return Err(ProcedureError::AlreadyPaid(id));
        }
        let amount = paid_amount
            .or_else(|| planned_amount(&current))
            .unwrap_or(Decimal::ZERO)
            .abs();
        self.conn.execute(
            "UPDATE transactions SET is_paid=1, paid_amount=?2, paid_at=?3 WHERE id=?1",
            params![id, amount.to_string(), paid_on.to_string()],
        )?;
        debug!("Marked transaction {} paid: {} on {}", id, amount, paid_on);
        Ok(amount)
    }

    fn upsert_budget(&self, month: &str, category_id: i64, amount: Decimal) -> ProcedureResult<()> {
        if amount.is_sign_negative() {
            return Err(ProcedureError::InvalidBudget(format!(
                "amount {} must not be negative",
                amount
            )));
        }
        let known: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM categories WHERE id=?1",
                params![category_id],
                |r| r.get(0),
            )
            .optional()?;
        if known.is_none() {
            return Err(ProcedureError::InvalidBudget(format!(
                "category {} does not exist",
                category_id
            )));
        }
        self.conn.execute(
            "INSERT INTO budgets(month, category_id, amount) VALUES (?1,?2,?3)
             ON CONFLICT(month, category_id) DO UPDATE SET amount=excluded.amount",
            params![month, category_id, amount.to_string()],
        )?;
        debug!("Budget {} / {} = {}", month, category_id, amount);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn conn() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        db::init_schema(&mut conn).unwrap();
        conn
    }

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn split_puts_remainder_first() {
        let plan = InstallmentPlan {
            total: d("100"),
            count: 3,
            ..Default::default()
        };
        let parts = plan.split().unwrap();
        assert_eq!(parts, vec![d("33.34"), d("33.33"), d("33.33")]);
        assert_eq!(parts.iter().copied().sum::<Decimal>(), d("100"));
    }

    #[test]
    fn split_rejects_empty_plans() {
        let plan = InstallmentPlan {
            total: d("100"),
            count: 0,
            ..Default::default()
        };
        assert!(matches!(plan.split(), Err(ProcedureError::InvalidPlan(_))));
    }

    #[test]
    fn installments_are_monthly_and_grouped() {
        let conn = conn();
        let procs = SqliteProcedures::new(&conn);
        let ids = procs
            .create_installments(&InstallmentPlan {
                kind: Some(TxKind::Expense),
                description: "Sofa".into(),
                total: d("900"),
                count: 3,
                first_due: Some(date("2024-01-31")),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(ids.len(), 3);

        let txs = db::load_transactions(&conn).unwrap();
        let mut txs: Vec<_> = txs.into_iter().filter(|t| ids.contains(&t.id)).collect();
        txs.sort_by_key(|t| t.id);
        assert_eq!(txs[0].description.as_deref(), Some("Sofa (1/3)"));
        assert_eq!(txs[1].due_date, Some(date("2024-02-29")));
        assert_eq!(txs[2].due_date, Some(date("2024-03-31")));
        assert!(txs.iter().all(|t| t.installment_of == Some(ids[0])));
        assert!(txs.iter().all(|t| t.planned_amount == Some(d("300"))));
    }

    #[test]
    fn mark_paid_defaults_to_planned_and_refuses_twice() {
        let conn = conn();
        conn.execute(
            "INSERT INTO transactions(type, amount, planned_amount, occurred_at) VALUES ('expense','280','300','2024-06-01')",
            [],
        )
        .unwrap();
        let id = conn.last_insert_rowid();
        let procs = SqliteProcedures::new(&conn);
        let paid = procs.mark_paid(id, None, date("2024-06-02")).unwrap();
        assert_eq!(paid, d("300"));
        let t = db::load_transaction(&conn, id).unwrap().unwrap();
        assert!(t.is_paid);
        assert_eq!(t.paid_at, Some(date("2024-06-02")));
        assert!(matches!(
            procs.mark_paid(id, None, date("2024-06-02")),
            Err(ProcedureError::AlreadyPaid(_))
        ));
        assert!(matches!(
            procs.mark_paid(999, None, date("2024-06-02")),
            Err(ProcedureError::NotFound(999))
        ));
    }

    #[test]
    fn upsert_budget_replaces_amount() {
        let conn = conn();
        conn.execute("INSERT INTO categories(name) VALUES ('Food')", [])
            .unwrap();
        let cat = conn.last_insert_rowid();
        let procs = SqliteProcedures::new(&conn);
        procs.upsert_budget("2024-06", cat, d("400")).unwrap();
        procs.upsert_budget("2024-06", cat, d("450")).unwrap();
        let amt: String = conn
            .query_row("SELECT amount FROM budgets WHERE month='2024-06'", [], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(amt, "450");
        assert!(matches!(
            procs.upsert_budget("2024-06", 42, d("1")),
            Err(ProcedureError::InvalidBudget(_))
        ));
    }
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{CreditCard, Transaction, TxKind};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

pub const PLACEHOLDER: &str = "—";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateKey {
    Occurred,
    /// `due_date`, falling back to `occurred_at` only when no due date was stored.
    Due,
}

impl DateKey {
    pub fn select(&self, tx: &Transaction) -> Option<NaiveDate> {
        match self {
            DateKey::Occurred => tx.occurred_at,
            DateKey::Due => tx.due_or_occurred(),
        }
    }

    pub fn parse(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "occurred" => Ok(DateKey::Occurred),
            "due" => Ok(DateKey::Due),
            other => Err(anyhow::anyhow!(
                "Invalid date key '{}', expected occurred|due",
                other
            )),
        }
    }
}

// Paid amount wins only when the transaction is paid and it was captured.
pub fn base_amount(tx: &Transaction) -> Decimal {
    let paid = if tx.is_paid { tx.paid_amount } else { None };
    paid.or_else(|| planned_amount(tx)).unwrap_or(Decimal::ZERO).abs()
}

pub fn planned_amount(tx: &Transaction) -> Option<Decimal> {
    tx.planned_amount.or(tx.amount)
}

pub fn clamped_add(a: Decimal, b: Decimal) -> Decimal {
    a.checked_add(b).unwrap_or_else(|| {
        warn!("sum of {} and {} is out of range, clamping", a, b);
        if b.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        }
    })
}

/// Signed contribution of a transaction: positive for income, negative for
/// expense, zero when the type is unknown.
pub fn effective_value(tx: &Transaction) -> Decimal {
    match tx.kind {
        Some(TxKind::Income) => base_amount(tx),
        Some(TxKind::Expense) => -base_amount(tx),
        None => Decimal::ZERO,
    }
}

/// Transactions whose selected date lies in `[start, end]`, ascending by that
/// date. Equal dates keep their input order.
pub fn filter_by_window<'a, I>(
    transactions: I,
    start: NaiveDate,
    end: NaiveDate,
    key: DateKey,
) -> Vec<&'a Transaction>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut out: Vec<(NaiveDate, &'a Transaction)> = transactions
        .into_iter()
        .filter_map(|tx| key.select(tx).map(|d| (d, tx)))
        .filter(|(d, _)| start <= *d && *d <= end)
        .collect();
    out.sort_by_key(|(d, _)| *d);
    out.into_iter().map(|(_, tx)| tx).collect()
}

#[derive(Debug, Clone, Default)]
pub struct Lookup {
    names: HashMap<i64, String>,
}

impl Lookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: i64, name: impl Into<String>) {
        self.names.insert(id, name.into());
    }

    pub fn label(&self, id: Option<i64>) -> String {
        id.and_then(|id| self.names.get(&id))
            .cloned()
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    }

}

impl FromIterator<(i64, String)> for Lookup {
    fn from_iter<T: IntoIterator<Item = (i64, String)>>(iter: T) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Dimension<'a> {
    Member(&'a Lookup),
    Category(&'a Lookup),
    Account(&'a Lookup),
    Card(&'a Lookup),
    Date(DateKey),
}

impl Dimension<'_> {
    pub fn label(&self, tx: &Transaction) -> String {
        match self {
            Dimension::Member(l) => l.label(tx.member_id),
            Dimension::Category(l) => l.label(tx.category_id),
            Dimension::Account(l) => l.label(tx.account_id),
            Dimension::Card(l) => l.label(tx.card_id),
            Dimension::Date(key) => key
                .select(tx)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
        }
    }
}

pub fn aggregate<'a, I>(transactions: I, dimension: Dimension<'_>) -> BTreeMap<String, Decimal>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    aggregate_by(transactions, |tx| dimension.label(tx))
}

pub fn aggregate_by<'a, I, F>(transactions: I, mut label: F) -> BTreeMap<String, Decimal>
where
    I: IntoIterator<Item = &'a Transaction>,
    F: FnMut(&Transaction) -> String,
{
    let mut out: BTreeMap<String, Decimal> = BTreeMap::new();
    for tx in transactions {
        let sum = out.entry(label(tx)).or_insert(Decimal::ZERO);
        *sum = clamped_add(*sum, effective_value(tx));
    }
    out
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub income: Decimal,
    // negative
    pub expense: Decimal,
    pub balance: Decimal,
}

pub fn totals<'a, I>(transactions: I) -> Totals
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut t = Totals::default();
    for tx in transactions {
        let v = effective_value(tx);
        if v > Decimal::ZERO {
            t.income = clamped_add(t.income, v);
        } else {
            t.expense = clamped_add(t.expense, v);
        }
    }
    t.balance = clamped_add(t.income, t.expense);
    t
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CashFlowPoint {
    pub date: NaiveDate,
    pub net: Decimal,
    pub running: Decimal,
}

pub fn cash_flow<'a, I>(
    transactions: I,
    start: NaiveDate,
    end: NaiveDate,
    key: DateKey,
) -> Vec<CashFlowPoint>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut per_day: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for tx in filter_by_window(transactions, start, end, key) {
        if let Some(d) = key.select(tx) {
            let net = per_day.entry(d).or_insert(Decimal::ZERO);
            *net = clamped_add(*net, effective_value(tx));
        }
    }
    let mut running = Decimal::ZERO;
    per_day
        .into_iter()
        .map(|(date, net)| {
            running = clamped_add(running, net);
            CashFlowPoint { date, net, running }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardUsage {
    pub card_id: i64,
    pub name: String,
    pub limit: Decimal,
    pub used: Decimal,
    pub available: Decimal,
}

pub fn card_usage<'a, I>(cards: &[CreditCard], transactions: I) -> Vec<CardUsage>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut used: HashMap<i64, Decimal> = HashMap::new();
    for tx in transactions {
        if tx.is_paid || tx.kind != Some(TxKind::Expense) {
            continue;
        }
        if let Some(card_id) = tx.card_id {
            let sum = used.entry(card_id).or_insert(Decimal::ZERO);
            *sum = clamped_add(*sum, effective_value(tx));
        }
    }
    let mut out: Vec<CardUsage> = cards
        .iter()
        .map(|c| {
            let u = used.get(&c.id).copied().unwrap_or(Decimal::ZERO).abs();
            CardUsage {
                card_id: c.id,
                name: c.name.clone(),
                limit: c.limit,
                used: u,
                available: clamped_add(c.limit, -u),
            }
        })
        .collect();
    out.sort_by(|a, b| a.name.cmp(&b.name).then(a.card_id.cmp(&b.card_id)));
    out
}

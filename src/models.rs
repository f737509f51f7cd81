// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    Income,
    Expense,
}

impl TxKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxKind::Income => "income",
            TxKind::Expense => "expense",
        }
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TxKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(TxKind::Income),
            "expense" => Ok(TxKind::Expense),
            other => Err(anyhow::anyhow!(
                "Invalid transaction type '{}', expected income|expense",
                other
            )),
        }
    }
}

// Rows are decoded leniently: anything that fails to parse arrives as None/false.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub kind: Option<TxKind>,
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub planned_amount: Option<Decimal>,
    pub paid_amount: Option<Decimal>,
    pub is_paid: bool,
    pub paid_at: Option<NaiveDate>,
    pub occurred_at: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    /// A due date was stored but could not be read.
    #[serde(skip)]
    pub due_date_invalid: bool,
    pub member_id: Option<i64>,
    pub category_id: Option<i64>,
    pub account_id: Option<i64>,
    pub card_id: Option<i64>,
    pub installment_of: Option<i64>,
    pub installment_no: Option<i64>,
    pub installment_count: Option<i64>,
    pub fixed_bill_id: Option<i64>,
}

impl Transaction {
    /// Due date, or the occurred date when no due date was captured. None when
    /// the stored due date is unreadable.
    pub fn due_or_occurred(&self) -> Option<NaiveDate> {
        if self.due_date_invalid {
            return None;
        }
        self.due_date.or(self.occurred_at)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditCard {
    pub id: i64,
    pub name: String,
    pub limit: Decimal,
    pub due_day: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedBill {
    pub id: i64,
    pub description: String,
    pub amount: Decimal,
    pub due_day: u32,
    pub member_id: Option<i64>,
    pub category_id: Option<i64>,
    pub account_id: Option<i64>,
    pub card_id: Option<i64>,
    pub active: bool,
}

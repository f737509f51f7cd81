// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{CreditCard, FixedBill, Transaction};
use crate::projection::Lookup;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, Row};
use rust_decimal::Decimal;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.alphavelocity", "Hearth", "hearth"));

pub fn db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("hearth.sqlite"))
}

/// Opens the household database, `path` taking precedence over the platform
/// data dir.
pub fn open_or_init(path: Option<&Path>) -> Result<Connection> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => db_path()?,
    };
    debug!("Opening database at {}", path.display());
    let mut conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&mut conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS members(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        email TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS accounts(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        type TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS categories(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE
    );

    CREATE TABLE IF NOT EXISTS credit_cards(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        limit_amount TEXT NOT NULL,
        due_day INTEGER
    );

    CREATE TABLE IF NOT EXISTS fixed_bills(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        description TEXT NOT NULL,
        amount TEXT NOT NULL,
        due_day INTEGER NOT NULL CHECK(due_day BETWEEN 1 AND 31),
        member_id INTEGER,
        category_id INTEGER,
        account_id INTEGER,
        card_id INTEGER,
        active INTEGER NOT NULL DEFAULT 1,
        FOREIGN KEY(member_id) REFERENCES members(id) ON DELETE SET NULL,
        FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE SET NULL,
        FOREIGN KEY(account_id) REFERENCES accounts(id) ON DELETE SET NULL,
        FOREIGN KEY(card_id) REFERENCES credit_cards(id) ON DELETE SET NULL
    );

    -- Amounts and dates are TEXT and decoded leniently; a bad value reads as absent.
    CREATE TABLE IF NOT EXISTS transactions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        type TEXT NOT NULL,
        description TEXT,
        amount TEXT,
        planned_amount TEXT,
        paid_amount TEXT,
        is_paid INTEGER NOT NULL DEFAULT 0,
        paid_at TEXT,
        occurred_at TEXT,
        due_date TEXT,
        member_id INTEGER,
        category_id INTEGER,
        account_id INTEGER,
        card_id INTEGER,
        installment_of INTEGER,
        installment_no INTEGER,
        installment_count INTEGER,
        fixed_bill_id INTEGER,
        bill_month TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        UNIQUE(fixed_bill_id, bill_month),
        FOREIGN KEY(member_id) REFERENCES members(id) ON DELETE SET NULL,
        FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE SET NULL,
        FOREIGN KEY(account_id) REFERENCES accounts(id) ON DELETE SET NULL,
        FOREIGN KEY(card_id) REFERENCES credit_cards(id) ON DELETE SET NULL,
        FOREIGN KEY(fixed_bill_id) REFERENCES fixed_bills(id) ON DELETE SET NULL
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_occurred ON transactions(occurred_at);
    CREATE INDEX IF NOT EXISTS idx_transactions_due ON transactions(due_date);

    CREATE TABLE IF NOT EXISTS budgets(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        month TEXT NOT NULL,
        category_id INTEGER NOT NULL,
        amount TEXT NOT NULL,
        UNIQUE(month, category_id),
        FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE CASCADE
    );
    "#,
    )?;
    Ok(())
}

const TX_COLUMNS: &str = "id, type, description, amount, planned_amount, paid_amount, is_paid, \
     paid_at, occurred_at, due_date, member_id, category_id, account_id, card_id, \
     installment_of, installment_no, installment_count, fixed_bill_id";

pub fn load_transactions(conn: &Connection) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM transactions", TX_COLUMNS))?;
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        out.push(transaction_from_row(r)?);
    }
    debug!("Loaded {} transactions", out.len());
    Ok(out)
}

pub fn load_transaction(conn: &Connection, id: i64) -> rusqlite::Result<Option<Transaction>> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM transactions WHERE id=?1", TX_COLUMNS))?;
    let mut rows = stmt.query([id])?;
    match rows.next()? {
        Some(r) => Ok(Some(transaction_from_row(r)?)),
        None => Ok(None),
    }
}

fn transaction_from_row(r: &Row<'_>) -> rusqlite::Result<Transaction> {
    let (due_date, due_date_invalid) = checked_date_at(r, 9)?;
    Ok(Transaction {
        id: r.get(0)?,
        kind: text_at(r, 1)?.and_then(|s| s.parse().ok()),
        description: text_at(r, 2)?.filter(|s| !s.trim().is_empty()),
        amount: decimal_at(r, 3)?,
        planned_amount: decimal_at(r, 4)?,
        paid_amount: decimal_at(r, 5)?,
        is_paid: flag_at(r, 6)?,
        paid_at: date_at(r, 7)?,
        occurred_at: date_at(r, 8)?,
        due_date,
        due_date_invalid,
        member_id: id_at(r, 10)?,
        category_id: id_at(r, 11)?,
        account_id: id_at(r, 12)?,
        card_id: id_at(r, 13)?,
        installment_of: id_at(r, 14)?,
        installment_no: id_at(r, 15)?,
        installment_count: id_at(r, 16)?,
        fixed_bill_id: id_at(r, 17)?,
    })
}

pub fn load_cards(conn: &Connection) -> Result<Vec<CreditCard>> {
    let mut stmt = conn.prepare("SELECT id, name, limit_amount, due_day FROM credit_cards")?;
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        out.push(CreditCard {
            id: r.get(0)?,
            name: r.get(1)?,
            limit: decimal_at(r, 2)?.unwrap_or(Decimal::ZERO),
            due_day: id_at(r, 3)?.and_then(|d| u32::try_from(d).ok()),
        });
    }
    Ok(out)
}

pub fn load_fixed_bills(conn: &Connection) -> Result<Vec<FixedBill>> {
    let mut stmt = conn.prepare(
        "SELECT id, description, amount, due_day, member_id, category_id, account_id, card_id, active
         FROM fixed_bills ORDER BY id",
    )?;
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        out.push(FixedBill {
            id: r.get(0)?,
            description: r.get(1)?,
            amount: decimal_at(r, 2)?.unwrap_or(Decimal::ZERO),
            due_day: id_at(r, 3)?.and_then(|d| u32::try_from(d).ok()).unwrap_or(1),
            member_id: id_at(r, 4)?,
            category_id: id_at(r, 5)?,
            account_id: id_at(r, 6)?,
            card_id: id_at(r, 7)?,
            active: flag_at(r, 8)?,
        });
    }
    Ok(out)
}

fn lookup(conn: &Connection, table: &str) -> Result<Lookup> {
    let mut stmt = conn.prepare(&format!("SELECT id, name FROM {}", table))?;
    let rows = stmt.query_map([], |r| Ok((r.get::<_, i64>(0)?, r.get::<_, String>(1)?)))?;
    let mut out = Lookup::new();
    for row in rows {
        let (id, name) = row?;
        out.insert(id, name);
    }
    Ok(out)
}

pub fn member_lookup(conn: &Connection) -> Result<Lookup> {
    lookup(conn, "members")
}

pub fn category_lookup(conn: &Connection) -> Result<Lookup> {
    lookup(conn, "categories")
}

pub fn account_lookup(conn: &Connection) -> Result<Lookup> {
    lookup(conn, "accounts")
}

pub fn card_lookup(conn: &Connection) -> Result<Lookup> {
    lookup(conn, "credit_cards")
}

// Lenient column decoders: a value of the wrong shape reads as None.

pub(crate) fn text_at(r: &Row<'_>, idx: usize) -> rusqlite::Result<Option<String>> {
    Ok(match r.get_ref(idx)? {
        ValueRef::Text(t) => std::str::from_utf8(t).ok().map(|s| s.to_string()),
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Null | ValueRef::Blob(_) => None,
    })
}

pub(crate) fn decimal_at(r: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Decimal>> {
    Ok(match r.get_ref(idx)? {
        ValueRef::Text(t) => std::str::from_utf8(t)
            .ok()
            .and_then(|s| s.trim().parse::<Decimal>().ok()),
        ValueRef::Integer(i) => Some(Decimal::from(i)),
        ValueRef::Real(f) => Decimal::try_from(f).ok(),
        ValueRef::Null | ValueRef::Blob(_) => None,
    })
}

pub(crate) fn date_at(r: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    Ok(text_at(r, idx)?.and_then(|s| stored_date(&s)))
}

/// The date, and whether a non-blank value was present but unreadable.
pub(crate) fn checked_date_at(
    r: &Row<'_>,
    idx: usize,
) -> rusqlite::Result<(Option<NaiveDate>, bool)> {
    let raw = text_at(r, idx)?.filter(|s| !s.trim().is_empty());
    let date = raw.as_deref().and_then(stored_date);
    Ok((date, raw.is_some() && date.is_none()))
}

fn stored_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    // full timestamps keep their date prefix
    let head = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

pub(crate) fn flag_at(r: &Row<'_>, idx: usize) -> rusqlite::Result<bool> {
    Ok(match r.get_ref(idx)? {
        ValueRef::Integer(i) => i != 0,
        ValueRef::Real(f) => f != 0.0,
        ValueRef::Text(t) => matches!(
            std::str::from_utf8(t).map(|s| s.trim().to_ascii_lowercase()),
            Ok(ref s) if s == "1" || s == "true" || s == "t" || s == "yes"
        ),
        ValueRef::Null | ValueRef::Blob(_) => false,
    })
}

fn id_at(r: &Row<'_>, idx: usize) -> rusqlite::Result<Option<i64>> {
    Ok(match r.get_ref(idx)? {
        ValueRef::Integer(i) => Some(i),
        ValueRef::Text(t) => std::str::from_utf8(t)
            .ok()
            .and_then(|s| s.trim().parse::<i64>().ok()),
        _ => None,
    })
}

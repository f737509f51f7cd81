// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db;
use crate::models::TxKind;
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection) -> Result<()> {
    let rows = issues(conn)?;
    if rows.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        let data = rows.into_iter().map(|(k, d)| vec![k, d]).collect();
        println!("{}", pretty_table(&["Issue", "Detail"], data));
    }
    Ok(())
}

// Rows that reports degrade silently, decoded the same way the loader does.
pub fn issues(conn: &Connection) -> Result<Vec<(String, String)>> {
    let mut rows = Vec::new();

    let mut stmt = conn.prepare(
        "SELECT id, type, amount, planned_amount, paid_amount, is_paid, occurred_at, due_date
         FROM transactions ORDER BY id",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let id: i64 = r.get(0)?;
        let kind = db::text_at(r, 1)?;
        let is_paid = db::flag_at(r, 5)?;
        let (occurred, bad_occurred) = db::checked_date_at(r, 6)?;
        let (_, bad_due) = db::checked_date_at(r, 7)?;

        if kind.as_deref().and_then(|k| k.parse::<TxKind>().ok()).is_none() {
            rows.push(("unknown_type".into(), format!("#{} {:?}", id, kind)));
        }
        let mut paid_amount = None;
        for (idx, col) in [(2, "amount"), (3, "planned_amount"), (4, "paid_amount")] {
            let raw = db::text_at(r, idx)?.filter(|s| !s.trim().is_empty());
            let value = db::decimal_at(r, idx)?;
            if let (Some(s), None) = (&raw, value) {
                rows.push(("bad_amount".into(), format!("#{} {}='{}'", id, col, s)));
            }
            if idx == 4 {
                paid_amount = value;
            }
        }
        if is_paid && paid_amount.is_none() {
            rows.push((
                "paid_without_amount".into(),
                format!("#{} counts its planned amount", id),
            ));
        }
        if bad_occurred {
            let raw = db::text_at(r, 6)?.unwrap_or_default();
            rows.push(("bad_date".into(), format!("#{} occurred_at='{}'", id, raw)));
        } else if occurred.is_none() {
            rows.push(("missing_date".into(), format!("#{}", id)));
        }
        if bad_due {
            let raw = db::text_at(r, 7)?.unwrap_or_default();
            rows.push(("bad_date".into(), format!("#{} due_date='{}'", id, raw)));
        }
    }

    for (col, table) in [
        ("member_id", "members"),
        ("category_id", "categories"),
        ("account_id", "accounts"),
        ("card_id", "credit_cards"),
    ] {
        let mut stmt = conn.prepare(&format!(
            "SELECT t.id, t.{col} FROM transactions t LEFT JOIN {table} x ON t.{col}=x.id
             WHERE t.{col} IS NOT NULL AND x.id IS NULL ORDER BY t.id"
        ))?;
        let mut cur = stmt.query([])?;
        while let Some(r) = cur.next()? {
            let id: i64 = r.get(0)?;
            let dangling: i64 = r.get(1).unwrap_or_default();
            rows.push((
                "dangling_reference".into(),
                format!("#{} {}={}", id, col, dangling),
            ));
        }
    }
    Ok(rows)
}

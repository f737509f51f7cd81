// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db;
use crate::projection::effective_value;
use crate::utils::arg;
use anyhow::{Context, Result, bail};
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(conn, sub),
        _ => Ok(()),
    }
}

#[derive(Serialize)]
struct ExportRow {
    id: i64,
    #[serde(rename = "type")]
    kind: String,
    description: String,
    occurred_at: String,
    due_date: String,
    amount: String,
    planned_amount: String,
    paid_amount: String,
    is_paid: bool,
    effective_value: String,
    member: String,
    category: String,
    account: String,
    card: String,
}

fn opt<T: ToString>(v: Option<T>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

fn export_transactions(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = arg(sub, "format")?.to_lowercase();
    let out = arg(sub, "out")?;

    let mut txs = db::load_transactions(conn)?;
    txs.sort_by_key(|t| (t.occurred_at, t.id));
    let members = db::member_lookup(conn)?;
    let categories = db::category_lookup(conn)?;
    let accounts = db::account_lookup(conn)?;
    let cards = db::card_lookup(conn)?;

    let rows: Vec<ExportRow> = txs
        .iter()
        .map(|t| ExportRow {
            id: t.id,
            kind: opt(t.kind),
            description: t.description.clone().unwrap_or_default(),
            occurred_at: opt(t.occurred_at),
            due_date: opt(t.due_date),
            amount: opt(t.amount),
            planned_amount: opt(t.planned_amount),
            paid_amount: opt(t.paid_amount),
            is_paid: t.is_paid,
            effective_value: effective_value(t).to_string(),
            member: members.label(t.member_id),
            category: categories.label(t.category_id),
            account: accounts.label(t.account_id),
            card: cards.label(t.card_id),
        })
        .collect();

    match fmt.as_str() {
        "csv" => {
            let mut wtr =
                csv::Writer::from_path(out).with_context(|| format!("Create {}", out))?;
            for row in &rows {
                wtr.serialize(row)?;
            }
            wtr.flush()?;
        }
        "json" => {
            std::fs::write(out, serde_json::to_string_pretty(&rows)?)
                .with_context(|| format!("Write {}", out))?;
        }
        other => bail!("Unknown format: {} (use csv|json)", other),
    }
    println!("Exported {} transactions to {}", rows.len(), out);
    Ok(())
}

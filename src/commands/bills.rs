// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db;
use crate::models::TxKind;
use crate::projection::Lookup;
use crate::utils::{
    arg, day_in_month, fmt_money, id_for_account, id_for_card, id_for_category, id_for_member,
    month_start, opt_id, parse_amount, parse_month, pretty_table,
};
use anyhow::{Context, Result, anyhow};
use chrono::Datelike;
use rusqlite::{Connection, params};
use tracing::{debug, info};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", _)) => list(conn)?,
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").context("Missing required argument --id")?;
            // Already generated transactions stay; only future generation stops.
            conn.execute("UPDATE fixed_bills SET active=0 WHERE id=?1", params![id])?;
            println!("Deactivated bill {}", id);
        }
        Some(("generate", sub)) => {
            let month = parse_month(arg(sub, "month")?)?;
            let ids = generate_bills(conn, &month)?;
            println!("Generated {} bill(s) for {}", ids.len(), month);
        }
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let description = arg(sub, "description")?;
    let amount = parse_amount(arg(sub, "amount")?)?;
    let day = *sub.get_one::<u32>("day").context("Missing required argument --day")?;
    conn.execute(
        "INSERT INTO fixed_bills(description, amount, due_day, member_id, category_id, account_id, card_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            description,
            amount.to_string(),
            day,
            opt_id(conn, sub, "member", id_for_member)?,
            opt_id(conn, sub, "category", id_for_category)?,
            opt_id(conn, sub, "account", id_for_account)?,
            opt_id(conn, sub, "card", id_for_card)?,
        ],
    )?;
    info!("fixed bill added: {} {} on day {}", description, amount, day);
    println!(
        "Added fixed bill '{}' of {} due on day {}",
        description,
        fmt_money(&amount),
        day
    );
    Ok(())
}

fn list(conn: &Connection) -> Result<()> {
    let bills = db::load_fixed_bills(conn)?;
    let members: Lookup = db::member_lookup(conn)?;
    let categories: Lookup = db::category_lookup(conn)?;
    let rows = bills
        .iter()
        .map(|b| {
            vec![
                b.id.to_string(),
                b.description.clone(),
                fmt_money(&b.amount),
                b.due_day.to_string(),
                members.label(b.member_id),
                categories.label(b.category_id),
                if b.active { "yes".into() } else { "no".into() },
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["ID", "Description", "Amount", "Day", "Member", "Category", "Active"],
            rows
        )
    );
    Ok(())
}

/// Inserts one planned expense per active fixed bill for `month` (YYYY-MM).
/// Bills already generated for that month are skipped. Returns the new ids.
pub fn generate_bills(conn: &Connection, month: &str) -> Result<Vec<i64>> {
    let first = month_start(month)?;
    let bills = db::load_fixed_bills(conn)?;
    let tx = conn.unchecked_transaction()?;
    let mut ids = Vec::new();
    for bill in bills.iter().filter(|b| b.active) {
        let due = day_in_month(first.year(), first.month(), bill.due_day)
            .ok_or_else(|| anyhow!("Invalid due day {} for {}", bill.due_day, month))?;
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO transactions(type, description, amount, planned_amount, is_paid,
                 occurred_at, due_date, member_id, category_id, account_id, card_id,
                 fixed_bill_id, bill_month)
             VALUES (?1, ?2, ?3, ?3, 0, ?4, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                TxKind::Expense.as_str(),
                bill.description,
                bill.amount.to_string(),
                due.to_string(),
                bill.member_id,
                bill.category_id,
                bill.account_id,
                bill.card_id,
                bill.id,
                month,
            ],
        )?;
        if inserted == 0 {
            debug!("bill {} already generated for {}", bill.id, month);
            continue;
        }
        ids.push(tx.last_insert_rowid());
    }
    tx.commit()?;
    info!("generated {} fixed bill(s) for {}", ids.len(), month);
    Ok(ids)
}

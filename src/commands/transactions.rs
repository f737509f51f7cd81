// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::backend::{InstallmentPlan, Procedures, SqliteProcedures};
use crate::db;
use crate::models::TxKind;
use crate::projection::{DateKey, PLACEHOLDER, effective_value, filter_by_window};
use crate::utils::{
    arg, fmt_money, id_for_account, id_for_card, id_for_category, id_for_member,
    maybe_print_json, opt_arg, opt_id, parse_amount, parse_date, pretty_table, today,
    window_from_args,
};
use anyhow::{Context, Result};
use rusqlite::{Connection, params};
use serde::Serialize;
use tracing::{debug, info};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("pay", sub)) => pay(conn, sub)?,
        Some(("installments", sub)) => installments(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let kind: TxKind = arg(sub, "kind")?.parse()?;
    let date = parse_date(arg(sub, "date")?)?;
    let amount = parse_amount(arg(sub, "amount")?)?;
    let planned = opt_arg(sub, "planned").map(parse_amount).transpose()?;
    let due = opt_arg(sub, "due").map(parse_date).transpose()?;
    let description = opt_arg(sub, "description");
    let paid = sub.get_flag("paid");

    let member_id = opt_id(conn, sub, "member", id_for_member)?;
    let category_id = opt_id(conn, sub, "category", id_for_category)?;
    let account_id = opt_id(conn, sub, "account", id_for_account)?;
    let card_id = opt_id(conn, sub, "card", id_for_card)?;

    let (paid_amount, paid_at) = if paid {
        (Some(amount.to_string()), Some(date.to_string()))
    } else {
        (None, None)
    };

    conn.execute(
        "INSERT INTO transactions(type, description, amount, planned_amount, paid_amount, is_paid,
             paid_at, occurred_at, due_date, member_id, category_id, account_id, card_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            kind.as_str(),
            description,
            amount.to_string(),
            planned.map(|p| p.to_string()),
            paid_amount,
            paid,
            paid_at,
            date.to_string(),
            due.map(|d| d.to_string()),
            member_id,
            category_id,
            account_id,
            card_id,
        ],
    )?;
    let id = conn.last_insert_rowid();
    info!("transaction {} recorded: {} {} on {}", id, kind, amount, date);
    println!(
        "Recorded {} #{} of {} on {}{}",
        kind,
        id,
        fmt_money(&amount),
        date,
        description.map(|d| format!(" ('{}')", d)).unwrap_or_default()
    );
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.date.clone(),
                    r.kind.clone(),
                    r.description.clone(),
                    r.member.clone(),
                    r.category.clone(),
                    r.value.clone(),
                    if r.paid { "yes".into() } else { "no".into() },
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Type", "Description", "Member", "Category", "Value", "Paid"],
                rows,
            )
        );
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct TransactionRow {
    pub id: i64,
    pub date: String,
    pub occurred_at: String,
    pub due_date: String,
    pub kind: String,
    pub description: String,
    pub member: String,
    pub category: String,
    pub account: String,
    pub card: String,
    pub value: String,
    pub paid: bool,
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<TransactionRow>> {
    let (start, end) = window_from_args(sub, today())?;
    let key = DateKey::parse(arg(sub, "key")?)?;
    let member_id = opt_id(conn, sub, "member", id_for_member)?;
    let category_id = opt_id(conn, sub, "category", id_for_category)?;

    let txs = db::load_transactions(conn)?;
    let members = db::member_lookup(conn)?;
    let categories = db::category_lookup(conn)?;
    let accounts = db::account_lookup(conn)?;
    let cards = db::card_lookup(conn)?;

    let fmt_date = |d: Option<chrono::NaiveDate>| {
        d.map(|d| d.to_string())
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    };

    let mut data: Vec<TransactionRow> = filter_by_window(&txs, start, end, key)
        .into_iter()
        .filter(|t| member_id.is_none() || t.member_id == member_id)
        .filter(|t| category_id.is_none() || t.category_id == category_id)
        .map(|t| TransactionRow {
            id: t.id,
            date: fmt_date(key.select(t)),
            occurred_at: fmt_date(t.occurred_at),
            due_date: fmt_date(t.due_date),
            kind: t
                .kind
                .map(|k| k.to_string())
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            description: t.description.clone().unwrap_or_default(),
            member: members.label(t.member_id),
            category: categories.label(t.category_id),
            account: accounts.label(t.account_id),
            card: cards.label(t.card_id),
            value: fmt_money(&effective_value(t)),
            paid: t.is_paid,
        })
        .collect();
    if let Some(limit) = sub.get_one::<usize>("limit") {
        data.truncate(*limit);
    }
    debug!("{} rows in {}..={}", data.len(), start, end);
    Ok(data)
}

fn pay(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").context("Missing required argument --id")?;
    let amount = opt_arg(sub, "amount").map(parse_amount).transpose()?;
    let date = match opt_arg(sub, "date") {
        Some(d) => parse_date(d)?,
        None => today(),
    };
    let paid = SqliteProcedures::new(conn).mark_paid(id, amount, date)?;
    println!("Marked #{} paid: {} on {}", id, fmt_money(&paid), date);
    Ok(())
}

fn installments(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let first_due = parse_date(arg(sub, "first-due")?)?;
    let plan = InstallmentPlan {
        kind: Some(arg(sub, "kind")?.parse()?),
        description: arg(sub, "description")?.to_string(),
        total: parse_amount(arg(sub, "total")?)?,
        count: *sub
            .get_one::<u32>("count")
            .context("Missing required argument --count")?,
        first_due: Some(first_due),
        occurred_at: opt_arg(sub, "date").map(parse_date).transpose()?,
        member_id: opt_id(conn, sub, "member", id_for_member)?,
        category_id: opt_id(conn, sub, "category", id_for_category)?,
        account_id: opt_id(conn, sub, "account", id_for_account)?,
        card_id: opt_id(conn, sub, "card", id_for_card)?,
    };
    let parts = plan.split()?;
    let ids = SqliteProcedures::new(conn).create_installments(&plan)?;
    println!(
        "Created {} installments of '{}' (first {} due {}, ids {}..={})",
        ids.len(),
        plan.description,
        fmt_money(&parts[0]),
        first_due,
        ids.first().copied().unwrap_or_default(),
        ids.last().copied().unwrap_or_default()
    );
    Ok(())
}

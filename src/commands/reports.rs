// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db;
use crate::projection::{DateKey, Dimension, aggregate, cash_flow, filter_by_window, totals};
use crate::utils::{arg, fmt_money, maybe_print_json, pretty_table, today, window_from_args};
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("totals", sub)) => period_totals(conn, sub)?,
        Some(("by-member", sub)) => grouped(conn, sub, Group::Member)?,
        Some(("by-category", sub)) => grouped(conn, sub, Group::Category)?,
        Some(("by-date", sub)) => grouped(conn, sub, Group::Date)?,
        Some(("cashflow", sub)) => cashflow(conn, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group {
    Member,
    Category,
    Date,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct GroupRow {
    pub label: String,
    pub value: Decimal,
}

fn window(sub: &clap::ArgMatches) -> Result<(chrono::NaiveDate, chrono::NaiveDate, DateKey)> {
    let (start, end) = window_from_args(sub, today())?;
    let key = DateKey::parse(arg(sub, "key")?)?;
    debug!("report window {}..={} keyed on {:?}", start, end, key);
    Ok((start, end, key))
}

pub fn group_rows(conn: &Connection, sub: &clap::ArgMatches, group: Group) -> Result<Vec<GroupRow>> {
    let (start, end, key) = window(sub)?;
    let txs = db::load_transactions(conn)?;
    let in_window = filter_by_window(&txs, start, end, key);
    let agg = match group {
        Group::Member => aggregate(in_window, Dimension::Member(&db::member_lookup(conn)?)),
        Group::Category => aggregate(in_window, Dimension::Category(&db::category_lookup(conn)?)),
        Group::Date => aggregate(in_window, Dimension::Date(key)),
    };
    Ok(agg
        .into_iter()
        .map(|(label, value)| GroupRow { label, value })
        .collect())
}

fn grouped(conn: &Connection, sub: &clap::ArgMatches, group: Group) -> Result<()> {
    let data = group_rows(conn, sub, group)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let header = match group {
            Group::Member => "Member",
            Group::Category => "Category",
            Group::Date => "Date",
        };
        let rows = data
            .iter()
            .map(|r| vec![r.label.clone(), fmt_money(&r.value)])
            .collect();
        println!("{}", pretty_table(&[header, "Value"], rows));
    }
    Ok(())
}

fn period_totals(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (start, end, key) = window(sub)?;
    let txs = db::load_transactions(conn)?;
    let t = totals(filter_by_window(&txs, start, end, key));
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &t)? {
        println!(
            "{}",
            pretty_table(
                &["From", "To", "Income", "Expense", "Balance"],
                vec![vec![
                    start.to_string(),
                    end.to_string(),
                    fmt_money(&t.income),
                    fmt_money(&t.expense),
                    fmt_money(&t.balance),
                ]],
            )
        );
    }
    Ok(())
}

fn cashflow(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (start, end, key) = window(sub)?;
    let txs = db::load_transactions(conn)?;
    let data = cash_flow(&txs, start, end, key);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|p| vec![p.date.to_string(), fmt_money(&p.net), fmt_money(&p.running)])
            .collect();
        println!("{}", pretty_table(&["Date", "Net", "Running"], rows));
    }
    Ok(())
}

// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::backend::{Procedures, SqliteProcedures};
use crate::db;
use crate::models::TxKind;
use crate::projection::{DateKey, Dimension, aggregate, clamped_add, filter_by_window};
use crate::utils::{
    arg, fmt_money, id_for_category, maybe_print_json, month_end, month_start, opt_arg,
    parse_amount, parse_month, pretty_table,
};
use anyhow::Result;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("report", sub)) => report(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn set(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let month = parse_month(arg(sub, "month")?)?;
    let cat = arg(sub, "category")?;
    let amount = parse_amount(arg(sub, "amount")?)?;
    let cat_id = id_for_category(conn, cat)?;
    SqliteProcedures::new(conn).upsert_budget(&month, cat_id, amount)?;
    println!("Budget set for {} / {} = {}", month, cat, fmt_money(&amount));
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let mut sql = String::from(
        "SELECT b.month, c.name, b.amount FROM budgets b JOIN categories c ON b.category_id=c.id",
    );
    let month = opt_arg(sub, "month").map(parse_month).transpose()?;
    if month.is_some() {
        sql.push_str(" WHERE b.month=?1 ORDER BY c.name");
    } else {
        sql.push_str(" ORDER BY b.month DESC, c.name");
    }
    let mut stmt = conn.prepare(&sql)?;
    let map_row = |r: &rusqlite::Row<'_>| -> rusqlite::Result<(String, String, String)> {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
        ))
    };
    let rows = match &month {
        Some(m) => stmt.query_map(params![m], map_row)?.collect::<Vec<_>>(),
        None => stmt.query_map([], map_row)?.collect::<Vec<_>>(),
    };
    let mut data = Vec::new();
    for row in rows {
        let (m, c, a) = row?;
        data.push(vec![m, c, a]);
    }
    println!("{}", pretty_table(&["Month", "Category", "Budget"], data));
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct BudgetRow {
    pub category: String,
    pub budget: Decimal,
    pub spent: Decimal,
    pub remaining: Decimal,
}

pub fn report_rows(conn: &Connection, month: &str) -> Result<Vec<BudgetRow>> {
    let (start, end) = (month_start(month)?, month_end(month)?);
    let categories = db::category_lookup(conn)?;

    let mut budgets: BTreeMap<String, Decimal> = BTreeMap::new();
    let mut stmt = conn.prepare("SELECT category_id, amount FROM budgets WHERE month=?1")?;
    let mut cur = stmt.query(params![month])?;
    while let Some(r) = cur.next()? {
        let cat: i64 = r.get(0)?;
        let amt = db::decimal_at(r, 1)?.unwrap_or(Decimal::ZERO);
        let sum = budgets.entry(categories.label(Some(cat))).or_insert(Decimal::ZERO);
        *sum = clamped_add(*sum, amt);
    }

    let txs = db::load_transactions(conn)?;
    let expenses = filter_by_window(&txs, start, end, DateKey::Occurred)
        .into_iter()
        .filter(|t| t.kind == Some(TxKind::Expense));
    let spent = aggregate(expenses, Dimension::Category(&categories));

    let mut names: Vec<&String> = budgets.keys().chain(spent.keys()).collect();
    names.sort();
    names.dedup();
    Ok(names
        .into_iter()
        .map(|name| {
            let budget = budgets.get(name).copied().unwrap_or(Decimal::ZERO);
            let spent = spent.get(name).copied().unwrap_or(Decimal::ZERO).abs();
            BudgetRow {
                category: name.clone(),
                budget,
                spent,
                remaining: clamped_add(budget, -spent),
            }
        })
        .collect())
}

fn report(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let month = parse_month(arg(sub, "month")?)?;
    let data = report_rows(conn, &month)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|r| {
                vec![
                    r.category.clone(),
                    fmt_money(&r.budget),
                    fmt_money(&r.spent),
                    fmt_money(&r.remaining),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Category", "Budget", "Spent", "Remaining"], rows)
        );
    }
    Ok(())
}

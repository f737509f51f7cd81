// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow};
use chrono::{Datelike, Months, NaiveDate};
use clap::ArgMatches;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;

const UA: &str = concat!(
    "hearth/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/alphavelocity/hearth)"
);

pub fn http_client() -> Result<reqwest::blocking::Client> {
    let c = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(15))
        .user_agent(UA)
        .build()?;
    Ok(c)
}

pub fn arg<'a>(sub: &'a ArgMatches, name: &str) -> Result<&'a str> {
    sub.get_one::<String>(name)
        .map(|s| s.trim())
        .with_context(|| format!("Missing required argument --{}", name))
}

pub fn opt_arg<'a>(sub: &'a ArgMatches, name: &str) -> Option<&'a str> {
    sub.get_one::<String>(name)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_month(s: &str) -> Result<String> {
    let s = s.trim();
    NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}', expected YYYY-MM", s))?;
    Ok(s.to_string())
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

pub fn parse_amount(s: &str) -> Result<Decimal> {
    let d = parse_decimal(s)?;
    if d.is_sign_negative() {
        return Err(anyhow!("Amount '{}' must not be negative", s));
    }
    Ok(d)
}

pub fn fmt_money(d: &Decimal) -> String {
    format!("{:.2}", d.round_dp(2))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

fn id_for(conn: &Connection, table: &str, what: &str, name: &str) -> Result<i64> {
    let mut stmt = conn.prepare(&format!("SELECT id FROM {} WHERE name=?1", table))?;
    let id: i64 = stmt
        .query_row(params![name], |r| r.get(0))
        .with_context(|| format!("{} '{}' not found", what, name))?;
    Ok(id)
}

pub fn id_for_member(conn: &Connection, name: &str) -> Result<i64> {
    id_for(conn, "members", "Member", name)
}

pub fn id_for_account(conn: &Connection, name: &str) -> Result<i64> {
    id_for(conn, "accounts", "Account", name)
}

pub fn id_for_category(conn: &Connection, name: &str) -> Result<i64> {
    id_for(conn, "categories", "Category", name)
}

pub fn id_for_card(conn: &Connection, name: &str) -> Result<i64> {
    id_for(conn, "credit_cards", "Card", name)
}

pub fn opt_id(
    conn: &Connection,
    sub: &ArgMatches,
    name: &str,
    resolve: fn(&Connection, &str) -> Result<i64>,
) -> Result<Option<i64>> {
    opt_arg(sub, name).map(|v| resolve(conn, v)).transpose()
}

pub fn month_start(month: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", month.trim()), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}'", month))
}

pub fn month_end(month: &str) -> Result<NaiveDate> {
    let first = month_start(month)?;
    first
        .checked_add_months(Months::new(1))
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| anyhow!("Invalid month '{}'", month))
}

pub fn day_in_month(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
    NaiveDate::from_ymd_opt(year, month, day.clamp(1, last.day()))
}

/// Date window from `--month` or `--from/--to`, defaulting to the month of `today`.
pub fn window_from_args(sub: &ArgMatches, today: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
    if let Some(m) = opt_arg(sub, "month") {
        let m = parse_month(m)?;
        return Ok((month_start(&m)?, month_end(&m)?));
    }
    let this_month = today.format("%Y-%m").to_string();
    let start = match opt_arg(sub, "from") {
        Some(s) => parse_date(s)?,
        None => month_start(&this_month)?,
    };
    let end = match opt_arg(sub, "to") {
        Some(s) => parse_date(s)?,
        None => month_end(&this_month)?,
    };
    if end < start {
        return Err(anyhow!("Window end {} is before start {}", end, start));
    }
    Ok((start, end))
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

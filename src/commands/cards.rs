// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db;
use crate::projection::{CardUsage, card_usage};
use crate::utils::{arg, fmt_money, maybe_print_json, parse_amount, pretty_table};
use anyhow::Result;
use rusqlite::{Connection, params};
use tracing::info;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = arg(sub, "name")?;
            let limit = parse_amount(arg(sub, "limit")?)?;
            let due_day = sub.get_one::<u32>("due-day").copied();
            conn.execute(
                "INSERT INTO credit_cards(name, limit_amount, due_day) VALUES (?1, ?2, ?3)",
                params![name, limit.to_string(), due_day],
            )?;
            info!("card added: {} limit {}", name, limit);
            println!("Added card '{}' with limit {}", name, fmt_money(&limit));
        }
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => {
            let name = arg(sub, "name")?;
            conn.execute("DELETE FROM credit_cards WHERE name=?1", params![name])?;
            println!("Removed card '{}'", name);
        }
        _ => {}
    }
    Ok(())
}

pub fn usage(conn: &Connection) -> Result<Vec<CardUsage>> {
    let cards = db::load_cards(conn)?;
    let txs = db::load_transactions(conn)?;
    Ok(card_usage(&cards, &txs))
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = usage(conn)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|u| {
                vec![
                    u.name.clone(),
                    fmt_money(&u.limit),
                    fmt_money(&u.used),
                    fmt_money(&u.available),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Card", "Limit", "Used", "Available"], rows)
        );
    }
    Ok(())
}

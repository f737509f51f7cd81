// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db;
use crate::projection::{Dimension, aggregate};
use crate::utils::{arg, fmt_money, pretty_table};
use anyhow::{Context, Result};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use tracing::info;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = arg(sub, "name")?;
            let typ = arg(sub, "type")?.to_lowercase();
            conn.execute(
                "INSERT INTO accounts(name, type) VALUES (?1, ?2)",
                params![name, typ],
            )
            .with_context(|| format!("Add account '{}'", name))?;
            info!("account added: {} ({})", name, typ);
            println!("Added account '{}' ({})", name, typ);
        }
        Some(("list", _)) => {
            let data = balances(conn)?
                .into_iter()
                .map(|(name, typ, balance)| vec![name, typ, fmt_money(&balance)])
                .collect();
            println!("{}", pretty_table(&["Account", "Type", "Balance"], data));
        }
        Some(("rm", sub)) => {
            let name = arg(sub, "name")?;
            let n = conn.execute("DELETE FROM accounts WHERE name=?1", params![name])?;
            if n == 0 {
                println!("No account named '{}'", name);
            } else {
                println!("Removed account '{}'", name);
            }
        }
        _ => {}
    }
    Ok(())
}

pub fn balances(conn: &Connection) -> Result<Vec<(String, String, Decimal)>> {
    let lookup = db::account_lookup(conn)?;
    let txs = db::load_transactions(conn)?;
    let sums = aggregate(&txs, Dimension::Account(&lookup));

    let mut stmt = conn.prepare("SELECT name, type FROM accounts ORDER BY name")?;
    let rows = stmt.query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))?;
    let mut out = Vec::new();
    for row in rows {
        let (name, typ) = row?;
        let balance = sums.get(&name).copied().unwrap_or(Decimal::ZERO);
        out.push((name, typ, balance));
    }
    Ok(out)
}

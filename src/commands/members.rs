// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{arg, opt_arg, pretty_table};
use anyhow::{Context, Result};
use rusqlite::{Connection, params};
use tracing::info;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = arg(sub, "name")?;
            let email = opt_arg(sub, "email");
            conn.execute(
                "INSERT INTO members(name, email) VALUES (?1, ?2)",
                params![name, email],
            )
            .with_context(|| format!("Add member '{}'", name))?;
            info!("member added: {}", name);
            println!("Added member '{}'", name);
        }
        Some(("list", _)) => {
            let mut stmt = conn.prepare(
                "SELECT name, COALESCE(email,''), created_at FROM members ORDER BY name",
            )?;
            let rows = stmt.query_map([], |r| {
                Ok((
                    r.get::<_, String>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, String>(2)?,
                ))
            })?;
            let mut data = Vec::new();
            for row in rows {
                let (n, e, cr) = row?;
                data.push(vec![n, e, cr]);
            }
            println!("{}", pretty_table(&["Member", "Email", "Created"], data));
        }
        Some(("rm", sub)) => {
            let name = arg(sub, "name")?;
            // Transactions keep their rows; the reference is nulled and shows as a placeholder.
            conn.execute("DELETE FROM members WHERE name=?1", params![name])?;
            println!("Removed member '{}'", name);
        }
        _ => {}
    }
    Ok(())
}

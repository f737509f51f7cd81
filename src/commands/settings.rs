// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config;
use crate::utils::{arg, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => {
            let key = arg(sub, "key")?;
            config::set(conn, key, arg(sub, "value")?)?;
            println!("Set {}", key);
        }
        Some(("get", sub)) => {
            let key = arg(sub, "key")?;
            match config::get(conn, key)? {
                Some(v) if key == config::MAIL_TOKEN => println!("{} chars (hidden)", v.len()),
                Some(v) => println!("{}", v),
                None => println!("{} is not set", key),
            }
        }
        Some(("list", _)) => {
            let rows = config::list(conn)?
                .into_iter()
                .map(|(k, v)| vec![k, v])
                .collect();
            println!("{}", pretty_table(&["Key", "Value"], rows));
        }
        _ => {}
    }
    Ok(())
}

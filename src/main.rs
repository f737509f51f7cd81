// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use hearth::{cli, commands, db};

fn main() -> ExitCode {
    let matches = cli::build_cli().get_matches();
    let level = matches
        .get_one::<String>("log-level")
        .map(|s| s.as_str())
        .unwrap_or("warn");
    init_logger(level);
    debug!("Log level set to {}", level);

    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(matches: &clap::ArgMatches) -> Result<()> {
    let db_arg = matches.get_one::<String>("db").map(PathBuf::from);
    let conn = db::open_or_init(db_arg.as_deref())?;

    match matches.subcommand() {
        Some(("init", _)) => match &db_arg {
            Some(p) => println!("Database initialized at {}", p.display()),
            None => println!("Database initialized at {}", db::db_path()?.display()),
        },
        Some(("member", sub)) => commands::members::handle(&conn, sub)?,
        Some(("category", sub)) => commands::categories::handle(&conn, sub)?,
        Some(("account", sub)) => commands::accounts::handle(&conn, sub)?,
        Some(("card", sub)) => commands::cards::handle(&conn, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&conn, sub)?,
        Some(("bill", sub)) => commands::bills::handle(&conn, sub)?,
        Some(("budget", sub)) => commands::budgets::handle(&conn, sub)?,
        Some(("report", sub)) => commands::reports::handle(&conn, sub)?,
        Some(("remind", sub)) => commands::remind::handle(&conn, sub)?,
        Some(("config", sub)) => commands::settings::handle(&conn, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&conn, sub)?,
        Some(("doctor", _)) => commands::doctor::handle(&conn)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}

fn init_logger(level: &str) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => EnvFilter::from_default_env(),
        None => EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), level)),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::{self, Settings};
use crate::db;
use crate::mailer::{self, Mailer};
use crate::reminder::{ReminderOutcome, ReminderState, due_soon, run_reminder};
use crate::utils::{fmt_money, opt_arg, parse_date, pretty_table, today};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;
use tracing::warn;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let today = match opt_arg(m, "today") {
        Some(d) => parse_date(d)?,
        None => today(),
    };
    if m.get_flag("dry-run") {
        let txs = db::load_transactions(conn)?;
        let rows = due_soon(&txs, today)
            .into_iter()
            .map(|b| vec![b.id.to_string(), b.due.to_string(), b.description, fmt_money(&b.amount)])
            .collect();
        println!("{}", pretty_table(&["ID", "Due", "Description", "Amount"], rows));
        return Ok(());
    }

    let settings = Settings::load(conn)?;
    let mailer = mailer::from_settings(&settings)?;
    match run(conn, &settings, today, mailer.as_ref())? {
        ReminderOutcome::AlreadyNotified => println!("Reminder already handled for {}", today),
        ReminderOutcome::NothingDue => println!("No bills due in the next days"),
        ReminderOutcome::Sent(bills) => println!("Reminder sent for {} bill(s)", bills.len()),
        ReminderOutcome::SendFailed(bills) => println!(
            "Reminder for {} bill(s) could not be sent; not retrying today",
            bills.len()
        ),
    }
    Ok(())
}

// The marker is written before any mail goes out.
pub fn run(
    conn: &Connection,
    settings: &Settings,
    today: NaiveDate,
    mailer: &dyn Mailer,
) -> Result<ReminderOutcome> {
    let mut state = ReminderState::new(settings.last_notified);
    if state.notified_on(today) {
        return Ok(ReminderOutcome::AlreadyNotified);
    }
    let txs = db::load_transactions(conn)?;
    if settings.mail_recipients.is_empty() {
        warn!("No mail recipients configured (set {})", config::MAIL_RECIPIENTS);
    }
    run_reminder(&mut state, &txs, today, mailer, &settings.mail_recipients, |day| {
        config::put(conn, config::REMINDER_LAST_NOTIFIED, &day.to_string())
    })
}

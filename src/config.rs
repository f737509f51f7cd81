// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;

pub const MAIL_ENDPOINT: &str = "mail.endpoint";
pub const MAIL_TOKEN: &str = "mail.token";
pub const MAIL_FROM: &str = "mail.from";
pub const MAIL_RECIPIENTS: &str = "mail.recipients";
pub const REMINDER_LAST_NOTIFIED: &str = "reminder.last_notified";

pub const KEYS: &[&str] = &[
    MAIL_ENDPOINT,
    MAIL_TOKEN,
    MAIL_FROM,
    MAIL_RECIPIENTS,
    REMINDER_LAST_NOTIFIED,
];

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s,]+@[^@\s,]+\.[^@\s,]+$").expect("email pattern"));

#[derive(Debug, Clone, Default, Serialize)]
pub struct Settings {
    pub mail_endpoint: Option<String>,
    #[serde(skip_serializing)]
    pub mail_token: Option<String>,
    pub mail_from: Option<String>,
    pub mail_recipients: Vec<String>,
    pub last_notified: Option<NaiveDate>,
}

impl Settings {
    pub fn load(conn: &Connection) -> Result<Self> {
        let recipients = get(conn, MAIL_RECIPIENTS)?
            .map(|s| split_recipients(&s))
            .unwrap_or_default();
        // A corrupt marker reads as "never notified".
        let last_notified = get(conn, REMINDER_LAST_NOTIFIED)?
            .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok());
        Ok(Self {
            mail_endpoint: get(conn, MAIL_ENDPOINT)?,
            mail_token: get(conn, MAIL_TOKEN)?,
            mail_from: get(conn, MAIL_FROM)?,
            mail_recipients: recipients,
            last_notified,
        })
    }
}

pub fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row("SELECT value FROM settings WHERE key=?1", params![key], |r| {
            r.get(0)
        })
        .optional()
        .with_context(|| format!("Read setting '{}'", key))?;
    Ok(v.filter(|s| !s.trim().is_empty()))
}

pub fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
    let key = key.trim();
    let value = value.trim();
    if !KEYS.contains(&key) {
        bail!("Unknown setting '{}' (known: {})", key, KEYS.join(", "));
    }
    let value = match key {
        MAIL_RECIPIENTS => {
            let list = split_recipients(value);
            for addr in &list {
                if !EMAIL.is_match(addr) {
                    return Err(anyhow!("Invalid email address '{}'", addr));
                }
            }
            list.join(",")
        }
        MAIL_FROM if !EMAIL.is_match(value) => {
            return Err(anyhow!("Invalid email address '{}'", value));
        }
        MAIL_ENDPOINT if !(value.starts_with("http://") || value.starts_with("https://")) => {
            return Err(anyhow!("Mail endpoint must be an http(s) URL, got '{}'", value));
        }
        REMINDER_LAST_NOTIFIED => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", value))?
            .to_string(),
        _ => value.to_string(),
    };
    put(conn, key, &value)
}

pub(crate) fn put(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

pub fn list(conn: &Connection) -> Result<Vec<(String, String)>> {
    let mut stmt = conn.prepare("SELECT key, value FROM settings ORDER BY key")?;
    let rows = stmt.query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))?;
    let mut out = Vec::new();
    for row in rows {
        let (k, v) = row?;
        let v = if k == MAIL_TOKEN { "********".to_string() } else { v };
        out.push((k, v));
    }
    Ok(out)
}

fn split_recipients(s: &str) -> Vec<String> {
    s.split([',', ';'])
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(|p| p.to_string())
        .collect()
}

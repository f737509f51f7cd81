// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use hearth::commands::doctor;
use hearth::db;
use hearth::projection::{DateKey, Dimension, aggregate, filter_by_window, totals};
use hearth::reminder::due_soon;
use rusqlite::Connection;
use rust_decimal::Decimal;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    conn.execute_batch(
        "PRAGMA foreign_keys = OFF;
         INSERT INTO transactions(id, type, amount, occurred_at) VALUES (1, 'income', '100', '2024-04-02');
         INSERT INTO transactions(id, type, amount, occurred_at) VALUES (2, 'transfer', '50', '2024-04-03');
         INSERT INTO transactions(id, type, amount, occurred_at) VALUES (3, 'expense', 'ten', '2024-04-04');
         INSERT INTO transactions(id, type, amount, is_paid, occurred_at) VALUES (4, 'expense', '20', 1, '2024-04-05');
         INSERT INTO transactions(id, type, amount, occurred_at) VALUES (5, 'expense', '5', '04/06/2024');
         INSERT INTO transactions(id, type, amount, occurred_at, member_id) VALUES (6, 'expense', '7', '2024-04-07', 42);",
    )
    .unwrap();
    conn
}

#[test]
fn flags_each_kind_of_problem() {
    let conn = setup();
    let kinds: Vec<(String, String)> = doctor::issues(&conn).unwrap();
    let has = |kind: &str, detail: &str| kinds.iter().any(|(k, d)| k == kind && d.starts_with(detail));
    assert!(has("unknown_type", "#2"));
    assert!(has("bad_amount", "#3 amount='ten'"));
    assert!(has("paid_without_amount", "#4"));
    assert!(has("bad_date", "#5 occurred_at"));
    assert!(has("dangling_reference", "#6 member_id=42"));
    assert!(!kinds.iter().any(|(_, d)| d.starts_with("#1 ")));
}

#[test]
fn malformed_rows_degrade_instead_of_failing_reports() {
    let conn = setup();
    let txs = db::load_transactions(&conn).unwrap();
    assert_eq!(txs.len(), 6);

    let window = filter_by_window(&txs, date("2024-04-01"), date("2024-04-30"), DateKey::Occurred);
    // #5 has an unreadable date and drops out of every window
    assert_eq!(window.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 2, 3, 4, 6]);

    let t = totals(window.iter().copied());
    assert_eq!(t.income, Decimal::from(100));
    // unknown type and unreadable amount count as zero
    assert_eq!(t.expense, Decimal::from(-27));

    let by_member = aggregate(window, Dimension::Member(&db::member_lookup(&conn).unwrap()));
    assert_eq!(by_member.len(), 1);
    assert_eq!(by_member["—"], Decimal::from(73));
}

#[test]
fn text_paid_flag_is_read_like_the_loader() {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    conn.execute(
        "INSERT INTO transactions(id, type, amount, is_paid, occurred_at)
         VALUES (1, 'expense', '30', 'true', '2024-04-01')",
        [],
    )
    .unwrap();
    assert!(db::load_transactions(&conn).unwrap()[0].is_paid);
    let found = doctor::issues(&conn).unwrap();
    assert_eq!(
        found,
        vec![("paid_without_amount".to_string(), "#1 counts its planned amount".to_string())]
    );
}

#[test]
fn unreadable_due_date_is_excluded_from_due_windows() {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    conn.execute(
        "INSERT INTO transactions(id, type, amount, occurred_at, due_date)
         VALUES (1, 'expense', '80', '2024-06-01', '2024-13-45')",
        [],
    )
    .unwrap();
    let txs = db::load_transactions(&conn).unwrap();
    let (start, end) = (date("2024-06-01"), date("2024-06-30"));
    assert!(filter_by_window(&txs, start, end, DateKey::Due).is_empty());
    assert_eq!(filter_by_window(&txs, start, end, DateKey::Occurred).len(), 1);
    assert!(due_soon(&txs, start).is_empty());

    let found = doctor::issues(&conn).unwrap();
    assert!(found.contains(&("bad_date".to_string(), "#1 due_date='2024-13-45'".to_string())));
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use hearth::commands::reports::{self, Group, GroupRow};
use hearth::{cli, db};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    conn.execute("INSERT INTO members(id,name) VALUES (1,'Ana'), (2,'Bruno')", [])
        .unwrap();
    conn
}

fn insert(conn: &Connection, kind: &str, amount: &str, occurred: &str, due: Option<&str>, member: Option<i64>) {
    conn.execute(
        "INSERT INTO transactions(type, amount, occurred_at, due_date, member_id) VALUES (?1,?2,?3,?4,?5)",
        params![kind, amount, occurred, due, member],
    )
    .unwrap();
}

fn rows(conn: &Connection, report: &str, group: Group, extra: &[&str]) -> Vec<GroupRow> {
    let mut args = vec!["hearth", "report", report];
    args.extend_from_slice(extra);
    let matches = cli::build_cli().get_matches_from(args);
    if let Some(("report", rep_m)) = matches.subcommand() {
        if let Some((_, sub)) = rep_m.subcommand() {
            return reports::group_rows(conn, sub, group).unwrap();
        }
    }
    panic!("report not parsed");
}

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

#[test]
fn by_date_over_march() {
    let conn = setup();
    insert(&conn, "income", "500", "2024-03-01", None, None);
    insert(&conn, "expense", "200", "2024-03-15", None, None);
    insert(&conn, "expense", "999", "2024-04-01", None, None);

    let got = rows(&conn, "by-date", Group::Date, &["--from", "2024-03-01", "--to", "2024-03-31"]);
    assert_eq!(
        got,
        vec![
            GroupRow { label: "2024-03-01".into(), value: d("500") },
            GroupRow { label: "2024-03-15".into(), value: d("-200") },
        ]
    );
}

#[test]
fn by_member_sums_unresolved_under_placeholder() {
    let conn = setup();
    insert(&conn, "expense", "30", "2024-05-02", None, Some(1));
    insert(&conn, "expense", "20", "2024-05-03", None, Some(2));
    insert(&conn, "income", "100", "2024-05-04", None, Some(1));
    insert(&conn, "expense", "7", "2024-05-05", None, None);
    insert(&conn, "expense", "3", "2024-05-06", None, None);

    let got = rows(&conn, "by-member", Group::Member, &["--month", "2024-05"]);
    assert_eq!(
        got,
        vec![
            GroupRow { label: "Ana".into(), value: d("70") },
            GroupRow { label: "Bruno".into(), value: d("-20") },
            GroupRow { label: "—".into(), value: d("-10") },
        ]
    );
}

#[test]
fn due_key_moves_bills_into_their_due_month() {
    let conn = setup();
    insert(&conn, "expense", "700", "2024-02-27", Some("2024-03-05"), None);
    insert(&conn, "income", "1000", "2024-03-01", None, None);

    let occurred = rows(&conn, "by-date", Group::Date, &["--month", "2024-03"]);
    assert_eq!(occurred.len(), 1);

    let due = rows(&conn, "by-date", Group::Date, &["--month", "2024-03", "--key", "due"]);
    assert_eq!(
        due,
        vec![
            GroupRow { label: "2024-03-01".into(), value: d("1000") },
            GroupRow { label: "2024-03-05".into(), value: d("-700") },
        ]
    );
}

#[test]
fn repeated_reports_are_stable() {
    let conn = setup();
    for (i, m) in [(1, Some(2)), (2, Some(1)), (3, None), (4, Some(2))] {
        insert(&conn, "expense", &i.to_string(), "2024-07-01", None, m);
    }
    let a = rows(&conn, "by-member", Group::Member, &["--month", "2024-07"]);
    let b = rows(&conn, "by-member", Group::Member, &["--month", "2024-07"]);
    assert_eq!(a, b);
    let labels: Vec<&str> = a.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, vec!["Ana", "Bruno", "—"]);
}

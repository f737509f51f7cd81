// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use hearth::{cli, commands::budgets, db};
use rusqlite::{Connection, params};

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    conn.execute("INSERT INTO categories(name) VALUES('Dining'), ('Fuel')", [])
        .unwrap();
    conn
}

fn budget(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut full = vec!["hearth", "budget"];
    full.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(full);
    if let Some(("budget", b_m)) = matches.subcommand() {
        budgets::handle(conn, b_m)
    } else {
        panic!("no budget subcommand");
    }
}

#[test]
fn set_twice_keeps_last_amount() {
    let conn = setup();
    budget(&conn, &["set", "--month", "2025-08", "--category", "Dining", "--amount", "50"]).unwrap();
    budget(&conn, &["set", "--month", "2025-08", "--category", "Dining", "--amount", "80"]).unwrap();
    let (n, amt): (i64, String) = conn
        .query_row("SELECT COUNT(*), MAX(amount) FROM budgets", [], |r| {
            Ok((r.get(0)?, r.get(1)?))
        })
        .unwrap();
    assert_eq!(n, 1);
    assert_eq!(amt, "80");
}

#[test]
fn negative_budget_is_rejected() {
    let conn = setup();
    let err = budget(&conn, &["set", "--month", "2025-08", "--category", "Dining", "--amount=-5"])
        .unwrap_err();
    assert!(err.to_string().contains("must not be negative"));
}

#[test]
fn report_compares_budget_with_effective_spend() {
    let conn = setup();
    budget(&conn, &["set", "--month", "2025-08", "--category", "Dining", "--amount", "50"]).unwrap();
    let dining: i64 = conn
        .query_row("SELECT id FROM categories WHERE name='Dining'", [], |r| r.get(0))
        .unwrap();
    // paid below plan: the paid amount counts
    conn.execute(
        "INSERT INTO transactions(type, amount, planned_amount, paid_amount, is_paid, occurred_at, category_id)
         VALUES('expense','20','20','18',1,'2025-08-10',?1)",
        params![dining],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO transactions(type, amount, occurred_at, category_id) VALUES('expense','12.5','2025-08-21',?1)",
        params![dining],
    )
    .unwrap();
    // income in the same category does not count as spending
    conn.execute(
        "INSERT INTO transactions(type, amount, occurred_at, category_id) VALUES('income','100','2025-08-22',?1)",
        params![dining],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO transactions(type, amount, occurred_at) VALUES('expense','9','2025-08-03')",
        [],
    )
    .unwrap();

    let rows = budgets::report_rows(&conn, "2025-08").unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].category, "Dining");
    assert_eq!(format!("{:.2}", rows[0].spent), "30.50");
    assert_eq!(format!("{:.2}", rows[0].remaining), "19.50");
    assert_eq!(rows[1].category, "—");
    assert_eq!(format!("{:.2}", rows[1].spent), "9.00");
}

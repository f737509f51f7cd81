// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use hearth::{cli, commands::exporter, db};
use rusqlite::Connection;
use tempfile::tempdir;

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    conn.execute_batch(
        "INSERT INTO members(name) VALUES ('Ana');
         INSERT INTO transactions(type, description, amount, occurred_at, member_id)
             VALUES ('income', 'Salary', '3000', '2024-03-01', 1);
         INSERT INTO transactions(type, description, amount, planned_amount, paid_amount, is_paid, occurred_at)
             VALUES ('expense', 'Rent', '1500', '1500', '1450', 1, '2024-03-05');",
    )
    .unwrap();
    conn
}

fn export(conn: &Connection, format: &str, out: &str) {
    let matches = cli::build_cli().get_matches_from([
        "hearth",
        "export",
        "transactions",
        "--format",
        format,
        "--out",
        out,
    ]);
    let (_, sub) = matches.subcommand().unwrap();
    exporter::handle(conn, sub).unwrap();
}

#[test]
fn json_export_carries_effective_values_and_labels() {
    let conn = setup();
    let dir = tempdir().unwrap();
    let out = dir.path().join("tx.json");
    export(&conn, "json", out.to_str().unwrap());

    let rows: Vec<serde_json::Value> =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["type"], "income");
    assert_eq!(rows[0]["member"], "Ana");
    assert_eq!(rows[0]["effective_value"], "3000");
    assert_eq!(rows[1]["member"], "—");
    assert_eq!(rows[1]["effective_value"], "-1450");
    assert_eq!(rows[1]["is_paid"], true);
}

#[test]
fn csv_export_has_header_and_rows() {
    let conn = setup();
    let dir = tempdir().unwrap();
    let out = dir.path().join("tx.csv");
    export(&conn, "csv", out.to_str().unwrap());

    let mut rdr = csv::Reader::from_path(&out).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(&headers[0], "id");
    assert_eq!(&headers[1], "type");
    let records: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 2);
    assert_eq!(&records[1][2], "Rent");
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, arg, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(arg!(--json "Print as pretty JSON").action(ArgAction::SetTrue))
        .arg(arg!(--jsonl "Print as JSON lines").action(ArgAction::SetTrue))
}

fn window_args(cmd: Command) -> Command {
    cmd.arg(arg!(--month <MONTH> "Calendar month YYYY-MM (overrides --from/--to)"))
        .arg(arg!(--from <DATE> "Window start YYYY-MM-DD (default: start of this month)"))
        .arg(arg!(--to <DATE> "Window end YYYY-MM-DD (default: end of this month)"))
}

fn key_arg(default: &'static str) -> Arg {
    arg!(--key <KEY> "Date anchoring the window: occurred|due")
        .value_parser(["occurred", "due"])
        .default_value(default)
}

fn ref_args(cmd: Command) -> Command {
    cmd.arg(arg!(--member <NAME> "Household member"))
        .arg(arg!(--category <NAME> "Category"))
        .arg(arg!(--account <NAME> "Account"))
        .arg(arg!(--card <NAME> "Credit card"))
}

fn report(name: &'static str, about: &'static str, key_default: &'static str) -> Command {
    json_flags(window_args(Command::new(name).about(about))).arg(key_arg(key_default))
}

pub fn build_cli() -> Command {
    Command::new("hearth")
        .about("Household finance tracker: transactions, fixed bills, budgets, card limits and cash-flow projections")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("db")
                .long("db")
                .value_name("PATH")
                .env("HEARTH_DB")
                .global(true)
                .help("SQLite database file (default: platform data dir)"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .global(true)
                .value_parser(["error", "warn", "info", "debug", "trace"])
                .default_value("warn")
                .help("Log level when RUST_LOG is not set"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("member")
                .about("Household members")
                .subcommand(
                    Command::new("add")
                        .arg(arg!(--name <NAME>).required(true))
                        .arg(arg!(--email <EMAIL>)),
                )
                .subcommand(Command::new("list"))
                .subcommand(Command::new("rm").arg(arg!(--name <NAME>).required(true))),
        )
        .subcommand(
            Command::new("category")
                .about("Transaction categories")
                .subcommand(Command::new("add").arg(arg!(--name <NAME>).required(true)))
                .subcommand(Command::new("list"))
                .subcommand(Command::new("rm").arg(arg!(--name <NAME>).required(true))),
        )
        .subcommand(
            Command::new("account")
                .about("Bank accounts and wallets")
                .subcommand(
                    Command::new("add")
                        .arg(arg!(--name <NAME>).required(true))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .value_name("TYPE")
                                .required(true)
                                .help("checking, savings, cash, ..."),
                        ),
                )
                .subcommand(Command::new("list"))
                .subcommand(Command::new("rm").arg(arg!(--name <NAME>).required(true))),
        )
        .subcommand(
            Command::new("card")
                .about("Credit cards and their limits")
                .subcommand(
                    Command::new("add")
                        .arg(arg!(--name <NAME>).required(true))
                        .arg(arg!(--limit <AMOUNT>).required(true))
                        .arg(arg!(--"due-day" <DAY>).value_parser(value_parser!(u32).range(1..=31))),
                )
                .subcommand(json_flags(Command::new("list").about("Limits, usage and availability")))
                .subcommand(Command::new("rm").arg(arg!(--name <NAME>).required(true))),
        )
        .subcommand(
            Command::new("tx")
                .about("Income and expense transactions")
                .subcommand(ref_args(
                    Command::new("add")
                        .arg(
                            arg!(--kind <KIND>)
                                .required(true)
                                .value_parser(["income", "expense"]),
                        )
                        .arg(arg!(--date <DATE> "Occurred date YYYY-MM-DD").required(true))
                        .arg(arg!(--amount <AMOUNT>).required(true))
                        .arg(arg!(--planned <AMOUNT> "Forecast amount"))
                        .arg(arg!(--due <DATE> "Due date YYYY-MM-DD"))
                        .arg(arg!(--description <TEXT>))
                        .arg(arg!(--paid "Record as already paid").action(ArgAction::SetTrue)),
                ))
                .subcommand(
                    json_flags(window_args(Command::new("list")))
                        .arg(key_arg("occurred"))
                        .arg(arg!(--member <NAME>))
                        .arg(arg!(--category <NAME>))
                        .arg(arg!(--limit <N>).value_parser(value_parser!(usize))),
                )
                .subcommand(
                    Command::new("pay")
                        .about("Mark a transaction as paid")
                        .arg(arg!(--id <ID>).required(true).value_parser(value_parser!(i64)))
                        .arg(arg!(--amount <AMOUNT> "Settled amount (default: planned)"))
                        .arg(arg!(--date <DATE> "Payment date (default: today)")),
                )
                .subcommand(ref_args(
                    Command::new("installments")
                        .about("Split a purchase into monthly installments")
                        .arg(arg!(--description <TEXT>).required(true))
                        .arg(arg!(--total <AMOUNT>).required(true))
                        .arg(
                            arg!(--count <N>)
                                .required(true)
                                .value_parser(value_parser!(u32).range(1..=360)),
                        )
                        .arg(arg!(--"first-due" <DATE>).required(true))
                        .arg(arg!(--date <DATE> "Purchase date (default: first due)"))
                        .arg(
                            arg!(--kind <KIND>)
                                .value_parser(["income", "expense"])
                                .default_value("expense"),
                        ),
                )),
        )
        .subcommand(
            Command::new("bill")
                .about("Fixed recurring bills")
                .subcommand(ref_args(
                    Command::new("add")
                        .arg(arg!(--description <TEXT>).required(true))
                        .arg(arg!(--amount <AMOUNT>).required(true))
                        .arg(
                            arg!(--day <DAY> "Day of month the bill is due")
                                .required(true)
                                .value_parser(value_parser!(u32).range(1..=31)),
                        ),
                ))
                .subcommand(Command::new("list"))
                .subcommand(
                    Command::new("rm").arg(arg!(--id <ID>).required(true).value_parser(value_parser!(i64))),
                )
                .subcommand(
                    Command::new("generate")
                        .about("Create this month's planned expenses from active bills")
                        .arg(arg!(--month <MONTH>).required(true)),
                ),
        )
        .subcommand(
            Command::new("budget")
                .about("Per-category monthly budgets")
                .subcommand(
                    Command::new("set")
                        .arg(arg!(--month <MONTH>).required(true))
                        .arg(arg!(--category <NAME>).required(true))
                        .arg(arg!(--amount <AMOUNT>).required(true)),
                )
                .subcommand(Command::new("list").arg(arg!(--month <MONTH>)))
                .subcommand(json_flags(
                    Command::new("report").arg(arg!(--month <MONTH>).required(true)),
                )),
        )
        .subcommand(
            Command::new("report")
                .about("Totals, grouped sums and cash-flow series")
                .subcommand(report("totals", "Income, expense and balance", "occurred"))
                .subcommand(report("by-member", "Effective value per member", "occurred"))
                .subcommand(report("by-category", "Effective value per category", "occurred"))
                .subcommand(report("by-date", "Effective value per date", "occurred"))
                .subcommand(report("cashflow", "Daily net and running balance", "due")),
        )
        .subcommand(
            Command::new("remind")
                .about("Mail unpaid bills due in the next 3 days, once per day")
                .arg(arg!(--today <DATE> "Override today's date"))
                .arg(
                    arg!(--"dry-run" "Show what is due without sending or recording")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Persisted settings")
                .subcommand(
                    Command::new("set")
                        .arg(arg!(--key <KEY>).required(true))
                        .arg(arg!(--value <VALUE>).required(true)),
                )
                .subcommand(Command::new("get").arg(arg!(--key <KEY>).required(true)))
                .subcommand(Command::new("list")),
        )
        .subcommand(
            Command::new("export").subcommand(
                Command::new("transactions")
                    .arg(
                        arg!(--format <FORMAT>)
                            .value_parser(["csv", "json"])
                            .default_value("csv"),
                    )
                    .arg(arg!(--out <PATH>).required(true)),
            ),
        )
        .subcommand(Command::new("doctor").about("Report malformed or dangling records"))
}

//! dbchat: ask a database questions in plain language.
//!
//! Connects with a `mysql://`, `postgresql://` or `mssql://` connection
//! string, reads the schema and has a chat model write the SQL.
//!
//! # Security Guarantees
//! - Passwords and API keys are never logged
//! - Generated SQL only runs when `--run` is given

use clap::Parser;
use dbchat_cli::{Cli, commands};
use dbchat_core::logging::init_logging;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    init_logging(cli.global.verbose, cli.global.quiet)?;

    commands::run(cli).await
}

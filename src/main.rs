//! # Stack Schema Copy CLI
//!
//! Binary entry point for the `stack-schema-copy` command-line tool.
//!
//! Its responsibilities are:
//! - Loading a `.env` file so login credentials can live outside the shell.
//! - Parsing command-line arguments using `clap`.
//! - Running the copy and translating fatal errors into a non-zero exit.
//!
//! The copy logic itself lives in the `stack_schema_copy` library crate.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = cli::Cli::parse();
    cli.execute()
}

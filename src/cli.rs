//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::Parser;

use crate::commands;

/// Copy a content type schema to other stacks, remapping extension references
#[derive(Parser, Debug)]
#[command(name = "stack-schema-copy")]
#[command(version, about, long_about = None)]
#[command(override_usage = "stack-schema-copy --ct <UID> [OPTIONS]")]
pub struct Cli {
    #[command(flatten)]
    copy: commands::copy::CopyArgs,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);
        commands::copy::execute(self.copy, &self.color)
    }
}

fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    // Already initialised when called twice in one process (tests)
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}

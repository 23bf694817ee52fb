//! Copy command implementation
//!
//! Resolves configuration from the YAML file, flags and environment, logs
//! in, then runs the copy pipeline on a single-threaded runtime:
//!
//! 1. Authenticate (cached token, then password)
//! 2. Fetch the content type and source extensions
//! 3. Remap and write one artifact per target stack

use anyhow::Result;
use clap::Args;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use stack_schema_copy::api::HttpApi;
use stack_schema_copy::artifact::Format;
use stack_schema_copy::auth::{Authenticator, CredentialSource};
use stack_schema_copy::config::{self, normalize_base_url};
use stack_schema_copy::copy::{self, CopyOptions, UnresolvedPolicy};
use stack_schema_copy::credentials::FileTokenStore;
use stack_schema_copy::defaults::{self, EMAIL_ENV, PASSWORD_ENV};
use stack_schema_copy::error::Error;
use stack_schema_copy::model::Credentials;
use stack_schema_copy::output::{OutputConfig, Reporter};
use stack_schema_copy::suggestions;

/// Arguments for copying a content type
#[derive(Args, Debug)]
pub struct CopyArgs {
    /// Uid of the content type to copy
    #[arg(
        long = "ct",
        visible_alias = "content-type",
        alias = "ContentType",
        value_name = "UID"
    )]
    pub content_type: String,

    /// Path to config file
    #[arg(short, long, value_name = "PATH", env = "STACK_COPY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Management API base URL (overrides the config file)
    #[arg(long, value_name = "URL", env = "STACK_COPY_BASE_URL")]
    pub base_url: Option<String>,

    /// Session token cache (overrides the config file)
    #[arg(long, value_name = "PATH", env = "STACK_COPY_TOKEN_FILE")]
    pub token_file: Option<PathBuf>,

    /// Directory to create the per-stack output directories in (defaults to current directory)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Login email
    #[arg(long, value_name = "EMAIL", env = EMAIL_ENV, hide_env_values = true)]
    pub email: Option<String>,

    /// Login password
    #[arg(long, value_name = "PASSWORD", env = PASSWORD_ENV, hide_env_values = true)]
    pub password: Option<String>,

    /// Write artifacts even if some extension references could not be matched
    #[arg(long)]
    pub allow_unresolved: bool,

    /// Request timeout in seconds
    #[arg(
        long,
        value_name = "SECS",
        default_value_t = defaults::DEFAULT_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: u64,

    /// Pretty-print the written JSON
    #[arg(long)]
    pub pretty: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Credentials from flags/env, prompting for what is missing when a
/// terminal is attached.
struct CliCredentials {
    email: Option<String>,
    password: Option<String>,
    interactive: bool,
}

impl CliCredentials {
    fn missing(name: &str, env: &str, flag: &str) -> Error {
        Error::MissingCredential {
            name: name.to_string(),
            env: env.to_string(),
            flag: flag.to_string(),
        }
    }
}

fn prompt_error(e: dialoguer::Error) -> Error {
    Error::Authentication {
        message: format!("prompt failed: {}", e),
    }
}

impl CredentialSource for CliCredentials {
    fn credentials(&self) -> stack_schema_copy::error::Result<Credentials> {
        let email = match (&self.email, self.interactive) {
            (Some(email), _) => email.clone(),
            (None, true) => dialoguer::Input::<String>::new()
                .with_prompt("Email")
                .interact_text()
                .map_err(prompt_error)?,
            (None, false) => return Err(Self::missing("email", EMAIL_ENV, "email")),
        };
        let password = match (&self.password, self.interactive) {
            (Some(password), _) => password.clone(),
            (None, true) => dialoguer::Password::new()
                .with_prompt("Password")
                .interact()
                .map_err(prompt_error)?,
            (None, false) => return Err(Self::missing("password", PASSWORD_ENV, "password")),
        };
        Ok(Credentials { email, password })
    }
}

/// Execute the copy
pub fn execute(args: CopyArgs, color_flag: &str) -> Result<()> {
    let config_path = args
        .config
        .unwrap_or_else(|| PathBuf::from(defaults::DEFAULT_CONFIG_FILE));
    if !config_path.exists() {
        return Err(suggestions::config_not_found(&config_path));
    }
    let config = config::from_file(&config_path)?;

    let base_url = match &args.base_url {
        Some(url) => normalize_base_url(url)?,
        None => config.base_url()?,
    };
    let token_file = args.token_file.unwrap_or_else(|| config.token_file.clone());
    let options = CopyOptions {
        content_type_uid: args.content_type,
        output_root: args.output.unwrap_or_else(|| PathBuf::from(".")),
        policy: if args.allow_unresolved {
            UnresolvedPolicy::KeepSource
        } else {
            UnresolvedPolicy::SkipTarget
        },
        format: if args.pretty {
            Format::Pretty
        } else {
            Format::Compact
        },
    };

    let reporter = Reporter::new(OutputConfig::from_env_and_flag(color_flag), args.quiet);
    let api = HttpApi::new(base_url, Duration::from_secs(args.timeout))?;
    let store = FileTokenStore::new(&token_file);
    let credentials = CliCredentials {
        email: args.email.filter(|e| !e.is_empty()),
        password: args.password.filter(|p| !p.is_empty()),
        interactive: std::io::stdin().is_terminal(),
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let report = runtime.block_on(async {
        let (token, _) = Authenticator::new(&api, &store, &credentials)
            .authenticate(&reporter)
            .await
            .map_err(|e| suggestions::could_not_log_in(&e, &token_file))?;
        reporter.logged_in();

        copy::run(
            &api,
            &token,
            &config.source,
            &config.targets,
            &options,
            &reporter,
        )
        .await
        .map_err(|e| suggestions::schema_unavailable(&options.content_type_uid, &config.source.name, &e))
    })?;

    reporter.summary(&report);
    if report.failed() > 0 {
        anyhow::bail!("{} target stack(s) could not be written", report.failed());
    }
    Ok(())
}

//! # Error Suggestions
//!
//! Helpers that turn fatal conditions into messages telling the operator
//! what went wrong AND how to fix it.
//!
//! ```rust,ignore
//! use stack_schema_copy::suggestions;
//!
//! return Err(suggestions::config_not_found(path));
//! ```

use std::path::Path;

use crate::defaults::{EMAIL_ENV, PASSWORD_ENV};
use crate::error::Error;

/// The configuration file does not exist.
pub fn config_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Configuration file not found: {path}\n\n\
         hint: Create a .stack-schema-copy.yaml file listing the source and target stacks\n\
         hint: Use -c/--config to specify a different path\n\
         hint: Set STACK_COPY_CONFIG environment variable",
        path = path.display()
    )
}

/// Could not log in at all.
pub fn could_not_log_in(error: &Error, token_file: &Path) -> anyhow::Error {
    let detail = match error {
        Error::MissingCredential { .. } => String::new(),
        Error::Network { .. } => "\nhint: Check network access and --base-url".to_string(),
        _ => format!("\nhint: Check {EMAIL_ENV} and {PASSWORD_ENV} (a .env file is read too)"),
    };
    anyhow::anyhow!(
        "Could not log in.\n\
         error: {error}\n{detail}\n\
         hint: Delete {token} to discard a cached session token",
        token = token_file.display()
    )
}

/// The content type could not be fetched from the source stack.
pub fn schema_unavailable(content_type_uid: &str, source: &str, error: &Error) -> anyhow::Error {
    let hint = match error {
        Error::Api { code: 118, .. } => {
            "hint: Check the content type uid (not its title) in the source stack".to_string()
        }
        Error::Api { code: 412, .. } => "hint: Check the source stack key in the configuration".to_string(),
        _ => "hint: Re-run with --log-level debug for request details".to_string(),
    };
    anyhow::anyhow!(
        "Could not copy content type '{content_type_uid}' from {source}\n\
         error: {error}\n\n\
         {hint}"
    )
}

//! Default values for stack-schema-copy configuration.
//!
//! This module provides centralized default values used across the CLI and
//! the library, ensuring consistency and avoiding duplication.

use std::path::PathBuf;

/// Base URL of the content management API.
pub const DEFAULT_BASE_URL: &str = "https://api.contentstack.io/v3/";

/// Configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".stack-schema-copy.yaml";

/// Cached session token, relative to the working directory.
pub const DEFAULT_TOKEN_FILE: &str = ".authtoken";

/// Request timeout applied to every API call.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variable holding the login email.
pub const EMAIL_ENV: &str = "USER_EMAIL";

/// Environment variable holding the login password.
pub const PASSWORD_ENV: &str = "USER_PASSWORD";

/// Returns the default token cache path.
///
/// This can be overridden by the `token_file` configuration key, the
/// `--token-file` CLI flag, or the `STACK_COPY_TOKEN_FILE` environment
/// variable.
pub fn default_token_path() -> PathBuf {
    PathBuf::from(".").join(DEFAULT_TOKEN_FILE)
}

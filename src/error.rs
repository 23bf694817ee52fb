//! # Error Handling
//!
//! This module defines the centralized error type for `stack-schema-copy`.
//! It uses the `thiserror` library to build a single `Error` enum covering
//! every failure the library can report, each with enough context (stack,
//! URL, field) for the operator to act on it.
//!
//! ## Key Components
//!
//! - **`Error`**: The enum of all library failures. Whether a failure is
//!   fatal is decided by the caller: a schema fetch error ends the run, an
//!   extension fetch error for a target only skips that target.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.

use thiserror::Error;

/// Main error type for stack-schema-copy operations
#[derive(Error, Debug)]
pub enum Error {
    /// The configuration file could not be parsed or failed validation.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// Neither the cached token nor the password login produced a session.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Credentials needed for the password login were not supplied.
    #[error("Missing credential: {name}\n  hint: set {env} or pass --{flag}")]
    MissingCredential {
        name: String,
        env: String,
        flag: String,
    },

    /// The remote API answered with an `error_code` in its body.
    #[error("API error {code} from {endpoint}: {message}")]
    Api {
        endpoint: String,
        code: i64,
        message: String,
    },

    /// The response body did not have the expected shape.
    #[error("Unexpected response from {endpoint}: {message}")]
    UnexpectedResponse { endpoint: String, message: String },

    /// The request could not be sent, timed out, or returned an unreadable body.
    #[error("Network operation error: {url} - {message}")]
    Network { url: String, message: String },

    /// A field references an extension that could not be matched.
    #[error("Unmatched extension reference in field '{field}': {extension_uid} ({reason})")]
    UnmatchedExtension {
        field: String,
        extension_uid: String,
        reason: String,
    },

    /// A filesystem operation on the token cache or output tree failed.
    #[error("Filesystem operation error: {message}")]
    Filesystem { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

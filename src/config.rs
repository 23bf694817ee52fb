//! # Configuration Schema and Parsing
//!
//! This module defines the `.stack-schema-copy.yaml` configuration file: the
//! source stack the content type is read from, the target stacks it is copied
//! to, and optionally the API base URL and token cache location.
//!
//! ```yaml
//! base_url: https://api.contentstack.io/v3/
//! token_file: .authtoken
//! source:
//!   name: Stylish Outdoor Gear
//!   key: blt2e8819a463338e6b
//! targets:
//!   - name: Goal-Oriented Bicycling
//!     key: blt38fde950b30192d4
//!     # optional: skip fetching this stack's extensions
//!     extensions:
//!       - {uid: b9, title: Map, type: widget}
//! ```
//!
//! `parse` validates the file after deserializing it, so a `Config` that
//! exists always has at least one target and a usable base URL.

use crate::defaults;
use crate::error::{Error, Result};
use crate::model::Stack;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Parsed and validated configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the management API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Where the session token is cached between runs.
    #[serde(default = "defaults::default_token_path")]
    pub token_file: PathBuf,
    /// Stack the content type is read from.
    pub source: Stack,
    /// Stacks that receive a remapped copy.
    pub targets: Vec<Stack>,
}

fn default_base_url() -> String {
    defaults::DEFAULT_BASE_URL.to_string()
}

impl Config {
    /// The base URL as a `Url`, with a trailing slash so relative endpoint
    /// paths join under it.
    pub fn base_url(&self) -> Result<Url> {
        normalize_base_url(&self.base_url)
    }
}

/// Parse a base URL, appending the trailing `/` that `Url::join` needs.
pub fn normalize_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw.trim())?;
    if url.cannot_be_a_base() {
        return Err(Error::ConfigParse {
            message: format!("Base URL cannot be used as a base: {}", raw),
            hint: Some("Use an absolute http(s) URL such as https://api.contentstack.io/v3/".to_string()),
        });
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Parse a YAML string into a validated `Config`.
pub fn parse(yaml_content: &str) -> Result<Config> {
    let config: Config = serde_yaml::from_str(yaml_content).map_err(|e| Error::ConfigParse {
        message: e.to_string(),
        hint: None,
    })?;
    validate(&config)?;
    Ok(config)
}

/// Read and parse a configuration file.
pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    parse(&content)
}

fn validate(config: &Config) -> Result<()> {
    if config.targets.is_empty() {
        return Err(Error::ConfigParse {
            message: "No target stacks configured".to_string(),
            hint: Some("Add at least one entry under 'targets:' with a name and key".to_string()),
        });
    }

    for (role, stack) in std::iter::once(("source", &config.source))
        .chain(config.targets.iter().map(|t| ("target", t)))
    {
        if stack.name.trim().is_empty() {
            return Err(Error::ConfigParse {
                message: format!("A {} stack has an empty name (key: {})", role, stack.key),
                hint: None,
            });
        }
        if stack.key.trim().is_empty() {
            return Err(Error::ConfigParse {
                message: format!("{} stack '{}' has an empty key", role, stack.name),
                hint: Some("Copy the stack API key from the stack settings".to_string()),
            });
        }
    }

    if let Some(dup) = config
        .targets
        .iter()
        .find(|t| t.key == config.source.key)
    {
        return Err(Error::ConfigParse {
            message: format!("Target stack '{}' is the source stack", dup.name),
            hint: None,
        });
    }

    config.base_url()?;
    Ok(())
}

//! # Credential Store
//!
//! Persistence of the session token between runs. The token is kept as
//! plain UTF-8 text in a single file; no expiry is recorded, the
//! authenticator decides whether a cached token is still good.
//!
//! The `CredentialStore` trait is the seam the authenticator depends on, so
//! tests can swap in an in-memory store.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::{Error, Result};
use crate::model::AuthToken;

/// Load and save a cached session token.
pub trait CredentialStore: Send + Sync {
    /// The cached token, or `None` if there is none. Never an error: an
    /// unreadable cache just means the caller has to log in again.
    fn load(&self) -> Option<AuthToken>;

    /// Replace the cached token.
    fn save(&self, token: &AuthToken) -> Result<()>;
}

/// Token cache backed by a file on disk.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Strip whitespace and any quote characters left over from JSON encoding.
fn clean_token(raw: &str) -> String {
    raw.trim().replace('"', "")
}

impl CredentialStore for FileTokenStore {
    fn load(&self) -> Option<AuthToken> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No token cache at {}", self.path.display());
                return None;
            }
            Err(e) => {
                warn!(
                    "Ignoring unreadable token cache {}: {}",
                    self.path.display(),
                    e
                );
                return None;
            }
        };

        let token = clean_token(&raw);
        if token.is_empty() {
            debug!("Token cache {} is empty", self.path.display());
            return None;
        }
        Some(AuthToken::new(token))
    }

    fn save(&self, token: &AuthToken) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::Filesystem {
                message: format!("Failed to create directory '{}': {}", parent.display(), e),
            })?;
        }
        fs::write(&self.path, clean_token(token.as_str())).map_err(|e| Error::Filesystem {
            message: format!(
                "Failed to write token cache '{}': {}",
                self.path.display(),
                e
            ),
        })
    }
}

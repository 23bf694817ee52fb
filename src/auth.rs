//! # Session Authentication
//!
//! Obtains a session token for the run. A cached token is preferred so that
//! an existing session is not invalidated by logging in again:
//!
//! 1. **Cached token**: load it from the `CredentialStore` and probe it. If
//!    the probe succeeds the token is used as is.
//! 2. **Password login**: entered when there is no cached token or the probe
//!    failed. One attempt; on success the new token is written back to the
//!    store.
//!
//! There are no retries. If the API refuses the password login the caller
//! gets `Error::Authentication`; transport failures are passed through
//! unchanged. Either way the run ends.

use log::{info, warn};

use crate::api::ManagementApi;
use crate::credentials::CredentialStore;
use crate::error::{Error, Result};
use crate::model::{AuthToken, Credentials};

/// How the token for this run was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionSource {
    Cached,
    Password,
}

/// Supplies login credentials when the password path is taken.
///
/// Resolved lazily, so a valid cached token never triggers a prompt.
pub trait CredentialSource: Send + Sync {
    fn credentials(&self) -> Result<Credentials>;
}

impl CredentialSource for Credentials {
    fn credentials(&self) -> Result<Credentials> {
        Ok(self.clone())
    }
}

/// Progress hooks, so the CLI can report each step.
pub trait AuthObserver {
    fn using_cached_token(&self) {}
    fn cached_token_rejected(&self, _error: &Error) {}
    fn logging_in(&self) {}
    fn token_saved(&self) {}
}

/// Observer that reports nothing.
pub struct Silent;

impl AuthObserver for Silent {}

/// Runs the two-step login against an API and a token cache.
pub struct Authenticator<'a> {
    api: &'a dyn ManagementApi,
    store: &'a dyn CredentialStore,
    credentials: &'a dyn CredentialSource,
}

impl<'a> Authenticator<'a> {
    pub fn new(
        api: &'a dyn ManagementApi,
        store: &'a dyn CredentialStore,
        credentials: &'a dyn CredentialSource,
    ) -> Self {
        Self {
            api,
            store,
            credentials,
        }
    }

    /// Obtain a usable token, reporting progress to `observer`.
    pub async fn authenticate(
        &self,
        observer: &dyn AuthObserver,
    ) -> Result<(AuthToken, SessionSource)> {
        if let Some(token) = self.store.load() {
            observer.using_cached_token();
            match self.api.validate_token(&token).await {
                Ok(()) => {
                    info!("Cached token accepted");
                    return Ok((token, SessionSource::Cached));
                }
                Err(e) => {
                    info!("Cached token rejected: {}", e);
                    observer.cached_token_rejected(&e);
                }
            }
        }

        observer.logging_in();
        let credentials = self.credentials.credentials()?;
        let token = self
            .api
            .create_session(&credentials)
            .await
            .map_err(|e| match e {
                Error::Api { message, .. } => Error::Authentication { message },
                other => other,
            })?;

        match self.store.save(&token) {
            Ok(()) => observer.token_saved(),
            // The session is still good for this run
            Err(e) => warn!("Could not cache session token: {}", e),
        }

        Ok((token, SessionSource::Password))
    }
}

//! # Content Management API
//!
//! This module is the only place that talks to the remote API. The rest of
//! the crate depends on the `ManagementApi` trait, in the same way the copy
//! pipeline depends on `CredentialStore` for the token cache, so every flow
//! can be exercised against an in-memory double.
//!
//! ## Endpoints
//!
//! | Operation            | Request                                                   | Payload key     |
//! |----------------------|-----------------------------------------------------------|-----------------|
//! | `validate_token`     | `GET user` with `authtoken`                               | `user`          |
//! | `create_session`     | `POST user-session` with `{"user": {email, password}}`    | `user.authtoken`|
//! | `fetch_content_type` | `GET content_types/{uid}?include_global_schema=true`      | `content_type`  |
//! | `fetch_extensions`   | `GET extensions?include_marketplace_extensions=true`      | `extensions`    |
//!
//! Stack-scoped requests carry the stack API key in the `api_key` header.
//! The API reports failures as a JSON body with `error_code` and
//! `error_message`, sometimes with a 2xx status, so the body is checked
//! before the status.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};
use url::Url;

use crate::error::{Error, Result};
use crate::model::{AuthToken, ContentType, Credentials, Extension, Stack};

/// Operations the copy workflow needs from the remote API.
#[async_trait]
pub trait ManagementApi: Send + Sync {
    /// Probe a session token. `Ok` means the API accepted it.
    async fn validate_token(&self, token: &AuthToken) -> Result<()>;

    /// Log in with email and password and return the new session token.
    async fn create_session(&self, credentials: &Credentials) -> Result<AuthToken>;

    /// Fetch a content type from `stack`, with global fields inlined.
    async fn fetch_content_type(
        &self,
        stack: &Stack,
        token: &AuthToken,
        content_type_uid: &str,
    ) -> Result<ContentType>;

    /// List the extensions and marketplace apps installed in `stack`.
    async fn fetch_extensions(&self, stack: &Stack, token: &AuthToken) -> Result<Vec<Extension>>;
}

/// `ManagementApi` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: Url,
}

impl HttpApi {
    /// Build a client for `base_url`. Every request is bounded by `timeout`.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Network {
                url: base_url.to_string(),
                message: e.to_string(),
            })?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    fn content_type_url(&self, content_type_uid: &str) -> Result<Url> {
        let mut url = self.endpoint("content_types")?;
        url.path_segments_mut()
            .map_err(|_| Error::ConfigParse {
                message: format!("Base URL cannot be used as a base: {}", self.base_url),
                hint: None,
            })?
            .push(content_type_uid);
        url.query_pairs_mut()
            .append_pair("include_global_schema", "true");
        Ok(url)
    }

    fn extensions_url(&self) -> Result<Url> {
        let mut url = self.endpoint("extensions")?;
        url.query_pairs_mut()
            .append_pair("include_marketplace_extensions", "true");
        Ok(url)
    }

    fn stack_request(&self, url: Url, stack: &Stack, token: &AuthToken) -> RequestBuilder {
        self.client
            .get(url)
            .header("authtoken", token.as_str())
            .header("api_key", &stack.key)
    }

    /// Send a request and return the JSON body, or the API error it carries.
    async fn send(&self, endpoint: &str, url: &Url, request: RequestBuilder) -> Result<Value> {
        debug!("Requesting {}", url);
        let network_error = |e: reqwest::Error| Error::Network {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = request.send().await.map_err(network_error)?;
        let status = response.status();
        let text = response.text().await.map_err(network_error)?;

        let body: Value = serde_json::from_str(&text).map_err(|e| Error::Network {
            url: url.to_string(),
            message: format!("HTTP {}: response is not JSON: {}", status, e),
        })?;
        let body = check_api_error(endpoint, body)?;

        if !status.is_success() {
            return Err(Error::Network {
                url: url.to_string(),
                message: format!("HTTP {}", status),
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl ManagementApi for HttpApi {
    async fn validate_token(&self, token: &AuthToken) -> Result<()> {
        let url = self.endpoint("user")?;
        let request = self.client.get(url.clone()).header("authtoken", token.as_str());
        self.send("user", &url, request).await?;
        Ok(())
    }

    async fn create_session(&self, credentials: &Credentials) -> Result<AuthToken> {
        let url = self.endpoint("user-session")?;
        let request = self
            .client
            .post(url.clone())
            .json(&json!({ "user": credentials }));
        let body = self.send("user-session", &url, request).await?;
        parse_session(body)
    }

    async fn fetch_content_type(
        &self,
        stack: &Stack,
        token: &AuthToken,
        content_type_uid: &str,
    ) -> Result<ContentType> {
        let url = self.content_type_url(content_type_uid)?;
        let endpoint = format!("content_types/{}", content_type_uid);
        let request = self.stack_request(url.clone(), stack, token);
        let body = self.send(&endpoint, &url, request).await?;
        parse_content_type(&endpoint, body)
    }

    async fn fetch_extensions(&self, stack: &Stack, token: &AuthToken) -> Result<Vec<Extension>> {
        let url = self.extensions_url()?;
        let request = self.stack_request(url.clone(), stack, token);
        let body = self.send("extensions", &url, request).await?;
        parse_extensions(body)
    }
}

/// Whether an `error_code` value marks a failure. `null`, `0`, `false` and
/// `""` do not.
fn is_error_code(code: &Value) -> bool {
    match code {
        Value::Null => false,
        Value::Bool(set) => *set,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Turn a body carrying a set `error_code` into `Error::Api`.
pub fn check_api_error(endpoint: &str, body: Value) -> Result<Value> {
    let Some(code) = body.get("error_code").filter(|code| is_error_code(code)) else {
        return Ok(body);
    };
    let code = code
        .as_i64()
        .or_else(|| code.as_str().and_then(|s| s.parse().ok()))
        .unwrap_or(-1);
    let message = body
        .get("error_message")
        .and_then(Value::as_str)
        .unwrap_or("no error message returned")
        .to_string();
    Err(Error::Api {
        endpoint: endpoint.to_string(),
        code,
        message,
    })
}

fn take_field(endpoint: &str, mut body: Value, key: &str) -> Result<Value> {
    body.get_mut(key)
        .map(Value::take)
        .filter(|v| !v.is_null())
        .ok_or_else(|| Error::UnexpectedResponse {
            endpoint: endpoint.to_string(),
            message: format!("missing '{}'", key),
        })
}

/// Extract the session token from a `user-session` response.
pub fn parse_session(body: Value) -> Result<AuthToken> {
    let user = take_field("user-session", body, "user")?;
    user.get("authtoken")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(AuthToken::new)
        .ok_or_else(|| Error::UnexpectedResponse {
            endpoint: "user-session".to_string(),
            message: "missing 'user.authtoken'".to_string(),
        })
}

/// Extract the content type from a `content_types/{uid}` response.
pub fn parse_content_type(endpoint: &str, body: Value) -> Result<ContentType> {
    let content_type = take_field(endpoint, body, "content_type")?;
    Ok(serde_json::from_value(content_type)?)
}

/// Extract the extension list from an `extensions` response.
pub fn parse_extensions(body: Value) -> Result<Vec<Extension>> {
    let extensions = take_field("extensions", body, "extensions")?;
    Ok(serde_json::from_value(extensions)?)
}

//! Provider client configuration and per-user client minting.
//!
//! [`GithubClient`] holds the static configuration for one GitHub or GitHub
//! Enterprise installation: addresses, OAuth application credentials, the
//! platform's webhook endpoint, the commit-status context, and the OAuth
//! scopes to request. It performs no network I/O at construction; every
//! authenticated operation mints a fresh [`Octocrab`] bound to one user's
//! token via [`GithubClient::authenticated`].
//!
//! Construction goes through [`GithubBuilder`], whose setters each validate
//! their input independently and fail construction early on structurally
//! invalid addresses or credentials.

use std::time::Duration;

use octocrab::Octocrab;

use crate::error::Error;
use crate::types::User;

pub mod backoff;
pub mod paginate;

pub use backoff::{retry_with_backoff, Backoff};
pub use paginate::collect_all_pages;

/// Default web address for hosted GitHub.
pub const DEFAULT_ADDRESS: &str = "https://github.com";

/// Default API address for hosted GitHub.
pub const DEFAULT_API_ADDRESS: &str = "https://api.github.com";

/// Default context under which commit statuses are published.
pub const DEFAULT_STATUS_CONTEXT: &str = "continuous-integration/vela";

/// Default OAuth scopes requested at login.
pub const DEFAULT_SCOPES: &[&str] = &["repo", "repo:status", "user:email", "read:user", "read:org"];

/// User agent sent on OAuth endpoint calls.
const USER_AGENT: &str = concat!("vela-scm-github/", env!("CARGO_PKG_VERSION"));

/// Static configuration for one GitHub installation.
///
/// Cheap to clone; safe to share across concurrent requests (no mutable
/// state, no retained credentials).
#[derive(Debug, Clone)]
pub struct GithubClient {
    /// Web address of the GitHub instance (no trailing slash).
    pub(crate) address: String,

    /// API base address, derived from `address`.
    pub(crate) api_address: String,

    /// OAuth application client id.
    pub(crate) client_id: String,

    /// OAuth application client secret.
    pub(crate) client_secret: String,

    /// Address of the platform server, used as the web-UI fallback.
    pub(crate) server_address: String,

    /// Full URL of the platform's webhook endpoint.
    pub(crate) webhook_address: String,

    /// Context under which commit statuses are published.
    pub(crate) status_context: String,

    /// Address of the platform web UI, when it differs from the server.
    pub(crate) web_ui_address: Option<String>,

    /// OAuth scopes requested at login.
    pub(crate) scopes: Vec<String>,

    /// Retry policy for the pipeline-file probe.
    pub(crate) pipeline_backoff: Backoff,

    /// Shared HTTP client for the OAuth endpoints (the API host goes through
    /// octocrab instead).
    pub(crate) http: reqwest::Client,
}

impl GithubClient {
    /// Starts building a client.
    pub fn builder() -> GithubBuilder {
        GithubBuilder::default()
    }

    /// The URL the platform's webhook endpoint is registered under.
    pub fn webhook_address(&self) -> &str {
        &self.webhook_address
    }

    /// The context commit statuses are published under.
    pub fn status_context(&self) -> &str {
        &self.status_context
    }

    /// Mints a provider API client bound to the given token.
    pub(crate) fn api_client(&self, token: &str) -> Result<Octocrab, Error> {
        let client = Octocrab::builder()
            .base_uri(self.api_address.as_str())?
            .personal_token(token.to_string())
            .build()?;
        Ok(client)
    }

    /// Mints a provider API client authenticated as the given user.
    pub(crate) fn authenticated(&self, user: &User) -> Result<Octocrab, Error> {
        self.api_client(&user.token)
    }

    /// The base address for build links in the web UI.
    pub(crate) fn web_link_base(&self) -> &str {
        self.web_ui_address.as_deref().unwrap_or(&self.server_address)
    }
}

/// Builder for [`GithubClient`].
///
/// Each setter validates its input and can fail construction on its own;
/// `build` only checks that required options were provided.
#[derive(Debug, Default)]
pub struct GithubBuilder {
    address: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    server_address: Option<String>,
    webhook_address: Option<String>,
    status_context: Option<String>,
    web_ui_address: Option<String>,
    scopes: Option<Vec<String>>,
    pipeline_backoff: Option<Backoff>,
}

impl GithubBuilder {
    /// Sets the web address of the GitHub instance.
    ///
    /// Defaults to hosted GitHub. For Enterprise installations the API base
    /// is derived as `<address>/api/v3`.
    pub fn address(mut self, address: &str) -> Result<Self, Error> {
        self.address = Some(validate_address(address, "address")?);
        Ok(self)
    }

    /// Sets the OAuth application client id.
    pub fn client_id(mut self, id: &str) -> Result<Self, Error> {
        self.client_id = Some(validate_non_empty(id, "client id")?);
        Ok(self)
    }

    /// Sets the OAuth application client secret.
    pub fn client_secret(mut self, secret: &str) -> Result<Self, Error> {
        self.client_secret = Some(validate_non_empty(secret, "client secret")?);
        Ok(self)
    }

    /// Sets the platform server address.
    pub fn server_address(mut self, address: &str) -> Result<Self, Error> {
        self.server_address = Some(validate_address(address, "server address")?);
        Ok(self)
    }

    /// Sets the webhook endpoint URL explicitly.
    ///
    /// Defaults to `<server address>/webhook`.
    pub fn server_webhook_address(mut self, address: &str) -> Result<Self, Error> {
        self.webhook_address = Some(validate_address(address, "server webhook address")?);
        Ok(self)
    }

    /// Sets the commit-status context.
    pub fn status_context(mut self, context: &str) -> Result<Self, Error> {
        self.status_context = Some(validate_non_empty(context, "status context")?);
        Ok(self)
    }

    /// Sets the web UI address used for build links in statuses.
    pub fn web_ui_address(mut self, address: &str) -> Result<Self, Error> {
        self.web_ui_address = Some(validate_address(address, "web UI address")?);
        Ok(self)
    }

    /// Overrides the default OAuth scopes.
    pub fn scopes<I, S>(mut self, scopes: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let scopes: Vec<String> = scopes.into_iter().map(Into::into).collect();
        if scopes.is_empty() {
            return Err(Error::Config("scopes must not be empty".to_string()));
        }
        self.scopes = Some(scopes);
        Ok(self)
    }

    /// Overrides the pipeline-probe retry policy.
    pub fn pipeline_backoff(mut self, backoff: Backoff) -> Self {
        self.pipeline_backoff = Some(backoff);
        self
    }

    /// Finishes construction.
    pub fn build(self) -> Result<GithubClient, Error> {
        let address = self
            .address
            .unwrap_or_else(|| DEFAULT_ADDRESS.to_string());
        let api_address = if address == DEFAULT_ADDRESS {
            DEFAULT_API_ADDRESS.to_string()
        } else {
            format!("{address}/api/v3")
        };

        let client_id = self
            .client_id
            .ok_or_else(|| Error::Config("client id is required".to_string()))?;
        let client_secret = self
            .client_secret
            .ok_or_else(|| Error::Config("client secret is required".to_string()))?;
        let server_address = self
            .server_address
            .ok_or_else(|| Error::Config("server address is required".to_string()))?;
        let webhook_address = self
            .webhook_address
            .unwrap_or_else(|| format!("{server_address}/webhook"));

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(GithubClient {
            address,
            api_address,
            client_id,
            client_secret,
            server_address,
            webhook_address,
            status_context: self
                .status_context
                .unwrap_or_else(|| DEFAULT_STATUS_CONTEXT.to_string()),
            web_ui_address: self.web_ui_address,
            scopes: self
                .scopes
                .unwrap_or_else(|| DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect()),
            pipeline_backoff: self.pipeline_backoff.unwrap_or_default(),
            http,
        })
    }
}

/// Validates an address option: absolute http(s) URI, trailing slash
/// trimmed.
fn validate_address(raw: &str, field: &str) -> Result<String, Error> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(Error::Config(format!("{field} must not be empty")));
    }
    let uri: http::Uri = trimmed
        .parse()
        .map_err(|_| Error::Config(format!("{field} is not a valid URI: {raw}")))?;
    match uri.scheme_str() {
        Some("http") | Some("https") => Ok(trimmed.to_string()),
        _ => Err(Error::Config(format!(
            "{field} must be an absolute http(s) URI: {raw}"
        ))),
    }
}

/// Validates a credential-like option: present after trimming.
fn validate_non_empty(raw: &str, field: &str) -> Result<String, Error> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::Config(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> Result<GithubBuilder, Error> {
        GithubClient::builder()
            .client_id("foo")?
            .client_secret("bar")?
            .server_address("https://vela.example.com")
    }

    #[test]
    fn builds_with_hosted_defaults() {
        let client = minimal().unwrap().build().unwrap();
        assert_eq!(client.address, DEFAULT_ADDRESS);
        assert_eq!(client.api_address, DEFAULT_API_ADDRESS);
        assert_eq!(client.webhook_address, "https://vela.example.com/webhook");
        assert_eq!(client.status_context, DEFAULT_STATUS_CONTEXT);
        assert_eq!(client.scopes.len(), DEFAULT_SCOPES.len());
    }

    #[test]
    fn enterprise_address_derives_api_v3() {
        let client = minimal()
            .unwrap()
            .address("https://git.example.com/")
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(client.address, "https://git.example.com");
        assert_eq!(client.api_address, "https://git.example.com/api/v3");
    }

    #[test]
    fn explicit_webhook_address_wins() {
        let client = minimal()
            .unwrap()
            .server_webhook_address("https://hooks.example.com/github")
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(client.webhook_address, "https://hooks.example.com/github");
    }

    #[test]
    fn rejects_non_http_address() {
        let err = GithubClient::builder().address("ftp://github.com");
        assert!(matches!(err, Err(Error::Config(_))));
        let err = GithubClient::builder().address("not a uri at all");
        assert!(matches!(err, Err(Error::Config(_))));
    }

    #[test]
    fn rejects_empty_credentials() {
        assert!(matches!(
            GithubClient::builder().client_id("  "),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            GithubClient::builder().client_secret(""),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn build_requires_credentials_and_server() {
        let err = GithubClient::builder().build();
        assert!(matches!(err, Err(Error::Config(_))));

        let err = GithubClient::builder()
            .client_id("foo")
            .unwrap()
            .client_secret("bar")
            .unwrap()
            .build();
        assert!(matches!(err, Err(Error::Config(_))));
    }

    #[test]
    fn rejects_empty_scopes() {
        let err = minimal().unwrap().scopes(Vec::<String>::new());
        assert!(matches!(err, Err(Error::Config(_))));
    }

    #[test]
    fn web_link_base_prefers_web_ui_address() {
        let client = minimal()
            .unwrap()
            .web_ui_address("https://ui.example.com")
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(client.web_link_base(), "https://ui.example.com");

        let client = minimal().unwrap().build().unwrap();
        assert_eq!(client.web_link_base(), "https://vela.example.com");
    }
}

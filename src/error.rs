//! Error taxonomy for provider interactions.
//!
//! The contract with callers is a value/error pair per operation:
//!
//! - **Transport errors** ([`Error::Api`], [`Error::Http`]) always propagate
//!   and are never retried here, except inside the pipeline backoff probe.
//! - **Absence-as-data** (a 404 on an optional resource, a pending org
//!   membership, a non-actionable pull request) yields a zero value with
//!   `Ok`; callers must not treat an empty result as failure.
//! - **Idempotency signals** (HTTP 422 on hook creation) become descriptive
//!   domain errors ([`Error::AlreadyEnabled`]) distinguishable from
//!   unexpected failure.
//! - **Security failures** ([`Error::OauthStateMismatch`], webhook signature
//!   errors) are always fatal.
//!
//! HTTP status mapping of these errors is the caller's decision.

use http::StatusCode;
use thiserror::Error;

/// Errors returned by provider operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A construction option was given a structurally invalid value.
    #[error("invalid client configuration: {0}")]
    Config(String),

    /// The provider API call failed at the transport or API level.
    #[error(transparent)]
    Api(#[from] octocrab::Error),

    /// An OAuth endpoint call failed at the transport level.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// The OAuth callback carried a state token that does not match the one
    /// issued at login. The request must not be processed further.
    #[error("oauth state mismatch")]
    OauthStateMismatch,

    /// The repository already has this platform's webhook installed.
    #[error("webhook already enabled for {org}/{repo}")]
    AlreadyEnabled { org: String, repo: String },

    /// The repository does not exist or the user cannot see it.
    #[error("repo {org}/{repo} not found")]
    RepoNotFound { org: String, repo: String },

    /// Neither pipeline file exists in the repository.
    #[error("no pipeline configuration found in {org}/{repo}")]
    PipelineNotFound { org: String, repo: String },

    /// The provider responded with something this crate cannot interpret.
    #[error("malformed provider data: {0}")]
    MalformedResponse(String),
}

/// Extracts the HTTP status from a provider API error, when the provider
/// answered at all.
pub fn github_status(err: &octocrab::Error) -> Option<StatusCode> {
    match err {
        octocrab::Error::GitHub { source, .. } => Some(source.status_code),
        _ => None,
    }
}

/// Returns true if the provider answered with the given status.
pub(crate) fn is_status(err: &octocrab::Error, status: StatusCode) -> bool {
    github_status(err) == Some(status)
}

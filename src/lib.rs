//! GitHub and GitHub Enterprise boundary for the Vela CI/CD platform.
//!
//! Everything the platform knows about GitHub crosses this crate:
//!
//! - **Webhooks**: [`process_webhook`] verifies a delivery's signature and
//!   normalizes it into the canonical hook/repo/build triple.
//! - **Sessions**: the OAuth web flow ([`GithubClient::login`],
//!   [`GithubClient::authenticate`]) and terminal logins
//!   ([`GithubClient::login_cli`]).
//! - **Access**: org, repo, and team permission resolution into opaque
//!   [`AccessLevel`] values.
//! - **Repo lifecycle**: pipeline-file retrieval, hook enable/disable,
//!   commit and deployment statuses, changesets, repo listing.
//!
//! [`GithubClient`] is pure configuration; each operation authenticates as
//! the acting user and no provider state is cached. Canonical types
//! ([`Hook`], [`Repo`], [`Build`], [`User`]) carry no GitHub-specific
//! fields, so callers above this crate stay provider-neutral.

pub mod access;
pub mod client;
pub mod error;
pub mod oauth;
pub mod repo;
pub mod types;
pub mod webhook;

pub use client::{Backoff, GithubBuilder, GithubClient};
pub use error::Error;
pub use oauth::LoginRedirect;
pub use types::{AccessLevel, Build, Hook, Repo, User};
pub use webhook::{process_webhook, Delivery, WebhookError};

//! Canonical domain records exchanged with the platform.
//!
//! These are the values this crate produces for the platform to persist and
//! queue: the [`Hook`]/[`Repo`]/[`Build`] triple from webhook normalization,
//! the [`User`] that authorizes provider calls, and the provider-opaque
//! [`AccessLevel`]. All of them are created fresh per call, returned by
//! value, and never mutated after return.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod build;
pub mod hook;
pub mod repo;

pub use build::Build;
pub use hook::Hook;
pub use repo::Repo;

/// The authenticated platform user on whose behalf provider calls are made.
///
/// Every authenticated operation takes a `User`; the token is used to mint a
/// per-call provider client and is never retained beyond the call.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// The user's provider login name.
    pub name: String,

    /// The user's OAuth token.
    pub token: String,
}

impl User {
    pub fn new(name: impl Into<String>, token: impl Into<String>) -> Self {
        User {
            name: name.into(),
            token: token.into(),
        }
    }
}

// Tokens must not leak into logs.
impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("name", &self.name)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// A provider-defined permission level on an org, repo, or team.
///
/// GitHub's permission vocabularies genuinely differ between orgs
/// (`admin`/`member`), repos (`admin`/`maintain`/`write`/…), and teams, so
/// this is an opaque tagged string rather than a shared enum. Comparison
/// helpers live here at the boundary; an empty (or `none`) level is normal
/// "no access" data, never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessLevel(String);

impl AccessLevel {
    /// The "no access" level.
    pub fn none() -> Self {
        AccessLevel(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if this level grants no access at all.
    pub fn is_none(&self) -> bool {
        self.0.is_empty() || self.0 == "none"
    }

    /// Returns true if this is the provider's administrative level.
    pub fn is_admin(&self) -> bool {
        self.0 == "admin"
    }

    /// Returns true if this level allows pushing changes.
    ///
    /// Covers the write-capable names GitHub uses across its org, repo, and
    /// team permission vocabularies.
    pub fn grants_write(&self) -> bool {
        matches!(self.0.as_str(), "admin" | "maintain" | "write" | "push")
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AccessLevel {
    fn from(s: String) -> Self {
        AccessLevel(s)
    }
}

impl From<&str> for AccessLevel {
    fn from(s: &str) -> Self {
        AccessLevel(s.to_string())
    }
}

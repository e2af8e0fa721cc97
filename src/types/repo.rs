//! The repository a delivery or API call concerns.

use serde::{Deserialize, Serialize};

/// A source repository in platform terms.
///
/// Fields are always populated together from a single provider payload or
/// response, never partially.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repo {
    /// The owning org or user namespace.
    pub org: String,

    /// The repository name.
    pub name: String,

    /// `org/name`.
    pub full_name: String,

    /// Web link to the repository.
    pub link: String,

    /// HTTPS clone URL.
    #[serde(rename = "clone")]
    pub clone_url: String,

    /// The default branch.
    pub branch: String,

    /// Whether the repository is private.
    pub private: bool,
}

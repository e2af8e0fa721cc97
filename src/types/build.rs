//! The build-trigger representation derived from a delivery.

use serde::{Deserialize, Serialize};

/// A canonical build trigger.
///
/// Produced by webhook normalization and consumed by status publishing.
/// `number` and `status` are assigned by the platform before the build is
/// published back to the provider; normalization leaves them at their
/// defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Build {
    /// The platform-assigned build number.
    pub number: u64,

    /// The event kind that triggered the build (`push`, `tag`,
    /// `pull_request`, `deployment`).
    pub event: String,

    /// The platform build status (`pending`, `running`, `success`,
    /// `failure`, `killed`, `error`).
    pub status: String,

    /// HTTPS clone URL of the repository under build.
    #[serde(rename = "clone")]
    pub clone_url: String,

    /// Web link to the provider object that triggered the build (head
    /// commit, pull request, deployment).
    pub source: String,

    /// Human-readable one-line summary of the trigger.
    pub title: String,

    /// The commit or pull-request message.
    pub message: String,

    /// The commit SHA under test.
    pub commit: String,

    /// Login of the account that caused the delivery.
    pub sender: String,

    /// Login or name of the change author.
    pub author: String,

    /// The author's email, when the payload carries one.
    pub email: String,

    /// The branch the build concerns.
    pub branch: String,

    /// The concrete provider ref under test: a branch head, a tag, or a
    /// pull request's `head`/`merge` ref. Never symbolic.
    #[serde(rename = "ref")]
    pub ref_: String,

    /// The ref the change is based on, when the payload carries one.
    pub base_ref: String,
}

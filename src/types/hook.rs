//! The audit record for one webhook delivery.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One webhook delivery, normalized into platform terms.
///
/// A `Hook` exists for every delivery, including signature failures,
/// malformed payloads, and event types the platform does not act on. It is
/// the auditable record of what arrived. The accompanying [`Repo`] and
/// [`Build`] are only present when the delivery is actionable.
///
/// [`Repo`]: crate::types::Repo
/// [`Build`]: crate::types::Build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hook {
    /// The durable per-repo sequence number, assigned by the caller when the
    /// hook is persisted. `None` until then.
    pub number: Option<u64>,

    /// The provider's delivery id (`X-GitHub-Delivery`).
    pub source_id: String,

    /// When the delivery was received.
    pub created: DateTime<Utc>,

    /// The host the delivery was received from. `github.com` unless the
    /// enterprise-host header says otherwise.
    pub host: String,

    /// The event type (`X-GitHub-Event`). Set for every delivery whose event
    /// header was present, even unsupported types.
    pub event: String,

    /// The event sub-action from the payload (e.g. `opened`), when the event
    /// type carries one.
    pub event_action: String,

    /// The branch the event concerns, when derivable.
    pub branch: String,

    /// Processing status. Starts as `success`; the caller downgrades it when
    /// downstream handling fails.
    pub status: String,

    /// Link to the repository's webhook settings page.
    pub link: String,
}

impl Hook {
    /// The initial processing status of every delivery.
    pub const STATUS_SUCCESS: &'static str = "success";
}

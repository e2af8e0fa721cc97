//! Typed classification of webhook deliveries.
//!
//! The push/tag/pull-request branching is an explicit tagged union here, not
//! a chain of conditionals: [`classify`] decides exactly once which variant
//! a delivery is, and `normalize` (one function per variant) does the rest.
//! Unknown event types and uninteresting pull-request actions are variants
//! of their own, never errors: provider retries on uninteresting events
//! must not be amplified into platform errors.

use serde::Deserialize;

use crate::types::Hook;

/// Ref prefix for branch heads.
pub(crate) const BRANCH_REF_PREFIX: &str = "refs/heads/";

/// Ref prefix for tags.
pub(crate) const TAG_REF_PREFIX: &str = "refs/tags/";

/// One delivery, classified. Exactly one canonical interpretation exists per
/// delivered event.
#[derive(Debug)]
pub enum WebhookEvent {
    /// A push to a branch head.
    PushToBranch(Box<PushPayload>),

    /// A push whose ref is a tag.
    PushToTag(Box<PushPayload>),

    /// A pull request opened against an open base.
    PullRequestOpened(Box<PullRequestPayload>),

    /// New commits pushed to an open pull request's head.
    PullRequestSynchronized(Box<PullRequestPayload>),

    /// A pull-request delivery the platform does not act on (closed,
    /// labeled, non-open state, …). Still enriches the [`Hook`].
    PullRequestIgnored(Box<PullRequestPayload>),

    /// An event type with no platform interpretation. Supported explicitly:
    /// the seeded [`Hook`] is the whole result.
    Unsupported,
}

/// Classifies a delivery by event-type header and payload.
///
/// Unknown event types are `Unsupported`, not an error; only a payload that
/// fails to parse for a known type is an error.
pub fn classify(event_type: &str, body: &[u8]) -> Result<WebhookEvent, serde_json::Error> {
    match event_type {
        "push" => {
            let payload: PushPayload = serde_json::from_slice(body)?;
            if payload.git_ref.starts_with(TAG_REF_PREFIX) {
                Ok(WebhookEvent::PushToTag(Box::new(payload)))
            } else {
                Ok(WebhookEvent::PushToBranch(Box::new(payload)))
            }
        }
        "pull_request" => {
            let payload: PullRequestPayload = serde_json::from_slice(body)?;
            let open = payload.pull_request.state == "open";
            let event = match (open, payload.action.as_str()) {
                (true, "opened") => WebhookEvent::PullRequestOpened(Box::new(payload)),
                (true, "synchronize") => WebhookEvent::PullRequestSynchronized(Box::new(payload)),
                _ => WebhookEvent::PullRequestIgnored(Box::new(payload)),
            };
            Ok(event)
        }
        _ => Ok(WebhookEvent::Unsupported),
    }
}

impl WebhookEvent {
    /// A short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            WebhookEvent::PushToBranch(_) => "push_to_branch",
            WebhookEvent::PushToTag(_) => "push_to_tag",
            WebhookEvent::PullRequestOpened(_) => "pull_request_opened",
            WebhookEvent::PullRequestSynchronized(_) => "pull_request_synchronized",
            WebhookEvent::PullRequestIgnored(_) => "pull_request_ignored",
            WebhookEvent::Unsupported => "unsupported",
        }
    }
}

// ============================================================================
// Raw payload structures
//
// These match GitHub's webhook JSON. Optional fields default liberally so a
// sparse payload still classifies; normalization validates what it needs.
// ============================================================================

/// The repository block embedded in every actionable payload.
#[derive(Debug, Default, Deserialize)]
pub struct RawRepository {
    pub owner: RawAccount,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub clone_url: String,
    #[serde(default)]
    pub default_branch: String,
    #[serde(default)]
    pub private: bool,
}

/// A user-shaped object: payload sender, repo owner, PR author.
#[derive(Debug, Default, Deserialize)]
pub struct RawAccount {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Git author/committer metadata on a commit, and the `pusher` block.
#[derive(Debug, Default, Deserialize)]
pub struct RawCommitter {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
}

/// The head commit of a push.
#[derive(Debug, Default, Deserialize)]
pub struct RawCommit {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub author: Option<RawCommitter>,
    #[serde(default)]
    pub committer: Option<RawCommitter>,
}

/// A `push` event payload.
#[derive(Debug, Deserialize)]
pub struct PushPayload {
    /// The full git ref that was pushed, e.g. `refs/heads/main` or
    /// `refs/tags/v1.0.0`.
    #[serde(rename = "ref")]
    pub git_ref: String,

    /// The ref the push was based on. For an annotated tag this is the
    /// originating branch.
    #[serde(default)]
    pub base_ref: Option<String>,

    /// SHA of the most recent commit after the push.
    #[serde(default)]
    pub after: String,

    pub repository: RawRepository,

    #[serde(default)]
    pub head_commit: Option<RawCommit>,

    #[serde(default)]
    pub pusher: Option<RawCommitter>,

    #[serde(default)]
    pub sender: Option<RawAccount>,
}

/// One side of a pull request (`head` or `base`).
#[derive(Debug, Default, Deserialize)]
pub struct RawGitRef {
    #[serde(rename = "ref", default)]
    pub git_ref: String,
    #[serde(default)]
    pub sha: String,
    #[serde(default)]
    pub user: Option<RawAccount>,
}

/// The pull-request block of a `pull_request` event.
#[derive(Debug, Default, Deserialize)]
pub struct RawPullRequest {
    #[serde(default)]
    pub number: u64,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub merged: bool,
    #[serde(default)]
    pub head: RawGitRef,
    #[serde(default)]
    pub base: RawGitRef,
    #[serde(default)]
    pub user: Option<RawAccount>,
}

/// A `pull_request` event payload.
#[derive(Debug, Deserialize)]
pub struct PullRequestPayload {
    #[serde(default)]
    pub action: String,
    pub pull_request: RawPullRequest,
    pub repository: RawRepository,
    #[serde(default)]
    pub sender: Option<RawAccount>,
}

/// Seeds the settings link every hook carries once the repo is known.
pub(crate) fn settings_link(hook: &Hook, full_name: &str) -> String {
    format!("https://{}/{}/settings", hook.host, full_name)
}

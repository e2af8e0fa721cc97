//! Webhook verification and normalization.
//!
//! The HTTP endpoint hands the raw request parts here; [`process_webhook`]
//! returns the canonical [`Delivery`] for the caller to persist and queue,
//! or a terminal [`WebhookError`]. Processing order:
//!
//! 1. Seed a [`Hook`] from headers alone, so malformed payloads still yield
//!    an auditable record.
//! 2. Verify the payload signature against the repo-registered secret.
//!    Verification is never skipped.
//! 3. Classify the payload into a [`WebhookEvent`] and normalize per
//!    variant.
//!
//! Only signature and parse failures are errors, and both still carry the
//! seeded hook. Every other outcome (unsupported event types, ignored
//! pull-request actions) degrades to a hook-only [`Delivery`] so provider
//! retries on uninteresting events are never amplified into platform
//! errors. The response status is the caller's responsibility.

use chrono::Utc;
use http::HeaderMap;
use thiserror::Error;
use tracing::debug;

use crate::types::{Build, Hook, Repo};

pub mod events;
mod normalize;
pub mod signature;

pub use events::{classify, WebhookEvent};
pub use signature::{compute_signature, format_signature_header, verify, SignatureError};

/// Header carrying the provider delivery id.
pub const HEADER_DELIVERY: &str = "x-github-delivery";
/// Header carrying the event type.
pub const HEADER_EVENT: &str = "x-github-event";
/// Header carrying the payload signature.
pub const HEADER_SIGNATURE: &str = "x-hub-signature-256";
/// Header carrying the originating GitHub Enterprise host.
pub const HEADER_ENTERPRISE_HOST: &str = "x-github-enterprise-host";

/// Receipt host when no enterprise-host header is present.
const DEFAULT_HOST: &str = "github.com";

/// The canonical interpretation of one delivery.
///
/// `hook` is always present; `repo` and `build` only when the delivery is
/// actionable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub hook: Hook,
    pub repo: Option<Repo>,
    pub build: Option<Build>,
}

/// Terminal webhook-processing failures.
///
/// Each variant carries the hook seeded from the request headers so the
/// failed delivery can still be recorded.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The event-type header was absent; the delivery has no
    /// interpretation.
    #[error("missing {HEADER_EVENT} header")]
    MissingEventHeader { hook: Box<Hook> },

    /// The payload signature was missing, malformed, or did not match.
    /// The request must not be processed further.
    #[error("webhook signature rejected: {source}")]
    Signature {
        hook: Box<Hook>,
        #[source]
        source: SignatureError,
    },

    /// The payload could not be parsed for its declared event type.
    #[error("malformed {event} payload: {source}")]
    Parse {
        hook: Box<Hook>,
        event: String,
        #[source]
        source: serde_json::Error,
    },
}

impl WebhookError {
    /// The hook seeded from the request headers, for auditing.
    pub fn hook(&self) -> &Hook {
        match self {
            WebhookError::MissingEventHeader { hook }
            | WebhookError::Signature { hook, .. }
            | WebhookError::Parse { hook, .. } => hook,
        }
    }

    /// Consumes the error, yielding the seeded hook.
    pub fn into_hook(self) -> Hook {
        match self {
            WebhookError::MissingEventHeader { hook }
            | WebhookError::Signature { hook, .. }
            | WebhookError::Parse { hook, .. } => *hook,
        }
    }
}

/// Converts one raw webhook request into its canonical [`Delivery`].
///
/// `secret` is the secret registered on the repo's hook at enable time,
/// resolved by the caller.
pub fn process_webhook(
    headers: &HeaderMap,
    body: &[u8],
    secret: &str,
) -> Result<Delivery, WebhookError> {
    let mut hook = seed_hook(headers);

    // Authenticity before any interpretation, including the event header.
    if let Err(source) = signature::verify(
        body,
        header_str(headers, HEADER_SIGNATURE),
        secret.as_bytes(),
    ) {
        return Err(WebhookError::Signature {
            hook: Box::new(hook),
            source,
        });
    }

    let Some(event) = header_str(headers, HEADER_EVENT).map(str::to_string) else {
        return Err(WebhookError::MissingEventHeader {
            hook: Box::new(hook),
        });
    };

    let event_union = match events::classify(&event, body) {
        Ok(e) => e,
        Err(source) => {
            return Err(WebhookError::Parse {
                hook: Box::new(hook),
                event,
                source,
            });
        }
    };

    debug!(
        delivery = %hook.source_id,
        event = %event,
        kind = event_union.kind(),
        "processing webhook delivery"
    );

    let (repo, build) = normalize::normalize(event_union, &mut hook);
    Ok(Delivery { hook, repo, build })
}

/// Seeds the audit record from headers alone.
fn seed_hook(headers: &HeaderMap) -> Hook {
    Hook {
        number: None,
        source_id: header_str(headers, HEADER_DELIVERY)
            .unwrap_or_default()
            .to_string(),
        created: Utc::now(),
        host: header_str(headers, HEADER_ENTERPRISE_HOST)
            .unwrap_or(DEFAULT_HOST)
            .to_string(),
        event: header_str(headers, HEADER_EVENT)
            .unwrap_or_default()
            .to_string(),
        event_action: String::new(),
        branch: String::new(),
        status: Hook::STATUS_SUCCESS.to_string(),
        link: String::new(),
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

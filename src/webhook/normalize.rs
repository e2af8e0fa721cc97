//! Per-variant normalizers: classified event → canonical triple.
//!
//! Each [`WebhookEvent`] variant has one normalizer producing the
//! `(Hook, Repo, Build)` interpretation the platform persists. Only
//! actionable variants yield a [`Repo`]/[`Build`]; ignored and unsupported
//! variants enrich (or leave) the seeded [`Hook`] and return nothing else.

use crate::types::{Build, Hook, Repo};

use super::events::{
    settings_link, PullRequestPayload, PushPayload, RawRepository, WebhookEvent,
    BRANCH_REF_PREFIX, TAG_REF_PREFIX,
};

/// Event name for branch pushes.
pub(crate) const EVENT_PUSH: &str = "push";
/// Event name for tag pushes.
pub(crate) const EVENT_TAG: &str = "tag";
/// Event name for pull requests.
pub(crate) const EVENT_PULL_REQUEST: &str = "pull_request";

/// Dispatches a classified event to its normalizer.
pub(crate) fn normalize(event: WebhookEvent, hook: &mut Hook) -> (Option<Repo>, Option<Build>) {
    match event {
        WebhookEvent::PushToBranch(payload) => normalize_push(*payload, hook),
        WebhookEvent::PushToTag(payload) => normalize_push(*payload, hook),
        WebhookEvent::PullRequestOpened(payload) => normalize_pull_request(*payload, hook, true),
        WebhookEvent::PullRequestSynchronized(payload) => {
            normalize_pull_request(*payload, hook, true)
        }
        WebhookEvent::PullRequestIgnored(payload) => normalize_pull_request(*payload, hook, false),
        WebhookEvent::Unsupported => (None, None),
    }
}

/// Normalizes a push delivery (branch or tag).
///
/// Fallbacks apply only when the primary field is empty: author falls back
/// to the committer name, sender to the pusher name, email to the committer
/// email. A tag's originating branch lives in `base_ref`, not `ref`, so tag
/// pushes recompute the branch from `base_ref` when it names a branch head.
fn normalize_push(payload: PushPayload, hook: &mut Hook) -> (Option<Repo>, Option<Build>) {
    let repo = repo_from_payload(&payload.repository);
    let head_commit = payload.head_commit.unwrap_or_default();
    let author = head_commit.author.unwrap_or_default();
    let committer = head_commit.committer.unwrap_or_default();
    let pusher = payload.pusher.unwrap_or_default();
    let sender = payload.sender.unwrap_or_default();

    let mut build = Build {
        event: EVENT_PUSH.to_string(),
        clone_url: repo.clone_url.clone(),
        source: head_commit.url,
        title: format!("{} received from {}", EVENT_PUSH, repo.link),
        message: head_commit.message,
        commit: if head_commit.id.is_empty() {
            payload.after
        } else {
            head_commit.id
        },
        sender: sender.login,
        author: author.username.unwrap_or_default(),
        email: author.email,
        branch: payload
            .git_ref
            .strip_prefix(BRANCH_REF_PREFIX)
            .unwrap_or(&payload.git_ref)
            .to_string(),
        ref_: payload.git_ref.clone(),
        base_ref: payload.base_ref.clone().unwrap_or_default(),
        ..Build::default()
    };

    if build.author.is_empty() {
        build.author = committer.name.clone();
    }
    if build.email.is_empty() {
        build.email = committer.email.clone();
    }
    if build.sender.is_empty() {
        build.sender = pusher.name.clone();
    }

    if payload.git_ref.starts_with(TAG_REF_PREFIX) {
        build.event = EVENT_TAG.to_string();
        build.title = format!("{} received from {}", EVENT_TAG, repo.link);
        // The branch a tag came from is carried in base_ref, when at all.
        if let Some(base_branch) = build.base_ref.strip_prefix(BRANCH_REF_PREFIX) {
            build.branch = base_branch.to_string();
        }
    }

    hook.event = build.event.clone();
    hook.branch = build.branch.clone();
    hook.link = settings_link(hook, &repo.full_name);

    (Some(repo), Some(build))
}

/// Normalizes a pull-request delivery.
///
/// The hook's branch and link come from the PR's base ref for every
/// pull-request delivery, actionable or not. Only actionable deliveries
/// (open state, opened/synchronize action) yield a repo and build; the ref
/// under test is the PR head ref, upgraded to the merge ref once the
/// provider reports the PR merged. Author and email fall back to the PR
/// head user; sender falls back to the PR author.
fn normalize_pull_request(
    payload: PullRequestPayload,
    hook: &mut Hook,
    actionable: bool,
) -> (Option<Repo>, Option<Build>) {
    let pr = &payload.pull_request;

    hook.event = EVENT_PULL_REQUEST.to_string();
    hook.event_action = payload.action.clone();
    hook.branch = pr.base.git_ref.clone();
    hook.link = settings_link(hook, &payload.repository.full_name);

    if !actionable {
        return (None, None);
    }

    let repo = repo_from_payload(&payload.repository);
    let head_user = pr.head.user.as_ref();
    let pr_user = pr.user.as_ref();
    let sender = payload.sender.as_ref();

    let ref_ = if pr.merged {
        format!("refs/pull/{}/merge", pr.number)
    } else {
        format!("refs/pull/{}/head", pr.number)
    };

    let mut build = Build {
        event: EVENT_PULL_REQUEST.to_string(),
        clone_url: repo.clone_url.clone(),
        source: pr.html_url.clone(),
        title: format!("{} received from {}", EVENT_PULL_REQUEST, pr.html_url),
        message: pr.title.clone(),
        commit: pr.head.sha.clone(),
        sender: sender.map(|s| s.login.clone()).unwrap_or_default(),
        author: pr_user.map(|u| u.login.clone()).unwrap_or_default(),
        email: pr_user.and_then(|u| u.email.clone()).unwrap_or_default(),
        branch: pr.base.git_ref.clone(),
        ref_,
        base_ref: pr.base.git_ref.clone(),
        ..Build::default()
    };

    if build.author.is_empty() {
        build.author = head_user.map(|u| u.login.clone()).unwrap_or_default();
    }
    if build.email.is_empty() {
        build.email = head_user.and_then(|u| u.email.clone()).unwrap_or_default();
    }
    if build.sender.is_empty() {
        build.sender = build.author.clone();
    }

    (Some(repo), Some(build))
}

/// Builds a fully-populated [`Repo`] from the payload's repository block.
fn repo_from_payload(raw: &RawRepository) -> Repo {
    Repo {
        org: raw.owner.login.clone(),
        name: raw.name.clone(),
        full_name: raw.full_name.clone(),
        link: raw.html_url.clone(),
        clone_url: raw.clone_url.clone(),
        branch: raw.default_branch.clone(),
        private: raw.private,
    }
}

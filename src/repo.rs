//! Repository lifecycle: pipeline config, hook enable/disable, commit
//! statuses, changesets, and repo listing.
//!
//! Everything here runs as a specific user through a per-call provider
//! client; nothing holds platform-wide credentials. Absence keeps its
//! meaning from the error taxonomy: a missing pipeline file falls through to
//! the next candidate, a hook that is already installed is a distinct
//! domain error, and a repo list simply omits what the user cannot see.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::paginate::PageQuery;
use crate::client::{collect_all_pages, retry_with_backoff, GithubClient};
use crate::error::{is_status, Error};
use crate::types::{Build, Repo, User};

/// Pipeline file candidates, probed in order.
pub const PIPELINE_FILES: &[&str] = &[".vela.yml", ".vela.yaml"];

/// Events the platform's webhook subscribes to.
pub const ENABLE_EVENTS: &[&str] = &["push", "pull_request", "deployment", "issue_comment"];

/// Event name that routes a status to the deployment-status API.
const EVENT_DEPLOYMENT: &str = "deployment";

#[derive(Serialize)]
struct RefQuery<'a> {
    #[serde(rename = "ref")]
    git_ref: &'a str,
}

/// The contents API's answer for one file.
#[derive(Deserialize)]
struct Contents {
    #[serde(default)]
    content: String,
}

/// One installed hook, as listed by the provider.
#[derive(Deserialize)]
struct RawHook {
    id: u64,
    #[serde(default)]
    config: RawHookConfig,
}

#[derive(Default, Deserialize)]
struct RawHookConfig {
    #[serde(default)]
    url: Option<String>,
}

/// Body for hook creation.
#[derive(Serialize)]
struct HookRequest<'a> {
    name: &'a str,
    active: bool,
    events: &'a [&'a str],
    config: HookConfigRequest<'a>,
}

#[derive(Serialize)]
struct HookConfigRequest<'a> {
    url: &'a str,
    content_type: &'a str,
    secret: &'a str,
}

/// Body for a commit status.
#[derive(Serialize)]
struct StatusRequest<'a> {
    state: &'a str,
    description: &'a str,
    context: &'a str,
    target_url: &'a str,
}

/// Body for a deployment status.
#[derive(Serialize)]
struct DeploymentStatusRequest<'a> {
    state: &'a str,
    description: &'a str,
    target_url: &'a str,
}

/// A commit with its changed files.
#[derive(Deserialize)]
struct CommitFiles {
    #[serde(default)]
    files: Vec<ChangedFile>,
}

#[derive(Deserialize)]
struct ChangedFile {
    filename: String,
}

/// One repo from the user's listing.
#[derive(Deserialize)]
struct RawRepo {
    #[serde(default)]
    name: String,
    #[serde(default)]
    full_name: String,
    #[serde(default)]
    html_url: String,
    #[serde(default)]
    clone_url: String,
    #[serde(default)]
    default_branch: String,
    #[serde(default)]
    private: bool,
    #[serde(default)]
    archived: bool,
    owner: RawRepoOwner,
}

#[derive(Default, Deserialize)]
struct RawRepoOwner {
    #[serde(default)]
    login: String,
}

impl GithubClient {
    /// Fetches the repo's pipeline file at the given ref.
    ///
    /// Candidates are probed in order; the first hit wins. A 404 on a
    /// candidate falls through to the next, and only when every candidate is
    /// missing does this return [`Error::PipelineNotFound`].
    pub async fn config(
        &self,
        user: &User,
        org: &str,
        repo: &str,
        git_ref: Option<&str>,
    ) -> Result<Vec<u8>, Error> {
        let client = self.authenticated(user)?;

        for file in PIPELINE_FILES {
            let route = format!("/repos/{org}/{repo}/contents/{file}");
            let result: Result<Contents, octocrab::Error> = match git_ref {
                Some(git_ref) => client.get(&route, Some(&RefQuery { git_ref })).await,
                None => client.get(&route, None::<&()>).await,
            };

            match result {
                Ok(contents) => {
                    debug!(org, repo, file, "pipeline file found");
                    return decode_contents(&contents.content);
                }
                Err(e) if is_status(&e, StatusCode::NOT_FOUND) => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(Error::PipelineNotFound {
            org: org.to_string(),
            repo: repo.to_string(),
        })
    }

    /// [`GithubClient::config`] under the pipeline retry policy.
    ///
    /// Covers the window right after enablement where a just-pushed pipeline
    /// file is not yet visible through the contents API.
    pub async fn config_backoff(
        &self,
        user: &User,
        org: &str,
        repo: &str,
        git_ref: Option<&str>,
    ) -> Result<Vec<u8>, Error> {
        retry_with_backoff(self.pipeline_backoff, || {
            self.config(user, org, repo, git_ref)
        })
        .await
    }

    /// Installs the platform's webhook on a repo, returning the hook id.
    ///
    /// The hook subscribes to [`ENABLE_EVENTS`] and carries `secret` for
    /// later delivery verification. Installing twice is
    /// [`Error::AlreadyEnabled`]; an invisible repo is
    /// [`Error::RepoNotFound`].
    pub async fn enable(
        &self,
        user: &User,
        org: &str,
        repo: &str,
        secret: &str,
    ) -> Result<u64, Error> {
        let client = self.authenticated(user)?;
        let body = HookRequest {
            name: "web",
            active: true,
            events: ENABLE_EVENTS,
            config: HookConfigRequest {
                url: &self.webhook_address,
                content_type: "form",
                secret,
            },
        };

        let route = format!("/repos/{org}/{repo}/hooks");
        let hook: RawHook = match client.post(&route, Some(&body)).await {
            Ok(hook) => hook,
            Err(e) if is_status(&e, StatusCode::UNPROCESSABLE_ENTITY) => {
                return Err(Error::AlreadyEnabled {
                    org: org.to_string(),
                    repo: repo.to_string(),
                });
            }
            Err(e) if is_status(&e, StatusCode::NOT_FOUND) => {
                return Err(Error::RepoNotFound {
                    org: org.to_string(),
                    repo: repo.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        debug!(org, repo, hook = hook.id, "webhook enabled");
        Ok(hook.id)
    }

    /// Removes every hook on the repo that points at the platform's webhook
    /// endpoint.
    ///
    /// Hooks registered by other installations are left alone. A repo with
    /// no matching hook disables cleanly.
    pub async fn disable(&self, user: &User, org: &str, repo: &str) -> Result<(), Error> {
        let client = self.authenticated(user)?;

        let route = format!("/repos/{org}/{repo}/hooks");
        let hooks: Vec<RawHook> = collect_all_pages(|page| {
            let client = client.clone();
            let route = route.clone();
            async move { client.get(&route, Some(&PageQuery::new(page))).await }
        })
        .await?;

        for hook in hooks {
            if hook.config.url.as_deref() != Some(self.webhook_address.as_str()) {
                continue;
            }
            debug!(org, repo, hook = hook.id, "removing webhook");
            client
                ._delete(format!("/repos/{org}/{repo}/hooks/{}", hook.id), None::<&()>)
                .await?;
        }
        Ok(())
    }

    /// Publishes a build's state to the provider.
    ///
    /// Deployment builds report through the deployment-status API, keyed by
    /// the deployment id parsed from the build's source URL; every other
    /// event reports a commit status under the configured context. The
    /// status links back to the build in the platform web UI.
    pub async fn status(
        &self,
        user: &User,
        build: &Build,
        org: &str,
        repo: &str,
    ) -> Result<(), Error> {
        let client = self.authenticated(user)?;

        let (state, description) = match build.status.as_str() {
            "running" | "pending" => ("pending", format!("the build is {}", build.status)),
            "success" => ("success", "the build was successful".to_string()),
            "failure" => ("failure", "the build has failed".to_string()),
            "killed" => ("failure", "the build was killed".to_string()),
            _ => ("error", "there was an error".to_string()),
        };
        let target_url = format!("{}/{org}/{repo}/{}", self.web_link_base(), build.number);

        if build.event == EVENT_DEPLOYMENT {
            let deployment = parse_deployment_id(&build.source).ok_or_else(|| {
                Error::MalformedResponse(format!(
                    "no deployment id in build source: {}",
                    build.source
                ))
            })?;
            let body = DeploymentStatusRequest {
                state,
                description: &description,
                target_url: &target_url,
            };
            let route = format!("/repos/{org}/{repo}/deployments/{deployment}/statuses");
            let _: serde_json::Value = client.post(&route, Some(&body)).await?;
        } else {
            let body = StatusRequest {
                state,
                description: &description,
                context: &self.status_context,
                target_url: &target_url,
            };
            let route = format!("/repos/{org}/{repo}/statuses/{}", build.commit);
            let _: serde_json::Value = client.post(&route, Some(&body)).await?;
        }

        debug!(org, repo, build = build.number, state, "status published");
        Ok(())
    }

    /// Lists the files changed by one commit.
    pub async fn changeset(
        &self,
        user: &User,
        org: &str,
        repo: &str,
        commit: &str,
    ) -> Result<Vec<String>, Error> {
        let client = self.authenticated(user)?;
        let route = format!("/repos/{org}/{repo}/commits/{commit}");
        let answer: CommitFiles = client.get(&route, None::<&()>).await?;
        Ok(answer.files.into_iter().map(|f| f.filename).collect())
    }

    /// Lists the files changed across a pull request.
    pub async fn changeset_pr(
        &self,
        user: &User,
        org: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<String>, Error> {
        let client = self.authenticated(user)?;
        let route = format!("/repos/{org}/{repo}/pulls/{number}/files");
        let files: Vec<ChangedFile> = collect_all_pages(|page| {
            let client = client.clone();
            let route = route.clone();
            async move { client.get(&route, Some(&PageQuery::new(page))).await }
        })
        .await?;
        Ok(files.into_iter().map(|f| f.filename).collect())
    }

    /// Lists the repos the user can see, skipping archived ones.
    pub async fn list_user_repos(&self, user: &User) -> Result<Vec<Repo>, Error> {
        let client = self.authenticated(user)?;
        let repos: Vec<RawRepo> = collect_all_pages(|page| {
            let client = client.clone();
            async move { client.get("/user/repos", Some(&PageQuery::new(page))).await }
        })
        .await?;

        Ok(repos
            .into_iter()
            .filter(|r| !r.archived)
            .map(|r| Repo {
                org: r.owner.login,
                name: r.name,
                full_name: r.full_name,
                link: r.html_url,
                clone_url: r.clone_url,
                branch: r.default_branch,
                private: r.private,
            })
            .collect())
    }
}

/// Decodes a contents-API payload, which is base64 with embedded newlines.
fn decode_contents(content: &str) -> Result<Vec<u8>, Error> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    BASE64
        .decode(compact)
        .map_err(|e| Error::MalformedResponse(format!("contents not base64: {e}")))
}

/// Extracts the deployment id from a deployment build's source URL.
///
/// Prefers the path segment after `/deployments/`. The trailing-segment
/// fallback only applies to bare sources (`982`, `deployment/982`); a full
/// URL without a `/deployments/` segment does not reference a deployment,
/// and guessing an id from its tail would publish against an unrelated
/// deployment.
pub(crate) fn parse_deployment_id(source: &str) -> Option<u64> {
    if let Some(rest) = source.split("/deployments/").nth(1) {
        let id = rest.split(['/', '?', '#']).next().unwrap_or(rest);
        if let Ok(id) = id.parse() {
            return Some(id);
        }
    }
    if source.contains("://") {
        return None;
    }
    source
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|tail| tail.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Backoff;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> GithubClient {
        GithubClient::builder()
            .client_id("id")
            .unwrap()
            .client_secret("secret")
            .unwrap()
            .server_address("https://vela.example.com")
            .unwrap()
            .address(&server.uri())
            .unwrap()
            .pipeline_backoff(Backoff::new(5, Duration::from_millis(1)))
            .build()
            .unwrap()
    }

    fn user() -> User {
        User::new("octocat", "gho_token")
    }

    // "version: \"1\"" in base64, split by a newline the way the contents
    // API wraps long payloads.
    const PIPELINE_B64: &str = "dmVyc2lv\nbjogIjEi";
    const PIPELINE: &[u8] = b"version: \"1\"";

    fn not_found() -> ResponseTemplate {
        ResponseTemplate::new(404).set_body_json(serde_json::json!({ "message": "Not Found" }))
    }

    // ========================================================================
    // Pipeline config
    // ========================================================================

    #[tokio::test]
    async fn config_prefers_yml() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/repos/octo-org/hello/contents/.vela.yml"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": PIPELINE_B64,
                "encoding": "base64",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let config = client.config(&user(), "octo-org", "hello", None).await.unwrap();
        assert_eq!(config, PIPELINE);
    }

    #[tokio::test]
    async fn config_falls_back_to_yaml() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/repos/octo-org/hello/contents/.vela.yml"))
            .respond_with(not_found())
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v3/repos/octo-org/hello/contents/.vela.yaml"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": PIPELINE_B64,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let config = client.config(&user(), "octo-org", "hello", None).await.unwrap();
        assert_eq!(config, PIPELINE);
    }

    #[tokio::test]
    async fn config_missing_both_is_pipeline_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(not_found())
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client
            .config(&user(), "octo-org", "hello", None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::PipelineNotFound { .. }));
    }

    #[tokio::test]
    async fn config_passes_ref() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/repos/octo-org/hello/contents/.vela.yml"))
            .and(query_param("ref", "refs/heads/feature"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": PIPELINE_B64,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let config = client
            .config(&user(), "octo-org", "hello", Some("refs/heads/feature"))
            .await
            .unwrap();
        assert_eq!(config, PIPELINE);
    }

    #[tokio::test]
    async fn config_backoff_retries_transient_failures() {
        let server = MockServer::start().await;
        // Four transient failures, then the file appears.
        Mock::given(method("GET"))
            .and(path("/api/v3/repos/octo-org/hello/contents/.vela.yml"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(serde_json::json!({ "message": "Server Error" })),
            )
            .up_to_n_times(4)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v3/repos/octo-org/hello/contents/.vela.yml"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": PIPELINE_B64,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let config = client
            .config_backoff(&user(), "octo-org", "hello", None)
            .await
            .unwrap();
        assert_eq!(config, PIPELINE);
    }

    // ========================================================================
    // Enable / disable
    // ========================================================================

    #[tokio::test]
    async fn enable_installs_hook_with_platform_config() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v3/repos/octo-org/hello/hooks"))
            .and(body_partial_json(serde_json::json!({
                "name": "web",
                "active": true,
                "events": ["push", "pull_request", "deployment", "issue_comment"],
                "config": {
                    "url": "https://vela.example.com/webhook",
                    "content_type": "form",
                    "secret": "hook-secret",
                },
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "id": 4242,
                "config": { "url": "https://vela.example.com/webhook" },
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let id = client
            .enable(&user(), "octo-org", "hello", "hook-secret")
            .await
            .unwrap();
        assert_eq!(id, 4242);
    }

    #[tokio::test]
    async fn enable_twice_is_already_enabled() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v3/repos/octo-org/hello/hooks"))
            .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
                "message": "Validation Failed",
                "errors": [{ "message": "Hook already exists on this repository" }],
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client
            .enable(&user(), "octo-org", "hello", "hook-secret")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::AlreadyEnabled { ref org, ref repo } if org == "octo-org" && repo == "hello"
        ));
    }

    #[tokio::test]
    async fn enable_on_invisible_repo_is_repo_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v3/repos/octo-org/secret-repo/hooks"))
            .respond_with(not_found())
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client
            .enable(&user(), "octo-org", "secret-repo", "hook-secret")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RepoNotFound { .. }));
    }

    #[tokio::test]
    async fn disable_removes_only_platform_hooks() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/repos/octo-org/hello/hooks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "id": 1, "config": { "url": "https://vela.example.com/webhook" } },
                { "id": 2, "config": { "url": "https://ci.elsewhere.com/hook" } },
                { "id": 3, "config": { "url": "https://vela.example.com/webhook" } },
                { "id": 4, "config": {} },
            ])))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/v3/repos/octo-org/hello/hooks/1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/v3/repos/octo-org/hello/hooks/3"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        client.disable(&user(), "octo-org", "hello").await.unwrap();
        // Hooks 2 and 4 must survive; wiremock verifies no DELETE hit them.
    }

    #[tokio::test]
    async fn disable_with_no_matching_hooks_is_clean() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/repos/octo-org/hello/hooks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        client.disable(&user(), "octo-org", "hello").await.unwrap();
    }

    // ========================================================================
    // Statuses
    // ========================================================================

    fn push_build(status: &str) -> Build {
        Build {
            number: 17,
            event: "push".to_string(),
            status: status.to_string(),
            commit: "48afb5bd".to_string(),
            ..Build::default()
        }
    }

    #[tokio::test]
    async fn status_publishes_commit_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v3/repos/octo-org/hello/statuses/48afb5bd"))
            .and(body_partial_json(serde_json::json!({
                "state": "success",
                "description": "the build was successful",
                "context": "continuous-integration/vela",
                "target_url": "https://vela.example.com/octo-org/hello/17",
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "id": 1,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        client
            .status(&user(), &push_build("success"), "octo-org", "hello")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn status_maps_build_states() {
        for (build_status, state, description) in [
            ("running", "pending", "the build is running"),
            ("pending", "pending", "the build is pending"),
            ("failure", "failure", "the build has failed"),
            ("killed", "failure", "the build was killed"),
            ("canceled", "error", "there was an error"),
        ] {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/api/v3/repos/octo-org/hello/statuses/48afb5bd"))
                .and(body_partial_json(serde_json::json!({
                    "state": state,
                    "description": description,
                })))
                .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                    "id": 1,
                })))
                .expect(1)
                .mount(&server)
                .await;

            let client = client_for(&server).await;
            client
                .status(&user(), &push_build(build_status), "octo-org", "hello")
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn deployment_build_reports_deployment_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v3/repos/octo-org/hello/deployments/982/statuses"))
            .and(body_partial_json(serde_json::json!({
                "state": "pending",
                "target_url": "https://vela.example.com/octo-org/hello/17",
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "id": 1,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let build = Build {
            number: 17,
            event: "deployment".to_string(),
            status: "running".to_string(),
            source: "https://api.github.com/repos/octo-org/hello/deployments/982".to_string(),
            ..Build::default()
        };

        let client = client_for(&server).await;
        client
            .status(&user(), &build, "octo-org", "hello")
            .await
            .unwrap();
    }

    #[test]
    fn deployment_id_from_canonical_url() {
        assert_eq!(
            parse_deployment_id("https://api.github.com/repos/o/r/deployments/982"),
            Some(982)
        );
        assert_eq!(
            parse_deployment_id("https://api.github.com/repos/o/r/deployments/982/statuses"),
            Some(982)
        );
        assert_eq!(
            parse_deployment_id("https://git.example.com/api/v3/repos/o/r/deployments/7?x=1"),
            Some(7)
        );
    }

    #[test]
    fn deployment_id_from_trailing_segment() {
        assert_eq!(parse_deployment_id("deployment/982"), Some(982));
        assert_eq!(parse_deployment_id("982"), Some(982));
    }

    #[test]
    fn deployment_id_absent() {
        assert_eq!(parse_deployment_id(""), None);
        assert_eq!(
            parse_deployment_id("https://github.com/octo-org/hello/pull/12"),
            None
        );
        assert_eq!(
            parse_deployment_id("https://api.github.com/repos/o/r/deployments/abc"),
            None
        );
    }

    #[test]
    fn url_without_deployments_segment_never_yields_an_id() {
        // A digit-tailed URL is not a deployment reference; publishing
        // against its tail would hit an unrelated deployment.
        assert_eq!(
            parse_deployment_id("https://github.com/octo-org/hello/issues/5"),
            None
        );
        assert_eq!(
            parse_deployment_id("https://github.com/octo-org/hello/commit/123456"),
            None
        );
    }

    #[tokio::test]
    async fn deployment_build_with_non_deployment_source_is_malformed() {
        // No mocks mounted: a request would fail the test with a connect
        // error rather than MalformedResponse.
        let server = MockServer::start().await;
        let build = Build {
            number: 17,
            event: "deployment".to_string(),
            status: "running".to_string(),
            source: "https://github.com/octo-org/hello/pull/12".to_string(),
            ..Build::default()
        };

        let client = client_for(&server).await;
        let err = client
            .status(&user(), &build, "octo-org", "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    // ========================================================================
    // Changesets and listing
    // ========================================================================

    #[tokio::test]
    async fn changeset_lists_commit_files() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/repos/octo-org/hello/commits/48afb5bd"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "sha": "48afb5bd",
                "files": [
                    { "filename": "src/main.rs" },
                    { "filename": ".vela.yml" },
                ],
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let files = client
            .changeset(&user(), "octo-org", "hello", "48afb5bd")
            .await
            .unwrap();
        assert_eq!(files, vec!["src/main.rs".to_string(), ".vela.yml".to_string()]);
    }

    #[tokio::test]
    async fn changeset_pr_drains_file_pages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/repos/octo-org/hello/pulls/12/files"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "filename": "README.md" },
            ])))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let files = client
            .changeset_pr(&user(), "octo-org", "hello", 12)
            .await
            .unwrap();
        assert_eq!(files, vec!["README.md".to_string()]);
    }

    #[tokio::test]
    async fn list_user_repos_skips_archived() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/user/repos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "name": "hello",
                    "full_name": "octo-org/hello",
                    "html_url": "https://github.com/octo-org/hello",
                    "clone_url": "https://github.com/octo-org/hello.git",
                    "default_branch": "main",
                    "private": false,
                    "archived": false,
                    "owner": { "login": "octo-org" }
                },
                {
                    "name": "attic",
                    "full_name": "octo-org/attic",
                    "archived": true,
                    "owner": { "login": "octo-org" }
                }
            ])))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let repos = client.list_user_repos(&user()).await.unwrap();
        assert_eq!(repos.len(), 1);
        assert_eq!(repos[0].org, "octo-org");
        assert_eq!(repos[0].name, "hello");
        assert_eq!(repos[0].branch, "main");
        assert!(!repos[0].private);
    }

    #[test]
    fn decode_strips_embedded_whitespace() {
        assert_eq!(decode_contents(PIPELINE_B64).unwrap(), PIPELINE);
        assert_eq!(decode_contents("").unwrap(), b"");
        assert!(matches!(
            decode_contents("!!! not base64 !!!"),
            Err(Error::MalformedResponse(_))
        ));
    }
}

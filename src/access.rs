//! Access resolution: what a user may do to an org, repo, or team.
//!
//! Every resolver returns an opaque [`AccessLevel`] carrying the provider's
//! own vocabulary; callers compare through its predicates, never against
//! string literals. Absence is data here: a 404 on a membership lookup and a
//! pending (unaccepted) org invitation both resolve to
//! [`AccessLevel::none`], not an error. Only transport failures propagate.

use http::StatusCode;
use serde::Deserialize;
use tracing::debug;

use crate::client::paginate::PageQuery;
use crate::client::{collect_all_pages, GithubClient};
use crate::error::{is_status, Error};
use crate::types::{AccessLevel, User};

/// One org membership record.
#[derive(Debug, Deserialize)]
struct OrgMembership {
    #[serde(default)]
    role: String,
    #[serde(default)]
    state: String,
}

/// The provider's answer to a collaborator-permission lookup.
#[derive(Debug, Deserialize)]
struct CollaboratorPermission {
    #[serde(default)]
    permission: String,
}

/// One team the authenticated user belongs to.
#[derive(Debug, Deserialize)]
struct Team {
    #[serde(default)]
    name: String,
    #[serde(default)]
    slug: String,
    #[serde(default)]
    permission: String,
    organization: TeamOrg,
}

#[derive(Debug, Deserialize)]
struct TeamOrg {
    #[serde(default)]
    login: String,
}

impl GithubClient {
    /// Resolves the user's access to an org.
    ///
    /// A user whose login equals the org name is its implicit admin (a
    /// personal namespace), decided without a network call. A missing
    /// membership and a pending invitation both resolve to no access.
    pub async fn org_access(&self, user: &User, org: &str) -> Result<AccessLevel, Error> {
        if org.eq_ignore_ascii_case(&user.name) {
            return Ok(AccessLevel::from("admin"));
        }

        let client = self.authenticated(user)?;
        let route = format!("/orgs/{org}/memberships/{}", user.name);
        let membership: OrgMembership = match client.get(&route, None::<&()>).await {
            Ok(membership) => membership,
            Err(e) if is_status(&e, StatusCode::NOT_FOUND) => {
                debug!(user = %user.name, org, "no org membership");
                return Ok(AccessLevel::none());
            }
            Err(e) => return Err(e.into()),
        };

        if membership.state != "active" {
            debug!(user = %user.name, org, state = %membership.state, "org membership not active");
            return Ok(AccessLevel::none());
        }
        Ok(AccessLevel::from(membership.role))
    }

    /// Resolves the user's access to a repo via the collaborator-permission
    /// endpoint.
    pub async fn repo_access(
        &self,
        user: &User,
        org: &str,
        repo: &str,
    ) -> Result<AccessLevel, Error> {
        let client = self.authenticated(user)?;
        let route = format!("/repos/{org}/{repo}/collaborators/{}/permission", user.name);
        let answer: CollaboratorPermission = client.get(&route, None::<&()>).await?;
        Ok(AccessLevel::from(answer.permission))
    }

    /// Resolves the user's access to a team within an org.
    ///
    /// The provider has no direct lookup for this, so the user's full team
    /// list is scanned. Org login and team name/slug all match
    /// case-insensitively; a team the user is not on resolves to no access.
    pub async fn team_access(
        &self,
        user: &User,
        org: &str,
        team: &str,
    ) -> Result<AccessLevel, Error> {
        let teams = self.user_teams(user).await?;
        let access = teams
            .into_iter()
            .find(|t| {
                t.organization.login.eq_ignore_ascii_case(org)
                    && (t.name.eq_ignore_ascii_case(team) || t.slug.eq_ignore_ascii_case(team))
            })
            .map(|t| AccessLevel::from(t.permission))
            .unwrap_or_else(AccessLevel::none);
        Ok(access)
    }

    /// Lists the names of the user's teams within one org.
    pub async fn list_user_teams_for_org(
        &self,
        user: &User,
        org: &str,
    ) -> Result<Vec<String>, Error> {
        let teams = self.user_teams(user).await?;
        Ok(teams
            .into_iter()
            .filter(|t| t.organization.login.eq_ignore_ascii_case(org))
            .map(|t| t.name)
            .collect())
    }

    /// Drains the authenticated user's full team list.
    async fn user_teams(&self, user: &User) -> Result<Vec<Team>, Error> {
        let client = self.authenticated(user)?;
        let teams = collect_all_pages(|page| {
            let client = client.clone();
            async move { client.get("/user/teams", Some(&PageQuery::new(page))).await }
        })
        .await?;
        Ok(teams)
    }
}

//! OAuth web flow and CLI token minting.
//!
//! The web flow is the usual two-step dance: [`GithubClient::login`] issues
//! a redirect to the provider's authorize page carrying a random `state`
//! token, and [`GithubClient::authenticate`] handles the callback: it checks
//! the returned state against the issued one, exchanges the code for an
//! access token, and resolves the token to a [`User`]. The state check is a
//! hard security boundary; a mismatch is fatal and never degrades to an
//! anonymous session.
//!
//! The OAuth endpoints live on the web host, not the API host, so they go
//! through the shared `reqwest` client rather than octocrab.

use http::{header, Response, StatusCode};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::GithubClient;
use crate::error::Error;
use crate::types::User;

/// Number of random bytes behind the `state` token.
const STATE_BYTES: usize = 16;

/// A pending login: where to send the browser, and the state token the
/// callback must echo.
///
/// The caller persists `state` (session, signed cookie) for the later
/// [`GithubClient::authenticate`] call.
#[derive(Debug, Clone)]
pub struct LoginRedirect {
    /// The provider's authorize URL, fully parameterized.
    pub location: String,

    /// The anti-forgery token embedded in `location`.
    pub state: String,
}

impl LoginRedirect {
    /// Renders the redirect as an HTTP response.
    pub fn into_response(self) -> Response<()> {
        Response::builder()
            .status(StatusCode::TEMPORARY_REDIRECT)
            .header(header::LOCATION, self.location)
            .body(())
            .expect("statically valid response")
    }
}

/// Query parameters sent to the provider's authorize page.
#[derive(Serialize)]
struct AuthorizeParams<'a> {
    client_id: &'a str,
    scope: String,
    state: &'a str,
}

/// Query parameters the provider sends back to the callback.
#[derive(Deserialize)]
struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
}

/// Form body for the code-for-token exchange.
#[derive(Serialize)]
struct ExchangeRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
}

#[derive(Deserialize)]
struct ExchangeResponse {
    #[serde(default)]
    access_token: Option<String>,
}

/// Request body for the CLI authorizations endpoint.
#[derive(Serialize)]
struct AuthorizationRequest<'a> {
    scopes: &'a [String],
    note: &'a str,
}

#[derive(Deserialize)]
struct AuthorizationResponse {
    #[serde(default)]
    token: Option<String>,
}

/// The provider's answer to `GET /user`.
#[derive(Deserialize)]
struct AuthenticatedUser {
    login: String,
}

impl GithubClient {
    /// Starts the OAuth web flow.
    ///
    /// Returns the redirect to the provider's authorize page and the state
    /// token the caller must hold for the callback.
    pub fn login(&self) -> LoginRedirect {
        let mut bytes = [0u8; STATE_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        let state = hex::encode(bytes);

        let params = AuthorizeParams {
            client_id: &self.client_id,
            scope: self.scopes.join(" "),
            state: &state,
        };
        let query = serde_urlencoded::to_string(&params).expect("statically serializable params");
        let location = format!("{}/login/oauth/authorize?{query}", self.address);

        LoginRedirect { location, state }
    }

    /// Completes the OAuth web flow from the callback query string.
    ///
    /// Returns `Ok(None)` when the query carries no code (the provider sent
    /// the user back without authorizing). A state mismatch is
    /// [`Error::OauthStateMismatch`] and must abort the request.
    pub async fn authenticate(&self, query: &str, issued_state: &str) -> Result<Option<User>, Error> {
        let params: CallbackParams = serde_urlencoded::from_str(query)
            .map_err(|e| Error::MalformedResponse(format!("callback query: {e}")))?;

        let Some(code) = params.code else {
            return Ok(None);
        };

        if params.state.as_deref() != Some(issued_state) {
            return Err(Error::OauthStateMismatch);
        }

        let token = self.exchange_code(&code).await?;
        let login = self.authorize(&token).await?;

        debug!(user = %login, "oauth web login completed");
        Ok(Some(User::new(login, token)))
    }

    /// Mints a token from a username and password, for terminal logins.
    ///
    /// `otp` carries the one-time password when the account has two-factor
    /// authentication enabled; the provider answers 401 with an OTP
    /// challenge header otherwise.
    pub async fn login_cli(
        &self,
        username: &str,
        password: &str,
        otp: Option<&str>,
    ) -> Result<User, Error> {
        let body = AuthorizationRequest {
            scopes: &self.scopes,
            note: "vela",
        };

        let mut request = self
            .http
            .post(format!("{}/authorizations", self.api_address))
            .basic_auth(username, Some(password))
            .header(header::ACCEPT, "application/json")
            .json(&body);
        if let Some(otp) = otp {
            request = request.header("X-GitHub-OTP", otp);
        }

        let response: AuthorizationResponse =
            request.send().await?.error_for_status()?.json().await?;
        let token = response
            .token
            .ok_or_else(|| Error::MalformedResponse("authorization without token".to_string()))?;

        debug!(user = %username, "cli login completed");
        Ok(User::new(username, token))
    }

    /// Resolves a token to the login it authenticates, proving it valid.
    pub async fn authorize(&self, token: &str) -> Result<String, Error> {
        let client = self.api_client(token)?;
        let user: AuthenticatedUser = client.get("/user", None::<&()>).await?;
        Ok(user.login)
    }

    /// Exchanges an authorization code for an access token on the web host.
    async fn exchange_code(&self, code: &str) -> Result<String, Error> {
        let body = ExchangeRequest {
            client_id: &self.client_id,
            client_secret: &self.client_secret,
            code,
        };

        let response: ExchangeResponse = self
            .http
            .post(format!("{}/login/oauth/access_token", self.address))
            .header(header::ACCEPT, "application/json")
            .form(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response
            .access_token
            .ok_or_else(|| Error::MalformedResponse("token exchange without access_token".to_string()))
    }
}

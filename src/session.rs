//! Session manager: the OAuth2 authorization-code state machine.
//!
//! Login is a two-phase protocol that spans process lifetimes. Phase one
//! (`initiate_login`) stores a random state nonce and hands back the
//! authorize URL; control leaves the process when the user opens it. Phase
//! two (`resume_from_callback`) runs once at the next startup, when the
//! redirect's `code`/`state` pair is passed back on the command line.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Deserialize;

use crate::config::OAuthConfig;
use crate::store::SessionStore;

const KEY_SESSION: &str = "session";
const KEY_USERNAME: &str = "username";
const KEY_ACCESS_TOKEN: &str = "access_token";
const KEY_OAUTH_STATE: &str = "oauth_state";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    PendingAuthorization,
    Authenticated,
}

/// What happened to a redirect callback.
#[derive(Debug, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// State nonce mismatch; the callback was dropped and nothing changed.
    Ignored,
    /// Code exchanged and identity fetched; now logged in as this user.
    LoggedIn(String),
}

/// The two remote edges of the login flow, behind a trait so the state
/// machine can be tested without a token server.
#[async_trait]
pub trait AuthApi {
    /// Exchanges an authorization code for a bearer token.
    async fn exchange_code(&self, code: &str) -> Result<String>;
    /// Resolves the display username for a bearer token.
    async fn fetch_identity(&self, token: &str) -> Result<String>;
}

pub struct SessionManager {
    oauth: OAuthConfig,
    store: SessionStore,
    api: Box<dyn AuthApi>,
    state: AuthState,
    pending_nonce: Option<String>,
    access_token: Option<String>,
    username: Option<String>,
}

impl SessionManager {
    /// Builds a session manager, restoring any persisted state first.
    pub fn new(oauth: OAuthConfig, store: SessionStore, api: Box<dyn AuthApi>) -> Result<Self> {
        let mut manager = Self {
            oauth,
            store,
            api,
            state: AuthState::Anonymous,
            pending_nonce: None,
            access_token: None,
            username: None,
        };
        manager.restore()?;
        Ok(manager)
    }

    /// Restores Authenticated or PendingAuthorization state from the store.
    fn restore(&mut self) -> Result<()> {
        let session = self.store.get(KEY_SESSION)?;
        let token = self.store.get(KEY_ACCESS_TOKEN)?;
        let username = self.store.get(KEY_USERNAME)?;

        if let (Some(_), Some(token), Some(username)) = (session, token, username) {
            tracing::info!(user = %username, "restored authenticated session");
            self.state = AuthState::Authenticated;
            self.access_token = Some(token);
            self.username = Some(username);
            return Ok(());
        }

        if let Some(nonce) = self.store.get(KEY_OAUTH_STATE)? {
            tracing::debug!("restored pending authorization");
            self.state = AuthState::PendingAuthorization;
            self.pending_nonce = Some(nonce);
        }

        Ok(())
    }

    pub fn auth_state(&self) -> AuthState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == AuthState::Authenticated
    }

    /// The display name, present only while authenticated.
    pub fn current_user(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// The bearer token, present only while authenticated.
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Starts the login flow: persists a fresh state nonce and returns the
    /// authorize URL the user agent must visit.
    pub fn initiate_login(&mut self) -> Result<String> {
        let nonce: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(16)
            .map(char::from)
            .collect();

        // The nonce must outlive this process: the redirect comes back on a
        // later launch.
        self.store.set(KEY_OAUTH_STATE, &nonce)?;

        let url = format!(
            "{}?client_id={}&response_type=code&state={}&redirect_uri={}&duration=permanent&scope={}",
            self.oauth.auth_url,
            urlencoding::encode(&self.oauth.client_id),
            nonce,
            urlencoding::encode(&self.oauth.redirect_uri),
            urlencoding::encode("identity read vote"),
        );

        self.pending_nonce = Some(nonce);
        self.state = AuthState::PendingAuthorization;
        tracing::info!("login initiated, awaiting redirect callback");

        Ok(url)
    }

    /// Completes the login flow with the `code`/`state` pair from the
    /// redirect. A state mismatch is dropped silently; an exchange failure
    /// reverts to Anonymous and is returned for reporting.
    pub async fn resume_from_callback(
        &mut self,
        code: &str,
        state: &str,
    ) -> Result<CallbackOutcome> {
        let expected = self.store.get(KEY_OAUTH_STATE)?;
        if expected.as_deref() != Some(state) {
            tracing::debug!("redirect state mismatch, ignoring callback");
            return Ok(CallbackOutcome::Ignored);
        }

        match self.complete_exchange(code).await {
            Ok(username) => Ok(CallbackOutcome::LoggedIn(username)),
            Err(e) => {
                tracing::warn!("token exchange failed: {:#}", e);
                self.state = AuthState::Anonymous;
                self.pending_nonce = None;
                self.store.delete(KEY_OAUTH_STATE)?;
                Err(e)
            }
        }
    }

    async fn complete_exchange(&mut self, code: &str) -> Result<String> {
        let token = self.api.exchange_code(code).await?;
        let username = self.api.fetch_identity(&token).await?;

        self.store.set(KEY_SESSION, "true")?;
        self.store.set(KEY_ACCESS_TOKEN, &token)?;
        self.store.set(KEY_USERNAME, &username)?;
        self.store.delete(KEY_OAUTH_STATE)?;

        self.access_token = Some(token);
        self.username = Some(username.clone());
        self.pending_nonce = None;
        self.state = AuthState::Authenticated;
        tracing::info!(user = %username, "authenticated");

        Ok(username)
    }

    /// Clears the session and every persisted copy of it.
    pub fn logout(&mut self) -> Result<()> {
        if self.state != AuthState::Authenticated {
            bail!("Not logged in");
        }

        self.store.delete(KEY_SESSION)?;
        self.store.delete(KEY_USERNAME)?;
        self.store.delete(KEY_ACCESS_TOKEN)?;
        self.store.delete(KEY_OAUTH_STATE)?;

        self.state = AuthState::Anonymous;
        self.access_token = None;
        self.username = None;
        self.pending_nonce = None;
        tracing::info!("logged out");

        Ok(())
    }
}

/// reqwest-backed token exchange and identity lookup.
pub struct RedditAuth {
    oauth: OAuthConfig,
    http: reqwest::Client,
}

impl RedditAuth {
    pub fn new(oauth: OAuthConfig) -> Self {
        Self {
            oauth,
            http: reqwest::Client::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IdentityResponse {
    name: String,
}

#[async_trait]
impl AuthApi for RedditAuth {
    async fn exchange_code(&self, code: &str) -> Result<String> {
        let response = self
            .http
            .post(&self.oauth.token_url)
            // Client id as the basic-auth user; installed apps have no secret.
            .basic_auth(&self.oauth.client_id, Some(""))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.oauth.redirect_uri.as_str()),
            ])
            .send()
            .await
            .context("Token request failed")?;

        if !response.status().is_success() {
            bail!("Token endpoint returned {}", response.status());
        }

        let body: TokenResponse = response
            .json()
            .await
            .context("Failed to parse token response")?;

        body.access_token
            .context("Token response did not contain an access token")
    }

    async fn fetch_identity(&self, token: &str) -> Result<String> {
        let response = self
            .http
            .get(format!("{}/api/v1/me", self.oauth.api_base))
            .bearer_auth(token)
            .send()
            .await
            .context("Identity request failed")?;

        if !response.status().is_success() {
            bail!("Identity endpoint returned {}", response.status());
        }

        let identity: IdentityResponse = response
            .json()
            .await
            .context("Failed to parse identity response")?;

        Ok(identity.name)
    }
}

//! OAuth2 authorization flow and token refresh.

use std::sync::Arc;

use chrono::{Duration, Utc};
use oauth2::{
    basic::BasicClient, AuthUrl, ClientId, ClientSecret, RedirectUrl, Scope, TokenResponse,
    TokenUrl,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use inkpress_common::{Error, Result};

use crate::credential::Credential;
use crate::store::CredentialStore;

/// OAuth2 authorization endpoint.
const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
/// OAuth2 token endpoint.
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
/// Default callback URL for the local server.
const DEFAULT_REDIRECT_URL: &str = "http://localhost:3000/oauth/callback";

/// Full Drive scope requested at consent time.
const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";

/// Configuration for the OAuth2 flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    /// Client ID issued by the provider.
    pub client_id: String,
    /// Client secret issued by the provider.
    pub client_secret: String,
    /// Redirect URL for the OAuth2 callback.
    pub redirect_url: String,
    /// Authorization endpoint (overridable for tests).
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    /// Token endpoint (overridable for tests).
    #[serde(default = "default_token_url")]
    pub token_url: String,
}

fn default_auth_url() -> String {
    GOOGLE_AUTH_URL.to_string()
}

fn default_token_url() -> String {
    GOOGLE_TOKEN_URL.to_string()
}

impl OAuthConfig {
    /// Build a configuration for the given client credentials with Google
    /// endpoints and the default redirect URL.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_url: DEFAULT_REDIRECT_URL.to_string(),
            auth_url: default_auth_url(),
            token_url: default_token_url(),
        }
    }

    /// Load the configuration from environment variables.
    ///
    /// Reads `GOOGLE_CLIENT_ID`, `GOOGLE_CLIENT_SECRET` and, optionally,
    /// `OAUTH_REDIRECT_URL`.
    ///
    /// # Errors
    /// - Client ID or secret missing from the environment
    pub fn from_env() -> Result<Self> {
        let client_id = std::env::var("GOOGLE_CLIENT_ID")
            .map_err(|_| Error::InvalidInput("GOOGLE_CLIENT_ID is not set".to_string()))?;
        let client_secret = std::env::var("GOOGLE_CLIENT_SECRET")
            .map_err(|_| Error::InvalidInput("GOOGLE_CLIENT_SECRET is not set".to_string()))?;

        let mut config = Self::new(client_id, client_secret);
        if let Ok(redirect) = std::env::var("OAUTH_REDIRECT_URL") {
            config.redirect_url = redirect;
        }
        Ok(config)
    }
}

/// Authorization state as seen by callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStatus {
    /// A credential is held (in memory or loadable from storage).
    Authenticated,
    /// No credential; visit `auth_url` to begin the flow.
    Unauthenticated {
        /// Provider consent URL to begin the flow.
        auth_url: String,
    },
}

/// Drives the three-step authorization-code exchange.
///
/// Consent URL generation has no side effects; a successful exchange
/// persists the credential through the [`CredentialStore`] before returning.
pub struct AuthFlow {
    client: BasicClient,
    store: Arc<CredentialStore>,
}

impl AuthFlow {
    /// Create a new flow over the given configuration and store.
    pub fn new(config: OAuthConfig, store: Arc<CredentialStore>) -> Result<Self> {
        let client = BasicClient::new(
            ClientId::new(config.client_id),
            Some(ClientSecret::new(config.client_secret)),
            AuthUrl::new(config.auth_url)
                .map_err(|e| Error::InvalidInput(format!("Invalid auth URL: {}", e)))?,
            Some(
                TokenUrl::new(config.token_url)
                    .map_err(|e| Error::InvalidInput(format!("Invalid token URL: {}", e)))?,
            ),
        )
        .set_redirect_uri(
            RedirectUrl::new(config.redirect_url)
                .map_err(|e| Error::InvalidInput(format!("Invalid redirect URL: {}", e)))?,
        );

        Ok(Self { client, store })
    }

    /// Produce the provider consent URL.
    ///
    /// Requests offline access and the full Drive scope, and forces
    /// re-consent so a refresh token is re-issued on every authorization.
    pub fn begin_authorization(&self) -> String {
        let (auth_url, _csrf_token) = self
            .client
            .authorize_url(oauth2::CsrfToken::new_random)
            .add_scope(Scope::new(DRIVE_SCOPE.to_string()))
            .add_extra_param("access_type", "offline")
            .add_extra_param("prompt", "consent")
            .url();

        auth_url.to_string()
    }

    /// Exchange an authorization code for a credential and persist it.
    ///
    /// # Errors
    /// - `AuthExchange` on an invalid or expired code, or a provider error;
    ///   any previously stored credential is left unchanged
    pub async fn complete_authorization(&self, code: &str) -> Result<Credential> {
        use oauth2::reqwest::async_http_client;
        use oauth2::AuthorizationCode;

        let token_result = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(async_http_client)
            .await
            .map_err(|e| Error::AuthExchange(format!("Token exchange failed: {}", e)))?;

        let credential = credential_from_response(&token_result, None)?;
        self.store.save(&credential).await?;

        info!("Authorization complete, credential stored");
        Ok(credential)
    }

    /// Report the current authorization state.
    pub async fn status(&self) -> AuthStatus {
        if self.store.current().await.is_some() {
            AuthStatus::Authenticated
        } else {
            AuthStatus::Unauthenticated {
                auth_url: self.begin_authorization(),
            }
        }
    }

    /// Obtain a fresh access token using a refresh token.
    ///
    /// The provider may omit a new refresh token from the response, in
    /// which case the old one is carried over.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Credential> {
        use oauth2::reqwest::async_http_client;
        use oauth2::RefreshToken;

        let token_result = self
            .client
            .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
            .request_async(async_http_client)
            .await
            .map_err(|e| Error::AuthExchange(format!("Token refresh failed: {}", e)))?;

        credential_from_response(&token_result, Some(refresh_token))
    }
}

/// Build a [`Credential`] from a token response.
///
/// `fallback_refresh_token` covers refresh responses that omit the token.
fn credential_from_response(
    token_result: &oauth2::basic::BasicTokenResponse,
    fallback_refresh_token: Option<&str>,
) -> Result<Credential> {
    let access_token = token_result.access_token().secret().clone();

    let refresh_token = match token_result.refresh_token() {
        Some(token) => token.secret().clone(),
        None => fallback_refresh_token
            .map(|t| t.to_string())
            .ok_or_else(|| {
                Error::AuthExchange(
                    "No refresh token received. Ensure 'offline' access and 'consent' prompt were requested.".to_string(),
                )
            })?,
    };

    let expires_in = token_result
        .expires_in()
        .unwrap_or_else(|| std::time::Duration::from_secs(3600));
    let expires_at =
        Utc::now() + Duration::from_std(expires_in).unwrap_or_else(|_| Duration::hours(1));

    let scopes = token_result
        .scopes()
        .map(|scopes| scopes.iter().map(|s| s.to_string()).collect())
        .unwrap_or_default();

    Ok(Credential {
        access_token,
        refresh_token,
        expires_at,
        scopes,
    })
}

/// Hands out valid access tokens, refreshing expired ones transparently.
///
/// Refreshed credentials are written back through the store so the new
/// access token survives a restart.
pub struct TokenSource {
    flow: Arc<AuthFlow>,
    store: Arc<CredentialStore>,
}

impl TokenSource {
    /// Create a token source over the given flow and store.
    pub fn new(flow: Arc<AuthFlow>, store: Arc<CredentialStore>) -> Self {
        Self { flow, store }
    }

    /// Get a valid (non-expired) access token.
    ///
    /// # Errors
    /// - `NotAuthenticated` when no credential is held
    /// - `AuthExchange` when the refresh fails
    pub async fn access_token(&self) -> Result<String> {
        let credential = self
            .store
            .current()
            .await
            .ok_or(Error::NotAuthenticated)?;

        if !credential.is_expired() {
            return Ok(credential.access_token);
        }

        info!("Refreshing expired access token");
        let refreshed = self.flow.refresh(&credential.refresh_token).await?;
        self.store.save(&refreshed).await?;

        Ok(refreshed.access_token)
    }
}

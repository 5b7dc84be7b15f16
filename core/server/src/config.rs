//! Server configuration, loaded once at startup.

use std::path::PathBuf;

use inkpress_auth::{CredentialStore, OAuthConfig};
use inkpress_common::Result;
use inkpress_render::RenderConfig;

/// Default listening port.
const DEFAULT_PORT: u16 = 3000;

/// Everything the server binary needs, read from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listening port.
    pub port: u16,
    /// OAuth2 client configuration.
    pub oauth: OAuthConfig,
    /// Credential file location.
    pub credential_path: PathBuf,
    /// Renderer configuration.
    pub render: RenderConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// `GOOGLE_CLIENT_ID` and `GOOGLE_CLIENT_SECRET` are required;
    /// `PORT`, `OAUTH_REDIRECT_URL`, `INKPRESS_CREDENTIALS`,
    /// `RENDER_MAX_CONCURRENT` and `CHROME_PATH` are optional.
    pub fn from_env() -> Result<Self> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let credential_path = std::env::var("INKPRESS_CREDENTIALS")
            .map(PathBuf::from)
            .unwrap_or_else(|_| CredentialStore::default_path());

        let mut render = RenderConfig::default();
        if let Some(max) = std::env::var("RENDER_MAX_CONCURRENT")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            render.max_concurrent = max;
        }
        if let Ok(path) = std::env::var("CHROME_PATH") {
            render.chrome_path = Some(PathBuf::from(path));
        }

        Ok(Self {
            port,
            oauth: OAuthConfig::from_env()?,
            credential_path,
            render,
        })
    }
}

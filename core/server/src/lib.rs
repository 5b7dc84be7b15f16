//! HTTP surface for Inkpress.
//!
//! Thin orchestration over the core crates: validate the request, check the
//! credential, render, publish, map outcomes to HTTP responses. All real
//! state and sequencing lives in `inkpress-auth`, `inkpress-render` and
//! `inkpress-storage`.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tracing::info;

use inkpress_auth::{AuthFlow, CredentialStore, TokenSource};
use inkpress_common::Result;
use inkpress_render::{ChromeRenderer, RenderEngine};
use inkpress_storage::{DriveStore, Publisher};

pub mod config;
pub mod routes;

pub use config::ServerConfig;

/// Shared state behind every handler.
#[derive(Clone)]
pub struct AppState {
    /// OAuth2 authorization flow.
    pub flow: Arc<AuthFlow>,
    /// Process-wide credential store.
    pub credentials: Arc<CredentialStore>,
    /// Render engine.
    pub renderer: Arc<dyn RenderEngine>,
    /// Auth-gated publisher.
    pub publisher: Arc<Publisher>,
}

impl AppState {
    /// Assemble state from pre-built components.
    pub fn new(
        flow: Arc<AuthFlow>,
        credentials: Arc<CredentialStore>,
        renderer: Arc<dyn RenderEngine>,
        publisher: Arc<Publisher>,
    ) -> Self {
        Self {
            flow,
            credentials,
            renderer,
            publisher,
        }
    }

    /// Wire up the production pipeline: Chrome renderer, Drive store,
    /// file-backed credential store.
    pub async fn from_config(config: &ServerConfig) -> Result<Self> {
        let credentials = Arc::new(CredentialStore::new(&config.credential_path));
        info!(path = %credentials.path().display(), "Using credential store");
        // Pick up a credential persisted by a previous run.
        credentials.load().await;

        let flow = Arc::new(AuthFlow::new(config.oauth.clone(), Arc::clone(&credentials))?);
        let tokens = Arc::new(TokenSource::new(Arc::clone(&flow), Arc::clone(&credentials)));
        let store = Arc::new(DriveStore::new(tokens));
        let publisher = Arc::new(Publisher::new(store, Arc::clone(&credentials)));
        let renderer = Arc::new(ChromeRenderer::new(config.render.clone()));

        Ok(Self::new(flow, credentials, renderer, publisher))
    }
}

/// Build the router over the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/auth", get(routes::auth_redirect))
        .route("/oauth/callback", get(routes::oauth_callback))
        .route("/auth-status", get(routes::auth_status))
        .route("/upload-pdf", post(routes::upload_pdf))
        .with_state(state)
}

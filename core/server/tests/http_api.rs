//! End-to-end scenarios against the router, with the browser engine and
//! storage provider stubbed out.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use tower::ServiceExt;

use inkpress_auth::{AuthFlow, Credential, CredentialStore, OAuthConfig};
use inkpress_common::{Error, Result};
use inkpress_render::{RenderEngine, RenderedPdf};
use inkpress_server::{router, AppState};
use inkpress_storage::{MemoryStore, Publisher, RemoteStore};

#[derive(Clone, Copy)]
enum StubMode {
    Succeed,
    FailRender,
    Overloaded,
}

struct StubEngine {
    mode: StubMode,
    calls: AtomicUsize,
}

impl StubEngine {
    fn new(mode: StubMode) -> Self {
        Self {
            mode,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl RenderEngine for StubEngine {
    async fn render(&self, _html: &str) -> Result<RenderedPdf> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.mode {
            StubMode::Succeed => Ok(RenderedPdf {
                bytes: b"%PDF-1.4 stub".to_vec(),
                page_height_mm: 297.0,
            }),
            StubMode::FailRender => Err(Error::Render("stub failure".to_string())),
            StubMode::Overloaded => Err(Error::Overloaded("no slot".to_string())),
        }
    }
}

struct Harness {
    app: Router,
    memory: Arc<MemoryStore>,
    engine: Arc<StubEngine>,
    credentials: Arc<CredentialStore>,
    _dir: tempfile::TempDir,
}

async fn harness(mode: StubMode, authenticated: bool) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let credentials = Arc::new(CredentialStore::new(dir.path().join("credential.json")));
    if authenticated {
        credentials
            .save(&Credential {
                access_token: "access".to_string(),
                refresh_token: "refresh".to_string(),
                expires_at: Utc::now() + Duration::hours(1),
                scopes: vec![],
            })
            .await
            .unwrap();
    }

    let flow = Arc::new(
        AuthFlow::new(
            OAuthConfig::new("test_id", "test_secret"),
            Arc::clone(&credentials),
        )
        .unwrap(),
    );
    let memory = Arc::new(MemoryStore::new());
    let publisher = Arc::new(Publisher::new(
        Arc::clone(&memory) as Arc<dyn RemoteStore>,
        Arc::clone(&credentials),
    ));
    let engine = Arc::new(StubEngine::new(mode));

    let state = AppState::new(
        flow,
        Arc::clone(&credentials),
        Arc::clone(&engine) as Arc<dyn RenderEngine>,
        publisher,
    );

    Harness {
        app: router(state),
        memory,
        engine,
        credentials,
        _dir: dir,
    }
}

fn upload_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/upload-pdf")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn upload_with_valid_auth_returns_file_id_and_link() {
    let h = harness(StubMode::Succeed, true).await;

    let response = h
        .app
        .oneshot(upload_request(r#"{"html":"<h1>Hi</h1>"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert!(!body["fileId"].as_str().unwrap().is_empty());
    assert!(!body["viewLink"].as_str().unwrap().is_empty());

    let uploads = h.memory.uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].name, "document.pdf");
}

#[tokio::test]
async fn upload_honors_name_and_folder() {
    let h = harness(StubMode::Succeed, true).await;

    let response = h
        .app
        .oneshot(upload_request(
            r#"{"html":"<canvas id='c' style='width:100px;height:50px'></canvas>","name":"chart","folderId":"f42"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let uploads = h.memory.uploads();
    assert_eq!(uploads[0].name, "chart.pdf");
    assert_eq!(uploads[0].folder_id.as_deref(), Some("f42"));
}

#[tokio::test]
async fn upload_without_html_is_rejected() {
    let h = harness(StubMode::Succeed, true).await;

    let response = h
        .app
        .oneshot(upload_request(r#"{"name":"chart"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "HTML content required");
    assert_eq!(h.engine.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn upload_with_empty_html_is_rejected() {
    let h = harness(StubMode::Succeed, true).await;

    let response = h
        .app
        .oneshot(upload_request(r#"{"html":"   "}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_without_credential_returns_auth_url_and_skips_pipeline() {
    let h = harness(StubMode::Succeed, false).await;

    let response = h
        .app
        .oneshot(upload_request(r#"{"html":"<h1>Hi</h1>"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert!(!body["error"].as_str().unwrap().is_empty());
    assert!(body["authUrl"].as_str().unwrap().contains("client_id=test_id"));

    // Neither the renderer nor the store was touched.
    assert_eq!(h.engine.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.memory.upload_count(), 0);
}

#[tokio::test]
async fn render_failure_maps_to_internal_error() {
    let h = harness(StubMode::FailRender, true).await;

    let response = h
        .app
        .oneshot(upload_request(r#"{"html":"<h1>Hi</h1>"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("Render failed"));
    assert_eq!(h.memory.upload_count(), 0);
}

#[tokio::test]
async fn overloaded_renderer_maps_to_service_unavailable() {
    let h = harness(StubMode::Overloaded, true).await;

    let response = h
        .app
        .oneshot(upload_request(r#"{"html":"<h1>Hi</h1>"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn upload_failure_maps_to_internal_error() {
    let h = harness(StubMode::Succeed, true).await;
    h.memory.fail_uploads();

    let response = h
        .app
        .oneshot(upload_request(r#"{"html":"<h1>Hi</h1>"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("Upload failed"));
}

#[tokio::test]
async fn auth_redirects_to_consent_url() {
    let h = harness(StubMode::Succeed, false).await;

    let response = h
        .app
        .oneshot(Request::builder().uri("/auth").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(location.starts_with("https://accounts.google.com/"));
    assert!(location.contains("prompt=consent"));
}

#[tokio::test]
async fn callback_without_code_is_rejected() {
    let h = harness(StubMode::Succeed, false).await;

    let response = h
        .app
        .oneshot(
            Request::builder()
                .uri("/oauth/callback")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Missing authorization code");
}

#[tokio::test]
async fn auth_status_reflects_credential() {
    let h = harness(StubMode::Succeed, false).await;
    let status_request = || {
        Request::builder()
            .uri("/auth-status")
            .body(Body::empty())
            .unwrap()
    };

    let response = h.app.clone().oneshot(status_request()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["authenticated"], false);
    assert!(body["authUrl"].as_str().unwrap().contains("accounts.google.com"));

    h.credentials
        .save(&Credential {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at: Utc::now() + Duration::hours(1),
            scopes: vec![],
        })
        .await
        .unwrap();

    let response = h.app.oneshot(status_request()).await.unwrap();
    let body = json_body(response).await;
    assert_eq!(body["authenticated"], true);
    assert!(body.get("authUrl").is_none());
}

//! Request handlers and response mapping.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use inkpress_auth::AuthStatus;
use inkpress_common::Error;

use crate::AppState;

/// Confirmation page shown after a successful authorization.
const CONFIRMATION_HTML: &str = "<html><body>\
<h1>Authorization complete</h1>\
<p>Inkpress can now publish to your Drive. You can close this window.</p>\
</body></html>";

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    pub html: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "folderId")]
    pub folder_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(rename = "authUrl", skip_serializing_if = "Option::is_none")]
    auth_url: Option<String>,
}

#[derive(Debug, Serialize)]
struct UploadResponse {
    success: bool,
    #[serde(rename = "fileId")]
    file_id: String,
    #[serde(rename = "viewLink")]
    view_link: String,
}

#[derive(Debug, Serialize)]
pub struct AuthStatusResponse {
    authenticated: bool,
    #[serde(rename = "authUrl", skip_serializing_if = "Option::is_none")]
    auth_url: Option<String>,
}

/// `GET /auth`: send the operator to the provider consent page.
pub async fn auth_redirect(State(state): State<AppState>) -> Redirect {
    Redirect::temporary(&state.flow.begin_authorization())
}

/// `GET /oauth/callback`: complete the authorization-code exchange.
pub async fn oauth_callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Response {
    let Some(code) = params.code else {
        return error_json(
            StatusCode::BAD_REQUEST,
            "Missing authorization code".to_string(),
            None,
        );
    };

    match state.flow.complete_authorization(&code).await {
        Ok(_) => {
            info!("Operator authorization completed");
            Html(CONFIRMATION_HTML).into_response()
        }
        Err(e) => {
            error!(error = %e, "Authorization exchange failed");
            error_json(StatusCode::INTERNAL_SERVER_ERROR, e.to_string(), None)
        }
    }
}

/// `GET /auth-status`: report whether publishing is possible.
pub async fn auth_status(State(state): State<AppState>) -> Json<AuthStatusResponse> {
    match state.flow.status().await {
        AuthStatus::Authenticated => Json(AuthStatusResponse {
            authenticated: true,
            auth_url: None,
        }),
        AuthStatus::Unauthenticated { auth_url } => Json(AuthStatusResponse {
            authenticated: false,
            auth_url: Some(auth_url),
        }),
    }
}

/// `POST /upload-pdf`: render the HTML and publish the PDF.
pub async fn upload_pdf(
    State(state): State<AppState>,
    Json(request): Json<UploadRequest>,
) -> Response {
    let html = match request.html {
        Some(html) if !html.trim().is_empty() => html,
        _ => {
            return error_json(
                StatusCode::BAD_REQUEST,
                "HTML content required".to_string(),
                None,
            );
        }
    };

    // Check the credential before spending a render on a request that
    // could not be published anyway.
    if state.credentials.current().await.is_none() {
        return error_json(
            StatusCode::UNAUTHORIZED,
            "Not authenticated".to_string(),
            Some(state.flow.begin_authorization()),
        );
    }

    let rendered = match state.renderer.render(&html).await {
        Ok(rendered) => rendered,
        Err(e) => return map_error(&state, e),
    };

    let filename = pdf_filename(request.name.as_deref());
    match state
        .publisher
        .publish(rendered.bytes, &filename, request.folder_id.as_deref())
        .await
    {
        Ok(published) => (
            StatusCode::OK,
            Json(UploadResponse {
                success: true,
                file_id: published.file_id,
                view_link: published.view_link,
            }),
        )
            .into_response(),
        Err(e) => map_error(&state, e),
    }
}

/// Map a pipeline error to its HTTP response.
fn map_error(state: &AppState, error: Error) -> Response {
    error!(error = %error, "Publish request failed");
    match error {
        Error::NotAuthenticated => error_json(
            StatusCode::UNAUTHORIZED,
            error.to_string(),
            Some(state.flow.begin_authorization()),
        ),
        Error::InvalidInput(_) => error_json(StatusCode::BAD_REQUEST, error.to_string(), None),
        Error::Overloaded(_) => {
            error_json(StatusCode::SERVICE_UNAVAILABLE, error.to_string(), None)
        }
        _ => error_json(StatusCode::INTERNAL_SERVER_ERROR, error.to_string(), None),
    }
}

fn error_json(status: StatusCode, error: String, auth_url: Option<String>) -> Response {
    (status, Json(ErrorBody { error, auth_url })).into_response()
}

/// Target filename: `name` (default `document`) with a `.pdf` suffix.
fn pdf_filename(name: Option<&str>) -> String {
    let base = match name {
        Some(name) if !name.trim().is_empty() => name.trim(),
        _ => "document",
    };
    if base.to_ascii_lowercase().ends_with(".pdf") {
        base.to_string()
    } else {
        format!("{}.pdf", base)
    }
}

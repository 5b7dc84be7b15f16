//! Google Drive API client.

use std::sync::Arc;

use futures::StreamExt;
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};

use inkpress_auth::TokenSource;
use inkpress_common::{Error, Result};

use crate::store::ByteStream;

/// Google Drive upload API base URL.
const DRIVE_UPLOAD_BASE: &str = "https://www.googleapis.com/upload/drive/v3";

/// Chunk size for resumable uploads (256KB minimum, must be multiple of 256KB).
pub(crate) const CHUNK_SIZE: usize = 256 * 1024;

/// Payloads up to this size go through the simple multipart upload.
pub(crate) const SIMPLE_UPLOAD_LIMIT: u64 = 5 * 1024 * 1024;

/// Metadata fields requested on every upload response.
const UPLOAD_FIELDS: &str = "id,name,webViewLink";

/// Uploaded-file metadata from the Drive API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveUpload {
    /// File ID.
    pub id: String,
    /// File name.
    pub name: String,
    /// Link to view the file in the Drive UI.
    #[serde(default)]
    pub web_view_link: Option<String>,
}

impl DriveUpload {
    /// View link for the file, synthesized from the ID when the API
    /// response omitted one.
    pub fn view_link(&self) -> String {
        self.web_view_link
            .clone()
            .unwrap_or_else(|| format!("https://drive.google.com/file/d/{}/view", self.id))
    }
}

/// Google Drive API client.
pub struct DriveClient {
    http: Client,
    tokens: Arc<TokenSource>,
}

impl DriveClient {
    /// Create a new Drive client.
    pub fn new(tokens: Arc<TokenSource>) -> Self {
        let http = Client::builder()
            .user_agent("Inkpress/0.1")
            .build()
            .expect("Failed to create HTTP client");

        Self { http, tokens }
    }

    /// Get authorization header.
    async fn auth_header(&self) -> Result<String> {
        let token = self.tokens.access_token().await?;
        Ok(format!("Bearer {}", token))
    }

    /// Upload a small file in one multipart request.
    pub async fn upload_multipart(
        &self,
        name: &str,
        folder_id: Option<&str>,
        data: Vec<u8>,
    ) -> Result<DriveUpload> {
        let url = format!("{}/files?uploadType=multipart", DRIVE_UPLOAD_BASE);
        let auth = self.auth_header().await?;

        let metadata_json = serde_json::to_string(&file_metadata(name, folder_id))
            .map_err(|e| Error::Serialization(format!("Failed to serialize metadata: {}", e)))?;

        let boundary = "InkpressBoundary";
        let body = multipart_body(&metadata_json, &data, boundary);

        let response = self
            .http
            .post(&url)
            .header(header::AUTHORIZATION, auth)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/related; boundary={}", boundary),
            )
            .query(&[("fields", UPLOAD_FIELDS)])
            .body(body)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Failed to upload file: {}", e)))?;

        self.handle_response(response).await
    }

    /// Start a resumable upload session.
    pub async fn start_resumable_upload(
        &self,
        name: &str,
        folder_id: Option<&str>,
        total_size: u64,
    ) -> Result<String> {
        let url = format!("{}/files?uploadType=resumable", DRIVE_UPLOAD_BASE);
        let auth = self.auth_header().await?;

        let response = self
            .http
            .post(&url)
            .header(header::AUTHORIZATION, auth)
            .header(header::CONTENT_TYPE, "application/json")
            .header("X-Upload-Content-Length", total_size.to_string())
            .query(&[("fields", UPLOAD_FIELDS)])
            .json(&file_metadata(name, folder_id))
            .send()
            .await
            .map_err(|e| Error::Network(format!("Failed to start resumable upload: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upload(format!(
                "Failed to start resumable upload: {} - {}",
                status, body
            )));
        }

        // Upload URI arrives in the Location header
        let upload_uri = response
            .headers()
            .get(header::LOCATION)
            .ok_or_else(|| Error::Upload("No upload URI in response".to_string()))?
            .to_str()
            .map_err(|e| Error::Upload(format!("Invalid upload URI: {}", e)))?
            .to_string();

        Ok(upload_uri)
    }

    /// Upload a chunk to a resumable upload session.
    ///
    /// Returns the uploaded file once the final chunk is accepted, `None`
    /// while the session expects more data (308 Resume Incomplete).
    pub async fn upload_chunk(
        &self,
        upload_uri: &str,
        data: &[u8],
        start_byte: u64,
        total_size: u64,
    ) -> Result<Option<DriveUpload>> {
        let content_range = content_range(start_byte, data.len() as u64, total_size);

        let response = self
            .http
            .put(upload_uri)
            .header(header::CONTENT_LENGTH, data.len().to_string())
            .header(header::CONTENT_RANGE, content_range)
            .body(data.to_vec())
            .send()
            .await
            .map_err(|e| Error::Network(format!("Failed to upload chunk: {}", e)))?;

        let status = response.status();

        if status == StatusCode::OK || status == StatusCode::CREATED {
            let file: DriveUpload = response
                .json()
                .await
                .map_err(|e| Error::Upload(format!("Failed to parse upload response: {}", e)))?;
            Ok(Some(file))
        } else if status.as_u16() == 308 {
            // 308 Resume Incomplete
            Ok(None)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(Error::Upload(format!(
                "Chunk upload failed: {} - {}",
                status, body
            )))
        }
    }

    /// Upload a large file using a resumable session fed from a stream.
    ///
    /// Peak memory is bounded by the chunk size regardless of `total_size`.
    pub async fn upload_resumable(
        &self,
        name: &str,
        folder_id: Option<&str>,
        mut stream: ByteStream,
        total_size: u64,
    ) -> Result<DriveUpload> {
        let upload_uri = self
            .start_resumable_upload(name, folder_id, total_size)
            .await?;

        let mut bytes_uploaded = 0u64;
        let mut buffer: Vec<u8> = Vec::with_capacity(CHUNK_SIZE);

        while let Some(chunk) = stream.next().await {
            buffer.extend_from_slice(&chunk?);

            while buffer.len() >= CHUNK_SIZE {
                let chunk_to_upload: Vec<u8> = buffer.drain(..CHUNK_SIZE).collect();
                let result = self
                    .upload_chunk(&upload_uri, &chunk_to_upload, bytes_uploaded, total_size)
                    .await?;

                bytes_uploaded += chunk_to_upload.len() as u64;

                if let Some(file) = result {
                    return Ok(file);
                }
            }
        }

        // Final partial chunk
        if !buffer.is_empty() {
            let result = self
                .upload_chunk(&upload_uri, &buffer, bytes_uploaded, total_size)
                .await?;
            if let Some(file) = result {
                return Ok(file);
            }
        }

        Err(Error::Upload(
            "Resumable upload ended before the provider acknowledged completion".to_string(),
        ))
    }

    /// Parse a successful JSON response or surface the provider error.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upload(format!(
                "Drive API error: {} - {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Upload(format!("Failed to parse Drive response: {}", e)))
    }
}

/// File metadata for an upload; `parents` only when a folder was supplied.
fn file_metadata(name: &str, folder_id: Option<&str>) -> serde_json::Value {
    let mut metadata = serde_json::json!({ "name": name });
    if let Some(folder) = folder_id {
        metadata["parents"] = serde_json::json!([folder]);
    }
    metadata
}

/// Assemble a multipart/related body with a JSON metadata part and a
/// binary content part.
fn multipart_body(metadata_json: &str, data: &[u8], boundary: &str) -> Vec<u8> {
    let mut body = Vec::new();

    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata_json.as_bytes());
    body.extend_from_slice(b"\r\n");

    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(b"Content-Type: application/pdf\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(b"\r\n");

    body.extend_from_slice(format!("--{}--", boundary).as_bytes());
    body
}

fn content_range(start_byte: u64, len: u64, total_size: u64) -> String {
    let end_byte = start_byte + len - 1;
    format!("bytes {}-{}/{}", start_byte, end_byte, total_size)
}

//! RemoteStore implementation over the Drive client.

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use tracing::debug;

use inkpress_auth::TokenSource;
use inkpress_common::Result;

use crate::store::{ByteStream, PublishedFile, RemoteStore};

use super::client::{DriveClient, SIMPLE_UPLOAD_LIMIT};

/// Google Drive remote store.
pub struct DriveStore {
    client: DriveClient,
}

impl DriveStore {
    /// Create a store whose uploads are authorized by the given token source.
    pub fn new(tokens: Arc<TokenSource>) -> Self {
        Self {
            client: DriveClient::new(tokens),
        }
    }
}

#[async_trait]
impl RemoteStore for DriveStore {
    fn name(&self) -> &str {
        "gdrive"
    }

    async fn create_file(
        &self,
        name: &str,
        folder_id: Option<&str>,
        mut data: ByteStream,
        size: u64,
    ) -> Result<PublishedFile> {
        let upload = if size <= SIMPLE_UPLOAD_LIMIT {
            debug!(name, size, "Uploading via multipart");
            let mut buffer = Vec::with_capacity(size as usize);
            while let Some(chunk) = data.next().await {
                buffer.extend_from_slice(&chunk?);
            }
            self.client.upload_multipart(name, folder_id, buffer).await?
        } else {
            debug!(name, size, "Uploading via resumable session");
            self.client
                .upload_resumable(name, folder_id, data, size)
                .await?
        };

        Ok(PublishedFile {
            view_link: upload.view_link(),
            file_id: upload.id,
        })
    }
}

//! Auth-gated publish orchestration.

use std::sync::Arc;

use bytes::Bytes;
use futures::stream;
use tracing::info;

use inkpress_auth::CredentialStore;
use inkpress_common::{Error, Result};

use crate::store::{ByteStream, PublishedFile, RemoteStore};

/// Stream chunk size for buffered payloads.
const STREAM_CHUNK: usize = 256 * 1024;

/// Publishes PDF bytes to a remote store under the current credential.
pub struct Publisher {
    store: Arc<dyn RemoteStore>,
    credentials: Arc<CredentialStore>,
}

impl Publisher {
    /// Create a publisher over the given store and credential store.
    pub fn new(store: Arc<dyn RemoteStore>, credentials: Arc<CredentialStore>) -> Self {
        Self { store, credentials }
    }

    /// Upload the bytes under `filename`, optionally into `folder_id`.
    ///
    /// # Preconditions
    /// - A credential must be present; without one this fails with
    ///   `NotAuthenticated` and never contacts the store
    ///
    /// # Errors
    /// - `NotAuthenticated` when no credential is held
    /// - `Upload`/`Network` on provider failure
    pub async fn publish(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        folder_id: Option<&str>,
    ) -> Result<PublishedFile> {
        if self.credentials.current().await.is_none() {
            return Err(Error::NotAuthenticated);
        }

        let size = bytes.len() as u64;
        info!(
            filename,
            size,
            store = self.store.name(),
            folder = folder_id.unwrap_or("<root>"),
            "Publishing document"
        );

        let published = self
            .store
            .create_file(filename, folder_id, chunked_stream(bytes), size)
            .await?;

        info!(file_id = %published.file_id, "Publish complete");
        Ok(published)
    }
}

/// Turn a buffered payload into a chunked byte stream.
fn chunked_stream(bytes: Vec<u8>) -> ByteStream {
    let chunks: Vec<Result<Bytes>> = bytes
        .chunks(STREAM_CHUNK)
        .map(|c| Ok(Bytes::copy_from_slice(c)))
        .collect();
    Box::pin(stream::iter(chunks))
}

//! Remote store trait definition.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use serde::{Deserialize, Serialize};

use inkpress_common::Result;

/// Result of a successful publish, returned verbatim to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishedFile {
    /// Provider-assigned stable identifier.
    pub file_id: String,
    /// Human-navigable view link.
    pub view_link: String,
}

/// Byte stream type for upload operations.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// A remote storage backend that can create one file per call.
///
/// This is the seam between the pipeline and the storage provider; the
/// provider's wider API surface is deliberately not modeled.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Get the store name (e.g., "gdrive", "memory").
    fn name(&self) -> &str;

    /// Create a file with the given name from a byte stream.
    ///
    /// When `folder_id` is supplied, the file is placed under that folder;
    /// otherwise the provider's default root location is used.
    ///
    /// # Errors
    /// - Upload rejected or failed by the provider
    /// - Network/I/O errors
    async fn create_file(
        &self,
        name: &str,
        folder_id: Option<&str>,
        data: ByteStream,
        size: u64,
    ) -> Result<PublishedFile>;
}

//! In-memory remote store for testing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use futures::StreamExt;
use uuid::Uuid;

use inkpress_common::{Error, Result};

use crate::store::{ByteStream, PublishedFile, RemoteStore};

/// One recorded upload.
#[derive(Debug, Clone)]
pub struct RecordedUpload {
    /// Filename the upload was created with.
    pub name: String,
    /// Destination folder, when one was supplied.
    pub folder_id: Option<String>,
    /// Uploaded payload size in bytes.
    pub size: u64,
    /// Identifier assigned to the upload.
    pub file_id: String,
}

/// In-memory remote store.
///
/// Records every upload for assertions. All data is lost on drop.
#[derive(Default)]
pub struct MemoryStore {
    uploads: RwLock<Vec<RecordedUpload>>,
    fail_uploads: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent upload fail, simulating a provider outage.
    pub fn fail_uploads(&self) {
        self.fail_uploads.store(true, Ordering::SeqCst);
    }

    /// Uploads recorded so far.
    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.read().unwrap().clone()
    }

    /// Number of uploads recorded so far.
    pub fn upload_count(&self) -> usize {
        self.uploads.read().unwrap().len()
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn create_file(
        &self,
        name: &str,
        folder_id: Option<&str>,
        mut data: ByteStream,
        _size: u64,
    ) -> Result<PublishedFile> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(Error::Upload("Simulated provider failure".to_string()));
        }

        let mut received = 0u64;
        while let Some(chunk) = data.next().await {
            received += chunk?.len() as u64;
        }

        let file_id = Uuid::new_v4().to_string();
        let upload = RecordedUpload {
            name: name.to_string(),
            folder_id: folder_id.map(|f| f.to_string()),
            size: received,
            file_id: file_id.clone(),
        };
        self.uploads.write().unwrap().push(upload);

        Ok(PublishedFile {
            view_link: format!("memory://files/{}", file_id),
            file_id,
        })
    }
}

//! Durable storage for the single process-wide credential.

use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use inkpress_common::{Error, Result};

use crate::credential::Credential;

/// Persists and reloads the delegated-access credential.
///
/// One JSON record on disk, one in-memory copy behind a lock. Writers
/// replace the whole record; a concurrent reader never observes a partially
/// written file because saves go through a temp file and rename.
pub struct CredentialStore {
    path: PathBuf,
    current: RwLock<Option<Credential>>,
}

impl CredentialStore {
    /// Create a store backed by the given file path.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            current: RwLock::new(None),
        }
    }

    /// Default credential location under the platform config directory.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("inkpress")
            .join("credential.json")
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the credential from durable storage, if present.
    ///
    /// Malformed or unreadable data is treated as absent: the failure is
    /// logged and `None` is returned, never an error. A successful read
    /// also refreshes the in-memory copy.
    pub async fn load(&self) -> Option<Credential> {
        let data = match fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No stored credential");
                return None;
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read stored credential");
                return None;
            }
        };

        match serde_json::from_str::<Credential>(&data) {
            Ok(credential) => {
                *self.current.write().await = Some(credential.clone());
                Some(credential)
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Stored credential is malformed, treating as absent");
                None
            }
        }
    }

    /// Serialize the credential and overwrite durable storage.
    ///
    /// The record is written to a sibling temp file and renamed into place
    /// so a concurrent `load` sees either the old or the new record.
    /// Errors surface to the caller.
    pub async fn save(&self, credential: &Credential) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let data = serde_json::to_vec_pretty(credential)
            .map_err(|e| Error::Serialization(format!("Failed to serialize credential: {}", e)))?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &data).await?;
        fs::rename(&tmp, &self.path).await?;

        *self.current.write().await = Some(credential.clone());
        debug!(path = %self.path.display(), "Credential saved");
        Ok(())
    }

    /// Return the in-memory credential, lazily re-attempting `load` when
    /// memory is empty but storage may not be (self-healing after restart).
    pub async fn current(&self) -> Option<Credential> {
        if let Some(credential) = self.current.read().await.clone() {
            return Some(credential);
        }
        self.load().await
    }
}

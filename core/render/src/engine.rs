//! Render engine trait and configuration.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use inkpress_common::Result;

/// A rendered PDF plus the page height it was exported with.
#[derive(Debug, Clone)]
pub struct RenderedPdf {
    /// PDF bytes.
    pub bytes: Vec<u8>,
    /// Computed page height in millimeters (>= one A4 page).
    pub page_height_mm: f64,
}

/// Renderer configuration.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Maximum time to wait for the document to load.
    pub load_timeout: Duration,
    /// Fixed wait after load so script-driven painting (charts etc.) can
    /// finish before measurement and capture.
    pub settle_delay: Duration,
    /// Maximum number of concurrent browser instances.
    pub max_concurrent: usize,
    /// How long a render may wait for admission before being rejected.
    pub queue_timeout: Duration,
    /// Explicit Chrome binary path; autodetected when absent.
    pub chrome_path: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            load_timeout: Duration::from_secs(30),
            settle_delay: Duration::from_secs(3),
            max_concurrent: 4,
            queue_timeout: Duration::from_secs(30),
            chrome_path: None,
        }
    }
}

/// Converts an HTML string into PDF bytes.
///
/// Implementations must release all browser resources on every exit path,
/// success or failure.
#[async_trait]
pub trait RenderEngine: Send + Sync {
    /// Render the given HTML to a single-page PDF.
    ///
    /// # Errors
    /// - `InvalidInput` on empty HTML
    /// - `RenderTimeout` when the document fails to settle in time
    /// - `Overloaded` when admission is refused
    /// - `Render` on any other engine failure
    async fn render(&self, html: &str) -> Result<RenderedPdf>;
}

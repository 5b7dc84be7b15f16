//! Headless-Chrome render engine.

use std::sync::Arc;

use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions};
use tokio::sync::Semaphore;
use tracing::{debug, info};

use inkpress_common::{Error, Result};

use crate::engine::{RenderConfig, RenderEngine, RenderedPdf};
use crate::page;

/// Renders HTML with an isolated headless-Chrome instance per render.
///
/// Admission is bounded by a semaphore of `max_concurrent` permits; a
/// render that cannot get a slot within `queue_timeout` is rejected with
/// [`Error::Overloaded`] instead of spawning an unbounded number of
/// browser processes.
pub struct ChromeRenderer {
    config: RenderConfig,
    permits: Arc<Semaphore>,
}

impl ChromeRenderer {
    /// Create a renderer with the given configuration.
    pub fn new(config: RenderConfig) -> Self {
        let slots = config.max_concurrent.max(1);
        Self {
            config,
            permits: Arc::new(Semaphore::new(slots)),
        }
    }
}

#[async_trait]
impl RenderEngine for ChromeRenderer {
    async fn render(&self, html: &str) -> Result<RenderedPdf> {
        if html.trim().is_empty() {
            return Err(Error::InvalidInput("HTML content is empty".to_string()));
        }

        let permit = tokio::time::timeout(
            self.config.queue_timeout,
            Arc::clone(&self.permits).acquire_owned(),
        )
        .await
        .map_err(|_| {
            Error::Overloaded(format!(
                "No renderer slot became available within {:?}",
                self.config.queue_timeout
            ))
        })?
        .map_err(|_| Error::Overloaded("Renderer pool is shut down".to_string()))?;

        let config = self.config.clone();
        let html = html.to_string();

        // Chrome control is blocking; keep it off the async worker threads.
        let result = tokio::task::spawn_blocking(move || render_blocking(&html, &config))
            .await
            .map_err(|e| Error::Render(format!("Render task failed: {}", e)))?;

        drop(permit);
        result
    }
}

/// One full render: launch, load, settle, flatten, measure, export.
///
/// The `Browser` kills its Chrome process on drop, so every exit path out
/// of this function releases the browser.
fn render_blocking(html: &str, config: &RenderConfig) -> Result<RenderedPdf> {
    let mut builder = LaunchOptions::default_builder();
    builder.headless(true);
    // Keep the connection alive through the load wait plus settle delay.
    builder.idle_browser_timeout(config.load_timeout + config.settle_delay + config.load_timeout);
    if let Some(path) = &config.chrome_path {
        builder.path(Some(path.clone()));
    }
    let options = builder
        .build()
        .map_err(|e| Error::Render(format!("Browser configuration failed: {}", e)))?;

    debug!("Launching isolated browser instance");
    let browser =
        Browser::new(options).map_err(|e| Error::Render(format!("Browser launch failed: {}", e)))?;

    let tab = browser
        .new_tab()
        .map_err(|e| Error::Render(format!("Failed to open tab: {}", e)))?;
    tab.set_default_timeout(config.load_timeout);

    // The HTML string is the document; nothing is fetched over the network,
    // so the load event doubles as the network-idle signal here.
    tab.navigate_to(&page::data_url(html))
        .map_err(|e| Error::Render(format!("Failed to load document: {}", e)))?;
    tab.wait_until_navigated()
        .map_err(|e| Error::RenderTimeout(format!("Document failed to settle: {}", e)))?;

    // Give chart libraries and other async painters time to finish before
    // measurement; PDF export cannot capture live canvas painting.
    std::thread::sleep(config.settle_delay);

    let flattened = tab
        .evaluate(page::FLATTEN_CANVASES_JS, false)
        .map_err(|e| Error::Render(format!("Canvas flattening failed: {}", e)))?;
    if let Some(count) = flattened.value.as_ref().and_then(|v| v.as_u64()) {
        if count > 0 {
            debug!(canvases = count, "Flattened canvas elements");
        }
    }

    let measured = tab
        .evaluate(page::MEASURE_BODY_JS, false)
        .map_err(|e| Error::Render(format!("Body measurement failed: {}", e)))?;
    let body_height_px = measured
        .value
        .and_then(|v| v.as_f64())
        .ok_or_else(|| Error::Render("Body measurement returned no value".to_string()))?;

    let page_height_mm = page::page_height_mm(body_height_px);

    let bytes = tab
        .print_to_pdf(Some(page::pdf_options(page_height_mm)))
        .map_err(|e| Error::Render(format!("PDF export failed: {}", e)))?;

    info!(
        body_height_px,
        page_height_mm,
        pdf_bytes = bytes.len(),
        "Render complete"
    );

    Ok(RenderedPdf {
        bytes,
        page_height_mm,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_empty_html_rejected_before_admission() {
        let renderer = ChromeRenderer::new(RenderConfig::default());
        let result = renderer.render("   ").await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_saturated_pool_rejects_with_overloaded() {
        let config = RenderConfig {
            max_concurrent: 1,
            queue_timeout: Duration::from_millis(10),
            ..RenderConfig::default()
        };
        let renderer = ChromeRenderer::new(config);

        // Hold the only slot so admission must time out.
        let held = Arc::clone(&renderer.permits).acquire_owned().await.unwrap();

        let result = renderer.render("<h1>Hi</h1>").await;
        assert!(matches!(result, Err(Error::Overloaded(_))));

        drop(held);
    }

    #[test]
    fn test_at_least_one_slot() {
        let config = RenderConfig {
            max_concurrent: 0,
            ..RenderConfig::default()
        };
        let renderer = ChromeRenderer::new(config);
        assert_eq!(renderer.permits.available_permits(), 1);
    }
}

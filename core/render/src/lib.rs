//! HTML to PDF rendering for Inkpress.
//!
//! The [`RenderEngine`] trait is the seam between the pipeline and the
//! browser engine; [`ChromeRenderer`] is the headless-Chrome implementation.
//! Output is always a single continuous page: short documents are padded to
//! one A4 page, tall documents get one page of the measured height instead
//! of pagination.

pub mod chrome;
pub mod engine;
pub mod page;

pub use chrome::ChromeRenderer;
pub use engine::{RenderConfig, RenderEngine, RenderedPdf};
pub use page::{page_height_mm, A4_HEIGHT_MM, A4_WIDTH_MM};

//! Page sizing, document URL construction and in-page scripts.

use headless_chrome::types::PrintToPdfOptions;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

/// A4 page width in millimeters.
pub const A4_WIDTH_MM: f64 = 210.0;
/// A4 page height in millimeters.
pub const A4_HEIGHT_MM: f64 = 297.0;
/// CSS pixel to millimeter conversion factor (96 dpi).
pub const PX_TO_MM: f64 = 0.264583;

const MM_PER_INCH: f64 = 25.4;

/// Output page height for a measured body height.
///
/// Short documents are floored at one A4 page; tall documents get a single
/// continuous page of the measured height.
pub fn page_height_mm(body_height_px: f64) -> f64 {
    (body_height_px * PX_TO_MM).max(A4_HEIGHT_MM)
}

pub(crate) fn mm_to_inches(mm: f64) -> f64 {
    mm / MM_PER_INCH
}

/// PDF export options: zero margins, A4 width, computed height,
/// backgrounds included.
pub(crate) fn pdf_options(page_height_mm: f64) -> PrintToPdfOptions {
    PrintToPdfOptions {
        print_background: Some(true),
        paper_width: Some(mm_to_inches(A4_WIDTH_MM)),
        paper_height: Some(mm_to_inches(page_height_mm)),
        margin_top: Some(0.0),
        margin_bottom: Some(0.0),
        margin_left: Some(0.0),
        margin_right: Some(0.0),
        prefer_css_page_size: Some(false),
        ..Default::default()
    }
}

/// Build a `data:` URL carrying the HTML document itself, so the browser
/// parses the string directly instead of fetching it over the network.
pub(crate) fn data_url(html: &str) -> String {
    format!(
        "data:text/html;charset=utf-8,{}",
        utf8_percent_encode(html, NON_ALPHANUMERIC)
    )
}

/// Replace every canvas with a static raster image of its current content.
///
/// Explicit CSS dimensions win over the canvas's intrinsic pixel
/// dimensions, so the flattened image occupies the same layout box as the
/// live canvas did. Returns the number of canvases flattened.
pub(crate) const FLATTEN_CANVASES_JS: &str = r#"
(() => {
    const canvases = Array.from(document.querySelectorAll('canvas'));
    for (const canvas of canvases) {
        const img = document.createElement('img');
        img.src = canvas.toDataURL('image/png');
        img.style.width = canvas.style.width || canvas.width + 'px';
        img.style.height = canvas.style.height || canvas.height + 'px';
        canvas.parentNode.replaceChild(img, canvas);
    }
    return canvases.length;
})()
"#;

/// Full scrollable height of the document body, in CSS pixels.
pub(crate) const MEASURE_BODY_JS: &str = "document.body.scrollHeight";

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_short_document_floors_at_one_page() {
        assert_eq!(page_height_mm(0.0), A4_HEIGHT_MM);
        assert_eq!(page_height_mm(100.0), A4_HEIGHT_MM);
    }

    #[test]
    fn test_tall_document_gets_single_continuous_page() {
        // 2000px is well past one A4 page
        let height = page_height_mm(2000.0);
        assert!(height > A4_HEIGHT_MM);
        assert!((height - 2000.0 * PX_TO_MM).abs() < 1e-9);
    }

    #[test]
    fn test_page_height_is_deterministic() {
        assert_eq!(page_height_mm(1234.5), page_height_mm(1234.5));
    }

    #[test]
    fn test_pdf_options_zero_margins_and_a4_width() {
        let options = pdf_options(500.0);
        assert_eq!(options.margin_top, Some(0.0));
        assert_eq!(options.margin_bottom, Some(0.0));
        assert_eq!(options.margin_left, Some(0.0));
        assert_eq!(options.margin_right, Some(0.0));
        assert_eq!(options.print_background, Some(true));
        assert!((options.paper_width.unwrap() - 210.0 / 25.4).abs() < 1e-9);
        assert!((options.paper_height.unwrap() - 500.0 / 25.4).abs() < 1e-9);
    }

    #[test]
    fn test_data_url_escapes_document() {
        let url = data_url("<h1>Hi & bye #1</h1>");
        assert!(url.starts_with("data:text/html;charset=utf-8,"));
        // '#' would terminate the URL, '&' and '%' would corrupt it
        let payload = &url["data:text/html;charset=utf-8,".len()..];
        assert!(!payload.contains('#'));
        assert!(!payload.contains('&'));
        assert!(!payload.contains('<'));
    }

    #[test]
    fn test_flatten_script_prefers_css_dimensions() {
        // The script must fall back to intrinsic pixels only when no CSS
        // size is set on the canvas.
        assert!(FLATTEN_CANVASES_JS.contains("canvas.style.width || canvas.width"));
        assert!(FLATTEN_CANVASES_JS.contains("canvas.style.height || canvas.height"));
        assert!(FLATTEN_CANVASES_JS.contains("toDataURL"));
    }

    proptest! {
        #[test]
        fn prop_page_height_never_below_one_page(px in 0.0f64..1_000_000.0) {
            prop_assert!(page_height_mm(px) >= A4_HEIGHT_MM);
        }
    }
}

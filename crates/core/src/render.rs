//! Page rendering contract
//!
//! The core never decodes documents itself. A [`PageRenderer`] turns
//! "page N at size S" into an opaque bitmap that the display surface shows
//! behind the strokes.

use crate::geometry::{PageSize, ViewportSize};
use crate::store::PageIndex;

/// A rasterized page ready to be used as background
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage<B> {
    pub page_index: PageIndex,

    /// Backend-specific pixel data
    pub bitmap: B,

    /// Bitmap width in pixels
    pub width_px: u32,

    /// Bitmap height in pixels
    pub height_px: u32,

    /// Page dimensions in points, used to map between pixels and page space
    pub page_size: PageSize,
}

impl<B> RenderedPage<B> {
    /// Pixels per page point along x
    pub fn scale(&self) -> f32 {
        if self.page_size.width_pt <= 0.0 {
            return 1.0;
        }
        self.width_px as f32 / self.page_size.width_pt
    }
}

/// Document rasterizer
///
/// Implementations must be deterministic for a given document, page index and
/// size. Failures (bad index, decode errors) are returned, never replaced by a
/// blank page.
pub trait PageRenderer {
    type Bitmap;
    type Error: std::error::Error + Send + Sync + 'static;

    fn page_count(&self) -> u32;

    /// Render `page_index` fitted inside `size`, keeping the page aspect ratio
    fn render(
        &self,
        page_index: PageIndex,
        size: ViewportSize,
    ) -> Result<RenderedPage<Self::Bitmap>, Self::Error>;
}

/// Largest size with the page's aspect ratio that fits inside `size`
pub fn fit_page(page: PageSize, size: ViewportSize) -> (u32, u32) {
    if page.width_pt <= 0.0 || page.height_pt <= 0.0 || size.is_empty() {
        return (size.width.max(1), size.height.max(1));
    }

    let scale = (size.width as f32 / page.width_pt).min(size.height as f32 / page.height_pt);
    let width = (page.width_pt * scale).round().max(1.0) as u32;
    let height = (page.height_pt * scale).round().max(1.0) as u32;
    (width.min(size.width), height.min(size.height))
}

use image::{ImageBuffer, Rgba};
use lopdf::{Document, Object, ObjectId};
use simplepres_core::{fit_page, PageIndex, PageRenderer, PageSize, RenderedPage, ViewportSize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub type RgbaImage = ImageBuffer<Rgba<u8>, Vec<u8>>;

const BORDER: Rgba<u8> = Rgba([220, 220, 220, 255]);
const PAPER: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// How deep `Parent` links are followed when looking for an inherited MediaBox
const MAX_INHERITANCE_DEPTH: usize = 16;

#[derive(Debug, Clone)]
pub enum OpenSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl OpenSource {
    fn into_bytes(self) -> Result<Vec<u8>, PdfEngineError> {
        match self {
            Self::Path(path) => Ok(fs::read(path)?),
            Self::Bytes(bytes) => Ok(bytes),
        }
    }
}

impl From<PathBuf> for OpenSource {
    fn from(value: PathBuf) -> Self {
        Self::Path(value)
    }
}

impl From<&Path> for OpenSource {
    fn from(value: &Path) -> Self {
        Self::Path(value.to_path_buf())
    }
}

impl From<Vec<u8>> for OpenSource {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PdfEngineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF parse error: {0}")]
    Parse(#[from] lopdf::Error),
    #[error("page {page} out of range (page_count={page_count})")]
    PageOutOfRange { page: u32, page_count: u32 },
    #[error("encrypted PDFs are not supported in the default backend")]
    EncryptedUnsupported,
    #[error("document has no pages")]
    NoPages,
    #[error("backend error: {0}")]
    Backend(String),
}

/// A loaded PDF document that can be rasterized page by page
pub trait PdfEngine {
    fn page_count(&self) -> u32;
    fn page_size(&self, page_index: u32) -> Result<PageSize, PdfEngineError>;
    /// Rasterize a page to exactly `width` x `height` pixels
    fn render_page(&self, page_index: u32, width: u32, height: u32) -> Result<RgbaImage, PdfEngineError>;
}

/// Pure-Rust backend
///
/// Reads page geometry with lopdf and rasterizes a blank bordered sheet of
/// the right proportions. Content rendering needs the `pdfium` feature.
#[derive(Debug, Clone)]
pub struct LopdfEngine {
    page_sizes: Vec<PageSize>,
}

impl LopdfEngine {
    pub fn open(source: impl Into<OpenSource>) -> Result<Self, PdfEngineError> {
        Self::from_bytes(&source.into().into_bytes()?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PdfEngineError> {
        let page_sizes = Self::parse_sizes(bytes)?;
        debug!(pages = page_sizes.len(), "Parsed PDF with lopdf");
        Ok(Self { page_sizes })
    }

    fn parse_sizes(bytes: &[u8]) -> Result<Vec<PageSize>, PdfEngineError> {
        if bytes.windows("/Encrypt".len()).any(|window| window == b"/Encrypt") {
            return Err(PdfEngineError::EncryptedUnsupported);
        }

        let doc = Document::load_mem(bytes)?;
        let sizes: Vec<PageSize> = doc
            .get_pages()
            .into_values()
            .map(|object_id| media_box(&doc, object_id).unwrap_or_default())
            .collect();

        if sizes.is_empty() {
            return Err(PdfEngineError::NoPages);
        }
        Ok(sizes)
    }
}

/// MediaBox of a page, inherited from its ancestors when absent
fn media_box(doc: &Document, page_id: ObjectId) -> Option<PageSize> {
    let mut current = page_id;
    for _ in 0..MAX_INHERITANCE_DEPTH {
        let dict = doc.get_dictionary(current).ok()?;
        if let Some(size) = dict.get(b"MediaBox").ok().and_then(size_from_box) {
            return Some(size);
        }
        current = dict.get(b"Parent").ok()?.as_reference().ok()?;
    }
    None
}

fn size_from_box(obj: &Object) -> Option<PageSize> {
    let array = obj.as_array().ok()?;
    let [x0, y0, x1, y1] = array.as_slice() else {
        return None;
    };
    let (x0, y0, x1, y1) = (number(x0)?, number(y0)?, number(x1)?, number(y1)?);
    Some(PageSize { width_pt: (x1 - x0).abs(), height_pt: (y1 - y0).abs() })
}

fn number(obj: &Object) -> Option<f32> {
    obj.as_float().ok().or_else(|| obj.as_i64().ok().map(|value| value as f32))
}

fn check_page(page_sizes: &[PageSize], page_index: u32) -> Result<PageSize, PdfEngineError> {
    page_sizes.get(page_index as usize).copied().ok_or(PdfEngineError::PageOutOfRange {
        page: page_index,
        page_count: page_sizes.len() as u32,
    })
}

impl PdfEngine for LopdfEngine {
    fn page_count(&self) -> u32 {
        self.page_sizes.len() as u32
    }

    fn page_size(&self, page_index: u32) -> Result<PageSize, PdfEngineError> {
        check_page(&self.page_sizes, page_index)
    }

    fn render_page(&self, page_index: u32, width: u32, height: u32) -> Result<RgbaImage, PdfEngineError> {
        self.page_size(page_index)?;
        let (width, height) = (width.max(1), height.max(1));

        let mut image = RgbaImage::from_pixel(width, height, PAPER);

        if width >= 4 && height >= 4 {
            for x in 0..width {
                image.put_pixel(x, 0, BORDER);
                image.put_pixel(x, height - 1, BORDER);
            }
            for y in 0..height {
                image.put_pixel(0, y, BORDER);
                image.put_pixel(width - 1, y, BORDER);
            }
        }

        Ok(image)
    }
}

#[cfg(feature = "pdfium")]
pub mod pdfium_backend {
    use super::*;
    use pdfium_render::prelude::*;

    /// Real rasterization through the PDFium library
    pub struct PdfiumEngine {
        pdfium: Pdfium,
        bytes: Vec<u8>,
        page_sizes: Vec<PageSize>,
    }

    impl PdfiumEngine {
        /// Bind PDFium next to the executable, in the working directory, or
        /// from the system library path, in that order
        fn bind() -> Result<Pdfium, PdfEngineError> {
            let exe_dir = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf));

            if let Some(dir) = exe_dir {
                if let Ok(bindings) =
                    Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&dir))
                {
                    return Ok(Pdfium::new(bindings));
                }
            }

            let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                .or_else(|_| Pdfium::bind_to_system_library())
                .map_err(|err| PdfEngineError::Backend(format!("failed to bind pdfium library: {err}")))?;
            Ok(Pdfium::new(bindings))
        }

        pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, PdfEngineError> {
            let pdfium = Self::bind()?;
            let page_sizes = {
                let document = pdfium
                    .load_pdf_from_byte_slice(&bytes, None)
                    .map_err(|err| PdfEngineError::Backend(err.to_string()))?;
                document
                    .pages()
                    .iter()
                    .map(|page| PageSize { width_pt: page.width().value, height_pt: page.height().value })
                    .collect::<Vec<_>>()
            };

            if page_sizes.is_empty() {
                return Err(PdfEngineError::NoPages);
            }
            Ok(Self { pdfium, bytes, page_sizes })
        }
    }

    impl PdfEngine for PdfiumEngine {
        fn page_count(&self) -> u32 {
            self.page_sizes.len() as u32
        }

        fn page_size(&self, page_index: u32) -> Result<PageSize, PdfEngineError> {
            check_page(&self.page_sizes, page_index)
        }

        fn render_page(&self, page_index: u32, width: u32, height: u32) -> Result<RgbaImage, PdfEngineError> {
            self.page_size(page_index)?;
            let backend = |err: PdfiumError| PdfEngineError::Backend(err.to_string());

            let document = self.pdfium.load_pdf_from_byte_slice(&self.bytes, None).map_err(backend)?;
            let page = document.pages().get(page_index as u16).map_err(backend)?;

            let config = PdfRenderConfig::new()
                .set_target_width(width.max(1) as i32)
                .set_target_height(height.max(1) as i32);
            let bitmap = page.render_with_config(&config).map_err(backend)?;

            let (bitmap_width, bitmap_height) = (bitmap.width() as u32, bitmap.height() as u32);
            RgbaImage::from_raw(bitmap_width, bitmap_height, bitmap.as_rgba_bytes().to_vec()).ok_or_else(|| {
                PdfEngineError::Backend(format!("pdfium returned a malformed {bitmap_width}x{bitmap_height} bitmap"))
            })
        }
    }
}

/// Open a document with the best available backend
#[cfg(feature = "pdfium")]
pub fn open_engine(source: OpenSource) -> Result<Box<dyn PdfEngine>, PdfEngineError> {
    let bytes = source.into_bytes()?;
    match pdfium_backend::PdfiumEngine::from_bytes(bytes.clone()) {
        Ok(engine) => Ok(Box::new(engine)),
        Err(err) => {
            tracing::warn!(error = %err, "PDFium unavailable, falling back to lopdf");
            Ok(Box::new(LopdfEngine::from_bytes(&bytes)?))
        }
    }
}

/// Open a document with the best available backend
#[cfg(not(feature = "pdfium"))]
pub fn open_engine(source: OpenSource) -> Result<Box<dyn PdfEngine>, PdfEngineError> {
    Ok(Box::new(LopdfEngine::open(source)?))
}

/// Adapts a [`PdfEngine`] to the page rendering contract of a session
pub struct PdfPageRenderer {
    engine: Box<dyn PdfEngine>,
}

impl PdfPageRenderer {
    pub fn new(engine: Box<dyn PdfEngine>) -> Self {
        Self { engine }
    }

    pub fn open(source: impl Into<OpenSource>) -> Result<Self, PdfEngineError> {
        let engine = open_engine(source.into())?;
        info!(pages = engine.page_count(), "Opened PDF document");
        Ok(Self::new(engine))
    }
}

impl PageRenderer for PdfPageRenderer {
    type Bitmap = RgbaImage;
    type Error = PdfEngineError;

    fn page_count(&self) -> u32 {
        self.engine.page_count()
    }

    fn render(&self, page_index: PageIndex, size: ViewportSize) -> Result<RenderedPage<RgbaImage>, PdfEngineError> {
        let page_size = self.engine.page_size(page_index)?;
        let (width, height) = fit_page(page_size, size);
        let bitmap = self.engine.render_page(page_index, width, height)?;
        debug!(page = page_index, width = bitmap.width(), height = bitmap.height(), "Rendered page");

        Ok(RenderedPage {
            page_index,
            width_px: bitmap.width(),
            height_px: bitmap.height(),
            bitmap,
            page_size,
        })
    }
}

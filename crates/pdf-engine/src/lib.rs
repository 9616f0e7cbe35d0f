use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgba};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub type RgbaImage = ImageBuffer<Rgba<u8>, Vec<u8>>;

const SCALE_EPSILON: f32 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentHandle(u64);

impl DocumentHandle {
    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSize {
    pub width_pt: f32,
    pub height_pt: f32,
}

/// One positioned glyph run as the text extraction service reports it
///
/// `transform` is the PDF text matrix `[a, b, c, d, e, f]` in bottom-left
/// page space; `width` is the run's advance in points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTextRun {
    pub text: String,
    pub transform: [f32; 6],
    pub width: f32,
    #[serde(default)]
    pub font_name: String,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderRequest {
    pub page_index: u32,
    /// Pixels per point
    pub scale: f32,
}

#[derive(Debug, Clone)]
pub enum OpenSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
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
    #[error("capture parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("raster error: {0}")]
    Image(#[from] image::ImageError),
    #[error("invalid handle {0}")]
    InvalidHandle(u64),
    #[error("page {page} out of range (page_count={page_count})")]
    PageOutOfRange { page: u32, page_count: u32 },
    #[error("backend error: {0}")]
    Backend(String),
}

/// Everything the reconstruction pipeline needs from a document backend
pub trait PdfEngine {
    fn open(&mut self, source: OpenSource) -> Result<DocumentHandle, PdfEngineError>;
    fn page_count(&self, handle: DocumentHandle) -> Result<u32, PdfEngineError>;
    fn page_size(
        &self,
        handle: DocumentHandle,
        page_index: u32,
    ) -> Result<PageSize, PdfEngineError>;
    fn text_runs(
        &self,
        handle: DocumentHandle,
        page_index: u32,
    ) -> Result<Vec<RawTextRun>, PdfEngineError>;
    fn render_page(
        &self,
        handle: DocumentHandle,
        request: RenderRequest,
    ) -> Result<RgbaImage, PdfEngineError>;
    fn close(&mut self, handle: DocumentHandle) -> Result<(), PdfEngineError>;
}

/// Pre-rendered raster of a page and the scale it was rendered at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturedRaster {
    pub path: PathBuf,
    pub scale: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedPage {
    #[serde(flatten)]
    pub size: PageSize,
    #[serde(default)]
    pub runs: Vec<RawTextRun>,
    #[serde(default)]
    pub raster: Option<CapturedRaster>,
}

/// On-disk capture of what the extraction and rendering services produced
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Capture {
    pub pages: Vec<CapturedPage>,
}

#[derive(Debug, Clone)]
struct DocumentRecord {
    pages: Vec<CapturedPage>,
    /// Raster paths resolve against this directory
    base_dir: Option<PathBuf>,
}

/// Backend reading capture files instead of PDF bytes
///
/// Pages without a raster render as blank white pages.
#[derive(Debug, Default)]
pub struct CaptureEngine {
    next_handle: u64,
    docs: HashMap<DocumentHandle, DocumentRecord>,
}

impl CaptureEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn parse_capture(bytes: &[u8]) -> Result<Vec<CapturedPage>, PdfEngineError> {
        let capture: Capture = serde_json::from_slice(bytes)?;
        if capture.pages.is_empty() {
            return Err(PdfEngineError::Backend("capture has no pages".to_owned()));
        }

        for (index, page) in capture.pages.iter().enumerate() {
            if page.size.width_pt <= 0.0 || page.size.height_pt <= 0.0 {
                return Err(PdfEngineError::Backend(format!(
                    "page {index} has non-positive size {}x{}",
                    page.size.width_pt, page.size.height_pt
                )));
            }
            if let Some(raster) = &page.raster {
                if raster.scale <= 0.0 {
                    return Err(PdfEngineError::Backend(format!(
                        "page {index} raster has non-positive scale {}",
                        raster.scale
                    )));
                }
            }
        }

        Ok(capture.pages)
    }

    fn record(&self, handle: DocumentHandle) -> Result<&DocumentRecord, PdfEngineError> {
        self.docs.get(&handle).ok_or(PdfEngineError::InvalidHandle(handle.raw()))
    }

    fn page(
        &self,
        handle: DocumentHandle,
        page_index: u32,
    ) -> Result<(&DocumentRecord, &CapturedPage), PdfEngineError> {
        let record = self.record(handle)?;
        let page = record.pages.get(page_index as usize).ok_or(PdfEngineError::PageOutOfRange {
            page: page_index,
            page_count: record.pages.len() as u32,
        })?;
        Ok((record, page))
    }
}

impl PdfEngine for CaptureEngine {
    fn open(&mut self, source: OpenSource) -> Result<DocumentHandle, PdfEngineError> {
        let (bytes, base_dir) = match source {
            OpenSource::Path(path) => {
                let bytes = fs::read(&path)?;
                (bytes, path.parent().map(Path::to_path_buf))
            }
            OpenSource::Bytes(bytes) => (bytes, None),
        };

        let pages = Self::parse_capture(&bytes)?;
        tracing::debug!(pages = pages.len(), "opened capture");

        self.next_handle += 1;
        let handle = DocumentHandle(self.next_handle);
        self.docs.insert(handle, DocumentRecord { pages, base_dir });

        Ok(handle)
    }

    fn page_count(&self, handle: DocumentHandle) -> Result<u32, PdfEngineError> {
        Ok(self.record(handle)?.pages.len() as u32)
    }

    fn page_size(
        &self,
        handle: DocumentHandle,
        page_index: u32,
    ) -> Result<PageSize, PdfEngineError> {
        Ok(self.page(handle, page_index)?.1.size)
    }

    fn text_runs(
        &self,
        handle: DocumentHandle,
        page_index: u32,
    ) -> Result<Vec<RawTextRun>, PdfEngineError> {
        Ok(self.page(handle, page_index)?.1.runs.clone())
    }

    fn render_page(
        &self,
        handle: DocumentHandle,
        request: RenderRequest,
    ) -> Result<RgbaImage, PdfEngineError> {
        let (record, page) = self.page(handle, request.page_index)?;
        let scale = if request.scale <= 0.0 { 1.0 } else { request.scale };

        let width = (page.size.width_pt * scale).round().max(1.0) as u32;
        let height = (page.size.height_pt * scale).round().max(1.0) as u32;

        let Some(raster) = &page.raster else {
            return Ok(RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255])));
        };

        let path = match &record.base_dir {
            Some(dir) if raster.path.is_relative() => dir.join(&raster.path),
            _ => raster.path.clone(),
        };
        let image = image::open(&path)?.to_rgba8();

        if (raster.scale - scale).abs() <= SCALE_EPSILON {
            return Ok(image);
        }

        tracing::debug!(
            from = raster.scale,
            to = scale,
            path = %path.display(),
            "resampling captured raster"
        );
        Ok(imageops::resize(&image, width, height, FilterType::Triangle))
    }

    fn close(&mut self, handle: DocumentHandle) -> Result<(), PdfEngineError> {
        self.docs.remove(&handle).map(|_| ()).ok_or(PdfEngineError::InvalidHandle(handle.raw()))
    }
}

pub fn default_engine() -> CaptureEngine {
    CaptureEngine::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAPTURE: &str = r#"{
        "pages": [
            {
                "widthPt": 200,
                "heightPt": 100,
                "runs": [
                    {"text": "Hello", "transform": [12, 0, 0, 12, 10, 80], "width": 30, "fontName": "Helvetica"}
                ]
            },
            {"widthPt": 300, "heightPt": 400}
        ]
    }"#;

    fn open_sample(engine: &mut CaptureEngine) -> DocumentHandle {
        engine
            .open(OpenSource::Bytes(CAPTURE.as_bytes().to_vec()))
            .expect("open should succeed")
    }

    #[test]
    fn opens_capture_and_reads_pages() {
        let mut engine = CaptureEngine::new();
        let handle = open_sample(&mut engine);

        assert_eq!(engine.page_count(handle).expect("count should succeed"), 2);
        assert_eq!(
            engine.page_size(handle, 1).expect("size should succeed"),
            PageSize { width_pt: 300.0, height_pt: 400.0 }
        );

        let runs = engine.text_runs(handle, 0).expect("runs should succeed");
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].font_name, "Helvetica");
        assert!(!runs[0].bold);
        assert!(engine.text_runs(handle, 1).expect("runs should succeed").is_empty());
    }

    #[test]
    fn page_without_raster_renders_blank_white() {
        let mut engine = CaptureEngine::new();
        let handle = open_sample(&mut engine);

        let image = engine
            .render_page(handle, RenderRequest { page_index: 0, scale: 2.0 })
            .expect("render should succeed");

        assert_eq!((image.width(), image.height()), (400, 200));
        assert!(image.pixels().all(|pixel| *pixel == Rgba([255, 255, 255, 255])));
    }

    #[test]
    fn raster_is_resolved_relative_to_capture_and_resampled() {
        let dir = tempfile::tempdir().expect("tempdir");
        let raster = RgbaImage::from_pixel(40, 20, Rgba([10, 20, 30, 255]));
        raster.save(dir.path().join("page.png")).expect("write png");

        let capture = r#"{"pages": [{"widthPt": 20, "heightPt": 10,
            "raster": {"path": "page.png", "scale": 2.0}}]}"#;
        let capture_path = dir.path().join("capture.json");
        fs::write(&capture_path, capture).expect("write capture");

        let mut engine = CaptureEngine::new();
        let handle = engine.open(OpenSource::Path(capture_path)).expect("open should succeed");

        let native = engine
            .render_page(handle, RenderRequest { page_index: 0, scale: 2.0 })
            .expect("render should succeed");
        assert_eq!((native.width(), native.height()), (40, 20));
        assert_eq!(native.get_pixel(5, 5), &Rgba([10, 20, 30, 255]));

        let halved = engine
            .render_page(handle, RenderRequest { page_index: 0, scale: 1.0 })
            .expect("render should succeed");
        assert_eq!((halved.width(), halved.height()), (20, 10));
    }

    #[test]
    fn empty_capture_is_rejected() {
        let mut engine = CaptureEngine::new();
        let err = engine
            .open(OpenSource::Bytes(br#"{"pages": []}"#.to_vec()))
            .expect_err("should reject empty capture");

        assert!(matches!(err, PdfEngineError::Backend(_)));
    }

    #[test]
    fn page_out_of_range_returns_error() {
        let mut engine = CaptureEngine::new();
        let handle = open_sample(&mut engine);

        let err = engine.page_size(handle, 5).expect_err("should fail past the last page");
        assert!(matches!(err, PdfEngineError::PageOutOfRange { page: 5, page_count: 2 }));
    }

    #[test]
    fn invalid_handle_returns_error() {
        let engine = CaptureEngine::new();
        let err =
            engine.page_count(DocumentHandle(999)).expect_err("should fail for unknown handle");

        assert!(matches!(err, PdfEngineError::InvalidHandle(999)));
    }

    #[test]
    fn close_releases_handle() {
        let mut engine = CaptureEngine::new();
        let handle = open_sample(&mut engine);

        engine.close(handle).expect("close should succeed");
        assert!(engine.close(handle).is_err());
    }
}

//! Rendering: layout table, display list, rasterizer and the export pipeline

pub mod export;
pub mod layout;
pub mod paint;
pub mod raster;
pub mod readiness;

pub use export::{ExportReport, Exporter};
pub use layout::{template_for, CollageView, GridCell, GridTemplate, Rect};
pub use raster::{CaptureEngine, RasterCapture};
pub use readiness::wait_for_images;

use image::DynamicImage;

/// A captured collage
#[derive(Debug, Clone)]
pub struct Screenshot {
    pub width: u32,
    pub height: u32,
    pub png_data: Vec<u8>,
}

impl Screenshot {
    /// `data:image/png;base64,...` form used for archival
    pub fn to_data_uri(&self) -> String {
        crate::platform::loader::encode_data_uri("image/png", &self.png_data)
    }
}

/// An image that passed the readiness barrier, decoded and ready to paint
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub src: String,
    pub image: DynamicImage,
}

/// Download name for a capture taken at `millis`
pub fn export_filename(millis: i64) -> String {
    format!("collage-{}.png", millis)
}

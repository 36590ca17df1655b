//! Rasterizer: paints a collage view into a PNG

use crate::rendering::layout::CollageView;
use crate::rendering::paint::{build_display_list, PaintCommand};
use crate::rendering::{LoadedImage, Screenshot};
use crate::{CollageConfig, Error, Result};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

/// Turns a composed view plus its decoded images into a raster image.
pub trait CaptureEngine: Send + Sync {
    fn capture(
        &self,
        view: &CollageView,
        images: &[LoadedImage],
        config: &CollageConfig,
    ) -> Result<Screenshot>;
}

impl<T: CaptureEngine + ?Sized> CaptureEngine for std::sync::Arc<T> {
    fn capture(
        &self,
        view: &CollageView,
        images: &[LoadedImage],
        config: &CollageConfig,
    ) -> Result<Screenshot> {
        (**self).capture(view, images, config)
    }
}

/// CPU rasterizer built on the `image` crate.
///
/// Every image is scaled to cover its cell and center-cropped, and the result
/// is encoded as lossless PNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RasterCapture {
    pub filter: Option<FilterType>,
}

impl RasterCapture {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CaptureEngine for RasterCapture {
    fn capture(
        &self,
        view: &CollageView,
        images: &[LoadedImage],
        config: &CollageConfig,
    ) -> Result<Screenshot> {
        if images.len() != view.state.len() {
            return Err(Error::CaptureFailure(format!(
                "view has {} images but {} were loaded",
                view.state.len(),
                images.len()
            )));
        }
        let filter = self.filter.unwrap_or(FilterType::Triangle);
        let (width, height, commands) = build_display_list(view, config);
        let mut canvas = RgbaImage::new(width, height);

        for cmd in &commands {
            match cmd {
                PaintCommand::SolidRect { rect, rgba } => {
                    for y in rect.y..rect.bottom().min(height) {
                        for x in rect.x..rect.right().min(width) {
                            canvas.put_pixel(x, y, Rgba(*rgba));
                        }
                    }
                }
                PaintCommand::Image { rect, index } => {
                    if rect.width == 0 || rect.height == 0 {
                        continue;
                    }
                    let tile = images[*index]
                        .image
                        .resize_to_fill(rect.width, rect.height, filter)
                        .to_rgba8();
                    imageops::overlay(&mut canvas, &tile, rect.x as i64, rect.y as i64);
                }
            }
        }

        encode_png(canvas)
    }
}

fn encode_png(canvas: RgbaImage) -> Result<Screenshot> {
    let (width, height) = canvas.dimensions();
    let mut png_data = Vec::new();
    DynamicImage::ImageRgba8(canvas)
        .write_to(&mut Cursor::new(&mut png_data), ImageFormat::Png)
        .map_err(|e| Error::CaptureFailure(format!("PNG encoding failed: {}", e)))?;
    Ok(Screenshot {
        width,
        height,
        png_data,
    })
}

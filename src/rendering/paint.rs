//! Display list produced from a collage view

use crate::rendering::layout::{CollageView, Rect};
use crate::CollageConfig;

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    SolidRect {
        rect: Rect,
        rgba: [u8; 4],
    },
    /// Draw image `index` (into the loaded image list) covering `rect`
    Image {
        rect: Rect,
        index: usize,
    },
}

/// Paint commands in device pixels: background first, then one image per cell.
pub fn build_display_list(view: &CollageView, config: &CollageConfig) -> (u32, u32, Vec<PaintCommand>) {
    let ratio = config.pixel_ratio;
    let full = Rect {
        x: 0,
        y: 0,
        width: config.canvas.width,
        height: config.canvas.height,
    }
    .scaled(ratio);

    let mut commands = vec![PaintCommand::SolidRect {
        rect: full,
        rgba: config.background,
    }];
    commands.extend(
        view.template
            .resolve(config.canvas, config.gap)
            .into_iter()
            .enumerate()
            .map(|(index, rect)| PaintCommand::Image {
                rect: rect.scaled(ratio),
                index,
            }),
    );
    (full.width, full.height, commands)
}

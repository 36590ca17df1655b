use criterion::{criterion_group, criterion_main, Criterion};

use collagekit::rendering::{CaptureEngine, CollageView, LoadedImage, RasterCapture};
use collagekit::state::{self, CollageImage, CollageLayout};
use collagekit::CollageConfig;
use image::{DynamicImage, Rgba, RgbaImage};

fn solid(w: u32, h: u32, rgba: [u8; 4]) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba(rgba)))
}

fn fixture(count: usize, layout: CollageLayout) -> (CollageView, Vec<LoadedImage>) {
    let images: Vec<CollageImage> = (0..count)
        .map(|i| CollageImage::new(format!("img{}", i), format!("mem://{}", i)))
        .collect();
    let state = state::create(images).unwrap().with_layout(layout);
    let loaded = state
        .images()
        .iter()
        .enumerate()
        .map(|(i, img)| LoadedImage {
            src: img.src.clone(),
            image: solid(1200, 900, [(i * 60) as u8, 90, 200, 255]),
        })
        .collect();
    (CollageView::from_state(&state), loaded)
}

fn bench_capture(c: &mut Criterion) {
    let config = CollageConfig::default();
    let engine = RasterCapture::new();

    for (count, layout) in [(4, CollageLayout::Grid), (3, CollageLayout::Grid), (2, CollageLayout::Horizontal)] {
        let (view, loaded) = fixture(count, layout);
        c.bench_function(&format!("capture_{}_{}", count, layout), |b| {
            b.iter(|| {
                let _ = engine.capture(&view, &loaded, &config).unwrap();
            })
        });
    }
}

fn bench_layout(c: &mut Criterion) {
    let config = CollageConfig::default();
    c.bench_function("resolve_grid_templates", |b| {
        b.iter(|| {
            for count in 1..=4 {
                for layout in CollageLayout::ALL {
                    let t = collagekit::rendering::template_for(count, layout);
                    let _ = t.resolve(config.canvas, config.gap);
                }
            }
        })
    });
}

criterion_group!(benches, bench_capture, bench_layout);
criterion_main!(benches);

//! Scene model, templates and the capture strategies.
//!
//! A capture strategy rasterizes a scene into an encoded bitmap. Two are
//! provided: the vector path (serialize to SVG, rasterize with resvg) and a
//! direct tiny-skia painter used as the fallback. The export pipeline tries
//! them in order.

pub mod raster;
pub mod scene;
pub mod svg;
pub mod template;

use std::io::Cursor;

use image::{Rgb, RgbImage, RgbaImage};
use tiny_skia::Pixmap;

use crate::error::{Error, Result};
use crate::readiness::ResolvedImages;
use crate::rendering::scene::Scene;
use crate::{OutputFormat, JPEG_QUALITY};

/// One way of turning a scene into an encoded bitmap
pub trait CaptureStrategy {
    fn name(&self) -> &'static str;

    /// Rasterize `scene` at its fixed dimensions and encode to `format`.
    /// Resolved images are shared so every strategy paints the same pixels.
    fn capture(
        &self,
        scene: &Scene,
        images: &ResolvedImages,
        format: OutputFormat,
    ) -> Result<Vec<u8>>;
}

/// Encode straight-alpha RGBA pixels to the requested format. PNG keeps the
/// alpha channel; JPEG has none, so the image is flattened over white at
/// quality 92.
pub(crate) fn encode_rgba(pixels: RgbaImage, format: OutputFormat) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Png => {
            let mut buf = Cursor::new(Vec::new());
            pixels
                .write_to(&mut buf, image::ImageFormat::Png)
                .map_err(|e| Error::EncodeError(format!("png: {}", e)))?;
            Ok(buf.into_inner())
        }
        OutputFormat::Jpeg => {
            let flat = flatten_over_white(&pixels);
            let mut buf = Vec::new();
            let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY);
            encoder
                .encode(
                    flat.as_raw(),
                    flat.width(),
                    flat.height(),
                    image::ExtendedColorType::Rgb8,
                )
                .map_err(|e| Error::EncodeError(format!("jpeg: {}", e)))?;
            Ok(buf)
        }
    }
}

fn flatten_over_white(pixels: &RgbaImage) -> RgbImage {
    let mut out = RgbImage::new(pixels.width(), pixels.height());
    for (src, dst) in pixels.pixels().zip(out.pixels_mut()) {
        let a = u16::from(src[3]);
        let blend = |c: u8| -> u8 { ((u16::from(c) * a + 255 * (255 - a)) / 255) as u8 };
        *dst = Rgb([blend(src[0]), blend(src[1]), blend(src[2])]);
    }
    out
}

/// Convert straight-alpha RGBA pixels into a premultiplied tiny-skia pixmap
pub(crate) fn rgba_to_pixmap(pixels: &RgbaImage) -> Option<Pixmap> {
    let mut data = pixels.as_raw().clone();
    for px in data.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        px[0] = ((u16::from(px[0]) * a) / 255) as u8;
        px[1] = ((u16::from(px[1]) * a) / 255) as u8;
        px[2] = ((u16::from(px[2]) * a) / 255) as u8;
    }
    let size = tiny_skia::IntSize::from_wh(pixels.width(), pixels.height())?;
    Pixmap::from_vec(data, size)
}

/// Read a pixmap back into straight-alpha RGBA pixels
pub(crate) fn pixmap_to_rgba(pixmap: &Pixmap) -> RgbaImage {
    let mut out = RgbaImage::new(pixmap.width(), pixmap.height());
    for (src, dst) in pixmap.pixels().iter().zip(out.pixels_mut()) {
        let c = src.demultiply();
        *dst = image::Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    out
}

/// Scale-and-crop a source image so it covers the slot exactly, preserving
/// aspect ratio (the raster analog of `xMidYMid slice`)
pub(crate) fn fit_cover(pixels: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    if width == 0 || height == 0 || pixels.width() == 0 || pixels.height() == 0 {
        return RgbaImage::new(width.max(1), height.max(1));
    }
    let sx = f64::from(width) / f64::from(pixels.width());
    let sy = f64::from(height) / f64::from(pixels.height());
    let scale = sx.max(sy);
    let scaled_w = (f64::from(pixels.width()) * scale).ceil() as u32;
    let scaled_h = (f64::from(pixels.height()) * scale).ceil() as u32;
    let scaled = image::imageops::resize(
        pixels,
        scaled_w.max(width),
        scaled_h.max(height),
        image::imageops::FilterType::Triangle,
    );
    let off_x = (scaled.width() - width) / 2;
    let off_y = (scaled.height() - height) / 2;
    image::imageops::crop_imm(&scaled, off_x, off_y, width, height).to_image()
}

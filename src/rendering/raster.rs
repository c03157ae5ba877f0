//! Direct raster capture: paint the scene straight onto a tiny-skia pixmap.
//!
//! This is the fallback strategy. It avoids the SVG round trip entirely:
//! rects and polylines become paths, resolved images are cover-fitted and
//! blitted, and text is drawn from ttf-parser glyph outlines with plain
//! advance-based layout (no shaping). Lower fidelity than the vector
//! strategy, but with far fewer moving parts.

use tiny_skia::{
    FillRule, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, PixmapPaint, Rect, Stroke,
    Transform,
};
use usvg::fontdb;

use crate::error::{Error, Result};
use crate::readiness::{font_database, ResolvedImages};
use crate::rendering::scene::{Anchor, Color, Node, Scene, TextNode};
use crate::rendering::{encode_rgba, fit_cover, pixmap_to_rgba, rgba_to_pixmap, CaptureStrategy};
use crate::OutputFormat;

pub struct DirectRaster;

impl CaptureStrategy for DirectRaster {
    fn name(&self) -> &'static str {
        "raster"
    }

    fn capture(
        &self,
        scene: &Scene,
        images: &ResolvedImages,
        format: OutputFormat,
    ) -> Result<Vec<u8>> {
        let mut pixmap = Pixmap::new(scene.width, scene.height)
            .ok_or_else(|| Error::CaptureError("failed to allocate pixmap".to_string()))?;
        let fonts = font_database();

        for node in &scene.nodes {
            match node {
                Node::Rect(r) => {
                    let Some(path) = rounded_rect_path(r.x, r.y, r.width, r.height, r.radius)
                    else {
                        continue;
                    };
                    pixmap.fill_path(
                        &path,
                        &solid_paint(r.fill),
                        FillRule::Winding,
                        Transform::identity(),
                        None,
                    );
                }
                Node::Polyline(p) => {
                    let Some(path) = polyline_path(&p.points, p.closed) else {
                        continue;
                    };
                    if let Some(fill) = p.fill {
                        pixmap.fill_path(
                            &path,
                            &solid_paint(fill),
                            FillRule::Winding,
                            Transform::identity(),
                            None,
                        );
                    }
                    if let Some(stroke_color) = p.stroke {
                        let stroke = Stroke {
                            width: p.stroke_width,
                            line_cap: LineCap::Round,
                            line_join: LineJoin::Round,
                            ..Stroke::default()
                        };
                        pixmap.stroke_path(
                            &path,
                            &solid_paint(stroke_color),
                            &stroke,
                            Transform::identity(),
                            None,
                        );
                    }
                }
                Node::Image(img) => {
                    let Some(pixels) = images.get(&img.source) else {
                        continue;
                    };
                    let fitted = fit_cover(pixels, img.width as u32, img.height as u32);
                    let Some(src) = rgba_to_pixmap(&fitted) else {
                        continue;
                    };
                    pixmap.draw_pixmap(
                        img.x as i32,
                        img.y as i32,
                        src.as_ref(),
                        &PixmapPaint::default(),
                        Transform::identity(),
                        None,
                    );
                }
                Node::Text(t) => {
                    draw_text(&mut pixmap, &fonts, t);
                }
            }
        }

        encode_rgba(pixmap_to_rgba(&pixmap), format)
    }
}

fn solid_paint<'a>(color: Color) -> Paint<'a> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

fn rounded_rect_path(x: f32, y: f32, w: f32, h: f32, radius: f32) -> Option<Path> {
    if w <= 0.0 || h <= 0.0 {
        return None;
    }
    let r = radius.min(w / 2.0).min(h / 2.0);
    if r <= 0.0 {
        let mut pb = PathBuilder::new();
        pb.push_rect(Rect::from_xywh(x, y, w, h)?);
        return pb.finish();
    }
    let mut pb = PathBuilder::new();
    pb.move_to(x + r, y);
    pb.line_to(x + w - r, y);
    pb.quad_to(x + w, y, x + w, y + r);
    pb.line_to(x + w, y + h - r);
    pb.quad_to(x + w, y + h, x + w - r, y + h);
    pb.line_to(x + r, y + h);
    pb.quad_to(x, y + h, x, y + h - r);
    pb.line_to(x, y + r);
    pb.quad_to(x, y, x + r, y);
    pb.close();
    pb.finish()
}

fn polyline_path(points: &[(f32, f32)], closed: bool) -> Option<Path> {
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.0, first.1);
    for (x, y) in rest {
        pb.line_to(*x, *y);
    }
    if closed {
        pb.close();
    }
    pb.finish()
}

fn draw_text(pixmap: &mut Pixmap, fonts: &fontdb::Database, node: &TextNode) {
    let Some((path, advance)) = text_outline(fonts, &node.content, node.size, node.weight) else {
        // No usable font or nothing to draw; tolerated, text is skipped
        return;
    };
    let dx = match node.anchor {
        Anchor::Start => 0.0,
        Anchor::Middle => -advance / 2.0,
        Anchor::End => -advance,
    };
    pixmap.fill_path(
        &path,
        &solid_paint(node.fill),
        FillRule::Winding,
        Transform::from_translate(node.x + dx, node.y),
        None,
    );
}

/// Build a combined outline path for a text run at the origin (baseline at
/// y=0), returning the path and its total advance width.
fn text_outline(fonts: &fontdb::Database, text: &str, size: f32, weight: u16) -> Option<(Path, f32)> {
    let query = fontdb::Query {
        families: &[fontdb::Family::SansSerif],
        weight: fontdb::Weight(weight),
        ..fontdb::Query::default()
    };
    let id = match fonts.query(&query) {
        Some(id) => id,
        None => {
            log::warn!("no sans-serif face for weight {}; skipping text run", weight);
            return None;
        }
    };

    fonts
        .with_face_data(id, |data, face_index| -> Option<(Path, f32)> {
            let face = ttf_parser::Face::parse(data, face_index).ok()?;
            let scale = size / f32::from(face.units_per_em());
            let mut pb = PathBuilder::new();
            let mut pen = 0.0f32;
            for ch in text.chars() {
                let Some(glyph) = face.glyph_index(ch) else {
                    pen += size * 0.33;
                    continue;
                };
                let mut sink = GlyphSink {
                    pb: &mut pb,
                    scale,
                    dx: pen,
                };
                face.outline_glyph(glyph, &mut sink);
                pen += f32::from(face.glyph_hor_advance(glyph).unwrap_or(0)) * scale;
            }
            let path = pb.finish()?;
            Some((path, pen))
        })
        .flatten()
}

/// Feeds ttf-parser outline callbacks into a tiny-skia path builder,
/// scaling font units to pixels and flipping the y axis.
struct GlyphSink<'a> {
    pb: &'a mut PathBuilder,
    scale: f32,
    dx: f32,
}

impl GlyphSink<'_> {
    fn map(&self, x: f32, y: f32) -> (f32, f32) {
        (self.dx + x * self.scale, -y * self.scale)
    }
}

impl ttf_parser::OutlineBuilder for GlyphSink<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.pb.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.pb.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x, y) = self.map(x, y);
        self.pb.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x2, y2) = self.map(x2, y2);
        let (x, y) = self.map(x, y);
        self.pb.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.pb.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::scene::{ImageNode, RectNode};

    #[test]
    fn rect_is_painted_and_background_stays_transparent() {
        let mut scene = Scene::new(8, 8);
        scene.push(Node::Rect(RectNode {
            x: 0.0,
            y: 0.0,
            width: 4.0,
            height: 4.0,
            radius: 0.0,
            fill: Color::rgb(0, 0, 255),
        }));
        let bytes = DirectRaster
            .capture(&scene, &ResolvedImages::default(), OutputFormat::Png)
            .unwrap();
        let img = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (8, 8));
        assert_eq!(img.get_pixel(1, 1), &image::Rgba([0, 0, 255, 255]));
        assert_eq!(img.get_pixel(6, 6)[3], 0);
    }

    #[test]
    fn resolved_image_is_blitted_into_its_slot() {
        let mut scene = Scene::new(8, 8);
        scene.push(Node::Image(ImageNode {
            x: 0.0,
            y: 0.0,
            width: 4.0,
            height: 4.0,
            source: "x.png".to_string(),
        }));
        let mut images = ResolvedImages::default();
        images.insert_ready(
            "x.png",
            image::RgbaImage::from_pixel(2, 2, image::Rgba([255, 0, 0, 255])),
        );
        let bytes = DirectRaster.capture(&scene, &images, OutputFormat::Png).unwrap();
        let img = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(img.get_pixel(1, 1), &image::Rgba([255, 0, 0, 255]));
        assert_eq!(img.get_pixel(6, 6)[3], 0);
    }

    #[test]
    fn broken_image_is_skipped_without_error() {
        let mut scene = Scene::new(8, 8);
        scene.push(Node::Image(ImageNode {
            x: 0.0,
            y: 0.0,
            width: 4.0,
            height: 4.0,
            source: "gone.png".to_string(),
        }));
        let mut images = ResolvedImages::default();
        images.insert_broken("gone.png");
        let bytes = DirectRaster.capture(&scene, &images, OutputFormat::Png).unwrap();
        let img = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(img.get_pixel(1, 1)[3], 0);
    }

    #[test]
    fn rounded_rect_path_handles_degenerate_sizes() {
        assert!(rounded_rect_path(0.0, 0.0, 0.0, 10.0, 2.0).is_none());
        assert!(rounded_rect_path(0.0, 0.0, 10.0, 10.0, 0.0).is_some());
        assert!(rounded_rect_path(0.0, 0.0, 10.0, 10.0, 100.0).is_some());
    }
}

//! Vector capture: serialize the scene to SVG markup and rasterize it with
//! resvg. This is the primary strategy; it gets text shaping, kerning and
//! anti-aliasing from the usvg text machinery.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use std::io::Cursor;

use crate::error::{Error, Result};
use crate::readiness::{font_database, ResolvedImages};
use crate::rendering::scene::{Anchor, Node, Scene};
use crate::rendering::{encode_rgba, pixmap_to_rgba, CaptureStrategy};
use crate::OutputFormat;

pub struct VectorCapture;

impl CaptureStrategy for VectorCapture {
    fn name(&self) -> &'static str {
        "vector"
    }

    fn capture(
        &self,
        scene: &Scene,
        images: &ResolvedImages,
        format: OutputFormat,
    ) -> Result<Vec<u8>> {
        let svg = scene_to_svg(scene, images);

        let mut opt = usvg::Options::default();
        opt.fontdb = font_database();
        opt.font_family = "sans-serif".to_string();

        let tree = usvg::Tree::from_data(svg.as_bytes(), &opt)
            .map_err(|e| Error::CaptureError(format!("svg parse: {}", e)))?;

        let mut pixmap = tiny_skia::Pixmap::new(scene.width, scene.height)
            .ok_or_else(|| Error::CaptureError("failed to allocate pixmap".to_string()))?;
        resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());

        encode_rgba(pixmap_to_rgba(&pixmap), format)
    }
}

/// Serialize the scene to standalone SVG markup. Resolved images are
/// re-embedded as PNG data URIs so rasterization needs no further I/O;
/// broken images are simply omitted.
pub fn scene_to_svg(scene: &Scene, images: &ResolvedImages) -> String {
    let mut svg = String::with_capacity(4096);
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" \
         width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">",
        w = scene.width,
        h = scene.height
    );

    for node in &scene.nodes {
        match node {
            Node::Rect(r) => {
                let _ = write!(
                    svg,
                    "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"{}\" \
                     fill=\"{}\" fill-opacity=\"{}\"/>",
                    r.x,
                    r.y,
                    r.width,
                    r.height,
                    r.radius,
                    r.fill.hex(),
                    r.fill.opacity()
                );
            }
            Node::Text(t) => {
                let anchor = match t.anchor {
                    Anchor::Start => "start",
                    Anchor::Middle => "middle",
                    Anchor::End => "end",
                };
                let _ = write!(
                    svg,
                    "<text x=\"{}\" y=\"{}\" font-family=\"sans-serif\" font-size=\"{}\" \
                     font-weight=\"{}\" fill=\"{}\" fill-opacity=\"{}\" text-anchor=\"{}\">{}</text>",
                    t.x,
                    t.y,
                    t.size,
                    t.weight,
                    t.fill.hex(),
                    t.fill.opacity(),
                    anchor,
                    escape_xml(&t.content)
                );
            }
            Node::Polyline(p) => {
                let points = p
                    .points
                    .iter()
                    .map(|(x, y)| format!("{},{}", x, y))
                    .collect::<Vec<_>>()
                    .join(" ");
                let tag = if p.closed { "polygon" } else { "polyline" };
                let fill = p
                    .fill
                    .map(|c| format!("fill=\"{}\" fill-opacity=\"{}\"", c.hex(), c.opacity()))
                    .unwrap_or_else(|| "fill=\"none\"".to_string());
                let stroke = p
                    .stroke
                    .map(|c| {
                        format!(
                            "stroke=\"{}\" stroke-opacity=\"{}\" stroke-width=\"{}\" \
                             stroke-linecap=\"round\" stroke-linejoin=\"round\"",
                            c.hex(),
                            c.opacity(),
                            p.stroke_width
                        )
                    })
                    .unwrap_or_default();
                let _ = write!(svg, "<{} points=\"{}\" {} {}/>", tag, points, fill, stroke);
            }
            Node::Image(img) => {
                let Some(pixels) = images.get(&img.source) else {
                    continue;
                };
                let fitted =
                    crate::rendering::fit_cover(pixels, img.width as u32, img.height as u32);
                let mut png = Cursor::new(Vec::new());
                if fitted.write_to(&mut png, image::ImageFormat::Png).is_err() {
                    continue;
                }
                let _ = write!(
                    svg,
                    "<image x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" \
                     xlink:href=\"data:image/png;base64,{}\"/>",
                    img.x,
                    img.y,
                    img.width,
                    img.height,
                    BASE64.encode(png.into_inner())
                );
            }
        }
    }

    svg.push_str("</svg>");
    svg
}

/// Stable digest of the serialized scene, for golden tests
pub fn scene_digest(scene: &Scene, images: &ResolvedImages) -> String {
    let mut hasher = Sha256::new();
    hasher.update(scene_to_svg(scene, images).as_bytes());
    hex::encode(hasher.finalize())
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

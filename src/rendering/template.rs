//! The two built-in thumbnail layouts.
//!
//! Both templates consume the same `EditorState` and emit a scene over the
//! fixed 1280x720 canvas. Construction is pure: no decoding, no network.

use crate::editor::EditorState;
use crate::rendering::scene::{
    Anchor, Color, ImageNode, Node, PolylineNode, RectNode, Scene, TextNode,
};
use crate::{Template, Trend, CANVAS_HEIGHT, CANVAS_WIDTH};

const BG_DARK: Color = Color::rgb(16, 22, 35);
const PANEL: Color = Color::rgb(26, 34, 53);
const TEXT_PRIMARY: Color = Color::rgb(245, 247, 250);
const TEXT_MUTED: Color = Color::rgb(139, 147, 167);
const TREND_UP: Color = Color::rgb(34, 197, 94);
const TREND_DOWN: Color = Color::rgb(239, 68, 68);
const OVERLAY: Color = Color::rgba(8, 10, 16, 200);

/// Build the scene for the currently selected template
pub fn build_scene(editor: &EditorState) -> Scene {
    match editor.fields().template {
        Template::Classic => classic_scene(editor),
        Template::Impact => impact_scene(editor),
    }
}

fn accent(trend: Trend) -> Color {
    match trend {
        Trend::Up => TREND_UP,
        Trend::Down => TREND_DOWN,
    }
}

fn rect(x: f32, y: f32, width: f32, height: f32, radius: f32, fill: Color) -> Node {
    Node::Rect(RectNode {
        x,
        y,
        width,
        height,
        radius,
        fill,
    })
}

fn text(x: f32, y: f32, content: &str, size: f32, weight: u16, fill: Color, anchor: Anchor) -> Node {
    Node::Text(TextNode {
        x,
        y,
        content: content.to_string(),
        size,
        weight,
        fill,
        anchor,
    })
}

/// Small filled triangle pointing with the trend
fn trend_arrow(cx: f32, cy: f32, half: f32, trend: Trend) -> Node {
    let points = match trend {
        Trend::Up => vec![(cx - half, cy + half), (cx + half, cy + half), (cx, cy - half)],
        Trend::Down => vec![(cx - half, cy - half), (cx + half, cy - half), (cx, cy + half)],
    };
    Node::Polyline(PolylineNode {
        points,
        stroke: None,
        stroke_width: 0.0,
        fill: Some(TEXT_PRIMARY),
        closed: true,
    })
}

/// Placeholder sparkline sloping with the trend
fn sparkline(x: f32, y: f32, width: f32, height: f32, trend: Trend) -> Node {
    // Fixed jagged profile, mirrored vertically for a downtrend
    let profile = [0.85, 0.70, 0.78, 0.55, 0.62, 0.40, 0.48, 0.22, 0.30, 0.08];
    let step = width / (profile.len() - 1) as f32;
    let points = profile
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let ty = match trend {
                Trend::Up => *t,
                Trend::Down => 1.0 - *t,
            };
            (x + step * i as f32, y + height * ty)
        })
        .collect();
    Node::Polyline(PolylineNode {
        points,
        stroke: Some(accent(trend)),
        stroke_width: 6.0,
        fill: None,
        closed: false,
    })
}

fn classic_scene(editor: &EditorState) -> Scene {
    let fields = editor.fields();
    let trend = fields.trend;
    let w = CANVAS_WIDTH as f32;
    let h = CANVAS_HEIGHT as f32;
    let mut scene = Scene::new(CANVAS_WIDTH, CANVAS_HEIGHT);

    scene.push(rect(0.0, 0.0, w, h, 0.0, BG_DARK));
    scene.push(rect(0.0, 0.0, w, 12.0, 0.0, accent(trend)));

    // Artwork panel, left half
    scene.push(rect(56.0, 72.0, 512.0, 576.0, 24.0, PANEL));
    if !editor.displayed_image().is_empty() {
        scene.push(Node::Image(ImageNode {
            x: 72.0,
            y: 88.0,
            width: 480.0,
            height: 544.0,
            source: editor.displayed_image().to_string(),
        }));
    }

    // Text column, right half
    let col = 624.0;
    scene.push(text(col, 150.0, &fields.subtitle, 30.0, 400, TEXT_MUTED, Anchor::Start));
    scene.push(text(col, 234.0, &fields.title, 68.0, 900, TEXT_PRIMARY, Anchor::Start));

    scene.push(text(col, 392.0, &fields.price, 110.0, 900, TEXT_PRIMARY, Anchor::Start));
    scene.push(text(
        col,
        452.0,
        &format!("was {}", fields.before_price),
        34.0,
        400,
        TEXT_MUTED,
        Anchor::Start,
    ));

    // Change chip with the trend arrow
    scene.push(rect(col, 492.0, 280.0, 76.0, 38.0, accent(trend)));
    scene.push(trend_arrow(col + 48.0, 530.0, 16.0, trend));
    scene.push(text(
        col + 88.0,
        546.0,
        &editor.display_change_percent(),
        42.0,
        700,
        TEXT_PRIMARY,
        Anchor::Start,
    ));

    scene.push(text(col, 628.0, &fields.timeframe, 28.0, 400, TEXT_MUTED, Anchor::Start));
    scene.push(sparkline(960.0, 500.0, 260.0, 110.0, trend));

    scene
}

fn impact_scene(editor: &EditorState) -> Scene {
    let fields = editor.fields();
    let trend = fields.trend;
    let w = CANVAS_WIDTH as f32;
    let h = CANVAS_HEIGHT as f32;
    let mut scene = Scene::new(CANVAS_WIDTH, CANVAS_HEIGHT);

    scene.push(rect(0.0, 0.0, w, h, 0.0, BG_DARK));

    // Full-bleed artwork behind everything else
    if !editor.displayed_image().is_empty() {
        scene.push(Node::Image(ImageNode {
            x: 0.0,
            y: 0.0,
            width: w,
            height: h,
            source: editor.displayed_image().to_string(),
        }));
    }

    // Title banner across the top
    scene.push(rect(0.0, 48.0, w, 120.0, 0.0, OVERLAY));
    scene.push(text(64.0, 134.0, &fields.title, 76.0, 900, TEXT_PRIMARY, Anchor::Start));

    // Oversized change figure, center-right
    scene.push(rect(700.0, 248.0, 520.0, 216.0, 32.0, OVERLAY));
    scene.push(trend_arrow(780.0, 356.0, 36.0, trend));
    scene.push(text(
        840.0,
        412.0,
        &editor.display_change_percent(),
        150.0,
        900,
        accent(trend),
        Anchor::Start,
    ));

    // Bottom strip: price, before-price, timeframe
    scene.push(rect(0.0, h - 152.0, w, 152.0, 0.0, OVERLAY));
    scene.push(text(64.0, h - 58.0, &fields.price, 92.0, 900, TEXT_PRIMARY, Anchor::Start));
    scene.push(text(
        460.0,
        h - 62.0,
        &format!("was {}", fields.before_price),
        36.0,
        400,
        TEXT_MUTED,
        Anchor::Start,
    ));
    scene.push(text(
        w - 64.0,
        h - 62.0,
        &fields.timeframe,
        32.0,
        700,
        TEXT_MUTED,
        Anchor::End,
    ));
    scene.push(text(64.0, h - 172.0, &fields.subtitle, 30.0, 400, TEXT_MUTED, Anchor::Start));

    scene
}

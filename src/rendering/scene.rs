//! Flat paint-node scene model shared by both capture strategies.
//!
//! A template produces a `Scene`: an ordered list of nodes painted
//! back-to-front over a fixed-size canvas. The model is deliberately small;
//! it only has to express what the two thumbnail templates need.

/// RGBA color, straight (non-premultiplied) alpha
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// `#rrggbb` form used by the SVG serializer
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Alpha as a 0..=1 opacity
    pub fn opacity(&self) -> f32 {
        f32::from(self.a) / 255.0
    }
}

/// Horizontal text anchoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

/// Filled, optionally rounded rectangle
#[derive(Debug, Clone, PartialEq)]
pub struct RectNode {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub radius: f32,
    pub fill: Color,
}

/// A single text run; `y` is the baseline
#[derive(Debug, Clone, PartialEq)]
pub struct TextNode {
    pub x: f32,
    pub y: f32,
    pub content: String,
    pub size: f32,
    /// CSS-style weight (400 regular, 700 bold, 900 black)
    pub weight: u16,
    pub fill: Color,
    pub anchor: Anchor,
}

/// Open polyline or closed filled polygon (trend arrow, sparkline)
#[derive(Debug, Clone, PartialEq)]
pub struct PolylineNode {
    pub points: Vec<(f32, f32)>,
    pub stroke: Option<Color>,
    pub stroke_width: f32,
    pub fill: Option<Color>,
    pub closed: bool,
}

/// Image slot; `source` is a reference string resolved by the readiness
/// waiter. The pixels are cover-fitted into the slot at paint time.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageNode {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Rect(RectNode),
    Text(TextNode),
    Polyline(PolylineNode),
    Image(ImageNode),
}

/// A fixed-size composition, painted in node order
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    pub nodes: Vec<Node>,
}

impl Scene {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            nodes: Vec::new(),
        }
    }

    pub fn push(&mut self, node: Node) {
        self.nodes.push(node);
    }

    /// Every image source referenced by the scene, in paint order
    pub fn image_sources(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().filter_map(|n| match n {
            Node::Image(img) => Some(img.source.as_str()),
            _ => None,
        })
    }
}

//! Pokethumb
//!
//! A headless composer and exporter for fixed-size (1280x720) Pokemon price
//! thumbnails. Form-style field values are laid out by one of two built-in
//! templates, the referenced artwork is resolved (optionally through a
//! CORS-friendly image relay), and the composition is captured to PNG or
//! JPEG by an ordered pair of raster strategies.
//!
//! # Example
//!
//! ```no_run
//! use pokethumb::{EditorState, ExportConfig, ExportPipeline, OutputFormat};
//!
//! # fn main() -> pokethumb::Result<()> {
//! let config = ExportConfig::default();
//! let mut editor = EditorState::new(config.relay_base.clone());
//! editor.set_image_ref("https://example.com/charizard.png");
//!
//! let pipeline = ExportPipeline::new(config)?;
//! let outcome = pipeline.export(&mut editor, OutputFormat::Png)?;
//! println!("exported: {:?}", outcome);
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::str::FromStr;

pub mod error;
pub use error::{Error, Result};

pub mod imageref;

pub mod editor;
pub use editor::{EditorState, RenderFields};

// Scene model, templates and the two capture strategies
pub mod rendering;

pub mod readiness;

mod inline;

pub mod export;
pub use export::{ExportConfig, ExportOutcome, ExportPipeline};

/// Fixed output width in pixels
pub const CANVAS_WIDTH: u32 = 1280;
/// Fixed output height in pixels
pub const CANVAS_HEIGHT: u32 = 720;

/// JPEG quality used when exporting the lossy format (0-100)
pub const JPEG_QUALITY: u8 = 92;

/// The two built-in visual templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Template {
    /// Dark panel, artwork left, price column right
    Classic,
    /// Full-bleed artwork with an oversized change figure
    Impact,
}

impl Template {
    /// Lowercase name used in the output filename
    pub fn slug(&self) -> &'static str {
        match self {
            Template::Classic => "classic",
            Template::Impact => "impact",
        }
    }
}

impl FromStr for Template {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "classic" => Ok(Template::Classic),
            "impact" => Ok(Template::Impact),
            other => Err(format!("unknown template '{}' (expected 'classic' or 'impact')", other)),
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Price trend direction; drives the change-percent sign and the accent color
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    /// Lowercase name used in the output filename
    pub fn slug(&self) -> &'static str {
        match self {
            Trend::Up => "up",
            Trend::Down => "down",
        }
    }
}

impl FromStr for Trend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" => Ok(Trend::Up),
            "down" => Ok(Trend::Down),
            other => Err(format!("unknown trend '{}' (expected 'up' or 'down')", other)),
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Supported export encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg,
}

impl OutputFormat {
    /// File extension used in the output filename
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            other => Err(format!("unknown format '{}' (expected 'png' or 'jpeg')", other)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

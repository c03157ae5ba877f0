//! Capture readiness: fonts loaded, image sources resolved.
//!
//! Before a capture is attempted the font database must be populated (best
//! effort; a machine with no usable fonts is tolerated) and every image
//! node in the scene must be resolved to decoded pixels. A source that
//! cannot be fetched or decoded is recorded as broken and simply skipped at
//! paint time so a dead reference never blocks the export.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::RgbaImage;
use reqwest::blocking::Client;
use usvg::fontdb;

use crate::error::{Error, Result};
use crate::rendering::scene::Scene;

static FONTS: OnceLock<Arc<fontdb::Database>> = OnceLock::new();

/// Shared system font database, loaded once per process. Empty on machines
/// without system fonts; capture then proceeds without text.
pub fn font_database() -> Arc<fontdb::Database> {
    FONTS
        .get_or_init(|| {
            let mut db = fontdb::Database::new();
            db.load_system_fonts();
            if db.len() == 0 {
                log::warn!("no system fonts found; text will be omitted from captures");
            }
            Arc::new(db)
        })
        .clone()
}

/// Decoded pixels per image source. A key mapped to `None` is a broken
/// source that failed to resolve.
#[derive(Debug, Default)]
pub struct ResolvedImages {
    map: HashMap<String, Option<RgbaImage>>,
}

impl ResolvedImages {
    /// Pixels for a source, or `None` when unresolved/broken
    pub fn get(&self, source: &str) -> Option<&RgbaImage> {
        self.map.get(source).and_then(|r| r.as_ref())
    }

    pub fn insert_ready(&mut self, source: impl Into<String>, pixels: RgbaImage) {
        self.map.insert(source.into(), Some(pixels));
    }

    pub fn insert_broken(&mut self, source: impl Into<String>) {
        self.map.insert(source.into(), None);
    }
}

/// Resolve every image source in the scene. Never fails: broken sources are
/// logged and recorded as such. A scene with no image nodes resolves
/// immediately.
pub fn wait_ready(scene: &Scene, client: &Client) -> ResolvedImages {
    let mut resolved = ResolvedImages::default();
    for source in scene.image_sources() {
        if resolved.map.contains_key(source) {
            continue;
        }
        match resolve_source(source, client) {
            Ok(pixels) => resolved.insert_ready(source, pixels),
            Err(e) => {
                log::warn!("image source failed to resolve, skipping: {}", e);
                resolved.insert_broken(source);
            }
        }
    }
    resolved
}

/// Fetch/read and decode a single source
fn resolve_source(source: &str, client: &Client) -> Result<RgbaImage> {
    let bytes = if source.starts_with("data:") {
        decode_data_uri(source)?
    } else if source.starts_with("http://") || source.starts_with("https://") {
        let resp = client
            .get(source)
            .send()
            .map_err(|e| Error::NetworkError(format!("failed to fetch {}: {}", source, e)))?;
        if !resp.status().is_success() {
            return Err(Error::NetworkError(format!(
                "{} returned status {}",
                source,
                resp.status()
            )));
        }
        resp.bytes()
            .map_err(|e| Error::NetworkError(format!("failed to read body of {}: {}", source, e)))?
            .to_vec()
    } else {
        let path = source.strip_prefix("file://").unwrap_or(source);
        std::fs::read(path).map_err(|e| Error::IoError(format!("failed to read {}: {}", path, e)))?
    };

    let decoded = image::load_from_memory(&bytes)
        .map_err(|e| Error::DecodeError(format!("{}: {}", source, e)))?;
    Ok(decoded.to_rgba8())
}

fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let payload = uri
        .split_once(";base64,")
        .map(|(_, p)| p)
        .ok_or_else(|| Error::DecodeError("data URI is not base64-encoded".to_string()))?;
    BASE64
        .decode(payload.trim())
        .map_err(|e| Error::DecodeError(format!("invalid base64 payload: {}", e)))
}

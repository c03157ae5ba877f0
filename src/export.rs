//! The bitmap export pipeline.
//!
//! A linear sequence: entry guard, best-effort font load, best-effort
//! inlining of the remote artwork (with a scoped swap of the displayed
//! reference), image readiness, capture through an ordered list of
//! strategies, then delivery of the encoded file. The displayed reference
//! and the in-flight flag are restored on every exit path.

use std::ops::Deref;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use reqwest::blocking::Client;

use crate::editor::EditorState;
use crate::error::{Error, Result};
use crate::imageref::DEFAULT_RELAY;
use crate::readiness;
use crate::rendering::raster::DirectRaster;
use crate::rendering::svg::VectorCapture;
use crate::rendering::template;
use crate::rendering::CaptureStrategy;
use crate::{inline, OutputFormat, Template, Trend};

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Base URL of the CORS-friendly image relay
    pub relay_base: String,
    /// Directory the exported file is written into
    pub out_dir: PathBuf,
    /// Timeout applied to every HTTP fetch, in milliseconds
    pub timeout_ms: u64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            relay_base: DEFAULT_RELAY.to_string(),
            out_dir: PathBuf::from("."),
            timeout_ms: 30000,
        }
    }
}

/// What an export request produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The encoded bitmap was written to `path`
    Written { path: PathBuf, bytes: usize },
    /// Another export was already in flight; this request was dropped
    Skipped,
}

/// Orchestrates the capture-and-save sequence. One export at a time: a
/// request arriving while another is in flight is dropped, never queued.
pub struct ExportPipeline {
    client: Client,
    config: ExportConfig,
    in_flight: AtomicBool,
}

impl ExportPipeline {
    pub fn new(config: ExportConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| Error::InitializationError(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            config,
            in_flight: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Capture the current composition and write it to the output directory.
    ///
    /// Returns [`ExportOutcome::Skipped`] if an export is already running.
    /// On any terminal failure the error is [`Error::ExportFailed`], which
    /// carries the user-facing hint; the editor's displayed image and the
    /// in-flight flag are restored regardless of the path taken.
    pub fn export(&self, editor: &mut EditorState, format: OutputFormat) -> Result<ExportOutcome> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            log::debug!("export already in flight; request dropped");
            return Ok(ExportOutcome::Skipped);
        }
        let _in_flight = InFlightGuard(&self.in_flight);

        self.run(editor, format).map_err(|e| match e {
            terminal @ Error::ExportFailed(_) => terminal,
            other => Error::ExportFailed(other.to_string()),
        })
    }

    fn run(&self, editor: &mut EditorState, format: OutputFormat) -> Result<ExportOutcome> {
        // Font wait: loading is a one-time, best-effort operation
        let _fonts = readiness::font_database();

        // Best-effort inlining; the swap is reverted when `swapped` drops
        let inlined = inline::inline_remote_image(
            &self.client,
            editor.image_ref(),
            editor.proxy_enabled(),
            &self.config.relay_base,
        );
        let swapped = DisplaySwap::apply(editor, inlined);

        let scene = template::build_scene(&swapped);
        let images = readiness::wait_ready(&scene, &self.client);

        let fields = swapped.fields();
        let filename = export_filename(fields.template, fields.trend, format);
        let encoded =
            capture_with_fallback(&[&VectorCapture, &DirectRaster], &scene, &images, format)?;

        std::fs::create_dir_all(&self.config.out_dir)?;
        let path = self.config.out_dir.join(filename);
        std::fs::write(&path, &encoded)?;
        log::debug!("wrote {} ({} bytes)", path.display(), encoded.len());

        Ok(ExportOutcome::Written {
            path,
            bytes: encoded.len(),
        })
    }
}

/// `pokemon-thumbnail-<template>-<trend>.<ext>`
pub fn export_filename(template: Template, trend: Trend, format: OutputFormat) -> String {
    format!(
        "pokemon-thumbnail-{}-{}.{}",
        template.slug(),
        trend.slug(),
        format.extension()
    )
}

/// Try each capture strategy in order; the first success wins. A primary
/// failure is logged, not surfaced, as long as a later strategy delivers.
fn capture_with_fallback(
    strategies: &[&dyn CaptureStrategy],
    scene: &crate::rendering::scene::Scene,
    images: &crate::readiness::ResolvedImages,
    format: OutputFormat,
) -> Result<Vec<u8>> {
    let mut failures = Vec::new();
    for strategy in strategies {
        match strategy.capture(scene, images, format) {
            Ok(bytes) => return Ok(bytes),
            Err(e) => {
                log::warn!("{} capture failed, trying next strategy: {}", strategy.name(), e);
                failures.push(format!("{}: {}", strategy.name(), e));
            }
        }
    }
    Err(Error::ExportFailed(format!(
        "all capture strategies failed ({})",
        failures.join("; ")
    )))
}

/// Clears the in-flight flag on every exit path, including unwinds
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Scoped swap of the editor's displayed image reference. When inlining
/// produced a new value the original is captured on entry and restored on
/// drop, so the visible editor state is untouched by the export.
struct DisplaySwap<'a> {
    editor: &'a mut EditorState,
    original: Option<String>,
}

impl<'a> DisplaySwap<'a> {
    fn apply(editor: &'a mut EditorState, inlined: Option<String>) -> Self {
        let original = match inlined {
            Some(uri) if uri != editor.displayed_image() => Some(editor.swap_displayed(uri)),
            _ => None,
        };
        Self { editor, original }
    }
}

impl Deref for DisplaySwap<'_> {
    type Target = EditorState;

    fn deref(&self) -> &EditorState {
        self.editor
    }
}

impl Drop for DisplaySwap<'_> {
    fn drop(&mut self) {
        if let Some(original) = self.original.take() {
            self.editor.swap_displayed(original);
        }
    }
}

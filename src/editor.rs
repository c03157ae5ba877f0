//! Editor shell state: the form field set and the display-side image
//! reference bookkeeping.
//!
//! `EditorState` owns everything the templates consume. The raw image
//! reference is stored as typed by the user; the *displayed* reference (the
//! normalizer output) is recomputed whenever the raw reference or the proxy
//! flag changes, and is what the renderer is handed. The export pipeline
//! may temporarily swap the displayed reference while capturing and is
//! expected to restore it afterwards.

use serde::{Deserialize, Serialize};

use crate::imageref;
use crate::{Template, Trend};

/// The display strings plus the trend and template selectors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderFields {
    pub title: String,
    pub subtitle: String,
    pub price: String,
    pub before_price: String,
    /// Raw change figure as typed; see [`EditorState::display_change_percent`]
    pub change_percent: String,
    pub timeframe: String,
    pub trend: Trend,
    pub template: Template,
}

impl Default for RenderFields {
    fn default() -> Self {
        Self {
            title: "CHARIZARD VMAX".to_string(),
            subtitle: "PSA 10 Price Watch".to_string(),
            price: "$420".to_string(),
            before_price: "$88".to_string(),
            change_percent: "375".to_string(),
            timeframe: "LAST 30 DAYS".to_string(),
            trend: Trend::Up,
            template: Template::Classic,
        }
    }
}

/// In-memory editing session state
#[derive(Debug, Clone)]
pub struct EditorState {
    fields: RenderFields,
    image_ref: String,
    proxy_enabled: bool,
    displayed_image: String,
    relay_base: String,
}

impl EditorState {
    /// Create a session with the default field set, no image and the proxy
    /// enabled.
    pub fn new(relay_base: impl Into<String>) -> Self {
        Self {
            fields: RenderFields::default(),
            image_ref: String::new(),
            proxy_enabled: true,
            displayed_image: String::new(),
            relay_base: relay_base.into(),
        }
    }

    pub fn fields(&self) -> &RenderFields {
        &self.fields
    }

    pub fn set_fields(&mut self, fields: RenderFields) {
        self.fields = fields;
    }

    pub fn fields_mut(&mut self) -> &mut RenderFields {
        &mut self.fields
    }

    /// The raw reference as typed/uploaded, never relay-rewritten
    pub fn image_ref(&self) -> &str {
        &self.image_ref
    }

    /// The normalized reference the renderer consumes
    pub fn displayed_image(&self) -> &str {
        &self.displayed_image
    }

    pub fn proxy_enabled(&self) -> bool {
        self.proxy_enabled
    }

    pub fn relay_base(&self) -> &str {
        &self.relay_base
    }

    /// Update the raw image reference and recompute the displayed form
    pub fn set_image_ref(&mut self, raw: impl Into<String>) {
        self.image_ref = raw.into();
        self.refresh_displayed();
    }

    /// Toggle relay routing and recompute the displayed form
    pub fn set_proxy_enabled(&mut self, enabled: bool) {
        self.proxy_enabled = enabled;
        self.refresh_displayed();
    }

    /// Restore the fixed default field set and clear the image
    pub fn reset(&mut self) {
        self.fields = RenderFields::default();
        self.image_ref.clear();
        self.refresh_displayed();
    }

    /// Change-percent display rule: any leading sign and `%` suffix are
    /// stripped, then the figure is re-signed from the trend.
    pub fn display_change_percent(&self) -> String {
        let bare = self
            .fields
            .change_percent
            .trim()
            .trim_start_matches(['+', '-'])
            .trim_end_matches('%')
            .trim();
        let sign = match self.fields.trend {
            Trend::Up => '+',
            Trend::Down => '-',
        };
        format!("{}{}%", sign, bare)
    }

    /// Replace the displayed reference, returning the previous value.
    /// Used by the export pipeline's scoped swap; callers must restore.
    pub fn swap_displayed(&mut self, displayed: String) -> String {
        std::mem::replace(&mut self.displayed_image, displayed)
    }

    fn refresh_displayed(&mut self) {
        self.displayed_image =
            imageref::normalize_for_display(&self.image_ref, self.proxy_enabled, &self.relay_base);
    }
}

//! Image reference classification and relay rewriting.
//!
//! A user-supplied image reference is one of: embedded binary (a `data:`
//! URI), a reference already routed through the relay, a plain remote URL,
//! a local file reference, or empty. Classification looks only at the
//! string itself, so the renderer and the export pipeline always agree on
//! what a reference means.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Default CORS-friendly image relay. The rewritten form is
/// `<base>?url=<percent-encoded scheme-stripped source>`.
pub const DEFAULT_RELAY: &str = "https://images.weserv.nl/";

/// RFC 3986 unreserved characters stay literal; everything else, space
/// included, becomes a `%XX` escape.
const RELAY_QUERY: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// What kind of reference a raw string is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    /// Blank or whitespace-only
    Empty,
    /// Self-contained `data:` URI, no network needed
    DataUri,
    /// Already rewritten to route through the relay
    Proxied,
    /// Plain `http`/`https` URL
    Remote,
    /// Anything else: a bare path or `file:` reference
    Local,
}

/// Classify a raw reference string. Pure; checked in a fixed order so an
/// already-proxied URL is never treated as a plain remote one.
pub fn classify(raw: &str, relay_base: &str) -> RefKind {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return RefKind::Empty;
    }
    if trimmed.starts_with("data:") {
        return RefKind::DataUri;
    }
    if trimmed.starts_with(relay_base) {
        return RefKind::Proxied;
    }
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        return RefKind::Remote;
    }
    RefKind::Local
}

/// Rewrite a remote URL into its relayed form: scheme stripped,
/// percent-encoded, appended as the `url` query parameter.
pub fn proxied_form(remote_url: &str, relay_base: &str) -> String {
    let stripped = strip_scheme(remote_url);
    let encoded = utf8_percent_encode(stripped, RELAY_QUERY);
    format!("{}?url={}", relay_base, encoded)
}

/// Compute the reference the renderer should be given for display.
///
/// Empty, embedded and already-proxied references pass through unchanged;
/// remote URLs are relay-rewritten only when the proxy is enabled; local
/// references are left alone. Never performs I/O.
pub fn normalize_for_display(raw: &str, proxy_enabled: bool, relay_base: &str) -> String {
    match classify(raw, relay_base) {
        RefKind::Remote if proxy_enabled => proxied_form(raw.trim(), relay_base),
        _ => raw.to_string(),
    }
}

fn strip_scheme(url: &str) -> &str {
    url.strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url)
}

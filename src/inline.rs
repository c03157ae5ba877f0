//! Best-effort inlining of a remote image reference as a data URI.
//!
//! Capturing a composition that references a remote image can fail even
//! when display worked, so before capture the pipeline tries to pull the
//! bytes down and embed them. Candidates are tried once each, in order:
//! the relayed form first (when the proxy is enabled), then the raw URL.
//! Exhaustion is not an error; the caller proceeds with the original
//! reference.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::blocking::Client;

use crate::error::{Error, Result};
use crate::imageref::{self, RefKind};

/// Try to convert a raw image reference into a `data:` URI. Returns `None`
/// when the reference is not a remote URL or when every candidate fails.
pub fn inline_remote_image(
    client: &Client,
    raw: &str,
    proxy_enabled: bool,
    relay_base: &str,
) -> Option<String> {
    // Only plain remote URLs are worth inlining: data URIs are already
    // self-contained and local files never leave the machine.
    if imageref::classify(raw, relay_base) != RefKind::Remote {
        return None;
    }

    let raw = raw.trim();
    let mut candidates = Vec::with_capacity(2);
    if proxy_enabled {
        candidates.push(imageref::proxied_form(raw, relay_base));
    }
    candidates.push(raw.to_string());

    for candidate in candidates {
        match fetch_as_data_uri(client, &candidate) {
            Ok(uri) => return Some(uri),
            Err(e) => log::debug!("inline candidate {} failed: {}", candidate, e),
        }
    }
    None
}

fn fetch_as_data_uri(client: &Client, url: &str) -> Result<String> {
    let resp = client
        .get(url)
        .send()
        .map_err(|e| Error::NetworkError(format!("failed to fetch {}: {}", url, e)))?;
    if !resp.status().is_success() {
        return Err(Error::NetworkError(format!(
            "{} returned status {}",
            url,
            resp.status()
        )));
    }

    let content_type = resp
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.split(';').next().unwrap_or(s).trim().to_string());

    let bytes = resp
        .bytes()
        .map_err(|e| Error::NetworkError(format!("failed to read body of {}: {}", url, e)))?;

    let mime = match content_type {
        Some(ct) if ct.starts_with("image/") => ct,
        _ => image::guess_format(&bytes)
            .map(|f| f.to_mime_type().to_string())
            .unwrap_or_else(|_| "application/octet-stream".to_string()),
    };

    Ok(format!("data:{};base64,{}", mime, BASE64.encode(&bytes)))
}

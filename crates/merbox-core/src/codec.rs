//! Shareable state tokens: JSON → DEFLATE (level 9) → URL-safe base64 without padding.
//!
//! Tokens are compatible with the `#pako:` fragments produced by browser editors using `pako`:
//! decoding accepts zlib and gzip wrapped streams.

use crate::state::{EditorState, Theme, is_truthy};
use crate::{Error, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use flate2::Compression;
use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::write::ZlibEncoder;
use serde::Serialize;
use serde_json::Value;
use std::io::{Read, Write};

/// Upper bound on inflated state size; tokens come from user-editable URLs.
pub const MAX_DECODED_BYTES: u64 = 16 * 1024 * 1024;

#[derive(Serialize)]
struct StateRecord<'a> {
    code: &'a str,
    theme: Theme,
    #[serde(rename = "themeConfig", skip_serializing_if = "Option::is_none")]
    theme_config: Option<&'a Value>,
}

/// Encodes editor state into a URL-safe token.
///
/// `theme_config` is omitted from the payload when it is absent or falsy.
pub fn encode(code: &str, theme: Theme, theme_config: Option<&Value>) -> String {
    let record = StateRecord {
        code,
        theme,
        theme_config: theme_config.filter(|v| is_truthy(v)),
    };
    // A record of strings and a `Value` always serializes.
    let json = serde_json::to_vec(&record).unwrap_or_default();

    let mut encoder = ZlibEncoder::new(Vec::with_capacity(json.len() / 2), Compression::best());
    let compressed = encoder
        .write_all(&json)
        .and_then(|()| encoder.finish())
        .unwrap_or_default();

    let b64 = STANDARD.encode(compressed);
    b64.replace('+', "-")
        .replace('/', "_")
        .trim_end_matches('=')
        .to_string()
}

pub fn encode_state(state: &EditorState) -> String {
    encode(&state.code, state.theme, state.theme_config.as_ref())
}

/// Decodes a token, reporting why it failed.
pub fn try_decode(token: &str) -> Result<EditorState> {
    let mut b64 = token.replace('-', "+").replace('_', "/");
    while b64.len() % 4 != 0 {
        b64.push('=');
    }
    let compressed = STANDARD.decode(b64.as_bytes())?;
    let text = inflate(&compressed, MAX_DECODED_BYTES)?;
    Ok(serde_json::from_str(&text)?)
}

/// Best-effort decode: returns `None` for malformed, corrupt or foreign tokens and logs the reason.
pub fn decode(token: &str) -> Option<EditorState> {
    match try_decode(token) {
        Ok(state) => Some(state),
        Err(err) => {
            tracing::warn!(%err, "failed to decode state");
            None
        }
    }
}

pub(crate) fn inflate(compressed: &[u8], limit: u64) -> Result<String> {
    let reader: Box<dyn Read + '_> = if compressed.starts_with(&[0x1f, 0x8b]) {
        Box::new(GzDecoder::new(compressed))
    } else {
        Box::new(ZlibDecoder::new(compressed))
    };

    let mut out = Vec::new();
    reader
        .take(limit + 1)
        .read_to_end(&mut out)
        .map_err(Error::Inflate)?;
    if out.len() as u64 > limit {
        return Err(Error::StateTooLarge { limit });
    }
    Ok(String::from_utf8(out)?)
}

#![forbid(unsafe_code)]

//! Editor state model for a Mermaid live editor (headless).
//!
//! - [`codec`]: shareable URL tokens (JSON → DEFLATE → URL-safe base64)
//! - [`storage`]: persisted editor state and startup resolution
//! - [`config`]: renderer initialization config derived from the state
//! - [`viewport`]: preview pan/zoom state

pub mod codec;
pub mod config;
pub mod error;
pub mod fragment;
pub mod meta;
pub mod samples;
pub mod state;
pub mod storage;
pub mod viewport;

pub use codec::{decode, encode, encode_state, try_decode};
pub use config::RenderConfig;
pub use error::{Error, Result};
pub use fragment::{FRAGMENT_PREFIX, decode_fragment, share_fragment, share_url, token_from_fragment};
pub use state::{EditorState, Theme, is_truthy};
pub use storage::{FileStore, LoadOutcome, MemoryStore, Source, StateStore, load_state, save_state};
pub use viewport::{Point, Size, Viewport};

#[cfg(test)]
mod tests;

//! Persisted editor state: plain string values under fixed keys, last write wins.

use crate::fragment;
use crate::state::{EditorState, Theme};
use crate::Result;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub mod keys {
    pub const CODE: &str = "mermaid_code";
    pub const THEME: &str = "mermaid_theme";
    pub const THEME_CONFIG: &str = "mermaid_theme_config";
    pub const DIVIDER_POS: &str = "mermaid_divider_position";
    pub const DARK_MODE: &str = "mermaid_dark_mode";
    pub const LANGUAGE: &str = "mermaid_language";
}

pub const DEFAULT_DIVIDER_POSITION: f64 = 50.0;

pub trait StateStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// A JSON object file of string values; every mutation is written through.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Opens `path`, starting empty when the file does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        let text = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, text)?;
        Ok(())
    }
}

impl StateStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// Persists the editor state.
///
/// Blank code never overwrites a saved diagram. The theme config is only kept while the theme is
/// `custom`. Failures are logged; persistence never interrupts editing.
pub fn save_state(store: &mut dyn StateStore, state: &EditorState, dark_mode: bool) {
    if let Err(err) = try_save_state(store, state, dark_mode) {
        tracing::warn!(%err, "failed to save editor state");
    }
}

fn try_save_state(store: &mut dyn StateStore, state: &EditorState, dark_mode: bool) -> Result<()> {
    if !state.code.trim().is_empty() {
        store.set(keys::CODE, &state.code)?;
    }
    store.set(keys::THEME, state.theme.as_str())?;
    store.set(keys::DARK_MODE, if dark_mode { "true" } else { "false" })?;

    match state.theme_config_text() {
        Some(text) if state.theme == Theme::Custom => store.set(keys::THEME_CONFIG, &text),
        _ => store.remove(keys::THEME_CONFIG),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Decoded from a `#pako:` fragment.
    Url,
    /// Restored from the store (a saved diagram was found).
    Storage,
    /// Nothing to restore; `state` holds whatever partial preferences were found.
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadOutcome {
    pub state: EditorState,
    pub source: Source,
    /// The fragment carried a token that did not decode and should be dropped from the address.
    pub clear_fragment: bool,
}

/// Resolves the startup state: a decodable fragment wins, otherwise the store is consulted.
pub fn load_state(fragment_or_url: Option<&str>, store: &dyn StateStore) -> LoadOutcome {
    let mut clear_fragment = false;
    if let Some(token) = fragment_or_url.and_then(fragment::token_from_fragment) {
        match crate::codec::decode(token) {
            Some(state) => {
                return LoadOutcome {
                    state,
                    source: Source::Url,
                    clear_fragment: false,
                };
            }
            None => clear_fragment = true,
        }
    }

    let (state, source) = match load_from_store(store) {
        Ok(found) => found,
        Err(err) => {
            tracing::warn!(%err, "failed to load editor state from storage");
            (EditorState::default(), Source::Empty)
        }
    };
    LoadOutcome {
        state,
        source,
        clear_fragment,
    }
}

fn load_from_store(store: &dyn StateStore) -> Result<(EditorState, Source)> {
    let mut state = EditorState::default();
    let code = store.get(keys::CODE)?.filter(|c| !c.is_empty());
    let theme = store.get(keys::THEME)?.filter(|t| !t.is_empty());
    let theme_config = store.get(keys::THEME_CONFIG)?.filter(|t| !t.is_empty());

    let source = match code {
        Some(code) => {
            state.code = code;
            Source::Storage
        }
        None => Source::Empty,
    };
    if let Some(name) = theme {
        match name.parse::<Theme>() {
            Ok(theme) => state.theme = theme,
            Err(err) => tracing::warn!(%err, "ignoring stored theme"),
        }
    }
    if state.theme == Theme::Custom {
        state.theme_config = theme_config.map(Value::String);
    }
    Ok((state, source))
}

pub fn load_dark_mode(store: &dyn StateStore) -> bool {
    matches!(store.get(keys::DARK_MODE), Ok(Some(v)) if v == "true")
}

pub fn save_dark_mode(store: &mut dyn StateStore, dark_mode: bool) {
    if let Err(err) = store.set(keys::DARK_MODE, if dark_mode { "true" } else { "false" }) {
        tracing::warn!(%err, "failed to save dark mode preference");
    }
}

pub fn load_divider_position(store: &dyn StateStore) -> f64 {
    store
        .get(keys::DIVIDER_POS)
        .ok()
        .flatten()
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(DEFAULT_DIVIDER_POSITION)
}

pub fn save_divider_position(store: &mut dyn StateStore, percent: f64) {
    if let Err(err) = store.set(keys::DIVIDER_POS, &percent.to_string()) {
        tracing::warn!(%err, "failed to save divider position");
    }
}

pub fn load_language(store: &dyn StateStore) -> Option<String> {
    store.get(keys::LANGUAGE).ok().flatten()
}

pub fn save_language(store: &mut dyn StateStore, language: &str) {
    if let Err(err) = store.set(keys::LANGUAGE, language) {
        tracing::warn!(%err, "failed to save language");
    }
}

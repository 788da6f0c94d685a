use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Built-in renderer themes plus `custom`, which defers to a user supplied theme config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Default,
    Dark,
    Forest,
    Neutral,
    Base,
    Custom,
}

impl Theme {
    pub const ALL: [Theme; 6] = [
        Theme::Default,
        Theme::Dark,
        Theme::Forest,
        Theme::Neutral,
        Theme::Base,
        Theme::Custom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Default => "default",
            Theme::Dark => "dark",
            Theme::Forest => "forest",
            Theme::Neutral => "neutral",
            Theme::Base => "base",
            Theme::Custom => "custom",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Theme::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::UnknownTheme {
                name: s.to_string(),
            })
    }
}

/// The unit carried by share URLs and persisted between sessions.
///
/// `theme_config` is opaque here: usually an object like `{"theme": "base", "themeVariables":
/// {..}}`, or the raw JSON text of one as typed into the editor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EditorState {
    #[serde(default, deserialize_with = "code_or_empty")]
    pub code: String,
    #[serde(default, deserialize_with = "theme_or_default")]
    pub theme: Theme,
    #[serde(
        rename = "themeConfig",
        default,
        skip_serializing_if = "theme_config_is_falsy"
    )]
    pub theme_config: Option<Value>,
}

impl EditorState {
    pub fn new(code: impl Into<String>, theme: Theme) -> Self {
        Self {
            code: code.into(),
            theme,
            theme_config: None,
        }
    }

    pub fn with_theme_config(mut self, theme_config: Option<Value>) -> Self {
        self.theme_config = theme_config.filter(is_truthy);
        self
    }

    /// Theme config as an object, parsing it when it was stored as JSON text.
    ///
    /// Returns `None` when absent, falsy, or not parseable into an object.
    pub fn theme_config_object(&self) -> Option<serde_json::Map<String, Value>> {
        match self.theme_config.as_ref()? {
            Value::Object(map) => Some(map.clone()),
            Value::String(text) if !text.trim().is_empty() => {
                match serde_json::from_str::<Value>(text) {
                    Ok(Value::Object(map)) => Some(map),
                    Ok(_) => {
                        tracing::warn!("theme config JSON is not an object");
                        None
                    }
                    Err(err) => {
                        tracing::warn!(%err, "invalid theme config JSON");
                        None
                    }
                }
            }
            _ => None,
        }
    }

    /// Theme config as the text the editor pane shows.
    pub fn theme_config_text(&self) -> Option<String> {
        match self.theme_config.as_ref().filter(|v| is_truthy(v))? {
            Value::String(text) => Some(text.clone()),
            other => serde_json::to_string_pretty(other).ok(),
        }
    }
}

// Falsy `code`/`theme` values (`null`, `""`, ...) read as absent, as the editor's `||` fallbacks do.
fn code_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(code) => Ok(code),
        v if !is_truthy(&v) => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!("code must be a string, got {other}"))),
    }
}

fn theme_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Theme, D::Error> {
    match Value::deserialize(deserializer)? {
        v if !is_truthy(&v) => Ok(Theme::default()),
        Value::String(name) => name.parse().map_err(serde::de::Error::custom),
        other => Err(serde::de::Error::custom(format!("theme must be a string, got {other}"))),
    }
}

fn theme_config_is_falsy(value: &Option<Value>) -> bool {
    !value.as_ref().is_some_and(is_truthy)
}

/// JavaScript truthiness over JSON values: `null`, `false`, `0` and `""` are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

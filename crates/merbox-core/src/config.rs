use crate::state::{EditorState, Theme};
use serde_json::{Map, Value};

/// Initialization object handed to the diagram renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig(Value);

impl Default for RenderConfig {
    fn default() -> Self {
        Self(Value::Object(Map::new()))
    }
}

impl RenderConfig {
    /// Builds the renderer configuration for a state.
    ///
    /// Rendering never starts on load and runs with strict security. For `custom`, the config's
    /// own `theme` (default `"default"`) is selected and every top-level key of the custom config
    /// is assigned over the base object.
    pub fn for_state(state: &EditorState) -> Self {
        let custom = match state.theme {
            Theme::Custom => state.theme_config_object(),
            _ => None,
        };
        let theme = match (state.theme, custom.as_ref()) {
            (Theme::Custom, Some(obj)) => obj
                .get("theme")
                .and_then(Value::as_str)
                .filter(|t| !t.is_empty())
                .unwrap_or("default")
                .to_string(),
            (Theme::Custom, None) => "default".to_string(),
            (theme, _) => theme.as_str().to_string(),
        };

        let mut root = Map::new();
        root.insert("startOnLoad".to_string(), Value::Bool(false));
        root.insert(
            "securityLevel".to_string(),
            Value::String("strict".to_string()),
        );
        root.insert("theme".to_string(), Value::String(theme));
        if let Some(custom) = custom {
            for (key, value) in custom {
                root.insert(key, value);
            }
        }
        Self(Value::Object(root))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Looks up a nested key such as `themeVariables.primaryColor`.
    pub fn get(&self, dotted_path: &str) -> Option<&Value> {
        self.0.pointer(&format!("/{}", dotted_path.replace('.', "/")))
    }

    pub fn get_str(&self, dotted_path: &str) -> Option<&str> {
        self.get(dotted_path)?.as_str()
    }
}

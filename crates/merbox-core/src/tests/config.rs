use crate::*;
use serde_json::json;

#[test]
fn builtin_theme_config() {
    let cfg = RenderConfig::for_state(&EditorState::new("pie", Theme::Forest));
    assert_eq!(
        cfg.as_value(),
        &json!({ "startOnLoad": false, "securityLevel": "strict", "theme": "forest" })
    );
}

#[test]
fn builtin_theme_ignores_stray_theme_config() {
    let state = EditorState::new("pie", Theme::Dark).with_theme_config(Some(json!({"theme": "base"})));
    assert_eq!(RenderConfig::for_state(&state).get_str("theme"), Some("dark"));
}

#[test]
fn custom_theme_assigns_config_over_base() {
    let state = EditorState::new("pie", Theme::Custom)
        .with_theme_config(Some(json!(samples::DEFAULT_CUSTOM_THEME)));
    let cfg = RenderConfig::for_state(&state);
    assert_eq!(cfg.get_str("theme"), Some("base"));
    assert_eq!(cfg.get_str("securityLevel"), Some("strict"));
    assert_eq!(cfg.get("startOnLoad"), Some(&json!(false)));
    assert_eq!(cfg.get_str("themeVariables.primaryColor"), Some("#ffffff"));
    assert_eq!(cfg.get("themeVariables.darkMode"), Some(&json!(false)));
}

#[test]
fn custom_theme_with_invalid_json_uses_default() {
    let state = EditorState::new("pie", Theme::Custom).with_theme_config(Some(json!("{ nope")));
    assert_eq!(
        RenderConfig::for_state(&state).as_value(),
        &json!({ "startOnLoad": false, "securityLevel": "strict", "theme": "default" })
    );
}

#[test]
fn custom_config_can_override_security_level() {
    let state = EditorState::new("pie", Theme::Custom)
        .with_theme_config(Some(json!({ "securityLevel": "loose" })));
    let cfg = RenderConfig::for_state(&state);
    assert_eq!(cfg.get_str("securityLevel"), Some("loose"));
    assert_eq!(cfg.get_str("theme"), Some("default"));
}

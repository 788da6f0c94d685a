use crate::samples::*;
use serde_json::Value;
use std::collections::BTreeSet;

#[test]
fn every_sample_key_resolves() {
    let keys: Vec<&str> = sample_keys().collect();
    assert!(keys.len() >= 10);
    assert_eq!(keys.iter().collect::<BTreeSet<_>>().len(), keys.len());
    for key in keys {
        let code = sample(key).unwrap_or_else(|| panic!("sample `{key}` missing"));
        assert!(!code.trim().is_empty(), "sample `{key}` is blank");
    }
    assert_eq!(sample("flowchart").map(|c| c.starts_with("flowchart")), Some(true));
    assert_eq!(sample("nope"), None);
}

#[test]
fn default_custom_theme_is_a_json_object() {
    let value: Value = serde_json::from_str(DEFAULT_CUSTOM_THEME).unwrap();
    let obj = value.as_object().expect("object");
    assert_eq!(obj.get("theme").and_then(Value::as_str), Some("base"));
    assert!(obj.get("themeVariables").is_some_and(Value::is_object));
}

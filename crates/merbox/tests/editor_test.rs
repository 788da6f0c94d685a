use merbox::storage::keys;
use merbox::{
    DiagramRenderer, Editor, Error, MemoryStore, RenderConfig, RenderError, Source, StateStore,
    Theme,
};
use merbox::{EditorState, Size, share_fragment};
use serde_json::json;
use std::cell::RefCell;

const SQUARE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="100"><style>.box{fill:#ECECFF}</style><rect class="box" width="200" height="100"/></svg>"#;

/// Renders any source except `broken` to a fixed SVG, recording the config it was given.
#[derive(Default)]
struct FakeRenderer {
    configs: RefCell<Vec<serde_json::Value>>,
}

impl DiagramRenderer for FakeRenderer {
    fn render(&self, source: &str, config: &RenderConfig) -> Result<String, RenderError> {
        self.configs.borrow_mut().push(config.as_value().clone());
        if source.contains("broken") {
            Err(RenderError::new("Parse error on line 1"))
        } else {
            Ok(SQUARE.to_string())
        }
    }
}

#[test]
fn opens_from_fragment_before_storage() {
    let mut store = MemoryStore::new();
    store.set(keys::CODE, "pie").unwrap();
    store.set(keys::DARK_MODE, "true").unwrap();
    store.set(keys::DIVIDER_POS, "90").unwrap();

    let shared = EditorState::new("gantt", Theme::Forest);
    let url = format!("https://example.test/{}", share_fragment(&shared));
    let editor = Editor::open(Some(&url), store.clone());
    assert_eq!(editor.source(), Source::Url);
    assert_eq!(editor.state(), &shared);
    assert!(editor.dark_mode());
    assert_eq!(editor.divider_position(), 70.0);

    let editor = Editor::open(Some("https://example.test/#pako:!!"), store);
    assert_eq!(editor.source(), Source::Storage);
    assert_eq!(editor.state().code, "pie");
    assert!(editor.should_clear_fragment());
}

#[test]
fn renders_persists_and_fits() {
    let renderer = FakeRenderer::default();
    let mut editor = Editor::open(None, MemoryStore::new());
    assert_eq!(editor.render(&renderer).unwrap(), None, "blank code renders nothing");
    assert!(editor.share_fragment().is_none());

    editor.set_code("flowchart TD\n  A-->B");
    editor.set_theme(Theme::Dark);
    editor.set_container_size(Size::new(400.0, 400.0));
    let svg = editor.render(&renderer).unwrap().map(str::to_string);
    assert_eq!(svg.as_deref(), Some(SQUARE));

    assert_eq!(renderer.configs.borrow()[0]["theme"], json!("dark"));
    assert_eq!(renderer.configs.borrow()[0]["securityLevel"], json!("strict"));
    assert!((editor.viewport.scale - 1.9).abs() < 1e-9);
    assert!((editor.viewport.position.y - 105.0).abs() < 1e-9);
    assert!(editor.embed_html().unwrap().contains(r#"theme: "dark""#));
    assert_eq!(editor.page_title(), "Flowchart Diagram | Mermaid Live Preview");

    let store = editor.store();
    assert_eq!(store.get(keys::CODE).unwrap().as_deref(), Some("flowchart TD\n  A-->B"));
    assert_eq!(store.get(keys::THEME).unwrap().as_deref(), Some("dark"));

    let fragment = editor.share_fragment().unwrap();
    assert_eq!(merbox::decode_fragment(&fragment).as_ref(), Some(editor.state()));
}

#[test]
fn failed_render_keeps_last_good_svg() {
    let renderer = FakeRenderer::default();
    let mut editor = Editor::open(None, MemoryStore::new());
    editor.set_code("pie\n  \"a\": 1");
    editor.render(&renderer).unwrap();

    editor.set_code("broken");
    let err = editor.render(&renderer).unwrap_err();
    assert!(matches!(err, Error::Render(ref e) if e.message.contains("line 1")));
    assert_eq!(editor.last_svg(), Some(SQUARE));
    assert_eq!(
        editor.store().get(keys::CODE).unwrap().as_deref(),
        Some("pie\n  \"a\": 1"),
        "failed renders are not persisted"
    );
}

#[test]
fn custom_theme_config_reaches_renderer() {
    let renderer = |_: &str, config: &RenderConfig| -> Result<String, RenderError> {
        Ok(format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" data-theme="{}"/>"#,
            config.get_str("theme").unwrap_or_default()
        ))
    };
    let mut editor = Editor::open(None, MemoryStore::new());
    assert!(editor.load_sample("flowchart"));
    assert!(!editor.load_sample("nope"));
    editor.set_theme(Theme::Custom);
    editor.set_theme_config(Some(json!(r#"{"theme":"forest","fontSize":18}"#)));

    let svg = editor.render(&renderer).unwrap().unwrap();
    assert!(svg.contains(r#"data-theme="forest""#));
    assert_eq!(editor.render_config().as_value()["fontSize"], json!(18));

    editor.set_theme_config(Some(json!("")));
    assert_eq!(editor.state().theme_config, None);
    assert_eq!(editor.render_config().get_str("theme"), Some("default"));
}

#[test]
fn exports_require_a_render() {
    let mut editor = Editor::open(None, MemoryStore::new());
    assert!(matches!(editor.export_svg(), Err(Error::NothingRendered)));

    editor.set_code("flowchart TD\n  A-->B");
    editor.render(&FakeRenderer::default()).unwrap();
    let svg = editor.export_svg().unwrap();
    assert!(svg.contains("fill:#ECECFF"));
    assert!(!svg.contains("<style"));
}

#[test]
fn dark_mode_and_divider_are_saved() {
    let mut editor = Editor::open(None, MemoryStore::new());
    assert!(editor.toggle_dark_mode());
    assert_eq!(editor.set_divider_position(12.0), 30.0);
    let store = editor.into_store();
    assert_eq!(store.get(keys::DARK_MODE).unwrap().as_deref(), Some("true"));
    assert_eq!(store.get(keys::DIVIDER_POS).unwrap().as_deref(), Some("30"));
}

use crate::state::{EditorState, Theme};

pub const APP_TITLE: &str = "Mermaid Live Preview";
pub const MERMAID_CDN_MODULE: &str =
    "https://cdn.jsdelivr.net/npm/mermaid@11/dist/mermaid.esm.min.mjs";

/// Human readable diagram kind, keyed by the lower-cased first token of the source.
pub fn diagram_label(code: &str) -> &'static str {
    let first = code
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    match first.as_str() {
        "flowchart" | "flowcharttd" => "Flowchart Diagram",
        "sequencediagram" => "Sequence Diagram",
        "classdiagram" => "Class Diagram",
        "statediagram" | "statediagram-v2" => "State Diagram",
        "erdiagram" => "ER Diagram",
        "journey" => "User Journey",
        "gantt" => "Gantt Chart",
        "pie" => "Pie Chart",
        "quadrantchart" => "Quadrant Chart",
        "requirementdiagram" => "Requirement Diagram",
        "gitgraph" => "Git Graph",
        "mindmap" => "Mind Map",
        "timeline" => "Timeline Diagram",
        "sankey-beta" => "Sankey Diagram",
        "xychart-beta" => "XY Chart",
        "block-beta" => "Block Diagram",
        "kanban" => "Kanban Board",
        _ => "Mermaid Diagram",
    }
}

pub fn page_title(code: &str) -> String {
    format!("{} | {APP_TITLE}", diagram_label(code))
}

pub fn page_description(code: &str) -> String {
    format!(
        "Create and share {}s using a fast Mermaid editor with themes, samples, and shareable URLs.",
        diagram_label(code).to_lowercase()
    )
}

/// HTML snippet that renders the diagram on any page via the Mermaid CDN build.
///
/// Custom themes cannot travel in the snippet, so they fall back to `default`.
pub fn embed_html(state: &EditorState) -> String {
    let theme = match state.theme {
        Theme::Custom => Theme::Default,
        other => other,
    };
    format!(
        r#"<!-- Mermaid diagram -->
<div class="mermaid">
{code}
</div>
<script type="module">
  import mermaid from "{MERMAID_CDN_MODULE}";
  mermaid.initialize({{ startOnLoad: true, theme: "{theme}" }});
</script>"#,
        code = state.code,
        theme = theme.as_str(),
    )
}

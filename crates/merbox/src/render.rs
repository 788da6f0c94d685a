//! The diagram renderer seam.
//!
//! Parsing and laying out Mermaid source is not done here; an embedding application supplies a
//! [`DiagramRenderer`] (a JS bridge, a headless browser, a native Mermaid port) and this crate
//! handles everything around it.

use merbox_core::RenderConfig;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to render diagram: {message}")]
pub struct RenderError {
    pub message: String,
}

impl RenderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Turns diagram source into SVG markup, given the initialization config built from the
/// editor state (see [`RenderConfig::for_state`]).
pub trait DiagramRenderer {
    fn render(&self, source: &str, config: &RenderConfig) -> Result<String, RenderError>;
}

impl<F> DiagramRenderer for F
where
    F: Fn(&str, &RenderConfig) -> Result<String, RenderError>,
{
    fn render(&self, source: &str, config: &RenderConfig) -> Result<String, RenderError> {
        self(source, config)
    }
}

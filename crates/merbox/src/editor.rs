//! Headless editor session: the state a live-preview page keeps between keystrokes.

use crate::render::DiagramRenderer;
use crate::{Error, Result};
use merbox_core::storage::{self, StateStore};
use merbox_core::viewport::{self, Size, Viewport, DEFAULT_IMAGE_SIZE};
use merbox_core::{fragment, meta, samples, EditorState, RenderConfig, Source, Theme};
use serde_json::Value;

pub struct Editor<S: StateStore> {
    state: EditorState,
    store: S,
    source: Source,
    clear_fragment: bool,
    pub viewport: Viewport,
    dark_mode: bool,
    divider_position: f64,
    /// Pixel width of raster exports.
    pub image_size: u32,
    container: Option<Size>,
    last_svg: Option<String>,
    embed_html: Option<String>,
}

impl<S: StateStore> Editor<S> {
    /// Starts a session from an address (or bare fragment) and a store, the way the page does on
    /// load: a decodable `#pako:` fragment wins, otherwise the saved state is restored.
    pub fn open(fragment_or_url: Option<&str>, store: S) -> Self {
        let outcome = storage::load_state(fragment_or_url, &store);
        let dark_mode = storage::load_dark_mode(&store);
        let divider_position = viewport::clamp_divider(storage::load_divider_position(&store));
        tracing::debug!(source = ?outcome.source, "opened editor");
        Self {
            state: outcome.state,
            store,
            source: outcome.source,
            clear_fragment: outcome.clear_fragment,
            viewport: Viewport::new(),
            dark_mode,
            divider_position,
            image_size: DEFAULT_IMAGE_SIZE,
            container: None,
            last_svg: None,
            embed_html: None,
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Where the opening state came from.
    pub fn source(&self) -> Source {
        self.source
    }

    /// The opening address carried an undecodable token that should be removed from it.
    pub fn should_clear_fragment(&self) -> bool {
        self.clear_fragment
    }

    pub fn set_code(&mut self, code: impl Into<String>) {
        self.state.code = code.into();
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.state.theme = theme;
    }

    /// Sets the custom theme config (an object, or JSON text as typed). Falsy values clear it.
    pub fn set_theme_config(&mut self, theme_config: Option<Value>) {
        self.state.theme_config = theme_config.filter(merbox_core::is_truthy);
    }

    /// Replaces the code with a sample diagram; unknown keys change nothing.
    pub fn load_sample(&mut self, key: &str) -> bool {
        match samples::sample(key) {
            Some(code) => {
                self.state.code = code.to_string();
                true
            }
            None => false,
        }
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn toggle_dark_mode(&mut self) -> bool {
        self.dark_mode = !self.dark_mode;
        storage::save_dark_mode(&mut self.store, self.dark_mode);
        self.dark_mode
    }

    pub fn divider_position(&self) -> f64 {
        self.divider_position
    }

    /// Moves the editor/preview divider (percent of the window), clamped and saved.
    pub fn set_divider_position(&mut self, percent: f64) -> f64 {
        self.divider_position = viewport::clamp_divider(percent);
        storage::save_divider_position(&mut self.store, self.divider_position);
        self.divider_position
    }

    /// Preview pane size, used to fit freshly rendered diagrams.
    pub fn set_container_size(&mut self, size: Size) {
        self.container = Some(size);
    }

    /// `#pako:` fragment for the current state, or `None` while the code is blank.
    pub fn share_fragment(&self) -> Option<String> {
        (!self.state.code.trim().is_empty()).then(|| fragment::share_fragment(&self.state))
    }

    pub fn share_url(&self, base: &str) -> Option<String> {
        (!self.state.code.trim().is_empty()).then(|| fragment::share_url(base, &self.state))
    }

    pub fn persist(&mut self) {
        storage::save_state(&mut self.store, &self.state, self.dark_mode);
    }

    pub fn render_config(&self) -> RenderConfig {
        RenderConfig::for_state(&self.state)
    }

    pub fn page_title(&self) -> String {
        meta::page_title(&self.state.code)
    }

    /// Embed snippet of the last successful render.
    pub fn embed_html(&self) -> Option<&str> {
        self.embed_html.as_deref()
    }

    /// SVG of the last successful render.
    pub fn last_svg(&self) -> Option<&str> {
        self.last_svg.as_deref()
    }

    /// Renders the current code. Blank code renders nothing and returns `Ok(None)`.
    ///
    /// On success the state is persisted, the embed snippet refreshed and, when the container
    /// size is known, the viewport fitted to the diagram. On failure the previous SVG is kept.
    pub fn render(&mut self, renderer: &dyn DiagramRenderer) -> Result<Option<&str>> {
        if self.state.code.trim().is_empty() {
            return Ok(None);
        }
        let svg = match renderer.render(&self.state.code, &self.render_config()) {
            Ok(svg) => svg,
            Err(err) => {
                tracing::warn!(%err, "diagram failed to render; keeping previous output");
                return Err(err.into());
            }
        };

        if let Some(container) = self.container {
            match merbox_svg::parse_svg(&svg) {
                Ok(root) => {
                    let (width, height) = merbox_svg::svg_dimensions(&root);
                    self.viewport.fit(container, Size::new(width, height));
                }
                Err(err) => tracing::warn!(%err, "rendered output is not parseable SVG"),
            }
        }
        self.persist();
        self.embed_html = Some(meta::embed_html(&self.state));
        Ok(Some(self.last_svg.insert(svg).as_str()))
    }

    /// Standalone SVG of the last render.
    pub fn export_svg(&self) -> Result<String> {
        let svg = self.last_svg.as_deref().ok_or(Error::NothingRendered)?;
        Ok(crate::export::export_svg(svg)?)
    }

    /// The last render encoded as `format`, [`Self::image_size`] pixels wide.
    #[cfg(feature = "raster")]
    pub fn export_raster(
        &self,
        format: crate::export::ExportFormat,
        background: &str,
    ) -> Result<Vec<u8>> {
        let svg = self.last_svg.as_deref().ok_or(Error::NothingRendered)?;
        let options = crate::export::raster::RasterOptions {
            width: self.image_size,
            background: background.to_string(),
            ..Default::default()
        };
        crate::export::export(svg, format, &options)
    }
}

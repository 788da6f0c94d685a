#![forbid(unsafe_code)]

//! `merbox` is the headless core of a Mermaid live editor.
//!
//! - shareable `#pako:` URL tokens and persisted editor state (re-exported from `merbox-core`)
//! - standalone SVG export: computed styles inlined, `foreignObject` labels turned into native
//!   text (`merbox::svg`, from `merbox-svg`)
//! - an [`Editor`] session driving an application-supplied [`DiagramRenderer`]
//!
//! # Features
//!
//! - `raster`: PNG/JPG/WebP/PDF export via pure-Rust SVG rasterization/conversion

pub use merbox_core::*;
pub use merbox_svg as svg;

pub mod editor;
pub mod export;
pub mod render;

pub use editor::Editor;
pub use export::ExportFormat;
pub use render::{DiagramRenderer, RenderError};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] merbox_core::Error),
    #[error(transparent)]
    Svg(#[from] merbox_svg::Error),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[cfg(feature = "raster")]
    #[error(transparent)]
    Raster(#[from] export::raster::RasterError),
    #[error("no diagram has been rendered yet")]
    NothingRendered,
}

pub type Result<T> = std::result::Result<T, Error>;

#![forbid(unsafe_code)]

//! Export normalization for rendered Mermaid SVG.
//!
//! Takes the SVG a renderer produced (class-styled through an embedded `<style>` block, with HTML
//! labels inside `<foreignObject>`) and turns a clone of it into standalone markup: every visual
//! property inlined, every foreignObject replaced by native `<text>`, no stylesheet left.

pub mod cascade;
pub mod css;
pub mod dom;
pub mod error;
pub mod foreign_object;
pub mod inline;
pub mod normalize;

pub use cascade::{CascadeResolver, ComputedStyle, StyleResolver};
pub use dom::{parse_svg, Element, Node};
pub use error::{Error, Result};
pub use foreign_object::convert_foreign_objects_to_text;
pub use inline::{inline_computed_styles, INLINED_PROPERTIES};
pub use normalize::{normalize, normalize_svg, normalize_with, svg_dimensions};

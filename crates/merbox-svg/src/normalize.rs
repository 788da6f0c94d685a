//! The export pipeline: a standalone, style-inlined, foreignObject-free clone of a rendered SVG.

use crate::cascade::{CascadeResolver, StyleResolver};
use crate::css::parse_declarations;
use crate::dom::{parse_length, parse_svg, Element, SVG_NS, XLINK_NS};
use crate::foreign_object::convert_foreign_objects_to_text;
use crate::inline::inline_computed_styles;
use crate::Result;

pub const FALLBACK_WIDTH: f64 = 800.0;
pub const FALLBACK_HEIGHT: f64 = 600.0;

/// Normalizes `live` using the stylesheets embedded in it.
pub fn normalize(live: &Element) -> Result<Element> {
    normalize_with(live, &CascadeResolver::from_tree(live))
}

/// Clones `live`, inlines the styles `resolver` computes, converts foreignObjects to text and
/// strips `<style>` elements. `live` is never modified.
pub fn normalize_with(live: &Element, resolver: &dyn StyleResolver) -> Result<Element> {
    let mut clone = live.clone();
    let visited = inline_computed_styles(live, &mut clone, resolver)?;
    let converted = convert_foreign_objects_to_text(&mut clone);
    let styles = clone.remove_descendants("style");
    ensure_namespaces(&mut clone);
    tracing::debug!(visited, converted, styles, "normalized svg");
    Ok(clone)
}

/// Parses, normalizes and serializes SVG markup.
pub fn normalize_svg(text: &str) -> Result<String> {
    let live = parse_svg(text)?;
    Ok(normalize(&live)?.to_xml())
}

fn ensure_namespaces(root: &mut Element) {
    root.attrs
        .entry("xmlns".to_string())
        .or_insert_with(|| SVG_NS.to_string());
    let uses_xlink = root
        .descendants()
        .iter()
        .any(|e| e.attrs.keys().any(|k| k.starts_with("xlink:")));
    if uses_xlink && root.attr("xmlns:xlink").is_none() {
        root.set_attr("xmlns:xlink", XLINK_NS);
    }
}

/// Intrinsic size of an SVG root: numeric `width`/`height`, else the `viewBox` size, else the
/// `max-width` of its inline style (height from the viewBox aspect when known), else 800×600.
pub fn svg_dimensions(root: &Element) -> (f64, f64) {
    let view_box = root.attr("viewBox").and_then(parse_view_box);
    let width = root.attr_f64("width").filter(|w| *w > 0.0);
    let height = root.attr_f64("height").filter(|h| *h > 0.0);

    match (width, height, view_box) {
        (Some(w), Some(h), _) => return (w, h),
        (Some(w), None, Some((vw, vh))) => return (w, w * vh / vw),
        (None, Some(h), Some((vw, vh))) => return (h * vw / vh, h),
        (None, None, Some(size)) => return size,
        _ => {}
    }

    let max_width = root
        .attr("style")
        .map(parse_declarations)
        .unwrap_or_default()
        .into_iter()
        .find(|d| d.name == "max-width")
        .and_then(|d| parse_length(&d.value))
        .filter(|w| *w > 0.0);
    match (max_width, height) {
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) => (w, w * FALLBACK_HEIGHT / FALLBACK_WIDTH),
        (None, Some(h)) => (h * FALLBACK_WIDTH / FALLBACK_HEIGHT, h),
        (None, None) => (width.unwrap_or(FALLBACK_WIDTH), FALLBACK_HEIGHT),
    }
}

fn parse_view_box(raw: &str) -> Option<(f64, f64)> {
    let nums: Vec<f64> = raw
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::parse::<f64>)
        .collect::<std::result::Result<_, _>>()
        .ok()?;
    match nums.as_slice() {
        [_, _, w, h] if *w > 0.0 && *h > 0.0 => Some((*w, *h)),
        _ => None,
    }
}

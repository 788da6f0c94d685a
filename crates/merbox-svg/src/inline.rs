use crate::cascade::{ComputedStyle, StyleResolver};
use crate::css::{format_declarations, parse_declarations};
use crate::dom::Element;
use crate::{Error, Result};
use indexmap::IndexMap;

/// Visual properties copied from the computed style onto each clone element.
pub const INLINED_PROPERTIES: [&str; 28] = [
    "fill",
    "fill-opacity",
    "fill-rule",
    "stroke",
    "stroke-width",
    "stroke-opacity",
    "stroke-dasharray",
    "stroke-dashoffset",
    "stroke-linecap",
    "stroke-linejoin",
    "stroke-miterlimit",
    "opacity",
    "color",
    "font-family",
    "font-size",
    "font-weight",
    "font-style",
    "text-anchor",
    "dominant-baseline",
    "alignment-baseline",
    "text-decoration",
    "marker-start",
    "marker-mid",
    "marker-end",
    "stop-color",
    "stop-opacity",
    "visibility",
    "display",
];

pub fn is_inlined(name: &str) -> bool {
    INLINED_PROPERTIES.contains(&name)
}

/// Copies the effective value of every [`INLINED_PROPERTIES`] entry from each `live` element
/// onto the matching `clone` element and drops `class` attributes.
///
/// Both trees are walked in lock-step over element children; the first place where element
/// names or child counts differ aborts with [`Error::StructureMismatch`]. Returns the number of
/// elements visited.
pub fn inline_computed_styles(
    live: &Element,
    clone: &mut Element,
    resolver: &dyn StyleResolver,
) -> Result<usize> {
    let mut ancestors = Vec::new();
    let path = format!("/{}", live.name);
    walk(live, clone, None, &mut ancestors, resolver, &path)
}

fn walk<'a>(
    live: &'a Element,
    clone: &mut Element,
    parent: Option<&ComputedStyle>,
    ancestors: &mut Vec<&'a Element>,
    resolver: &dyn StyleResolver,
    path: &str,
) -> Result<usize> {
    if live.name != clone.name {
        return Err(Error::StructureMismatch {
            path: path.to_string(),
        });
    }

    let computed = resolver.computed_style(ancestors, live, parent);
    apply(clone, &computed);

    let live_children: Vec<&'a Element> = live.elements().collect();
    if live_children.len() != clone.elements().count() {
        return Err(Error::StructureMismatch {
            path: path.to_string(),
        });
    }

    ancestors.push(live);
    let mut visited = 1;
    for (i, (l, c)) in live_children.into_iter().zip(clone.elements_mut()).enumerate() {
        let child_path = format!("{path}/{}[{i}]", l.name);
        visited += walk(l, c, Some(&computed), ancestors, resolver, &child_path)?;
    }
    ancestors.pop();
    Ok(visited)
}

fn apply(clone: &mut Element, computed: &ComputedStyle) {
    let mut decls: IndexMap<String, String> = clone
        .attr("style")
        .map(parse_declarations)
        .unwrap_or_default()
        .into_iter()
        .filter(|d| !is_inlined(&d.name))
        .map(|d| {
            let value = if d.important {
                format!("{} !important", d.value)
            } else {
                d.value
            };
            (d.name, value)
        })
        .collect();

    for name in INLINED_PROPERTIES {
        if let Some(value) = computed.get(name).map(str::trim).filter(|v| !v.is_empty()) {
            decls.insert(name.to_string(), value.to_string());
        }
    }

    if decls.is_empty() {
        clone.remove_attr("style");
    } else {
        let style = format_declarations(decls.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        clone.set_attr("style", style);
    }
    clone.remove_attr("class");
}

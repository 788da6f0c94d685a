//! Computed styles without a browser.
//!
//! [`CascadeResolver`] plays the part of `getComputedStyle` for trees that come out of the
//! renderer: it applies the embedded `<style>` blocks, presentation attributes and inline
//! `style` declarations, then inherits from the parent's computed style.

use crate::css::{expand_shorthand, parse_declarations, Declaration, Specificity, Stylesheet};
use crate::dom::Element;
use indexmap::IndexMap;

/// SVG presentation attributes that take part in the cascade with the lowest author priority.
pub const PRESENTATION_ATTRIBUTES: &[&str] = &[
    "alignment-baseline",
    "clip-path",
    "clip-rule",
    "color",
    "display",
    "dominant-baseline",
    "fill",
    "fill-opacity",
    "fill-rule",
    "filter",
    "font-family",
    "font-size",
    "font-style",
    "font-weight",
    "marker-end",
    "marker-mid",
    "marker-start",
    "mask",
    "opacity",
    "stop-color",
    "stop-opacity",
    "stroke",
    "stroke-dasharray",
    "stroke-dashoffset",
    "stroke-linecap",
    "stroke-linejoin",
    "stroke-miterlimit",
    "stroke-opacity",
    "stroke-width",
    "text-anchor",
    "text-decoration",
    "visibility",
];

/// Properties whose computed value is inherited by children when they do not set one.
pub const INHERITED_PROPERTIES: &[&str] = &[
    "clip-rule",
    "color",
    "cursor",
    "dominant-baseline",
    "fill",
    "fill-opacity",
    "fill-rule",
    "font-family",
    "font-size",
    "font-style",
    "font-variant",
    "font-weight",
    "letter-spacing",
    "line-height",
    "marker-end",
    "marker-mid",
    "marker-start",
    "stroke",
    "stroke-dasharray",
    "stroke-dashoffset",
    "stroke-linecap",
    "stroke-linejoin",
    "stroke-miterlimit",
    "stroke-opacity",
    "stroke-width",
    "text-align",
    "text-anchor",
    "visibility",
    "white-space",
    "word-spacing",
];

const MAX_VAR_DEPTH: usize = 16;

pub fn is_inherited(name: &str) -> bool {
    name.starts_with("--") || INHERITED_PROPERTIES.contains(&name)
}

/// Resolved property values for one element. Only properties that some rule, attribute or
/// ancestor actually sets are present; initial values are left implicit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComputedStyle {
    props: IndexMap<String, String>,
}

impl ComputedStyle {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.props.get(name).map(String::as_str)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.props.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.props.shift_remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.props.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ComputedStyle {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            props: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Source of effective style values for the live tree.
///
/// `ancestors` lists the element's ancestors outermost first; `parent` is the computed style of
/// the last of them.
pub trait StyleResolver {
    fn computed_style(
        &self,
        ancestors: &[&Element],
        element: &Element,
        parent: Option<&ComputedStyle>,
    ) -> ComputedStyle;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Origin {
    Presentation,
    Sheet,
    Inline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Priority {
    important: bool,
    origin: Origin,
    specificity: Specificity,
    order: usize,
}

/// Cascade over the `<style>` blocks embedded in a tree.
#[derive(Debug, Clone, Default)]
pub struct CascadeResolver {
    sheet: Stylesheet,
}

impl CascadeResolver {
    pub fn new(sheet: Stylesheet) -> Self {
        Self { sheet }
    }

    pub fn from_css(css: &str) -> Self {
        Self::new(Stylesheet::parse(css))
    }

    /// Collects every `<style>` element of `root`, in document order.
    pub fn from_tree(root: &Element) -> Self {
        let mut sheet = Stylesheet::default();
        for style in root.descendants().into_iter().filter(|e| e.is("style")) {
            sheet.extend(Stylesheet::parse(&style.text_content()));
        }
        tracing::debug!(rules = sheet.rules.len(), "collected embedded stylesheet");
        Self { sheet }
    }

    pub fn stylesheet(&self) -> &Stylesheet {
        &self.sheet
    }

    fn declared(&self, ancestors: &[&Element], element: &Element) -> IndexMap<String, (Priority, String)> {
        let mut winners: IndexMap<String, (Priority, String)> = IndexMap::new();
        let mut offer = |decl: &Declaration, priority: Priority| {
            let replace = winners
                .get(&decl.name)
                .map_or(true, |(current, _)| priority >= *current);
            if replace {
                winners.insert(decl.name.clone(), (priority, decl.value.clone()));
            }
        };

        let mut order = 0usize;
        for (name, value) in &element.attrs {
            if PRESENTATION_ATTRIBUTES.contains(&name.as_str()) {
                let decl = Declaration {
                    name: name.clone(),
                    value: value.trim().to_string(),
                    important: false,
                };
                order += 1;
                offer(
                    &decl,
                    Priority {
                        important: false,
                        origin: Origin::Presentation,
                        specificity: Specificity::default(),
                        order,
                    },
                );
            }
        }

        for rule in &self.sheet.rules {
            let Some(specificity) = rule
                .selectors
                .iter()
                .filter(|s| s.matches(ancestors, element))
                .map(|s| s.specificity())
                .max()
            else {
                order += rule.declarations.len();
                continue;
            };
            for decl in &rule.declarations {
                order += 1;
                offer(
                    decl,
                    Priority {
                        important: decl.important,
                        origin: Origin::Sheet,
                        specificity,
                        order,
                    },
                );
            }
        }

        if let Some(style) = element.attr("style") {
            for decl in parse_declarations(style).into_iter().flat_map(expand_shorthand) {
                order += 1;
                offer(
                    &decl,
                    Priority {
                        important: decl.important,
                        origin: Origin::Inline,
                        specificity: Specificity::default(),
                        order,
                    },
                );
            }
        }
        winners
    }
}

impl StyleResolver for CascadeResolver {
    fn computed_style(
        &self,
        ancestors: &[&Element],
        element: &Element,
        parent: Option<&ComputedStyle>,
    ) -> ComputedStyle {
        let declared = self.declared(ancestors, element);
        let mut computed: ComputedStyle = parent
            .map(|p| p.iter().filter(|(k, _)| is_inherited(k)).collect())
            .unwrap_or_default();

        // Custom properties first so that regular values can reference them.
        let (custom, regular): (Vec<_>, Vec<_>) = declared
            .into_iter()
            .partition(|(name, _)| name.starts_with("--"));

        for (name, (_, value)) in custom.into_iter().chain(regular) {
            match value.to_ascii_lowercase().as_str() {
                "inherit" => match parent.and_then(|p| p.get(&name)) {
                    Some(v) => computed.set(name, v.to_string()),
                    None => {
                        computed.remove(&name);
                    }
                },
                "initial" => {
                    computed.remove(&name);
                }
                "unset" => {
                    if !is_inherited(&name) {
                        computed.remove(&name);
                    }
                }
                _ => match substitute_vars(&value, &computed, 0) {
                    Some(v) => computed.set(name, v),
                    None => {
                        // Invalid at computed-value time: behaves as `unset`.
                        if !is_inherited(&name) {
                            computed.remove(&name);
                        }
                    }
                },
            }
        }
        computed
    }
}

/// Replaces `var(--name[, fallback])` references. `None` when a reference has neither a value
/// nor a fallback.
fn substitute_vars(value: &str, custom: &ComputedStyle, depth: usize) -> Option<String> {
    if depth > MAX_VAR_DEPTH {
        return None;
    }
    let Some(start) = find_var(value) else {
        return Some(value.to_string());
    };
    let args_start = start + 4;
    let close = matching_paren(value, args_start)?;
    let args = &value[args_start..close];
    let (name, fallback) = match args.split_once(',') {
        Some((name, fallback)) => (name.trim(), Some(fallback.trim())),
        None => (args.trim(), None),
    };

    let replacement = match custom.get(name).filter(|v| !v.trim().is_empty()) {
        Some(v) => substitute_vars(v.trim(), custom, depth + 1)?,
        None => substitute_vars(fallback?, custom, depth + 1)?,
    };
    let rest = substitute_vars(&value[close + 1..], custom, depth)?;
    Some(format!("{}{}{}", &value[..start], replacement, rest))
}

fn find_var(value: &str) -> Option<usize> {
    let lower = value.to_ascii_lowercase();
    let mut from = 0;
    while let Some(i) = lower[from..].find("var(") {
        let at = from + i;
        let boundary = lower[..at]
            .chars()
            .last()
            .map_or(true, |c| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        if boundary {
            return Some(at);
        }
        from = at + 4;
    }
    None
}

/// Index of the `)` closing a group whose contents start at `from`.
fn matching_paren(value: &str, from: usize) -> Option<usize> {
    let mut depth = 1;
    for (i, c) in value[from..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(from + i);
                }
            }
            _ => {}
        }
    }
    None
}

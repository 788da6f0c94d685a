//! Owned, mutable SVG/XML tree.
//!
//! Parsing goes through `roxmltree`; namespaces are kept as `xmlns` attributes wherever the
//! element namespace changes (e.g. XHTML content inside `<foreignObject>`), which is all the
//! serializer needs to emit well-formed, standalone markup.

use crate::{Error, Result};
use indexmap::IndexMap;
use regex::Regex;
use std::fmt::Write as _;
use std::sync::OnceLock;

pub const SVG_NS: &str = "http://www.w3.org/2000/svg";
pub const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";
pub const XLINK_NS: &str = "http://www.w3.org/1999/xlink";
const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub name: String,
    pub attrs: IndexMap<String, String>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: IndexMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(name.into(), value.into());
    }

    /// Removes an attribute, keeping the order of the remaining ones.
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        self.attrs.shift_remove(name)
    }

    /// Parses a length attribute such as `120`, `120.5` or `120px`.
    pub fn attr_f64(&self, name: &str) -> Option<f64> {
        parse_length(self.attr(name)?)
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or_default().split_whitespace()
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    /// Element children, in document order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// Preorder traversal including `self`.
    pub fn descendants(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(el) = stack.pop() {
            out.push(el);
            let children: Vec<&Element> = el.elements().collect();
            stack.extend(children.into_iter().rev());
        }
        out
    }

    pub fn find(&self, name: &str) -> Option<&Element> {
        self.descendants().into_iter().find(|e| e.is(name))
    }

    pub fn count(&self, name: &str) -> usize {
        self.descendants().into_iter().filter(|e| e.is(name)).count()
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// Removes every descendant element named `name`; returns how many were removed.
    pub fn remove_descendants(&mut self, name: &str) -> usize {
        let before = self.children.len();
        self.children
            .retain(|n| !matches!(n, Node::Element(e) if e.is(name)));
        let mut removed = before - self.children.len();
        for child in self.elements_mut() {
            removed += child.remove_descendants(name);
        }
        removed
    }

    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        write_element(self, &mut out);
        out
    }
}

fn collect_text(el: &Element, out: &mut String) {
    for child in &el.children {
        match child {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) => collect_text(e, out),
        }
    }
}

pub(crate) fn parse_length(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let raw = raw.strip_suffix("px").unwrap_or(raw).trim_end();
    let v = raw.parse::<f64>().ok()?;
    v.is_finite().then_some(v)
}

fn re_html_void_br() -> &'static Regex {
    static ONCE: OnceLock<Regex> = OnceLock::new();
    ONCE.get_or_init(|| Regex::new(r"(?i)<br\s*>").expect("br regex must compile"))
}

/// Mermaid serializes HTML labels with HTML rules (`<br>`, `&nbsp;`); make them XML.
fn tolerate_html(svg: &str) -> String {
    let svg = re_html_void_br().replace_all(svg, "<br/>");
    svg.replace("&nbsp;", "&#160;")
}

/// Parses markup and returns the first `<svg>` element (the root, or the first one nested in an
/// HTML wrapper).
pub fn parse_svg(text: &str) -> Result<Element> {
    let text = tolerate_html(text);
    let opts = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..Default::default()
    };
    let doc = roxmltree::Document::parse_with_options(&text, opts)?;
    let svg = doc
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "svg")
        .ok_or(Error::MissingSvg)?;

    let mut root = convert(svg, None);
    for ns in svg.namespaces() {
        if let Some(prefix) = ns.name() {
            if prefix != "xml" {
                root.attrs
                    .entry(format!("xmlns:{prefix}"))
                    .or_insert_with(|| ns.uri().to_string());
            }
        }
    }
    Ok(root)
}

fn convert(node: roxmltree::Node<'_, '_>, parent_ns: Option<&str>) -> Element {
    let ns = node.tag_name().namespace();
    let mut el = Element::new(node.tag_name().name());
    if ns != parent_ns {
        if let Some(ns) = ns {
            el.set_attr("xmlns", ns);
        }
    }
    // Prefixes that come into scope below the root are redeclared where they appear.
    if let Some(parent) = node.parent_element() {
        for decl in node.namespaces() {
            if let Some(prefix) = decl.name() {
                if prefix != "xml" && parent.lookup_namespace_uri(Some(prefix)) != Some(decl.uri()) {
                    el.set_attr(format!("xmlns:{prefix}"), decl.uri());
                }
            }
        }
    }
    for a in node.attributes() {
        let name = match a.namespace() {
            None => a.name().to_string(),
            Some(XLINK_NS) => format!("xlink:{}", a.name()),
            Some(XML_NS) => format!("xml:{}", a.name()),
            Some(uri) => match node.lookup_prefix(uri) {
                Some(prefix) if !prefix.is_empty() => format!("{prefix}:{}", a.name()),
                _ => {
                    tracing::debug!(attr = a.name(), uri, "dropping attribute with unbound namespace");
                    continue;
                }
            },
        };
        el.attrs.insert(name, a.value().to_string());
    }
    for child in node.children() {
        if child.is_element() {
            el.children.push(Node::Element(convert(child, ns)));
        } else if child.is_text() {
            if let Some(text) = child.text() {
                el.children.push(Node::Text(text.to_string()));
            }
        }
    }
    el
}

fn write_element(el: &Element, out: &mut String) {
    let _ = write!(out, "<{}", el.name);
    for (k, v) in &el.attrs {
        let _ = write!(out, r#" {k}="{}""#, escape_attr(v));
    }
    if el.children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    for child in &el.children {
        match child {
            Node::Element(e) => write_element(e, out),
            Node::Text(t) => out.push_str(&escape_text(t)),
        }
    }
    let _ = write!(out, "</{}>", el.name);
}

pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_html_isms_in_foreign_object() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg"><foreignObject width="10" height="10"><div xmlns="http://www.w3.org/1999/xhtml">a<br>b&nbsp;c</div></foreignObject></svg>"#;
        let root = parse_svg(svg).unwrap();
        let div = root.find("div").unwrap();
        assert_eq!(div.attr("xmlns"), Some(XHTML_NS));
        assert_eq!(div.count("br"), 1);
        assert_eq!(div.text_content(), "ab\u{a0}c");
    }

    #[test]
    fn serializes_with_namespaces_and_escaping() {
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink"><use xlink:href="#a"/><text title="a&quot;b">x &lt; y</text></svg>"##;
        let root = parse_svg(svg).unwrap();
        assert_eq!(
            root.to_xml(),
            r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink"><use xlink:href="#a"/><text title="a&quot;b">x &lt; y</text></svg>"##
        );
    }

    #[test]
    fn keeps_prefixes_of_foreign_attributes() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape"><g inkscape:label="Layer" label="plain"><rect xmlns:sodipodi="urn:sodipodi" sodipodi:type="arc"/></g></svg>"#;
        let root = parse_svg(svg).unwrap();
        let g = root.find("g").unwrap();
        assert_eq!(g.attr("inkscape:label"), Some("Layer"));
        assert_eq!(g.attr("label"), Some("plain"));
        let rect = root.find("rect").unwrap();
        assert_eq!(rect.attr("sodipodi:type"), Some("arc"));
        assert_eq!(rect.attr("xmlns:sodipodi"), Some("urn:sodipodi"));

        let reparsed = parse_svg(&root.to_xml()).unwrap();
        assert_eq!(reparsed.find("g").unwrap().attr("inkscape:label"), Some("Layer"));
        assert_eq!(reparsed.find("rect").unwrap().attr("sodipodi:type"), Some("arc"));
    }

    #[test]
    fn finds_svg_inside_wrapper() {
        let root = parse_svg(r#"<div><svg width="4"/></div>"#).unwrap();
        assert_eq!(root.name, "svg");
        assert_eq!(root.attr_f64("width"), Some(4.0));
        assert!(matches!(parse_svg("<div/>"), Err(Error::MissingSvg)));
        assert!(matches!(parse_svg("<svg"), Err(Error::Xml(_))));
    }

    #[test]
    fn remove_descendants_counts_nested_matches() {
        let mut root = Element::new("svg")
            .with_child(Element::new("style"))
            .with_child(Element::new("g").with_child(Element::new("style")));
        assert_eq!(root.remove_descendants("style"), 2);
        assert_eq!(root.count("style"), 0);
        assert_eq!(root.count("g"), 1);
    }
}

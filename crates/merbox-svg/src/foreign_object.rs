use crate::css::{format_declarations, parse_declarations};
use crate::dom::{Element, Node};
use crate::inline::is_inlined;
use indexmap::IndexMap;

const BLOCK_ELEMENTS: &[&str] = &["div", "p", "li", "h1", "h2", "h3", "h4", "h5", "h6"];

/// Declarations never carried from HTML content onto the replacement `<text>`.
const NOT_CARRIED: &[&str] = &["text-anchor", "dominant-baseline", "alignment-baseline", "display"];

/// Replaces every `<foreignObject>` under `root` with a centered native `<text>` element, or
/// removes it when it holds no visible text. Returns how many were replaced or removed.
///
/// Expects styles to be inlined already: the replacement takes its font and color from the
/// `style` attributes of the foreignObject and its content.
pub fn convert_foreign_objects_to_text(root: &mut Element) -> usize {
    let mut converted = 0;
    let mut i = 0;
    while i < root.children.len() {
        let replacement = match &root.children[i] {
            Node::Element(e) if e.is("foreignObject") => Some(text_for(e)),
            _ => None,
        };
        match replacement {
            Some(Some(text)) => {
                root.children[i] = Node::Element(text);
                converted += 1;
                i += 1;
            }
            Some(None) => {
                root.children.remove(i);
                converted += 1;
            }
            None => {
                if let Node::Element(child) = &mut root.children[i] {
                    converted += convert_foreign_objects_to_text(child);
                }
                i += 1;
            }
        }
    }
    converted
}

/// Visible lines of a foreignObject, split on `<br>` and block element boundaries, with
/// whitespace collapsed and empty lines dropped.
pub fn text_lines(foreign_object: &Element) -> Vec<String> {
    let mut lines = vec![String::new()];
    collect_lines(foreign_object, &mut lines);
    lines
        .into_iter()
        .map(|l| l.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|l| !l.is_empty())
        .collect()
}

fn collect_lines(el: &Element, lines: &mut Vec<String>) {
    for child in &el.children {
        match child {
            Node::Text(t) => {
                if let Some(line) = lines.last_mut() {
                    line.push_str(t);
                }
            }
            Node::Element(e) if e.is("br") => lines.push(String::new()),
            Node::Element(e) => {
                let block = BLOCK_ELEMENTS.contains(&e.name.as_str());
                if block {
                    lines.push(String::new());
                }
                collect_lines(e, lines);
                if block {
                    lines.push(String::new());
                }
            }
        }
    }
}

fn text_for(fo: &Element) -> Option<Element> {
    let lines = text_lines(fo);
    if lines.is_empty() {
        return None;
    }

    let x = fo.attr_f64("x").unwrap_or(0.0);
    let y = fo.attr_f64("y").unwrap_or(0.0);
    let width = fo.attr_f64("width").unwrap_or(0.0);
    let height = fo.attr_f64("height").unwrap_or(0.0);
    let cx = x + width / 2.0;

    let mut text = Element::new("text");
    if let Some(transform) = fo.attr("transform") {
        text.set_attr("transform", transform);
    }
    text.set_attr("style", carried_style(fo));

    if let [line] = lines.as_slice() {
        text.set_attr("x", cx.to_string());
        text.set_attr("y", (y + height / 2.0).to_string());
        return Some(text.with_text(line.as_str()));
    }

    text.set_attr("x", cx.to_string());
    let slot = height / lines.len() as f64;
    for (i, line) in lines.iter().enumerate() {
        let tspan = Element::new("tspan")
            .with_attr("x", cx.to_string())
            .with_attr("y", (y + slot * (i as f64 + 0.5)).to_string())
            .with_attr("dominant-baseline", "middle")
            .with_text(line.as_str());
        text = text.with_child(tspan);
    }
    Some(text)
}

fn carried_style(fo: &Element) -> String {
    let mut decls: IndexMap<String, String> = IndexMap::new();
    for d in fo.attr("style").map(parse_declarations).unwrap_or_default() {
        if d.name != "text-anchor" && d.name != "dominant-baseline" {
            decls.insert(d.name, d.value);
        }
    }
    // Content styles (the label's `div`/`span`) override the foreignObject's own. HTML text is
    // painted with `color`, so `fill` is only taken from the foreignObject itself.
    let mut content_color = None;
    for el in fo.descendants().into_iter().skip(1) {
        for d in el.attr("style").map(parse_declarations).unwrap_or_default() {
            if d.name == "color" {
                content_color = Some(d.value.clone());
            }
            if d.name != "fill" && is_inlined(&d.name) && !NOT_CARRIED.contains(&d.name.as_str()) {
                decls.insert(d.name, d.value);
            }
        }
    }
    match content_color {
        Some(color) => {
            decls.insert("fill".to_string(), color);
        }
        None if !decls.contains_key("fill") => {
            if let Some(color) = decls.get("color").cloned() {
                decls.insert("fill".to_string(), color);
            }
        }
        None => {}
    }
    decls.insert("text-anchor".to_string(), "middle".to_string());
    decls.insert("dominant-baseline".to_string(), "middle".to_string());
    format_declarations(decls.iter().map(|(k, v)| (k.as_str(), v.as_str())))
}

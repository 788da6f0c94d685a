//! Just enough CSS to resolve renderer-generated stylesheets without a browser.
//!
//! Supported: type/universal/id/class/attribute selectors, descendant and child combinators,
//! selector lists, `!important`. Selectors with pseudo-classes, pseudo-elements or sibling
//! combinators are kept (they still count for nothing) but never match. At-rules are skipped.

use crate::dom::Element;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub value: String,
    pub important: bool,
}

impl Declaration {
    pub fn is_custom_property(&self) -> bool {
        self.name.starts_with("--")
    }
}

/// Parses a declaration block body such as the value of a `style` attribute.
pub fn parse_declarations(text: &str) -> Vec<Declaration> {
    split_top_level(text, ';')
        .into_iter()
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            let name = if name.starts_with("--") {
                name.to_string()
            } else {
                name.to_ascii_lowercase()
            };

            let mut value = value.trim();
            let mut important = false;
            if let Some(i) = value.rfind('!') {
                if value[i + 1..].trim().eq_ignore_ascii_case("important") {
                    important = true;
                    value = value[..i].trim_end();
                }
            }
            if value.is_empty() && !name.starts_with("--") {
                return None;
            }
            Some(Declaration {
                name,
                value: value.to_string(),
                important,
            })
        })
        .collect()
}

pub fn format_declarations<'a>(decls: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    decls
        .into_iter()
        .map(|(name, value)| format!("{name}:{value}"))
        .collect::<Vec<_>>()
        .join(";")
}

const FONT_LONGHANDS: [&str; 7] = [
    "font-style",
    "font-variant",
    "font-weight",
    "font-stretch",
    "font-size",
    "line-height",
    "font-family",
];

const MARKER_LONGHANDS: [&str; 3] = ["marker-start", "marker-mid", "marker-end"];

/// Splits `font` and `marker` into their longhands; every other declaration passes through.
///
/// An unparseable `font` yields nothing, like any invalid declaration. A `font` value that
/// uses `var()` cannot be split before substitution and is passed through unchanged.
pub fn expand_shorthand(decl: Declaration) -> Vec<Declaration> {
    let longhand = |name: &str, value: &str| Declaration {
        name: name.to_string(),
        value: value.to_string(),
        important: decl.important,
    };
    match decl.name.as_str() {
        "marker" => MARKER_LONGHANDS
            .iter()
            .map(|name| longhand(*name, &decl.value))
            .collect(),
        "font" if decl.value.to_ascii_lowercase().contains("var(") => vec![decl.clone()],
        "font" => match parse_font(&decl.value) {
            Some(values) => FONT_LONGHANDS
                .iter()
                .zip(values)
                .map(|(name, value)| longhand(*name, &value))
                .collect(),
            None => Vec::new(),
        },
        _ => vec![decl.clone()],
    }
}

/// `[style || variant || weight || stretch]? size[/line-height]? family`, in longhand order.
fn parse_font(value: &str) -> Option<[String; 7]> {
    let value = value.trim();
    let lower = value.to_ascii_lowercase();
    if matches!(lower.as_str(), "inherit" | "initial" | "unset") {
        return Some(std::array::from_fn(|_| lower.clone()));
    }

    let mut style = "normal";
    let mut variant = "normal";
    let mut weight = "normal";
    let mut stretch = "normal";
    let mut rest = value;
    let mut prefixes = 0;
    let (size, rest) = loop {
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let token = &rest[..end];
        let after = rest[end..].trim_start();
        if let Some(size) = font_size_token(token) {
            break (size, &rest[size.len()..]);
        }
        prefixes += 1;
        if prefixes > 4 || after.is_empty() {
            return None;
        }
        match token.to_ascii_lowercase().as_str() {
            "normal" => {}
            "italic" | "oblique" => style = token,
            "small-caps" => variant = token,
            "bold" | "bolder" | "lighter" => weight = token,
            t if t.parse::<u16>().is_ok_and(|w| (1..=1000).contains(&w)) => weight = token,
            "ultra-condensed" | "extra-condensed" | "condensed" | "semi-condensed"
            | "semi-expanded" | "expanded" | "extra-expanded" | "ultra-expanded" => stretch = token,
            _ => return None,
        }
        rest = after;
    };

    let mut rest = rest.trim_start();
    let mut line_height = "normal";
    if let Some(after_slash) = rest.strip_prefix('/') {
        let after_slash = after_slash.trim_start();
        let end = after_slash.find(char::is_whitespace)?;
        line_height = &after_slash[..end];
        rest = after_slash[end..].trim_start();
    }
    let family = rest.trim();
    if family.is_empty() {
        return None;
    }
    Some([style, variant, weight, stretch, size, line_height, family].map(str::to_string))
}

/// The font-size part of a shorthand token (`14px`, `1.2em`, `large`, `12px/1.5`), if it is one.
fn font_size_token(token: &str) -> Option<&str> {
    let size = token.split_once('/').map_or(token, |(size, _)| size);
    let lower = size.to_ascii_lowercase();
    let keyword = matches!(
        lower.as_str(),
        "xx-small" | "x-small" | "small" | "medium" | "large" | "x-large" | "xx-large"
            | "xxx-large" | "larger" | "smaller"
    );
    if keyword || lower.starts_with("calc(") {
        return Some(size);
    }
    let unit_at = lower
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .filter(|&i| i > 0)?;
    let unit = &lower[unit_at..];
    let known = matches!(
        unit,
        "px" | "em" | "rem" | "ex" | "ch" | "pt" | "pc" | "cm" | "mm" | "in" | "q" | "vw" | "vh"
            | "vmin" | "vmax" | "%"
    );
    (known && lower[..unit_at].parse::<f64>().is_ok()).then_some(size)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub selectors: Vec<Selector>,
    pub declarations: Vec<Declaration>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stylesheet {
    pub rules: Vec<Rule>,
}

impl Stylesheet {
    pub fn parse(css: &str) -> Self {
        let css = strip_comments(css);
        let mut rules = Vec::new();
        let mut rest = css.as_str();
        loop {
            rest = rest.trim_start();
            if rest.is_empty() {
                break;
            }
            let Some(end) = find_top_level(rest, &['{', ';', '}']) else {
                break;
            };
            if rest.as_bytes()[end] != b'{' {
                rest = &rest[end + 1..];
                continue;
            }
            let Some(close) = matching_brace(rest, end) else {
                break;
            };
            let prelude = rest[..end].trim();
            if !prelude.starts_with('@') {
                let selectors: Vec<Selector> = split_top_level(prelude, ',')
                    .into_iter()
                    .filter_map(Selector::parse)
                    .collect();
                if !selectors.is_empty() {
                    rules.push(Rule {
                        selectors,
                        declarations: parse_declarations(&rest[end + 1..close])
                            .into_iter()
                            .flat_map(expand_shorthand)
                            .collect(),
                    });
                }
            }
            rest = &rest[close + 1..];
        }
        Self { rules }
    }

    pub fn extend(&mut self, other: Stylesheet) {
        self.rules.extend(other.rules);
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn strip_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}

/// Byte index of the first char of `set` outside quotes and parentheses.
fn find_top_level(s: &str, set: &[char]) -> Option<usize> {
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if c == '\\' {
            escaped = true;
            continue;
        }
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' | '[' => depth += 1,
            ')' | ']' => depth -= 1,
            c if depth <= 0 && set.contains(&c) => return Some(i),
            _ => {}
        }
    }
    None
}

fn matching_brace(s: &str, open: usize) -> Option<usize> {
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in s[open..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if c == '\\' {
            escaped = true;
            continue;
        }
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

fn split_top_level(s: &str, sep: char) -> Vec<&str> {
    let mut out = Vec::new();
    let mut rest = s;
    while let Some(i) = find_top_level(rest, &[sep]) {
        out.push(&rest[..i]);
        rest = &rest[i + sep.len_utf8()..];
    }
    out.push(rest);
    out.into_iter().filter(|p| !p.trim().is_empty()).collect()
}

/// `(ids, classes + attributes + pseudo-classes, types + pseudo-elements)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Specificity(pub u32, pub u32, pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals,
    Includes,
    DashMatch,
    Prefix,
    Suffix,
    Substring,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrSelector {
    name: String,
    op: AttrOp,
    value: String,
}

impl AttrSelector {
    fn parse(inner: &str) -> Option<Self> {
        let inner = inner.trim();
        let Some(eq) = inner.find('=') else {
            return (!inner.is_empty()).then(|| Self {
                name: inner.to_string(),
                op: AttrOp::Exists,
                value: String::new(),
            });
        };
        let (op, name_end) = match inner[..eq].chars().last() {
            Some('~') => (AttrOp::Includes, eq - 1),
            Some('|') => (AttrOp::DashMatch, eq - 1),
            Some('^') => (AttrOp::Prefix, eq - 1),
            Some('$') => (AttrOp::Suffix, eq - 1),
            Some('*') => (AttrOp::Substring, eq - 1),
            _ => (AttrOp::Equals, eq),
        };
        let name = inner[..name_end].trim();
        if name.is_empty() {
            return None;
        }
        let mut value = inner[eq + 1..].trim();
        // Case-sensitivity flags (`[a="b" i]`) are accepted and ignored.
        if let Some(stripped) = value.strip_suffix(" i").or_else(|| value.strip_suffix(" s")) {
            value = stripped.trim_end();
        }
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
            .unwrap_or(value);
        Some(Self {
            name: name.to_string(),
            op,
            value: value.to_string(),
        })
    }

    fn matches(&self, el: &Element) -> bool {
        let Some(actual) = el.attr(&self.name) else {
            return false;
        };
        let v = self.value.as_str();
        match self.op {
            AttrOp::Exists => true,
            AttrOp::Equals => actual == v,
            AttrOp::Includes => actual.split_whitespace().any(|w| w == v),
            AttrOp::DashMatch => actual == v || actual.starts_with(&format!("{v}-")),
            AttrOp::Prefix => !v.is_empty() && actual.starts_with(v),
            AttrOp::Suffix => !v.is_empty() && actual.ends_with(v),
            AttrOp::Substring => !v.is_empty() && actual.contains(v),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    ids: Vec<String>,
    classes: Vec<String>,
    attrs: Vec<AttrSelector>,
}

impl Compound {
    fn matches(&self, el: &Element) -> bool {
        if let Some(tag) = &self.tag {
            if !tag.eq_ignore_ascii_case(&el.name) {
                return false;
            }
        }
        if !self.ids.iter().all(|id| el.attr("id") == Some(id.as_str())) {
            return false;
        }
        if !self.classes.iter().all(|c| el.classes().any(|have| have == c)) {
            return false;
        }
        self.attrs.iter().all(|a| a.matches(el))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    compounds: Vec<Compound>,
    /// `combinators[i]` joins `compounds[i]` and `compounds[i + 1]`.
    combinators: Vec<Combinator>,
    specificity: Specificity,
    matchable: bool,
}

impl Selector {
    pub fn parse(text: &str) -> Option<Self> {
        let (parts, combs) = split_compounds(text.trim())?;
        let mut specificity = Specificity::default();
        let mut matchable = true;
        let mut combinators = Vec::with_capacity(combs.len());
        for c in combs {
            match c {
                ' ' => combinators.push(Combinator::Descendant),
                '>' => combinators.push(Combinator::Child),
                _ => {
                    // Sibling combinators need sibling context the cascade does not track.
                    matchable = false;
                    combinators.push(Combinator::Descendant);
                }
            }
        }
        let compounds = parts
            .into_iter()
            .map(|p| parse_compound(p, &mut specificity, &mut matchable))
            .collect::<Option<Vec<_>>>()?;
        Some(Self {
            compounds,
            combinators,
            specificity,
            matchable,
        })
    }

    pub fn specificity(&self) -> Specificity {
        self.specificity
    }

    /// Matches `element`, whose ancestors (outermost first) are `ancestors`.
    pub fn matches(&self, ancestors: &[&Element], element: &Element) -> bool {
        self.matchable && self.match_at(self.compounds.len() - 1, ancestors, element)
    }

    fn match_at(&self, idx: usize, ancestors: &[&Element], element: &Element) -> bool {
        if !self.compounds[idx].matches(element) {
            return false;
        }
        if idx == 0 {
            return true;
        }
        match self.combinators[idx - 1] {
            Combinator::Child => match ancestors.split_last() {
                Some((parent, rest)) => self.match_at(idx - 1, rest, parent),
                None => false,
            },
            Combinator::Descendant => (0..ancestors.len())
                .rev()
                .any(|i| self.match_at(idx - 1, &ancestors[..i], ancestors[i])),
        }
    }
}

fn split_compounds(text: &str) -> Option<(Vec<&str>, Vec<char>)> {
    let mut parts = Vec::new();
    let mut combs = Vec::new();
    let mut start: Option<usize> = None;
    let mut pending: Option<char> = None;
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        let separator = depth <= 0 && (c.is_whitespace() || matches!(c, '>' | '+' | '~'));
        if separator {
            if let Some(s) = start.take() {
                parts.push(&text[s..i]);
                pending.get_or_insert(' ');
            }
            if !c.is_whitespace() {
                if parts.is_empty() {
                    return None;
                }
                pending = Some(c);
            }
            continue;
        }
        if start.is_none() {
            if !parts.is_empty() {
                combs.push(pending.take().unwrap_or(' '));
            }
            start = Some(i);
        }
        match c {
            '\\' => escaped = true,
            '"' | '\'' => quote = Some(c),
            '[' | '(' => depth += 1,
            ']' | ')' => depth -= 1,
            _ => {}
        }
    }
    match start {
        Some(s) => parts.push(&text[s..]),
        None if matches!(pending, Some('>' | '+' | '~')) => return None,
        None => {}
    }
    (!parts.is_empty()).then_some((parts, combs))
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

fn read_ident(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<String> {
    let mut out = String::new();
    while let Some(&c) = chars.peek() {
        if c == '\\' {
            chars.next();
            out.push(chars.next()?);
        } else if is_ident_char(c) {
            out.push(c);
            chars.next();
        } else {
            break;
        }
    }
    (!out.is_empty()).then_some(out)
}

fn read_until_balanced(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    open: char,
    close: char,
) -> Option<String> {
    let mut depth = 1;
    let mut quote: Option<char> = None;
    let mut out = String::new();
    for c in chars.by_ref() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            out.push(c);
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            c if c == open => depth += 1,
            c if c == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(out);
                }
            }
            _ => {}
        }
        out.push(c);
    }
    None
}

fn parse_compound(s: &str, spec: &mut Specificity, matchable: &mut bool) -> Option<Compound> {
    let mut compound = Compound::default();
    let mut chars = s.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            '*' => {
                chars.next();
            }
            '#' => {
                chars.next();
                compound.ids.push(read_ident(&mut chars)?);
                spec.0 += 1;
            }
            '.' => {
                chars.next();
                compound.classes.push(read_ident(&mut chars)?);
                spec.1 += 1;
            }
            '[' => {
                chars.next();
                let inner = read_until_balanced(&mut chars, '[', ']')?;
                compound.attrs.push(AttrSelector::parse(&inner)?);
                spec.1 += 1;
            }
            ':' => {
                chars.next();
                if chars.peek() == Some(&':') {
                    chars.next();
                    spec.2 += 1;
                } else {
                    spec.1 += 1;
                }
                read_ident(&mut chars)?;
                if chars.peek() == Some(&'(') {
                    chars.next();
                    read_until_balanced(&mut chars, '(', ')')?;
                }
                *matchable = false;
            }
            c if is_ident_char(c) || c == '\\' => {
                if compound.tag.is_some() {
                    return None;
                }
                compound.tag = Some(read_ident(&mut chars)?);
                spec.2 += 1;
            }
            _ => return None,
        }
    }
    Some(compound)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn el(name: &str, id: Option<&str>, class: Option<&str>) -> Element {
        let mut e = Element::new(name);
        if let Some(id) = id {
            e.set_attr("id", id);
        }
        if let Some(class) = class {
            e.set_attr("class", class);
        }
        e
    }

    #[test]
    fn parses_rules_and_skips_at_rules() {
        let sheet = Stylesheet::parse(
            r#"/* c */ #m{fill:#333;font-size:16px;}@keyframes dash{to{stroke-dashoffset:0;}}
               #m .node rect, #m .node circle{fill:#ECECFF !important;stroke:#9370DB;}
               @import url("x.css"); #m :root{--mermaid-font-family:"trebuchet ms";}"#,
        );
        assert_eq!(sheet.rules.len(), 3);
        assert_eq!(sheet.rules[1].selectors.len(), 2);
        assert_eq!(
            sheet.rules[1].declarations[0],
            Declaration {
                name: "fill".to_string(),
                value: "#ECECFF".to_string(),
                important: true
            }
        );
        assert_eq!(sheet.rules[2].declarations[0].name, "--mermaid-font-family");
    }

    #[test]
    fn specificity_counts() {
        let s = Selector::parse("#m .node > rect.a[data-x]").unwrap();
        assert_eq!(s.specificity(), Specificity(1, 3, 1));
        let s = Selector::parse("g:hover::before").unwrap();
        assert_eq!(s.specificity(), Specificity(0, 1, 2));
    }

    #[test]
    fn descendant_and_child_matching() {
        let svg = el("svg", Some("m"), None);
        let g = el("g", None, Some("node default"));
        let inner = el("g", None, Some("label"));
        let rect = el("rect", None, Some("basic label-container"));

        let desc = Selector::parse("#m .node rect").unwrap();
        assert!(desc.matches(&[&svg, &g, &inner], &rect));

        let child = Selector::parse("#m .node > rect").unwrap();
        assert!(!child.matches(&[&svg, &g, &inner], &rect));
        assert!(child.matches(&[&svg, &g], &rect));

        let attr = Selector::parse(r#"[class~="label-container"]"#).unwrap();
        assert!(attr.matches(&[], &rect));
        let suffix = Selector::parse(r#"rect[class$=container]"#).unwrap();
        assert!(suffix.matches(&[], &rect));
    }

    #[test]
    fn pseudo_and_sibling_selectors_never_match() {
        let svg = el("svg", Some("m"), None);
        let p = el("p", None, None);
        assert!(!Selector::parse("#m :root").unwrap().matches(&[&svg], &p));
        assert!(!Selector::parse("#m p:hover").unwrap().matches(&[&svg], &p));
        assert!(!Selector::parse("svg + p").unwrap().matches(&[&svg], &p));
        assert!(Selector::parse("#m p").unwrap().matches(&[&svg], &p));
        assert!(Selector::parse("> p").is_none());
        assert!(Selector::parse("p >").is_none());
    }

    fn expanded(text: &str) -> Vec<(String, String)> {
        parse_declarations(text)
            .into_iter()
            .flat_map(expand_shorthand)
            .map(|d| (d.name, d.value))
            .collect()
    }

    fn lookup<'a>(decls: &'a [(String, String)], name: &str) -> Option<&'a str> {
        decls.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    #[test]
    fn font_shorthand_splits_into_longhands() {
        let decls = expanded(r#"font: italic bold 12px/1.5 "Trebuchet MS", sans-serif"#);
        assert_eq!(lookup(&decls, "font-style"), Some("italic"));
        assert_eq!(lookup(&decls, "font-weight"), Some("bold"));
        assert_eq!(lookup(&decls, "font-size"), Some("12px"));
        assert_eq!(lookup(&decls, "line-height"), Some("1.5"));
        assert_eq!(lookup(&decls, "font-family"), Some(r#""Trebuchet MS", sans-serif"#));
        assert_eq!(lookup(&decls, "font"), None);

        let decls = expanded("font: 600 1.2em / 2 Arial");
        assert_eq!(lookup(&decls, "font-weight"), Some("600"));
        assert_eq!(lookup(&decls, "font-size"), Some("1.2em"));
        assert_eq!(lookup(&decls, "line-height"), Some("2"));
        assert_eq!(lookup(&decls, "font-style"), Some("normal"));

        assert_eq!(lookup(&expanded("font: inherit"), "font-size"), Some("inherit"));
        assert!(expanded("font: bold Arial").is_empty());
        assert!(expanded("font: 14px").is_empty());
        assert_eq!(lookup(&expanded("font: var(--f)"), "font"), Some("var(--f)"));
    }

    #[test]
    fn marker_shorthand_sets_all_positions() {
        let decls = expanded("marker: url(#arrow) !important");
        assert_eq!(decls.len(), 3);
        for name in MARKER_LONGHANDS {
            assert_eq!(lookup(&decls, name), Some("url(#arrow)"));
        }
        assert!(parse_declarations("marker:url(#a) !important")
            .into_iter()
            .flat_map(expand_shorthand)
            .all(|d| d.important));
    }

    #[test]
    fn declarations_keep_urls_and_importance() {
        let decls = parse_declarations(
            "marker-end: url(#arrow;x); FILL: Red ! important;;stroke:; --gap: ",
        );
        assert_eq!(decls.len(), 3);
        assert_eq!(decls[0].value, "url(#arrow;x)");
        assert_eq!(decls[1].name, "fill");
        assert_eq!(decls[1].value, "Red");
        assert!(decls[1].important);
        assert_eq!(decls[2].name, "--gap");
        assert_eq!(decls[2].value, "");
    }
}

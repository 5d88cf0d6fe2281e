// src/dom/canonical.rs

//! Structure-only page canonicalization.
//!
//! Projects raw markup down to a skeleton of tag names, nesting and a
//! whitelisted set of structural attributes. Two pages built from the
//! same template produce byte-identical skeletons regardless of their
//! content; the skeleton is what gets fingerprinted.

use std::sync::OnceLock;

use regex::Regex;
use scraper::{ElementRef, Html};

/// Elements that carry no structural signal.
const SKIP_TAGS: [&str; 6] = ["script", "style", "svg", "noscript", "meta", "link"];

/// Void elements get no closing tag: a literal `</br>` re-parses as a
/// second `<br>`, which would break the projection property.
const VOID_TAGS: [&str; 11] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "source", "track", "wbr",
];

/// Nesting levels considered for the skeleton. Structure below this is
/// template boilerplate repetition and does not discriminate templates.
const MAX_DEPTH: usize = 15;

/// Matches layout/templating class names; instance identifiers (hashed
/// class names, ids-in-classes, utility junk with digits) fail this.
fn structural_class_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z][a-z-]*[a-z]$").expect("valid class regex"))
}

/// Reduce markup to its canonical structural skeleton.
///
/// Deterministic: identical input always yields identical output, with
/// classes sorted and attributes emitted in a fixed order. The output is
/// itself parseable markup, so applying `canonicalize` to a skeleton
/// returns the skeleton unchanged.
pub fn canonicalize(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut skeleton = String::new();
    write_element(document.root_element(), 0, &mut skeleton);
    skeleton
}

fn write_element(element: ElementRef<'_>, depth: usize, out: &mut String) {
    if depth > MAX_DEPTH {
        return;
    }

    let name = element.value().name();
    if SKIP_TAGS.contains(&name) {
        return;
    }

    out.push('<');
    out.push_str(name);

    let mut classes: Vec<&str> = element
        .value()
        .classes()
        .filter(|class| class.len() > 3 && structural_class_re().is_match(class))
        .collect();
    if !classes.is_empty() {
        classes.sort_unstable();
        classes.dedup();
        out.push_str(" class=\"");
        out.push_str(&classes.join(" "));
        out.push('"');
    }

    if let Some(role) = element.value().attr("role").filter(|v| is_token(v)) {
        out.push_str(" role=\"");
        out.push_str(role);
        out.push('"');
    }

    if name == "input" {
        if let Some(kind) = element.value().attr("type").filter(|v| is_token(v)) {
            out.push_str(" type=\"");
            out.push_str(kind);
            out.push('"');
        }
    }

    out.push('>');

    if VOID_TAGS.contains(&name) {
        return;
    }

    for child in element.children() {
        if let Some(child) = ElementRef::wrap(child) {
            write_element(child, depth + 1, out);
        }
    }

    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn is_token(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_and_instance_attributes_are_ignored() {
        let a = canonicalize(
            r#"<div class="product-card" id="p1"><h2>Red shoes</h2><a href="/p/1">buy</a></div>"#,
        );
        let b = canonicalize(
            r#"<div class="product-card" id="p2"><h2>Blue hats</h2><a href="/p/2">buy</a></div>"#,
        );
        assert_eq!(a, b);
    }

    #[test]
    fn nesting_changes_the_skeleton() {
        let flat = canonicalize("<div><p></p><p></p></div>");
        let nested = canonicalize("<div><p><p></p></p></div>");
        assert_ne!(flat, nested);
    }

    #[test]
    fn tag_composition_changes_the_skeleton() {
        let a = canonicalize("<div><span></span></div>");
        let b = canonicalize("<div><em></em></div>");
        assert_ne!(a, b);
    }

    #[test]
    fn scripts_and_styles_are_stripped() {
        let with = canonicalize("<div><script>alert(1)</script><style>p{}</style></div>");
        let without = canonicalize("<div></div>");
        assert_eq!(with, without);
    }

    #[test]
    fn classes_are_sorted_and_filtered() {
        let a = canonicalize(r#"<div class="sidebar main-nav"></div>"#);
        let b = canonicalize(r#"<div class="main-nav sidebar"></div>"#);
        assert_eq!(a, b);
        assert!(a.contains(r#"class="main-nav sidebar""#));

        // Short, uppercase and digit-bearing classes are instance noise
        let noisy = canonicalize(r#"<div class="css-1x2y3z AB x sidebar"></div>"#);
        assert!(noisy.contains(r#"class="sidebar""#));
    }

    #[test]
    fn input_type_and_role_survive() {
        let skeleton =
            canonicalize(r#"<form role="search"><input type="email" value="x"></form>"#);
        assert!(skeleton.contains(r#"role="search""#));
        assert!(skeleton.contains(r#"<input type="email">"#));
        assert!(!skeleton.contains("value"));
    }

    #[test]
    fn canonicalization_is_a_projection() {
        let html = r#"
            <html><body>
              <nav class="main-nav"><a href="/">home</a></nav>
              <main role="main"><article class="post-body"><p>hello<br>world</p></article></main>
              <form><input type="text"><hr></form>
            </body></html>
        "#;
        let once = canonicalize(html);
        let twice = canonicalize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn malformed_markup_still_produces_a_skeleton() {
        let skeleton = canonicalize("<div><p>unclosed <span>mess");
        assert!(skeleton.contains("<div>"));
        assert!(skeleton.contains("<span>"));
    }
}

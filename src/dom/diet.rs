// src/dom/diet.rs

//! Token diet: analyzer-facing page reduction.
//!
//! Unlike canonicalization, the diet keeps business-logic signal:
//! interactive elements, headings, accessibility labels and a truncated
//! text sample per node. The output goes to the external analyzer, so
//! size is the constraint and structure-only fidelity is not.

use scraper::{ElementRef, Html};
use unicode_segmentation::UnicodeSegmentation;

/// Fixed characters-per-token ratio; reporting only, never enforcement.
const CHARS_PER_TOKEN: usize = 4;

/// Elements dropped from the reduced markup.
const SKIP_TAGS: [&str; 7] = [
    "script", "style", "svg", "noscript", "meta", "link", "iframe",
];

/// Attributes retained, in emission order.
const KEEP_ATTRS: [&str; 9] = [
    "name",
    "id",
    "type",
    "role",
    "placeholder",
    "aria-label",
    "href",
    "action",
    "method",
];

/// Elements that mark a wrapper as worth keeping even when empty.
const INTERACTIVE_TAGS: [&str; 6] = ["a", "button", "form", "input", "select", "textarea"];

/// Tags emitted without a closing tag.
const VOID_TAGS: [&str; 4] = ["br", "hr", "img", "input"];

/// A page after the token diet.
#[derive(Debug, Clone)]
pub struct CompressedPage {
    /// Reduced markup handed to the analyzer
    pub markup: String,

    /// Byte size of the raw input markup
    pub raw_size: usize,

    /// Byte size of the reduced markup
    pub reduced_size: usize,
}

impl CompressedPage {
    /// Approximate model-token count of the reduced markup.
    pub fn tokens(&self) -> usize {
        estimate_tokens(&self.markup)
    }
}

/// Reduce markup for analysis, truncating each text node to
/// `text_budget` grapheme clusters.
pub fn compress(html: &str, text_budget: usize) -> CompressedPage {
    let document = Html::parse_document(html);
    let mut markup = String::new();
    write_element(document.root_element(), text_budget, &mut markup);

    CompressedPage {
        raw_size: html.len(),
        reduced_size: markup.len(),
        markup,
    }
}

/// Approximate a model-token count for reporting.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / CHARS_PER_TOKEN
}

/// Count forms that carry at least one named field.
pub fn count_forms(html: &str) -> usize {
    let document = Html::parse_document(html);
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "form")
        .filter(|form| {
            form.descendants().filter_map(ElementRef::wrap).any(|el| {
                matches!(el.value().name(), "input" | "textarea" | "select")
                    && el.value().attr("name").is_some()
            })
        })
        .count()
}

fn write_element(element: ElementRef<'_>, text_budget: usize, out: &mut String) {
    let name = element.value().name();
    if SKIP_TAGS.contains(&name) {
        return;
    }

    // Empty presentational wrappers carry no signal for the analyzer
    if matches!(name, "div" | "span") && is_blank(element) {
        return;
    }

    out.push('<');
    out.push_str(name);
    for attr in KEEP_ATTRS {
        if let Some(value) = element.value().attr(attr) {
            out.push(' ');
            out.push_str(attr);
            out.push_str("=\"");
            out.push_str(&escape(value));
            out.push('"');
        }
    }
    out.push('>');

    if VOID_TAGS.contains(&name) {
        return;
    }

    for child in element.children() {
        if let Some(child) = ElementRef::wrap(child) {
            write_element(child, text_budget, out);
        } else if let Some(text) = child.value().as_text() {
            write_text(text, text_budget, out);
        }
        // Comments and processing instructions are dropped
    }

    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn write_text(text: &str, budget: usize, out: &mut String) {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        return;
    }

    let graphemes: Vec<&str> = normalized.graphemes(true).collect();
    if graphemes.len() > budget {
        out.push_str(&escape(&graphemes[..budget].concat()));
        out.push('…');
    } else {
        out.push_str(&escape(&normalized));
    }
}

fn is_blank(element: ElementRef<'_>) -> bool {
    let has_text = element.text().any(|t| !t.trim().is_empty());
    let has_interactive = element
        .descendants()
        .filter_map(ElementRef::wrap)
        .any(|el| INTERACTIVE_TAGS.contains(&el.value().name()));
    !has_text && !has_interactive
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

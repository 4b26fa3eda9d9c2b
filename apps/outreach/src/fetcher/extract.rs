//! HTML → visible text.
//!
//! Walks the parsed document, drops non-visible elements and turns block-level
//! elements into line breaks. Paragraph structure survives as blank lines, which is
//! what the chunker splits on.

use scraper::{ElementRef, Html};

/// Elements whose text is never shown to a reader.
const SKIPPED: [&str; 7] = [
    "script", "style", "noscript", "template", "svg", "iframe", "head",
];

/// Elements that start a new line of text.
const BLOCK: [&str; 24] = [
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "footer", "form",
    "h1", "h2", "h3", "h4", "h5", "h6", "header", "li", "main", "nav", "p", "section", "table",
    "tr",
];

/// Extracts the visible text of an HTML document.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut raw = String::new();
    collect_text(document.root_element(), &mut raw);
    normalize_lines(&raw)
}

/// Extracts the `<title>` of an HTML document, if any.
pub fn html_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = scraper::Selector::parse("title").ok()?;
    let title = document
        .select(&selector)
        .next()?
        .text()
        .collect::<String>();
    let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
    (!title.is_empty()).then_some(title)
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
            continue;
        }
        let Some(child_element) = ElementRef::wrap(child) else {
            continue;
        };
        let name = child_element.value().name();
        if SKIPPED.contains(&name) {
            continue;
        }
        if name == "br" {
            out.push('\n');
            continue;
        }
        let block = BLOCK.contains(&name);
        if block {
            out.push('\n');
        }
        collect_text(child_element, out);
        if block {
            out.push('\n');
        }
    }
}

/// Collapses whitespace inside lines; runs of empty lines become one blank line.
fn normalize_lines(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_break = false;

    for line in raw.lines() {
        let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            pending_break = !out.is_empty();
            continue;
        }
        if !out.is_empty() {
            out.push_str(if pending_break { "\n\n" } else { "\n" });
        }
        out.push_str(&collapsed);
        pending_break = false;
    }

    out
}

//! HTML visible-text extraction.

use crate::document::Document;
use scraper::{Html, Node};
use std::path::Path;

/// Elements whose text is never shown to a reader.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Parse markup into a single document holding its visible text.
///
/// Each text node is whitespace-normalized; non-empty nodes are joined
/// with newlines.
pub fn parse_html(markup: &str, path: &Path) -> Document {
    let html = Html::parse_document(markup);

    let text = html
        .root_element()
        .descendants()
        .filter_map(|node| {
            let text = match node.value() {
                Node::Text(text) => text,
                _ => return None,
            };
            let hidden = node
                .parent()
                .and_then(|parent| parent.value().as_element().map(|el| el.name().to_string()))
                .is_some_and(|name| HIDDEN_ELEMENTS.contains(&name.as_str()));
            if hidden {
                return None;
            }
            let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
            (!normalized.is_empty()).then_some(normalized)
        })
        .collect::<Vec<_>>()
        .join("\n");

    Document::from_file(text, path)
}

//! Plain-text extraction from server-rendered post HTML.
//!
//! Post bodies are a flat run of `<p>` elements. Only paragraph text is
//! kept; this is not a general HTML-to-text converter.

use scraper::{Html, Selector};

/// Text of every paragraph, in document order, joined with newlines.
pub fn html_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let Ok(selector) = Selector::parse("p") else {
        return String::new();
    };

    fragment
        .select(&selector)
        .map(|p| p.text().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

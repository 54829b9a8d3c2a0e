//! HTML-to-text extraction: a thin contract wrapper around `scraper`
//! (html5ever under the hood), which tolerates malformed markup by design --
//! there is no failure mode here to propagate, only degraded output.

use scraper::{Html, Selector};

const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "b", "strong"];

/// Extracts `(body_text, title_text, heading_text)` from raw HTML.
/// `body_text` is the whitespace-joined plain text of the whole document
/// (including the title, since `<title>` is part of the document's text
/// content). `title_text` is the whitespace-joined text of any `<title>`
/// tags; `heading_text` is the whitespace-joined text of `h1`, `h2`, `h3`,
/// `b`, and `strong` tags. Title and heading are kept apart (rather than
/// one combined "important text" blob) so the builder can tag their tokens
/// with distinct importance tiers -- `Importance::Title` outranks
/// `Importance::BoldOrHeading`, and collapsing the two would make that tier
/// unreachable. Empty input yields three empty strings.
pub fn extract_text(html: &str) -> (String, String, String) {
    if html.is_empty() {
        return (String::new(), String::new(), String::new());
    }

    let document = Html::parse_document(html);

    let body_text = join_text(document.root_element().text());
    let title_text = select_join(&document, "title");

    let mut heading_chunks = Vec::new();
    for tag in HEADING_TAGS {
        let text = select_join(&document, tag);
        if !text.is_empty() {
            heading_chunks.push(text);
        }
    }

    (body_text, title_text, heading_chunks.join(" "))
}

fn select_join(document: &Html, tag: &str) -> String {
    // A tag name is always a valid CSS selector; this cannot fail.
    let selector = Selector::parse(tag).expect("static tag selector is valid");
    let chunks: Vec<String> = document
        .select(&selector)
        .map(|element| join_text(element.text()))
        .filter(|text| !text.is_empty())
        .collect();
    chunks.join(" ")
}

fn join_text<'a>(fragments: impl Iterator<Item = &'a str>) -> String {
    fragments
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

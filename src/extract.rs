//! Projection of the rendered listing page into raw news records.
//!
//! Pure tree-to-record code: no network, no storage evaluation, which keeps
//! it unit-testable against static markup fixtures.

use crate::model::RawNewsItem;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Fixed selector for the listing container on the archived-news page.
pub const NEWS_CONTAINER_SELECTOR: &str = "#news-container";

static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").expect("static selector"));
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").expect("static selector"));

/// Extract raw news items from rendered HTML.
///
/// Locates the first element matching `container_selector` and walks its
/// direct `li` children in document order. An item needs an anchor with a
/// non-empty href and non-empty text plus a paragraph carrying the date
/// text; anything else is dropped silently. A missing container yields an
/// empty list (structural drift on the target page surfaces as zero items,
/// not a crash).
pub fn extract_items(html: &str, container_selector: &str) -> Vec<RawNewsItem> {
    let document = Html::parse_document(html);
    let Ok(container_sel) = Selector::parse(container_selector) else {
        debug!(selector = container_selector, "invalid container selector");
        return Vec::new();
    };
    let Some(container) = document.select(&container_sel).next() else {
        debug!(
            selector = container_selector,
            "news container not found in document"
        );
        return Vec::new();
    };

    let mut items = Vec::new();
    let mut dropped = 0usize;
    for child in container.children() {
        let Some(li) = ElementRef::wrap(child) else {
            continue;
        };
        if li.value().name() != "li" {
            continue;
        }
        match project_list_item(li) {
            Some(item) => items.push(item),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        debug!(dropped, "dropped malformed list items");
    }
    items
}

/// One `li` to one record. `None` means the item lacks a usable anchor or a
/// date paragraph and is filtered out, not reported.
fn project_list_item(li: ElementRef) -> Option<RawNewsItem> {
    let anchor = li.select(&ANCHOR).next()?;
    let paragraph = li.select(&PARAGRAPH).next()?;

    let link = anchor.value().attr("href")?.trim();
    let title = anchor.text().collect::<String>().trim().to_string();
    if link.is_empty() || title.is_empty() {
        return None;
    }

    Some(RawNewsItem {
        title,
        link: link.to_string(),
        date_text: paragraph.text().collect::<String>().trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"
        <html><body>
        <ul id="news-container">
            <li><a href="notice-one.pdf">Notice One</a><p>January 15, 2024</p></li>
            <li><a href="/notice-two.pdf">Notice Two</a><p>February 2, 2024</p></li>
            <li><a href="https://example.gov/ext.pdf">External Notice</a><p>March 9, 2024</p></li>
            <li><a href="broken.pdf">No Date Here</a></li>
        </ul>
        </body></html>
    "#;

    #[test]
    fn extracts_valid_items_in_document_order() {
        let items = extract_items(FIXTURE, NEWS_CONTAINER_SELECTOR);
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].title, "Notice One");
        assert_eq!(items[0].link, "notice-one.pdf");
        assert_eq!(items[0].date_text, "January 15, 2024");
        assert_eq!(items[1].link, "/notice-two.pdf");
        assert_eq!(items[2].title, "External Notice");
    }

    #[test]
    fn drops_item_missing_paragraph() {
        let items = extract_items(FIXTURE, NEWS_CONTAINER_SELECTOR);
        assert!(items.iter().all(|i| i.title != "No Date Here"));
    }

    #[test]
    fn drops_item_missing_anchor_or_title() {
        let html = r#"
            <ul id="news-container">
                <li><p>January 1, 2024</p></li>
                <li><a href="x.pdf"></a><p>January 2, 2024</p></li>
                <li><a href="">Empty Href</a><p>January 3, 2024</p></li>
                <li><a href="ok.pdf">Kept</a><p>January 4, 2024</p></li>
            </ul>
        "#;
        let items = extract_items(html, NEWS_CONTAINER_SELECTOR);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Kept");
    }

    #[test]
    fn missing_container_yields_empty() {
        let items = extract_items("<html><body><p>nothing</p></body></html>", NEWS_CONTAINER_SELECTOR);
        assert!(items.is_empty());
    }

    #[test]
    fn ignores_list_items_outside_container() {
        let html = r#"
            <ul><li><a href="other.pdf">Elsewhere</a><p>May 5, 2024</p></li></ul>
            <ul id="news-container">
                <li><a href="in.pdf">Inside</a><p>May 6, 2024</p></li>
            </ul>
        "#;
        let items = extract_items(html, NEWS_CONTAINER_SELECTOR);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Inside");
    }

    #[test]
    fn nested_list_items_are_not_direct_children() {
        let html = r#"
            <div id="news-container">
                <li><a href="direct.pdf">Direct</a><p>June 1, 2024</p></li>
                <ul><li><a href="nested.pdf">Nested</a><p>June 2, 2024</p></li></ul>
            </div>
        "#;
        let items = extract_items(html, NEWS_CONTAINER_SELECTOR);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Direct");
    }
}

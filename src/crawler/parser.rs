//! Catalog page parser
//!
//! Extracts candidate dataset records and the next-page link from one
//! listing page. The four structural selectors here are the compatibility
//! contract with the catalog markup:
//!
//! - item container: `article.product_pod`
//! - title/link: the anchor inside the item's `h3`
//! - description: `p.price_color` (trimmed text)
//! - pagination: the anchor inside `li.next`

use scraper::{ElementRef, Html, Selector};
use url::Url;

/// An item extracted from a catalog page, not yet checked against storage
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRecord {
    /// Non-empty record title
    pub title: String,
    /// Secondary text field; always present, may be empty
    pub description: String,
    /// Absolute link to the item page; the dedup key downstream
    pub source_url: Url,
}

/// Everything extracted from one catalog page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// Candidate records in document order
    pub records: Vec<CandidateRecord>,
    /// Relative target of the next page, if pagination continues
    pub next_href: Option<String>,
}

/// Parses one catalog page
///
/// Item links are resolved against `base` (the URL of the page they appear
/// on). A page with zero items is valid and yields an empty record list;
/// a missing next link is the normal end of pagination.
pub fn parse_catalog_page(html: &str, base: &Url) -> ParsedPage {
    let document = Html::parse_document(html);
    ParsedPage {
        records: extract_records(&document, base),
        next_href: extract_next_href(&document),
    }
}

/// Convenience wrapper extracting just the candidate records
pub fn extract_items(html: &str, base: &Url) -> Vec<CandidateRecord> {
    let document = Html::parse_document(html);
    extract_records(&document, base)
}

/// Convenience wrapper extracting just the next-page link
pub fn next_page_href(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    extract_next_href(&document)
}

fn extract_records(document: &Html, base: &Url) -> Vec<CandidateRecord> {
    let mut records = Vec::new();

    let item_selector = match Selector::parse("article.product_pod") {
        Ok(s) => s,
        Err(_) => return records,
    };

    for item in document.select(&item_selector) {
        match extract_record(&item, base) {
            Some(record) => records.push(record),
            None => {
                tracing::debug!("Skipping malformed catalog item");
            }
        }
    }

    records
}

/// Extracts a single record from an item container
///
/// Returns None when a required sub-element is missing or malformed; one
/// bad item never aborts the page.
fn extract_record(item: &ElementRef<'_>, base: &Url) -> Option<CandidateRecord> {
    let title_selector = Selector::parse("h3 a").ok()?;
    let description_selector = Selector::parse("p.price_color").ok()?;

    let title_element = item.select(&title_selector).next()?;
    let title = title_element.value().attr("title")?.trim().to_string();
    if title.is_empty() {
        return None;
    }

    let href = title_element.value().attr("href")?;
    let source_url = match base.join(href) {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!("Unresolvable item link {}: {}", href, e);
            return None;
        }
    };

    let description_element = item.select(&description_selector).next()?;
    let description = description_element
        .text()
        .collect::<String>()
        .trim()
        .to_string();

    Some(CandidateRecord {
        title,
        description,
        source_url,
    })
}

fn extract_next_href(document: &Html) -> Option<String> {
    let next_selector = Selector::parse("li.next a").ok()?;
    document
        .select(&next_selector)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(|href| href.to_string())
}

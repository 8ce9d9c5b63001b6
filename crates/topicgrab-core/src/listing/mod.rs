//! Listing pages: which topics on a board page are worth visiting.
//!
//! The topic table is located by the first matching container selector, then
//! each row's title cell is checked for a category marker. Matching rows yield
//! a [`TopicRef`] with a sanitized title and an absolute URL, in row order.

mod pages;

pub use pages::{listing_url, PageRange, RangeError};

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::config::{ConfigError, CrawlConfig};
use crate::html;
use crate::names;
use crate::outcome::{Miss, Outcome, Parsed};

/// A topic selected from a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicRef {
    /// Sanitized, length-capped title; usable as a folder name. Never empty.
    pub title: String,
    /// Title text as it appeared on the listing, whitespace collapsed.
    pub raw_title: String,
    /// Absolute topic page URL.
    pub url: String,
}

/// Parser for listing page HTML, built once per crawl.
#[derive(Debug)]
pub struct ListingParser {
    base: Url,
    containers: Vec<Selector>,
    row: Selector,
    title_cell: Selector,
    anchor: Selector,
    markers: Vec<String>,
    title_max_chars: usize,
}

impl ListingParser {
    pub fn new(cfg: &CrawlConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            base: cfg.base_url()?,
            containers: html::compile_all(&cfg.listing.container_selectors)?,
            row: html::compile(&cfg.listing.row_selector)?,
            title_cell: html::compile(&cfg.listing.title_cell_selector)?,
            anchor: html::compile("a[href]")?,
            markers: cfg
                .listing
                .category_markers
                .iter()
                .filter(|m| !m.is_empty())
                .cloned()
                .collect(),
            title_max_chars: cfg.title_max_chars,
        })
    }

    /// True if `text` carries any of the category markers.
    pub fn is_marked(&self, text: &str) -> bool {
        self.markers.iter().any(|m| text.contains(m.as_str()))
    }

    /// Extracts marked topics in document order.
    ///
    /// Missing container → `Empty(NoContainer)`; container present but no
    /// marked row → `Empty(NoMatches)`.
    pub fn parse(&self, page_html: &str) -> Parsed<TopicRef> {
        let doc = Html::parse_document(page_html);
        let Some((_, container)) = html::first_match(&doc, &self.containers) else {
            return Outcome::Empty(Miss::NoContainer);
        };

        let allowed_tables = if inside_table(container) { 0 } else { 1 };
        let mut topics = Vec::new();
        for row in container
            .select(&self.row)
            .filter(|row| tables_between(*row, container) <= allowed_tables)
        {
            let Some(cell) = row.select(&self.title_cell).next() else {
                continue;
            };
            let cell_text = html::collapsed_text(cell);
            if !self.is_marked(&cell_text) {
                continue;
            }
            let Some((anchor, href)) = cell.select(&self.anchor).find_map(|a| {
                a.value()
                    .attr("href")
                    .filter(|h| !h.trim().is_empty())
                    .map(|h| (a, h))
            }) else {
                continue;
            };
            let Some(url) = html::resolve(&self.base, href) else {
                tracing::debug!(href, "skipping topic with unusable href");
                continue;
            };

            let anchor_text = html::collapsed_text(anchor);
            let raw_title = if anchor_text.is_empty() {
                cell_text.as_str()
            } else {
                anchor_text.as_str()
            };
            let title = names::topic_folder_name(raw_title, url.as_str(), self.title_max_chars);
            tracing::debug!(%url, title = %title, "found topic");
            topics.push(TopicRef {
                title,
                raw_title: raw_title.to_string(),
                url: url.to_string(),
            });
        }

        Outcome::from_items(topics)
    }
}

/// True if `el` is a `table` or sits inside one.
fn inside_table(el: ElementRef<'_>) -> bool {
    el.value().name() == "table"
        || el
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|a| a.value().name() == "table")
}

/// Number of `table` elements strictly between `row` and `container`.
/// Rows of tables nested inside a topic row's cells count one more than the
/// container's own rows.
fn tables_between(row: ElementRef<'_>, container: ElementRef<'_>) -> usize {
    row.ancestors()
        .take_while(|n| n.id() != container.id())
        .filter_map(ElementRef::wrap)
        .filter(|a| a.value().name() == "table")
        .count()
}

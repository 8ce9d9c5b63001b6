//! Topic pages: image URLs in the post body, in document order.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::config::{ConfigError, CrawlConfig};
use crate::html;
use crate::outcome::{Miss, Outcome, Parsed};

/// An image discovered on a topic page. Position in the returned list is
/// its download index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub url: String,
}

/// Parser for topic page HTML, built once per crawl.
#[derive(Debug)]
pub struct TopicParser {
    base: Url,
    regions: Vec<Selector>,
    images: Selector,
    attributes: Vec<String>,
    whole_page_fallback: bool,
    extensions: Vec<String>,
}

impl TopicParser {
    pub fn new(cfg: &CrawlConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            base: cfg.base_url()?,
            regions: html::compile_all(&cfg.topic.content_selectors)?,
            images: html::compile(&cfg.topic.image_selector)?,
            attributes: cfg
                .topic
                .image_attributes
                .iter()
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty())
                .collect(),
            whole_page_fallback: cfg.topic.whole_page_fallback,
            extensions: cfg.download.image_extensions.clone(),
        })
    }

    /// Extracts image URLs from the content region.
    ///
    /// Without a content region the result is `Empty(NoContainer)`, unless the
    /// whole-page fallback is enabled, in which case every image element in
    /// the document is considered and only recognized image paths are kept.
    pub fn parse(&self, page_html: &str) -> Parsed<ImageRef> {
        let doc = Html::parse_document(page_html);

        let images = match html::first_match(&doc, &self.regions) {
            Some((idx, region)) => {
                tracing::trace!(selector = idx, "content region matched");
                self.collect(region, false)
            }
            None if self.whole_page_fallback => self.collect(doc.root_element(), true),
            None => return Outcome::Empty(Miss::NoContainer),
        };
        Outcome::from_items(images)
    }

    fn collect(&self, scope: ElementRef<'_>, filter_extensions: bool) -> Vec<ImageRef> {
        scope
            .select(&self.images)
            .filter_map(|el| resolve_source(el, &self.attributes))
            .filter_map(|src| html::resolve(&self.base, src))
            .filter(|url| !filter_extensions || self.has_image_extension(url))
            .map(|url| ImageRef {
                url: url.to_string(),
            })
            .collect()
    }

    fn has_image_extension(&self, url: &Url) -> bool {
        let path = url.path().to_ascii_lowercase();
        self.extensions
            .iter()
            .any(|ext| path.ends_with(&format!(".{}", ext.to_ascii_lowercase())))
    }
}

/// First present, non-empty value among `attributes`, in priority order.
pub fn resolve_source<'a>(el: ElementRef<'a>, attributes: &[String]) -> Option<&'a str> {
    attributes.iter().find_map(|name| {
        el.value()
            .attr(name)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    })
}

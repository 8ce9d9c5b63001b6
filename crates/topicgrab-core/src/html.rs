//! Small helpers shared by the listing and topic parsers.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::config::ConfigError;

/// Compiles one CSS selector, mapping the parse error into a config error.
pub fn compile(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Compiles a priority list of selectors, preserving order.
pub fn compile_all(selectors: &[String]) -> Result<Vec<Selector>, ConfigError> {
    selectors.iter().map(|s| compile(s)).collect()
}

/// Returns the first element matched by the first selector that matches anything,
/// with that selector's position in `candidates`.
pub fn first_match<'a>(doc: &'a Html, candidates: &[Selector]) -> Option<(usize, ElementRef<'a>)> {
    candidates
        .iter()
        .enumerate()
        .find_map(|(i, sel)| doc.select(sel).next().map(|el| (i, el)))
}

/// Text content of `el` with runs of whitespace collapsed to one space.
pub fn collapsed_text(el: ElementRef<'_>) -> String {
    let mut out = String::new();
    for chunk in el.text() {
        for word in chunk.split_whitespace() {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(word);
        }
    }
    out
}

/// Resolves `href` against `base`. Only http(s) results are returned.
pub fn resolve(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let url = base.join(href).ok()?;
    match url.scheme() {
        "http" | "https" => Some(url),
        _ => None,
    }
}

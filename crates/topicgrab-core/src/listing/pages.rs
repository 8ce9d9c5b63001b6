//! Page range validation and page → listing URL mapping.

use thiserror::Error;

use crate::config::SiteConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("start page must be at least 1 (got {0})")]
    StartBelowOne(u32),
    #[error("start page {start} is after end page {end}")]
    Inverted { start: u32, end: u32 },
}

/// Inclusive, validated range of listing pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    start: u32,
    end: u32,
}

impl PageRange {
    pub fn new(start: u32, end: u32) -> Result<Self, RangeError> {
        if start < 1 {
            return Err(RangeError::StartBelowOne(start));
        }
        if start > end {
            return Err(RangeError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    /// Number of listing pages the range covers.
    pub fn page_count(&self) -> usize {
        (self.end - self.start) as usize + 1
    }

    pub fn pages(&self) -> impl Iterator<Item = u32> {
        self.start..=self.end
    }
}

/// Listing URL for `page`.
///
/// Page 1 is the bare board URL without `search`/`page` parameters; every
/// other page carries them. Both forms are what the forum itself links to.
pub fn listing_url(site: &SiteConfig, page: u32) -> String {
    let base = site.base_url.trim().trim_end_matches('/');
    let path = site.list_path.trim().trim_start_matches('/');
    if page <= 1 {
        format!("{}/{}?fid={}", base, path, site.forum_id)
    } else {
        format!("{}/{}?fid={}&search=&page={}", base, path, site.forum_id, page)
    }
}

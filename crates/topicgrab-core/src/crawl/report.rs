//! Counters for one crawl run.

use std::fmt;
use std::path::PathBuf;

/// What a run did. Informational only; a run with failures still completes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Listing pages requested (successful or not).
    pub pages_visited: u32,
    /// Listing pages whose fetch failed.
    pub pages_failed: u32,
    /// Marked topics found across all listing pages.
    pub topics_found: u32,
    /// Topics not downloaded: fetch failed or no images.
    pub topics_skipped: u32,
    pub images_saved: u32,
    pub images_failed: u32,
    pub bytes_written: u64,
    /// Archive written after the crawl, if enabled.
    pub archive: Option<PathBuf>,
}

impl fmt::Display for CrawlReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} page(s) visited ({} failed), {} topic(s) found ({} skipped), \
             {} image(s) saved ({} failed), {} bytes",
            self.pages_visited,
            self.pages_failed,
            self.topics_found,
            self.topics_skipped,
            self.images_saved,
            self.images_failed,
            self.bytes_written
        )?;
        if let Some(archive) = &self.archive {
            write!(f, ", archive {}", archive.display())?;
        }
        Ok(())
    }
}

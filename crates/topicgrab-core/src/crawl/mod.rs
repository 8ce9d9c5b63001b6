//! Crawl loop: listing pages → topics → images → files.
//!
//! Strictly sequential. Every stage failure is logged and skips only its own
//! unit of work (a page, a topic, an image); the run ends once every page in
//! the range has been visited.

mod report;

pub use report::CrawlReport;

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::archive;
use crate::config::{ConfigError, CrawlConfig};
use crate::download::ImageDownloader;
use crate::http::{FetchError, Fetcher};
use crate::listing::{listing_url, ListingParser, PageRange, TopicRef};
use crate::names::FolderClaims;
use crate::outcome::{Miss, Outcome};
use crate::topic::{ImageRef, TopicParser};

/// Owns the per-run stages, built once from a validated configuration.
#[derive(Debug)]
pub struct Crawler {
    cfg: CrawlConfig,
    fetcher: Fetcher,
    listing: ListingParser,
    topics: TopicParser,
    downloader: ImageDownloader,
}

impl Crawler {
    pub fn new(cfg: &CrawlConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let fetcher = Fetcher::new(cfg)?;
        Ok(Self {
            listing: ListingParser::new(cfg)?,
            topics: TopicParser::new(cfg)?,
            downloader: ImageDownloader::new(fetcher.clone(), &cfg.download),
            fetcher,
            cfg: cfg.clone(),
        })
    }

    /// Crawls every page in `range`, then archives the output tree if enabled.
    ///
    /// Only an unusable output root or a failed archive is an error.
    pub fn run(&self, range: PageRange) -> Result<CrawlReport> {
        let root = &self.cfg.output_dir;
        fs::create_dir_all(root)
            .with_context(|| format!("create output directory {}", root.display()))?;

        tracing::debug!("{} listing page(s) in range", range.page_count());
        let mut report = CrawlReport::default();
        let mut folders = FolderClaims::default();
        for page in range.pages() {
            self.crawl_page(page, &mut folders, &mut report);
        }

        if self.cfg.archive {
            let dest = archive::default_archive_path(root)?;
            let files = archive::zip_dir(root, &dest)
                .with_context(|| format!("archive {}", root.display()))?;
            tracing::info!("archived {} file(s) to {}", files, dest.display());
            report.archive = Some(dest);
        }

        tracing::info!("crawl finished: {}", report);
        Ok(report)
    }

    fn crawl_page(&self, page: u32, folders: &mut FolderClaims, report: &mut CrawlReport) {
        let url = listing_url(&self.cfg.site, page);
        tracing::info!(page, "fetching listing page {}", url);
        report.pages_visited += 1;

        let topics = match self.list_topics(&url) {
            Outcome::Found(topics) => topics,
            Outcome::Empty(Miss::NoContainer) => {
                tracing::warn!(page, "topic list not found on listing page {}", url);
                return;
            }
            Outcome::Empty(Miss::NoMatches) => {
                tracing::info!(page, "no matching topics on this page");
                return;
            }
            Outcome::Failed(e) => {
                tracing::error!(page, kind = %e.kind(), "listing page fetch failed {}: {}", url, e);
                report.pages_failed += 1;
                return;
            }
        };

        tracing::info!(page, "{} matching topic(s)", topics.len());
        for topic in &topics {
            // Courtesy delay between topic visits; none before the first.
            if report.topics_found > 0 && !self.cfg.topic_delay().is_zero() {
                std::thread::sleep(self.cfg.topic_delay());
            }
            report.topics_found += 1;
            self.crawl_topic(topic, folders, report);
        }
    }

    /// Fetches and parses one listing page.
    pub fn list_topics(&self, url: &str) -> Outcome<TopicRef, FetchError> {
        match self.fetcher.fetch_text(url) {
            Ok(html) => self.listing.parse(&html).widen(),
            Err(e) => Outcome::Failed(e),
        }
    }

    /// Fetches and parses one topic page.
    pub fn topic_images(&self, url: &str) -> Outcome<ImageRef, FetchError> {
        match self.fetcher.fetch_text(url) {
            Ok(html) => self.topics.parse(&html).widen(),
            Err(e) => Outcome::Failed(e),
        }
    }

    fn crawl_topic(&self, topic: &TopicRef, folders: &mut FolderClaims, report: &mut CrawlReport) {
        tracing::info!("visiting topic {} ({})", topic.title, topic.url);

        let images = match self.topic_images(&topic.url) {
            Outcome::Found(images) => images,
            Outcome::Empty(miss) => {
                tracing::warn!("no images in topic {}: {}", topic.title, miss);
                report.topics_skipped += 1;
                return;
            }
            Outcome::Failed(e) => {
                tracing::error!(kind = %e.kind(), "topic fetch failed {}: {}", topic.url, e);
                report.topics_skipped += 1;
                return;
            }
        };

        let name = folders.claim(&topic.title, &topic.raw_title);
        if name != topic.title {
            tracing::warn!(
                "folder {} already holds another topic; using {}",
                topic.title,
                name
            );
        }
        // Created by the downloader on the first image.
        let folder = self.cfg.output_dir.join(name);
        let saved = self.download_all(&images, &folder, report);
        tracing::info!(
            "topic {} done: {}/{} image(s) saved to {}",
            topic.title,
            saved,
            images.len(),
            folder.display()
        );
    }

    /// Downloads `images` in order as `001.ext`, `002.ext`, ... Returns how many succeeded.
    fn download_all(&self, images: &[ImageRef], folder: &Path, report: &mut CrawlReport) -> usize {
        let mut saved = 0;
        for (i, image) in images.iter().enumerate() {
            match self.downloader.download(&image.url, folder, i + 1) {
                Ok(done) => {
                    saved += 1;
                    report.images_saved += 1;
                    report.bytes_written += done.bytes;
                }
                Err(e) => {
                    tracing::error!("image download failed {}: {}", image.url, e);
                    report.images_failed += 1;
                }
            }
        }
        saved
    }
}

//! `topicgrab <START_PAGE> <END_PAGE>` – run one crawl.

use anyhow::{Context, Result};
use topicgrab_core::config::CrawlConfig;
use topicgrab_core::crawl::Crawler;
use topicgrab_core::listing::PageRange;

/// Runs the blocking crawl on a blocking worker and prints the summary.
pub async fn run_crawl(cfg: CrawlConfig, range: PageRange) -> Result<()> {
    tracing::info!(
        "crawling pages {}..={} into {}",
        range.start(),
        range.end(),
        cfg.output_dir.display()
    );
    let report = tokio::task::spawn_blocking(move || {
        let crawler = Crawler::new(&cfg)?;
        crawler.run(range)
    })
    .await
    .context("crawl task join")??;

    println!("{}", report);
    Ok(())
}

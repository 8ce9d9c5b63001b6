//! CLI for the topicgrab forum image crawler.

mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use topicgrab_core::config::{self, CrawlConfig};
use topicgrab_core::listing::{PageRange, RangeError};

use commands::run_crawl;

/// Crawl listing pages START_PAGE..=END_PAGE and download the images of every
/// marked topic into one folder per topic.
#[derive(Debug, Parser)]
#[command(name = "topicgrab")]
#[command(about = "topicgrab: download topic images from a forum board", long_about = None)]
pub struct Cli {
    /// First listing page to crawl (1-based).
    pub start_page: u32,

    /// Last listing page to crawl (inclusive).
    pub end_page: u32,

    /// Output root directory (overrides `output_dir` from the config).
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Delay before each topic visit, in milliseconds (overrides `topic_delay_ms`).
    #[arg(long, value_name = "MS")]
    pub delay_ms: Option<u64>,

    /// Zip the output directory after the crawl.
    #[arg(long)]
    pub archive: bool,

    /// Config file to use instead of the default one under the XDG config dir.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Append log lines to this file instead of stderr.
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Validated page range from the positional arguments.
    pub fn page_range(&self) -> Result<PageRange, RangeError> {
        PageRange::new(self.start_page, self.end_page)
    }

    /// Command-line flags take precedence over the config file.
    pub fn apply_overrides(&self, cfg: &mut CrawlConfig) {
        if let Some(dir) = &self.output {
            cfg.output_dir = dir.clone();
        }
        if let Some(ms) = self.delay_ms {
            cfg.topic_delay_ms = ms;
        }
        if self.archive {
            cfg.archive = true;
        }
    }

    fn load_config(&self) -> Result<CrawlConfig> {
        let mut cfg = match &self.config {
            Some(path) => config::load_from_path(path)?,
            None => config::load_or_init()?,
        };
        self.apply_overrides(&mut cfg);
        cfg.validate().context("invalid configuration")?;
        Ok(cfg)
    }

    pub async fn run(self) -> Result<()> {
        let range = self.page_range().context("invalid page range")?;
        let cfg = self.load_config()?;
        tracing::debug!("loaded config: {:?}", cfg);
        run_crawl(cfg, range).await
    }
}

#[cfg(test)]
mod tests;

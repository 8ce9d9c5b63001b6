use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::html;

/// Problems found by [`CrawlConfig::validate`]. Fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid base_url {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("unknown text encoding label {0:?}")]
    UnknownEncoding(String),
    #[error("invalid CSS selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Where the forum lives and how its pages are encoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Scheme + host; relative hrefs are resolved against this.
    pub base_url: String,
    /// Listing script path, relative to `base_url`.
    pub list_path: String,
    /// Forum (category board) id passed as `fid`.
    pub forum_id: u32,
    /// `encoding_rs` label used to decode every HTML page (e.g. "gbk", "utf-8").
    pub encoding: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://t66y.com".to_string(),
            list_path: "thread0806.php".to_string(),
            forum_id: 8,
            encoding: "gbk".to_string(),
        }
    }
}

/// Request headers and timeouts shared by page fetches and image downloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Browser-like User-Agent; the origin rejects library defaults.
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0 Safari/537.36"
                .to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"
                .to_string(),
            accept_language: "zh-CN,zh;q=0.9,en;q=0.8".to_string(),
            timeout_secs: 15,
            connect_timeout_secs: 10,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Listing page structure and the category filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    /// Topic-list container candidates, tried in order; first match wins.
    pub container_selectors: Vec<String>,
    /// Topic rows inside the container.
    pub row_selector: String,
    /// Cell holding the title anchor inside a row.
    pub title_cell_selector: String,
    /// Title substrings that mark a topic as relevant. Any one matches.
    pub category_markers: Vec<String>,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            container_selectors: vec!["tbody#tbody".to_string(), "table#ajaxtable".to_string()],
            row_selector: "tr".to_string(),
            title_cell_selector: "td.tal".to_string(),
            // Traditional and simplified script forms of the same marker.
            category_markers: vec!["[亞洲]".to_string(), "[亚洲]".to_string()],
        }
    }
}

/// Topic page structure and image attribute priority.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicConfig {
    /// Content region candidates, tried in order; first match wins.
    pub content_selectors: Vec<String>,
    /// Image-bearing elements inside the region.
    pub image_selector: String,
    /// Attributes consulted per element; first present, non-empty value wins.
    pub image_attributes: Vec<String>,
    /// Scan the whole document (extension-filtered) when no region matches.
    pub whole_page_fallback: bool,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            content_selectors: vec![
                "div.tpc_content".to_string(),
                "div#conttpc".to_string(),
                "div.tpc_cont".to_string(),
            ],
            image_selector: "img, input[type=image]".to_string(),
            image_attributes: vec![
                "data-link".to_string(),
                "ess-data".to_string(),
                "src".to_string(),
            ],
            whole_page_fallback: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Lowercase extensions accepted from URL paths.
    pub image_extensions: Vec<String>,
    /// Used when the URL path has no recognized extension.
    pub default_extension: String,
    /// Buffered writer capacity for streamed image bodies.
    pub chunk_bytes: usize,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            image_extensions: ["jpg", "jpeg", "png", "gif", "webp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            default_extension: "jpg".to_string(),
            chunk_bytes: 64 * 1024,
        }
    }
}

/// Crawl configuration, loaded once at startup and passed by reference to every stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Root of the per-topic folder tree.
    pub output_dir: PathBuf,
    /// Pause before each topic visit after the first, in milliseconds.
    pub topic_delay_ms: u64,
    /// Cap on sanitized topic folder names, in characters.
    pub title_max_chars: usize,
    /// Zip the output tree after the crawl.
    pub archive: bool,
    pub site: SiteConfig,
    pub http: HttpConfig,
    pub listing: ListingConfig,
    pub topic: TopicConfig,
    pub download: DownloadConfig,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("downloaded_images"),
            topic_delay_ms: 1500,
            title_max_chars: 80,
            archive: false,
            site: SiteConfig::default(),
            http: HttpConfig::default(),
            listing: ListingConfig::default(),
            topic: TopicConfig::default(),
            download: DownloadConfig::default(),
        }
    }
}

impl CrawlConfig {
    pub fn topic_delay(&self) -> Duration {
        Duration::from_millis(self.topic_delay_ms)
    }

    /// Parsed `site.base_url`.
    pub fn base_url(&self) -> Result<url::Url, ConfigError> {
        let url = url::Url::parse(self.site.base_url.trim()).map_err(|e| {
            ConfigError::InvalidBaseUrl {
                url: self.site.base_url.clone(),
                reason: e.to_string(),
            }
        })?;
        if url.cannot_be_a_base() {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.site.base_url.clone(),
                reason: "cannot be used as a base".to_string(),
            });
        }
        Ok(url)
    }

    /// Decoder for HTML pages.
    pub fn encoding(&self) -> Result<&'static encoding_rs::Encoding, ConfigError> {
        encoding_rs::Encoding::for_label(self.site.encoding.trim().as_bytes())
            .ok_or_else(|| ConfigError::UnknownEncoding(self.site.encoding.clone()))
    }

    /// Checks everything a crawl needs before the first request goes out.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.base_url()?;
        self.encoding()?;

        if self.listing.container_selectors.is_empty() {
            return Err(ConfigError::Empty("listing.container_selectors"));
        }
        if self.listing.category_markers.iter().all(|m| m.is_empty()) {
            return Err(ConfigError::Empty("listing.category_markers"));
        }
        if self.topic.content_selectors.is_empty() {
            return Err(ConfigError::Empty("topic.content_selectors"));
        }
        if self.topic.image_attributes.iter().all(|a| a.trim().is_empty()) {
            return Err(ConfigError::Empty("topic.image_attributes"));
        }
        if self.download.default_extension.trim().is_empty() {
            return Err(ConfigError::Empty("download.default_extension"));
        }
        // curl reads a zero timeout as "wait forever".
        for (name, value) in [
            ("http.timeout_secs", self.http.timeout_secs),
            ("http.connect_timeout_secs", self.http.connect_timeout_secs),
        ] {
            if value == 0 {
                return Err(ConfigError::Zero(name));
            }
        }
        if self.title_max_chars == 0 {
            return Err(ConfigError::Zero("title_max_chars"));
        }
        if self.download.chunk_bytes == 0 {
            return Err(ConfigError::Zero("download.chunk_bytes"));
        }

        html::compile_all(&self.listing.container_selectors)?;
        html::compile(&self.listing.row_selector)?;
        html::compile(&self.listing.title_cell_selector)?;
        html::compile_all(&self.topic.content_selectors)?;
        html::compile(&self.topic.image_selector)?;
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("topicgrab")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from the XDG config dir, creating a default file if none exists.
pub fn load_or_init() -> Result<CrawlConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = CrawlConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// Load configuration from an explicit file. Missing keys take their defaults.
pub fn load_from_path(path: &Path) -> Result<CrawlConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: CrawlConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}

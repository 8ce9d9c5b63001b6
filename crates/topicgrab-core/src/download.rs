//! Single-image download: streamed GET into `NNN.ext` under the topic folder.
//!
//! The body is written to `NNN.ext.part` through a fixed-capacity buffer and
//! renamed into place once the transfer succeeds, so a failed download never
//! leaves a truncated file under the final name.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::DownloadConfig;
use crate::http::{FetchError, Fetcher};
use crate::names;

/// A successfully stored image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedImage {
    pub path: PathBuf,
    pub bytes: u64,
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("create {path}: {source}")]
    CreateFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("create folder {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("finalize {path}: {source}")]
    Finalize {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Downloads images with the crawl's shared fetcher and naming rules.
#[derive(Debug, Clone)]
pub struct ImageDownloader {
    fetcher: Fetcher,
    extensions: Vec<String>,
    default_extension: String,
    chunk_bytes: usize,
}

impl ImageDownloader {
    pub fn new(fetcher: Fetcher, cfg: &DownloadConfig) -> Self {
        Self {
            fetcher,
            extensions: cfg.image_extensions.clone(),
            default_extension: cfg.default_extension.trim().trim_start_matches('.').to_string(),
            chunk_bytes: cfg.chunk_bytes.max(1),
        }
    }

    /// Final path for the image at 1-based `index`.
    pub fn target_path(&self, url: &str, dest: &Path, index: usize) -> PathBuf {
        let ext = names::extension_from_url(url, &self.extensions, &self.default_extension);
        dest.join(names::image_file_name(index, &ext))
    }

    /// Fetches `url` into `dest/NNN.ext`, creating `dest` if needed.
    ///
    /// An existing file with the same name is replaced. Any failure is
    /// returned for this image only; the partial file is removed.
    pub fn download(&self, url: &str, dest: &Path, index: usize) -> Result<SavedImage, DownloadError> {
        fs::create_dir_all(dest).map_err(|source| DownloadError::CreateDir {
            path: dest.to_path_buf(),
            source,
        })?;

        let path = self.target_path(url, dest, index);
        let part = part_path(&path);
        let file = File::create(&part).map_err(|source| DownloadError::CreateFile {
            path: part.clone(),
            source,
        })?;
        let mut writer = BufWriter::with_capacity(self.chunk_bytes, file);

        let bytes = match self.fetcher.stream_to(url, &mut writer) {
            Ok(n) => n,
            Err(e) => {
                drop(writer);
                discard(&part);
                return Err(e.into());
            }
        };
        drop(writer);

        if let Err(source) = fs::rename(&part, &path) {
            discard(&part);
            return Err(DownloadError::Finalize { path, source });
        }
        tracing::debug!(url, path = %path.display(), bytes, "image saved");
        Ok(SavedImage { path, bytes })
    }
}

fn part_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    path.with_file_name(name)
}

fn discard(part: &Path) {
    if let Err(e) = fs::remove_file(part) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %part.display(), "could not remove partial file: {}", e);
        }
    }
}

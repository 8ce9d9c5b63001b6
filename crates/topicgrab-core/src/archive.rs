//! Optional zip archive of the output tree, written once after the crawl.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// `<root>.zip` next to `root`, e.g. `downloaded_images` → `downloaded_images.zip`.
pub fn default_archive_path(root: &Path) -> Result<PathBuf> {
    let abs = fs::canonicalize(root).with_context(|| format!("resolve {}", root.display()))?;
    let mut name = abs
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "archive".into());
    name.push(".zip");
    Ok(abs.with_file_name(name))
}

/// Writes every directory and file under `root` into a Deflate zip at `dest`.
///
/// Entry names are relative to `root`'s parent, so the archive unpacks into a
/// single top-level folder named like `root`. Entries are sorted by name.
/// Returns the number of files archived.
pub fn zip_dir(root: &Path, dest: &Path) -> Result<usize> {
    let root = fs::canonicalize(root).with_context(|| format!("resolve {}", root.display()))?;
    let prefix = root.parent().unwrap_or(&root).to_path_buf();

    let file = File::create(dest).with_context(|| format!("create {}", dest.display()))?;
    let mut zip = zip::ZipWriter::new(file);
    let file_options = zip::write::FileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .unix_permissions(0o644);
    let dir_options = zip::write::FileOptions::default().unix_permissions(0o755);

    let mut files = 0usize;
    for entry in WalkDir::new(&root).sort_by_file_name() {
        let entry = entry.with_context(|| format!("walk {}", root.display()))?;
        let path = entry.path();
        let name = entry_name(path, &prefix);
        if name.is_empty() {
            continue;
        }

        if entry.file_type().is_dir() {
            zip.add_directory(name.as_str(), dir_options)
                .with_context(|| format!("add directory {}", name))?;
        } else if entry.file_type().is_file() {
            zip.start_file(name.as_str(), file_options)
                .with_context(|| format!("add file {}", name))?;
            let mut src = File::open(path).with_context(|| format!("open {}", path.display()))?;
            io::copy(&mut src, &mut zip).with_context(|| format!("compress {}", path.display()))?;
            files += 1;
        }
    }

    zip.finish().context("finish archive")?;
    Ok(files)
}

/// `/`-separated name of `path` relative to `prefix`.
fn entry_name(path: &Path, prefix: &Path) -> String {
    path.strip_prefix(prefix)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

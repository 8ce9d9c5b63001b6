//! Local names for topics and images.
//!
//! Topic folders come from sanitized listing titles, made unique per run by
//! [`FolderClaims`]; image files are named by their 1-based discovery index
//! plus an extension taken from the URL path.

mod claims;
mod extension;
mod sanitize;

pub use claims::FolderClaims;
pub use extension::extension_from_url;
pub use sanitize::sanitize_title;

/// Fallback folder name when neither the title nor the URL yields anything.
const DEFAULT_FOLDER: &str = "topic";

/// Derives the folder name for a topic.
///
/// Uses the sanitized `title`; if that is empty, the last path segment of
/// `url` (sanitized the same way); otherwise `"topic"`.
pub fn topic_folder_name(title: &str, url: &str, max_chars: usize) -> String {
    let from_title = sanitize_title(title, max_chars);
    if !from_title.is_empty() {
        return from_title;
    }
    let from_url = url::Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut s| s.rfind(|seg| !seg.is_empty()).map(str::to_string))
        })
        .map(|seg| sanitize_title(&seg, max_chars))
        .unwrap_or_default();
    if from_url.is_empty() {
        DEFAULT_FOLDER.to_string()
    } else {
        from_url
    }
}

/// `NNN.ext`: zero-padded to three digits so files sort lexicographically.
pub fn image_file_name(index: usize, extension: &str) -> String {
    format!("{:03}.{}", index, extension)
}

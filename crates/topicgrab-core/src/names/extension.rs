//! Image extension from the URL path.

/// Longest extension accepted before the URL is treated as malformed.
const MAX_EXTENSION_LEN: usize = 5;

/// Returns the lowercase extension of the last path segment of `url` when it is
/// one of `known`; otherwise `default`.
///
/// Query strings and fragments are ignored. Unparsable URLs, segments without a
/// dot, and anomalously long suffixes all fall back to `default`.
pub fn extension_from_url(url: &str, known: &[String], default: &str) -> String {
    let candidate = url::Url::parse(url).ok().and_then(|u| {
        let segment = u.path_segments()?.rfind(|s| !s.is_empty())?.to_string();
        let (stem, ext) = segment.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() || ext.len() > MAX_EXTENSION_LEN {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    });

    match candidate {
        Some(ext) if known.iter().any(|k| k.eq_ignore_ascii_case(&ext)) => ext,
        _ => default.to_string(),
    }
}

//! Page body decoding with the site's fixed encoding.

use encoding_rs::Encoding;

/// Decodes `bytes` with `encoding`. A BOM, if present, overrides it.
/// Malformed sequences become U+FFFD.
pub fn decode_page(bytes: &[u8], encoding: &'static Encoding) -> String {
    let (text, actual, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::debug!(
            encoding = actual.name(),
            "page contained malformed byte sequences; replaced"
        );
    }
    text.into_owned()
}

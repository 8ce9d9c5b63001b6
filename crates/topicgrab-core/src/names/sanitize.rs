//! Folder-name sanitization for topic titles.

/// Sanitizes a topic title for use as a single path component.
///
/// - Replaces `/ \ : * ? " < > |`, NUL and control characters with `_`
/// - Collapses runs of whitespace into one space
/// - Trims leading/trailing spaces, dots and underscores
/// - Caps the result at `max_chars` characters (not bytes)
///
/// Returns an empty string when nothing usable is left; callers pick a fallback.
pub fn sanitize_title(title: &str, max_chars: usize) -> String {
    let mut out = String::with_capacity(title.len());
    let mut prev_space = false;

    for c in title.chars() {
        let replacement = match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_whitespace() => ' ',
            c if c == '\0' || c.is_control() => '_',
            c => c,
        };

        if replacement == ' ' {
            if !prev_space {
                out.push(' ');
            }
            prev_space = true;
        } else {
            out.push(replacement);
            prev_space = false;
        }
    }

    let trimmed = out.trim_matches(|c| c == ' ' || c == '.' || c == '_');
    let capped: String = trimmed.chars().take(max_chars).collect();
    // Capping can expose a trailing space or dot.
    capped.trim_end_matches(|c| c == ' ' || c == '.').to_string()
}

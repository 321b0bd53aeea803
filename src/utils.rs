use unicode_width::UnicodeWidthChar;

use url::Url;

pub const ELLIPSIS: &str = "...";

/// Safely truncate a string, ensuring it is not truncated in the middle of multi-byte characters
///
/// This function will:
/// 1. Correctly handle Unicode characters (including Chinese, emoji, etc.)
/// 2. Add ellipsis when maximum length is reached
/// 3. Ensure the output string's display width does not exceed the specified length
pub fn truncate_str(s: &str, max_width: usize) -> String {
    use unicode_width::UnicodeWidthStr;

    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(1);

        if current_width + char_width + ELLIPSIS.len() > max_width {
            break;
        }

        result.push(c);
        current_width += char_width;
    }

    result.push_str(ELLIPSIS);
    result
}

/// Keep the first `max_chars` characters and mark the cut with an ellipsis.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}{ELLIPSIS}", &s[..idx]),
        None => s.to_string(),
    }
}

/// `/favicon.ico` at the page's origin.
pub fn default_favicon(page_url: &Url) -> Option<String> {
    page_url.join("/favicon.ico").ok().map(String::from)
}

/// Host of the page, or the whole URL when it has none.
pub fn hostname_or_url(page_url: &Url) -> String {
    page_url
        .host_str()
        .map(str::to_string)
        .unwrap_or_else(|| page_url.to_string())
}

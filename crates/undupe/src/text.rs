//! Display-width helpers for terminal output

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

pub const TAB_WIDTH: usize = 4;

pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Truncate to at most `max` columns, ending with an ellipsis when cut
pub fn truncate_to_width(text: &str, max: usize) -> String {
    if display_width(text) <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut width = 0;
    for grapheme in text.graphemes(true) {
        let w = UnicodeWidthStr::width(grapheme);
        if width + w > max - 1 {
            break;
        }
        out.push_str(grapheme);
        width += w;
    }
    out.push('…');
    out
}

/// Replace tabs with spaces and drop carriage returns
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\t' => out.push_str(&" ".repeat(TAB_WIDTH)),
            '\r' => {}
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_fits() {
        assert_eq!(truncate_to_width("short.txt", 20), "short.txt");
    }

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate_to_width("a_very_long_name.txt", 8), "a_very_…");
        assert_eq!(display_width(&truncate_to_width("a_very_long_name.txt", 8)), 8);
    }

    #[test]
    fn test_truncate_wide_graphemes() {
        // each CJK char is two columns wide
        assert_eq!(truncate_to_width("文書比較結果", 5), "文書…");
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("a\tb\r\n"), "a    b\n");
    }
}

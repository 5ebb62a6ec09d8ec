use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Display width of a string, accounting for CJK double-width, emoji, etc.
pub(crate) fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncate a string to fit within `width` display columns, adding ".." if truncated.
pub(crate) fn truncate_display(s: &str, width: usize) -> String {
    if display_width(s) <= width {
        return s.to_string();
    }
    if width < 3 {
        // No room for "..": keep whatever leading chars fit
        let mut out = String::new();
        let mut used = 0;
        for ch in s.chars() {
            let cw = UnicodeWidthChar::width(ch).unwrap_or(0);
            if used + cw > width {
                break;
            }
            used += cw;
            out.push(ch);
        }
        return out;
    }

    let budget = width - 2;
    let mut used = 0;
    let mut end_byte = 0;
    for (i, ch) in s.char_indices() {
        let cw = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + cw > budget {
            break;
        }
        used += cw;
        end_byte = i + ch.len_utf8();
    }
    format!("{}..", &s[..end_byte])
}

/// Pad or truncate a string to exactly `width` display columns.
pub(crate) fn pad_right(s: &str, width: usize) -> String {
    let truncated = truncate_display(s, width);
    let sw = display_width(&truncated);
    format!("{}{}", truncated, " ".repeat(width.saturating_sub(sw)))
}

/// Ten-cell bar for a 0-100 similarity score, e.g. `######....`.
pub(crate) fn score_bar(score: u8) -> String {
    let filled = (usize::from(score.min(100)) + 5) / 10;
    format!("{}{}", "#".repeat(filled), ".".repeat(10 - filled))
}

/// "1 document" / "3 documents".
pub(crate) fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{} {}", n, noun)
    } else {
        format!("{} {}s", n, noun)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_counts_cjk_double() {
        assert_eq!(display_width("report"), 6);
        assert_eq!(display_width("\u{5e74}\u{5831}"), 4); // "年報"
    }

    #[test]
    fn truncate_long_name() {
        assert_eq!(truncate_display("annual_report_2023", 10), "annual_r..");
        assert_eq!(truncate_display("ar2023", 10), "ar2023");
    }

    #[test]
    fn truncate_narrow_and_empty() {
        assert_eq!(truncate_display("abc", 2), "ab");
        assert_eq!(truncate_display("abcdef", 1), "a");
        assert_eq!(truncate_display("", 0), "");
    }

    #[test]
    fn truncate_respects_cjk_boundary() {
        let t = truncate_display("\u{5e74}\u{5831}\u{5e74}\u{5831}", 6);
        assert_eq!(t, "\u{5e74}\u{5831}..");
        assert!(display_width(&t) <= 6);
    }

    #[test]
    fn pad_right_variants() {
        assert_eq!(pad_right("ab", 5), "ab   ");
        assert_eq!(pad_right("abcde", 5), "abcde");
        assert_eq!(pad_right("abcdef", 5), "abc..");
    }

    #[test]
    fn bars() {
        assert_eq!(score_bar(100), "##########");
        assert_eq!(score_bar(60), "######....");
        assert_eq!(score_bar(94), "#########.");
        assert_eq!(score_bar(0), "..........");
    }

    #[test]
    fn plurals() {
        assert_eq!(plural(1, "document"), "1 document");
        assert_eq!(plural(0, "document"), "0 documents");
    }
}

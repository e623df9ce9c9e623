//! Character columns vs. LSP UTF-16 columns.

/// UTF-16 code units covered by the first `char_column` characters of `line_text`.
///
/// Columns past the end of the line keep counting one unit per missing character, so a
/// position the text has not caught up with yet still maps monotonically.
pub fn char_to_utf16_column(line_text: &str, char_column: usize) -> usize {
    let mut units = 0;
    let mut chars = 0;
    for ch in line_text.chars() {
        if chars == char_column {
            return units;
        }
        units += ch.len_utf16();
        chars += 1;
    }
    units + char_column.saturating_sub(chars)
}

/// Character column covered by the first `units` UTF-16 code units of `line_text`.
///
/// A unit count that lands inside a surrogate pair maps to the character it splits. Counts
/// past the end of the line keep counting one character per missing unit.
pub fn utf16_to_char_column(line_text: &str, units: usize) -> usize {
    let mut seen = 0;
    let mut chars = 0;
    for ch in line_text.chars() {
        if seen >= units {
            return chars;
        }
        let width = ch.len_utf16();
        if seen + width > units {
            return chars;
        }
        seen += width;
        chars += 1;
    }
    chars + units.saturating_sub(seen)
}

/// Text of a 0-based line, without its line break.
///
/// Lines end at `\n`, `\r\n` or a lone `\r`, as LSP defines them.
pub fn line_of(text: &str, line: usize) -> &str {
    let mut rest = text;
    for _ in 0..line {
        let Some(end) = rest.find(['\n', '\r']) else {
            return "";
        };
        let skip = if rest[end..].starts_with("\r\n") { 2 } else { 1 };
        rest = &rest[end + skip..];
    }
    rest.find(['\n', '\r']).map_or(rest, |end| &rest[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_astral_chars_take_two_units() {
        let line = "a👋b";
        assert_eq!(char_to_utf16_column(line, 0), 0);
        assert_eq!(char_to_utf16_column(line, 1), 1);
        assert_eq!(char_to_utf16_column(line, 2), 3);
        assert_eq!(char_to_utf16_column(line, 3), 4);
        assert_eq!(char_to_utf16_column(line, 5), 6);
    }

    #[test]
    fn test_bmp_chars_take_one_unit() {
        assert_eq!(char_to_utf16_column("(m n : ℕ)", 8), 8);
    }

    #[test]
    fn test_utf16_units_back_to_chars() {
        let line = "a👋b";
        assert_eq!(utf16_to_char_column(line, 0), 0);
        assert_eq!(utf16_to_char_column(line, 1), 1);
        assert_eq!(utf16_to_char_column(line, 2), 1);
        assert_eq!(utf16_to_char_column(line, 3), 2);
        assert_eq!(utf16_to_char_column(line, 4), 3);
        assert_eq!(utf16_to_char_column(line, 6), 5);
    }

    #[test]
    fn test_line_of_breaks_only_on_lsp_line_endings() {
        let text = "a\u{000C}b\rc\r\nd\u{2028}e";
        assert_eq!(line_of(text, 0), "a\u{000C}b");
        assert_eq!(line_of(text, 1), "c");
        assert_eq!(line_of(text, 2), "d\u{2028}e");
        assert_eq!(line_of(text, 3), "");
    }

    #[test]
    fn test_line_of() {
        let text = "a\r\nb\n";
        assert_eq!(line_of(text, 0), "a");
        assert_eq!(line_of(text, 1), "b");
        assert_eq!(line_of(text, 2), "");
        assert_eq!(line_of(text, 9), "");
    }
}

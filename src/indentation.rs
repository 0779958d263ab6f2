use crate::comment_table::LineIndex;

/// Tab width used when the configured value is missing or unusable.
pub const DEFAULT_TAB_WIDTH: usize = 4;

/// Parse a configured tab size, falling back to [`DEFAULT_TAB_WIDTH`].
///
/// Zero is rejected as well, since the tab width is used as a divisor.
pub fn parse_tab_width(raw: &str) -> usize {
    match raw.trim().parse::<usize>() {
        Ok(width) if width > 0 => width,
        _ => {
            tracing::warn!(
                value = raw,
                fallback = DEFAULT_TAB_WIDTH,
                "invalid tab size, using fallback"
            );
            DEFAULT_TAB_WIDTH
        }
    }
}

/// Compute how many indentation units precede `offset` on its line.
///
/// Every character between the start of the line and `offset` counts, not
/// only leading whitespace. A tab advances to the next tab stop and always
/// counts as one unit; other characters count as a unit each time the column
/// reaches a multiple of `tab_width`. A partially filled unit rounds up.
pub fn indentation_level(
    source: &str,
    line_index: &LineIndex,
    offset: usize,
    tab_width: usize,
) -> usize {
    let tab_width = if tab_width == 0 {
        DEFAULT_TAB_WIDTH
    } else {
        tab_width
    };

    let line_start = line_index.line_start(line_index.line_number(offset));
    let Some(prefix) = source.get(line_start..offset) else {
        tracing::warn!(offset, len = source.len(), "offset is not a character position in the source");
        return 0;
    };

    let mut column = 0;
    let mut units = 0;
    for c in prefix.chars() {
        match c {
            '\t' => {
                column += tab_width - column % tab_width;
                units += 1;
            }
            '\r' | '\n' => {
                column = 0;
                units = 0;
            }
            _ => {
                column += 1;
                if column % tab_width == 0 {
                    units += 1;
                }
            }
        }
    }

    if column % tab_width != 0 {
        units += 1;
    }
    units
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level_at_marker(source: &str, tab_width: usize) -> usize {
        let offset = source.find("/*").unwrap();
        let line_index = LineIndex::new(source);
        indentation_level(source, &line_index, offset, tab_width)
    }

    #[test]
    fn column_zero_is_level_zero() {
        assert_eq!(level_at_marker("/* c */\nclass A {}", 4), 0);
        assert_eq!(level_at_marker("class A {}\n/* c */", 4), 0);
    }

    #[test]
    fn single_tab_is_one_level() {
        assert_eq!(level_at_marker("class A {\n\t/* c */\n}", 4), 1);
    }

    #[test]
    fn partial_unit_rounds_up() {
        assert_eq!(level_at_marker("class A {\n     /* c */\n}", 4), 2);
        assert_eq!(level_at_marker("class A {\n    /* c */\n}", 4), 1);
        assert_eq!(level_at_marker("class A {\n  /* c */\n}", 4), 1);
    }

    #[test]
    fn tab_after_spaces_rounds_to_tab_stop() {
        // Two spaces then a tab land on column 4: the tab is the only unit.
        assert_eq!(level_at_marker("class A {\n  \t/* c */\n}", 4), 1);
        assert_eq!(level_at_marker("class A {\n\t\t/* c */\n}", 4), 2);
    }

    #[test]
    fn code_before_comment_counts() {
        // `int x; ` is seven columns wide.
        assert_eq!(level_at_marker("int x; /* c */", 4), 2);
    }

    #[test]
    fn respects_tab_width() {
        assert_eq!(level_at_marker("class A {\n  /* c */\n}", 2), 1);
        assert_eq!(level_at_marker("class A {\n        /* c */\n}", 8), 1);
    }

    #[test]
    fn zero_tab_width_uses_default() {
        assert_eq!(level_at_marker("class A {\n    /* c */\n}", 0), 1);
    }

    #[test]
    fn counts_characters_not_bytes() {
        let source = "  é /* c */";
        let line_index = LineIndex::new(source);
        assert_eq!(indentation_level(source, &line_index, 5, 4), 1);
        assert_eq!(indentation_level(source, &line_index, 3, 4), 0);
        assert_eq!(indentation_level(source, &line_index, 40, 4), 0);
    }

    #[test]
    fn parse_tab_width_fallbacks() {
        assert_eq!(parse_tab_width("8"), 8);
        assert_eq!(parse_tab_width(" 2 "), 2);
        assert_eq!(parse_tab_width("0"), DEFAULT_TAB_WIDTH);
        assert_eq!(parse_tab_width("-1"), DEFAULT_TAB_WIDTH);
        assert_eq!(parse_tab_width("tab"), DEFAULT_TAB_WIDTH);
    }
}

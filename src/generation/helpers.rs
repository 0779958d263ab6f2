use dprint_core::formatting::*;

/// Emit one line of text.
///
/// dprint-core rejects tabs inside strings, so they are emitted as
/// `Signal::Tab`. The line must not contain a newline.
pub fn gen_line(line: &str) -> PrintItems {
    let mut items = PrintItems::new();
    let line = line.strip_suffix('\r').unwrap_or(line);

    let mut first = true;
    for part in line.split('\t') {
        if !first {
            items.push_signal(Signal::Tab);
        }
        first = false;
        if !part.is_empty() {
            items.push_string(part.to_string());
        }
    }

    items
}

/// Emit several lines separated by `Signal::NewLine`.
pub fn gen_lines<S: AsRef<str>>(lines: &[S]) -> PrintItems {
    let mut items = PrintItems::new();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            items.push_signal(Signal::NewLine);
        }
        items.extend(gen_line(line.as_ref()));
    }
    items
}

/// Generate a mandatory space.
pub fn gen_space() -> PrintItems {
    let mut items = PrintItems::new();
    items.push_string(" ".to_string());
    items
}

/// The whitespace at the start of the line containing `offset`.
pub fn line_indent(source: &str, offset: usize) -> &str {
    let line_start = source[..offset].rfind(['\n', '\r']).map_or(0, |i| i + 1);
    let line = &source[line_start..];
    let end = line
        .find(|c: char| c != ' ' && c != '\t')
        .unwrap_or(line.len());
    &line[..end]
}

/// Visual width of leading whitespace, with tabs advancing to the next stop.
pub fn indent_columns(indent: &str, tab_width: usize) -> usize {
    let tab_width = tab_width.max(1);
    indent.chars().fold(0, |column, c| match c {
        '\t' => column + tab_width - column % tab_width,
        _ => column + 1,
    })
}

/// Remove up to `columns` columns of leading whitespace from `line`.
pub fn strip_indent(line: &str, columns: usize, tab_width: usize) -> &str {
    let tab_width = tab_width.max(1);
    let mut column = 0;
    for (i, c) in line.char_indices() {
        if column >= columns {
            return &line[i..];
        }
        match c {
            ' ' => column += 1,
            '\t' => column += tab_width - column % tab_width,
            _ => return &line[i..],
        }
    }
    ""
}

/// Whether the source between two offsets contains a blank line.
pub fn has_blank_line_between(source: &str, start: usize, end: usize) -> bool {
    source[start..end].matches('\n').count() >= 2
}

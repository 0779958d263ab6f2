use anyhow::Result;
use anyhow::anyhow;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpanError {
    #[error("comment position ({start}, {end}) does not describe a range in the source")]
    InvalidPosition { start: i64, end: i64 },
    #[error("comment {index} at {start}..{end} starts before the previous comment ends at {previous_end}")]
    Overlapping {
        index: usize,
        start: usize,
        end: usize,
        previous_end: usize,
    },
}

/// The three comment forms of Java source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommentKind {
    /// `// ...`
    SingleLine,
    /// `/* ... */`
    MultiLine,
    /// `/** ... */`
    Javadoc,
}

/// A comment position as recorded by the parser.
///
/// The kind is folded into the signs: a line comment stores both offsets
/// negated, a block comment negates only `end`, and a doc comment keeps both
/// positive. `end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawCommentPosition {
    pub start: i64,
    pub end: i64,
}

impl RawCommentPosition {
    pub fn encode(start: usize, end: usize, kind: CommentKind) -> Self {
        let (start, end) = (start as i64, end as i64);
        match kind {
            CommentKind::SingleLine => Self {
                start: -start,
                end: -end,
            },
            CommentKind::MultiLine => Self { start, end: -end },
            CommentKind::Javadoc => Self { start, end },
        }
    }
}

/// A decoded comment range into the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentSpan {
    pub start: usize,
    pub end: usize,
    pub kind: CommentKind,
}

impl CommentSpan {
    /// Decode a sign-encoded position.
    ///
    /// A line comment at offset 0 cannot carry a negative start, which makes
    /// it look like a block comment; the source text settles that case.
    pub fn decode(raw: RawCommentPosition, source: &str) -> Result<Self, SpanError> {
        let invalid = || SpanError::InvalidPosition {
            start: raw.start,
            end: raw.end,
        };

        let (start, end, kind) = if raw.end < 0 {
            let end = -raw.end;
            if raw.start < 0 {
                (-raw.start, end, CommentKind::SingleLine)
            } else if raw.start == 0 && source.starts_with("//") {
                (0, end, CommentKind::SingleLine)
            } else {
                (raw.start, end, CommentKind::MultiLine)
            }
        } else {
            (raw.start, raw.end, CommentKind::Javadoc)
        };

        let start = usize::try_from(start).map_err(|_| invalid())?;
        let end = usize::try_from(end).map_err(|_| invalid())?;
        if start > end
            || end > source.len()
            || !source.is_char_boundary(start)
            || !source.is_char_boundary(end)
        {
            return Err(invalid());
        }

        Ok(Self { start, end, kind })
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

/// Line-start table for offset to line translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let bytes = source.as_bytes();
        let mut line_starts = vec![0];
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => line_starts.push(i + 1),
                b'\r' if bytes.get(i + 1) == Some(&b'\n') => {
                    line_starts.push(i + 2);
                    i += 1;
                }
                b'\r' => line_starts.push(i + 1),
                _ => {}
            }
            i += 1;
        }
        Self { line_starts }
    }

    /// 1-based line number of the line containing `offset`.
    pub fn line_number(&self, offset: usize) -> usize {
        self.line_starts.partition_point(|&start| start <= offset)
    }

    /// Byte offset where the given 1-based line starts. Out of range lines
    /// clamp to the first or last line.
    pub fn line_start(&self, line: usize) -> usize {
        let index = line.clamp(1, self.line_starts.len()) - 1;
        self.line_starts[index]
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

/// Comments of one compilation unit, in document order, along with the line
/// table of the same source.
#[derive(Debug, Clone)]
pub struct CommentTable {
    positions: Vec<RawCommentPosition>,
    spans: Vec<CommentSpan>,
    line_index: LineIndex,
}

impl CommentTable {
    /// Parse `source` and record every comment it contains.
    ///
    /// Fails when the source does not parse cleanly.
    pub fn scan(source: &str) -> Result<Self> {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_java::LANGUAGE.into())
            .map_err(|e| anyhow!("Failed to load Java grammar: {}", e))?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| anyhow!("Failed to parse Java source"))?;

        let root = tree.root_node();
        if root.has_error() {
            return Err(anyhow!(
                "Java source has syntax errors near line {}",
                first_error_row(root) + 1
            ));
        }

        let mut positions = Vec::new();
        collect_comments(root, source, &mut positions);
        Self::from_positions(source, positions)
    }

    /// Build a table from positions produced by some other parser.
    pub fn from_positions(source: &str, positions: Vec<RawCommentPosition>) -> Result<Self> {
        let spans = positions
            .iter()
            .map(|raw| CommentSpan::decode(*raw, source))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            positions,
            spans,
            line_index: LineIndex::new(source),
        })
    }

    pub fn positions(&self) -> &[RawCommentPosition] {
        &self.positions
    }

    pub fn spans(&self) -> &[CommentSpan] {
        &self.spans
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Check that spans are sorted by offset and do not overlap.
    ///
    /// Splicing formatted comments back in reverse order only preserves the
    /// earlier offsets when this holds.
    pub fn validate(&self) -> Result<(), SpanError> {
        for (index, pair) in self.spans.windows(2).enumerate() {
            let (previous, span) = (pair[0], pair[1]);
            if span.start < previous.end {
                return Err(SpanError::Overlapping {
                    index: index + 1,
                    start: span.start,
                    end: span.end,
                    previous_end: previous.end,
                });
            }
        }
        Ok(())
    }
}

/// Classify a `block_comment` node's text.
pub fn block_comment_kind(text: &str) -> CommentKind {
    if text.starts_with("/**") && !text.starts_with("/***") && text != "/**/" {
        CommentKind::Javadoc
    } else {
        CommentKind::MultiLine
    }
}

fn collect_comments(node: tree_sitter::Node, source: &str, out: &mut Vec<RawCommentPosition>) {
    match node.kind() {
        "line_comment" => {
            let text = &source[node.start_byte()..node.end_byte()];
            // The grammar lets a line comment swallow the `\r` of a CRLF.
            let end = node.end_byte() - (text.len() - text.trim_end_matches('\r').len());
            out.push(RawCommentPosition::encode(
                node.start_byte(),
                end,
                CommentKind::SingleLine,
            ));
        }
        "block_comment" => {
            let text = &source[node.start_byte()..node.end_byte()];
            out.push(RawCommentPosition::encode(
                node.start_byte(),
                node.end_byte(),
                block_comment_kind(text),
            ));
        }
        _ => {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                collect_comments(child, source, out);
            }
        }
    }
}

fn first_error_row(node: tree_sitter::Node) -> usize {
    if node.is_error() || node.is_missing() {
        return node.start_position().row;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() {
            return first_error_row(child);
        }
    }
    node.start_position().row
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_records_all_kinds_in_order() {
        let source = "/** doc */\nclass A {\n    // line\n    int x; /* block */\n}\n";
        let table = CommentTable::scan(source).unwrap();
        let kinds: Vec<_> = table.spans().iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                CommentKind::Javadoc,
                CommentKind::SingleLine,
                CommentKind::MultiLine
            ]
        );
        let texts: Vec<_> = table.spans().iter().map(|s| s.text(source)).collect();
        assert_eq!(texts, vec!["/** doc */", "// line", "/* block */"]);
        assert!(table.validate().is_ok());
    }

    #[test]
    fn positions_use_sign_convention() {
        let source = "class A {\n    // line\n    /* block */\n    /** doc */\n    void f() {}\n}\n";
        let table = CommentTable::scan(source).unwrap();
        let positions = table.positions();
        assert_eq!(positions.len(), 3);
        assert!(positions[0].start < 0 && positions[0].end < 0);
        assert!(positions[1].start > 0 && positions[1].end < 0);
        assert!(positions[2].start > 0 && positions[2].end > 0);
    }

    #[test]
    fn line_comment_at_offset_zero() {
        let source = "// header\nclass A {}\n";
        let table = CommentTable::scan(source).unwrap();
        assert_eq!(table.positions()[0], RawCommentPosition { start: 0, end: -9 });
        assert_eq!(
            table.spans()[0],
            CommentSpan {
                start: 0,
                end: 9,
                kind: CommentKind::SingleLine
            }
        );
    }

    #[test]
    fn block_comment_at_offset_zero() {
        let source = "/* header */\nclass A {}\n";
        let span = CommentSpan::decode(RawCommentPosition { start: 0, end: -12 }, source).unwrap();
        assert_eq!(span.kind, CommentKind::MultiLine);
        assert_eq!(span.text(source), "/* header */");
    }

    #[test]
    fn crlf_line_comment_excludes_carriage_return() {
        let source = "class A {\r\n    // hi\r\n}\r\n";
        let table = CommentTable::scan(source).unwrap();
        assert_eq!(table.spans()[0].text(source), "// hi");
    }

    #[test]
    fn decode_rejects_out_of_range() {
        let source = "class A {}";
        assert_eq!(
            CommentSpan::decode(RawCommentPosition { start: 3, end: 40 }, source),
            Err(SpanError::InvalidPosition { start: 3, end: 40 })
        );
        assert!(CommentSpan::decode(RawCommentPosition { start: -5, end: 3 }, source).is_err());
    }

    #[test]
    fn decode_rejects_offsets_inside_a_character() {
        let source = "// é";
        let raw = RawCommentPosition::encode(0, 4, CommentKind::SingleLine);
        assert_eq!(
            CommentSpan::decode(raw, source),
            Err(SpanError::InvalidPosition { start: 0, end: -4 })
        );
        assert!(CommentTable::from_positions(source, vec![raw]).is_err());

        let whole = RawCommentPosition::encode(0, 5, CommentKind::SingleLine);
        let span = CommentSpan::decode(whole, source).unwrap();
        assert_eq!(span.text(source), "// é");
        assert!(!span.is_empty());
    }

    #[test]
    fn validate_detects_overlap() {
        let source = "/* a */ /* b */";
        let positions = vec![
            RawCommentPosition::encode(0, 9, CommentKind::MultiLine),
            RawCommentPosition::encode(8, 15, CommentKind::MultiLine),
        ];
        let table = CommentTable::from_positions(source, positions).unwrap();
        assert_eq!(
            table.validate(),
            Err(SpanError::Overlapping {
                index: 1,
                start: 8,
                end: 15,
                previous_end: 9
            })
        );
    }

    #[test]
    fn scan_rejects_syntax_errors() {
        assert!(CommentTable::scan("public class { broken syntax").is_err());
    }

    #[test]
    fn block_comment_kinds() {
        assert_eq!(block_comment_kind("/** doc */"), CommentKind::Javadoc);
        assert_eq!(block_comment_kind("/**/"), CommentKind::MultiLine);
        assert_eq!(block_comment_kind("/*** banner ***/"), CommentKind::MultiLine);
        assert_eq!(block_comment_kind("/* plain */"), CommentKind::MultiLine);
    }

    #[test]
    fn line_index_lookup() {
        let source = "a\nbc\r\nd\re";
        let index = LineIndex::new(source);
        assert_eq!(index.line_count(), 4);
        assert_eq!(index.line_number(0), 1);
        assert_eq!(index.line_number(1), 1);
        assert_eq!(index.line_number(2), 2);
        assert_eq!(index.line_number(6), 3);
        assert_eq!(index.line_number(8), 4);
        assert_eq!(index.line_start(2), 2);
        assert_eq!(index.line_start(3), 6);
        assert_eq!(index.line_start(4), 8);
    }
}

use anyhow::Result;
use anyhow::bail;
use dprint_core::configuration::resolve_new_line_kind;
use dprint_core::formatting::PrintItems;
use dprint_core::formatting::Signal;

use crate::comment_table::CommentKind;
use crate::configuration::Configuration;
use crate::document::Document;
use crate::format_text::build_print_options;
use crate::format_text::format_text_inner;
use crate::generation::format_comment_lines;
use crate::generation::gen_line;

/// What a region handed to a formatter contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    CompilationUnit,
    SingleLineComment,
    MultiLineComment,
    Javadoc,
}

impl From<CommentKind> for FormatKind {
    fn from(kind: CommentKind) -> Self {
        match kind {
            CommentKind::SingleLine => FormatKind::SingleLineComment,
            CommentKind::MultiLine => FormatKind::MultiLineComment,
            CommentKind::Javadoc => FormatKind::Javadoc,
        }
    }
}

/// Replace `length` bytes at `offset` with `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceEdit {
    pub offset: usize,
    pub length: usize,
    pub text: String,
}

/// The changes a formatter wants made to its input.
///
/// Edits are sorted by offset and never overlap; offsets refer to the text
/// the formatter was given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextEdit {
    edits: Vec<ReplaceEdit>,
}

impl TextEdit {
    pub fn new(mut edits: Vec<ReplaceEdit>) -> Result<Self> {
        edits.sort_by_key(|edit| edit.offset);
        for pair in edits.windows(2) {
            if pair[0].offset + pair[0].length > pair[1].offset {
                bail!(
                    "text edits overlap at {}..{} and {}",
                    pair[0].offset,
                    pair[0].offset + pair[0].length,
                    pair[1].offset
                );
            }
        }
        Ok(Self { edits })
    }

    pub fn replace(offset: usize, length: usize, text: impl Into<String>) -> Self {
        Self {
            edits: vec![ReplaceEdit {
                offset,
                length,
                text: text.into(),
            }],
        }
    }

    pub fn edits(&self) -> &[ReplaceEdit] {
        &self.edits
    }

    /// Apply to `source`, last edit first so earlier offsets stay valid.
    pub fn apply(&self, source: &str) -> Result<String> {
        let mut document = Document::new(source);
        for edit in self.edits.iter().rev() {
            document.replace(edit.offset, edit.length, &edit.text)?;
        }
        Ok(document.into_string())
    }
}

/// A code formatter that can format a whole compilation unit or a single
/// comment.
///
/// `Ok(None)` means the region needs no change.
pub trait CodeFormatter {
    fn format(
        &self,
        kind: FormatKind,
        source: &str,
        offset: usize,
        length: usize,
        indentation_level: usize,
        line_separator: Option<&str>,
    ) -> Result<Option<TextEdit>>;
}

/// The crate's Java formatter exposed through [`CodeFormatter`].
#[derive(Debug, Clone)]
pub struct JavaFormatter {
    config: Configuration,
}

impl JavaFormatter {
    pub fn new(config: Configuration) -> Self {
        Self { config }
    }

    fn new_line_text(&self, text: &str, line_separator: Option<&str>) -> &'static str {
        match line_separator {
            None => resolve_new_line_kind(text, self.config.new_line_kind),
            Some("\r\n") => "\r\n",
            Some(_) => "\n",
        }
    }

    /// Format one comment. Continuation lines are indented by
    /// `indentation_level` units; the first line is left where it starts.
    fn format_comment(
        &self,
        kind: CommentKind,
        text: &str,
        indentation_level: usize,
        new_line_text: &'static str,
    ) -> String {
        let indent_columns = indentation_level * self.config.indent_width as usize;
        let lines = format_comment_lines(text, kind, &self.config, indent_columns);

        let mut items = PrintItems::new();
        let mut lines = lines.iter();
        if let Some(first) = lines.next() {
            items.extend(gen_line(first));
        }
        for _ in 0..indentation_level {
            items.push_signal(Signal::StartIndent);
        }
        for line in lines {
            items.push_signal(Signal::NewLine);
            items.extend(gen_line(line));
        }
        for _ in 0..indentation_level {
            items.push_signal(Signal::FinishIndent);
        }

        dprint_core::formatting::format(
            || items,
            build_print_options(&self.config, new_line_text),
        )
    }
}

impl CodeFormatter for JavaFormatter {
    fn format(
        &self,
        kind: FormatKind,
        source: &str,
        offset: usize,
        length: usize,
        indentation_level: usize,
        line_separator: Option<&str>,
    ) -> Result<Option<TextEdit>> {
        let Some(region) = source.get(offset..offset + length) else {
            bail!(
                "region {}..{} is not valid in a source of length {}",
                offset,
                offset + length,
                source.len()
            );
        };
        let new_line_text = self.new_line_text(region, line_separator);

        let formatted = match kind {
            FormatKind::CompilationUnit => format_text_inner(region, &self.config, new_line_text)?,
            FormatKind::SingleLineComment => {
                if !region.starts_with("//") {
                    bail!("text at {} is not a line comment", offset);
                }
                self.format_comment(CommentKind::SingleLine, region, indentation_level, new_line_text)
            }
            FormatKind::MultiLineComment | FormatKind::Javadoc => {
                if !region.starts_with("/*") || !region.ends_with("*/") || region.len() < 4 {
                    bail!("text at {} is not a block comment", offset);
                }
                let comment_kind = if kind == FormatKind::Javadoc {
                    CommentKind::Javadoc
                } else {
                    CommentKind::MultiLine
                };
                self.format_comment(comment_kind, region, indentation_level, new_line_text)
            }
        };

        if formatted == region {
            return Ok(None);
        }
        Ok(Some(TextEdit::replace(offset, length, formatted)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn formatter(format_javadoc: bool) -> JavaFormatter {
        JavaFormatter::new(Configuration {
            format_javadoc,
            ..Configuration::default()
        })
    }

    fn format_all(formatter: &JavaFormatter, kind: FormatKind, text: &str, level: usize) -> Option<String> {
        formatter
            .format(kind, text, 0, text.len(), level, None)
            .unwrap()
            .map(|edit| edit.apply(text).unwrap())
    }

    #[test]
    fn line_comment_needs_space() {
        let f = formatter(false);
        assert_eq!(
            format_all(&f, FormatKind::SingleLineComment, "//x", 0),
            Some("// x".to_string())
        );
        assert_eq!(format_all(&f, FormatKind::SingleLineComment, "// x", 3), None);
    }

    #[test]
    fn block_comment_continuation_follows_level() {
        let f = formatter(false);
        let text = "/* a\n b\n*/";
        assert_eq!(
            format_all(&f, FormatKind::MultiLineComment, text, 0),
            Some("/* a\n * b\n */".to_string())
        );
        assert_eq!(
            format_all(&f, FormatKind::MultiLineComment, text, 2),
            Some("/* a\n         * b\n         */".to_string())
        );
    }

    #[test]
    fn javadoc_reflows_when_enabled() {
        let f = formatter(true);
        assert_eq!(
            format_all(&f, FormatKind::Javadoc, "/** a\n *b*/", 0),
            Some("/**\n * a b\n */".to_string())
        );
        assert_eq!(
            format_all(&f, FormatKind::Javadoc, "/**\n * a b\n */", 0),
            None
        );
    }

    #[test]
    fn region_offsets_are_respected() {
        let f = formatter(false);
        let source = "int x; //note\n";
        let edit = f
            .format(FormatKind::SingleLineComment, source, 7, 6, 2, None)
            .unwrap()
            .unwrap();
        assert_eq!(edit.edits()[0].offset, 7);
        assert_eq!(edit.apply(source).unwrap(), "int x; // note\n");
    }

    #[test]
    fn crlf_line_separator() {
        let f = formatter(false);
        let edit = f
            .format(FormatKind::MultiLineComment, "/* a\n b */", 0, 10, 0, Some("\r\n"))
            .unwrap()
            .unwrap();
        assert_eq!(edit.apply("/* a\n b */").unwrap(), "/* a\r\n * b */");
    }

    #[test]
    fn compilation_unit() {
        let f = formatter(false);
        assert_eq!(
            format_all(&f, FormatKind::CompilationUnit, "class X{}", 0),
            Some("class X {}\n".to_string())
        );
        assert_eq!(format_all(&f, FormatKind::CompilationUnit, "class X {}\n", 0), None);
    }

    #[test]
    fn rejects_mismatched_kind_and_region() {
        let f = formatter(false);
        assert!(f.format(FormatKind::SingleLineComment, "/* a */", 0, 7, 0, None).is_err());
        assert!(f.format(FormatKind::MultiLineComment, "// a", 0, 4, 0, None).is_err());
        assert!(f.format(FormatKind::CompilationUnit, "class A {}", 4, 40, 0, None).is_err());
    }

    #[test]
    fn text_edit_applies_in_reverse() {
        let edit = TextEdit::new(vec![
            ReplaceEdit {
                offset: 7,
                length: 0,
                text: " ".to_string(),
            },
            ReplaceEdit {
                offset: 0,
                length: 5,
                text: "interface".to_string(),
            },
        ])
        .unwrap();
        assert_eq!(edit.edits()[0].offset, 0);
        assert_eq!(edit.apply("class A{}").unwrap(), "interface A {}");
    }

    #[test]
    fn text_edit_rejects_overlap() {
        let result = TextEdit::new(vec![
            ReplaceEdit {
                offset: 0,
                length: 4,
                text: String::new(),
            },
            ReplaceEdit {
                offset: 2,
                length: 1,
                text: String::new(),
            },
        ]);
        assert!(result.is_err());
    }
}

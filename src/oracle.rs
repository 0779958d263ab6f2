//! Baseline for comment formatting.
//!
//! Every comment of a compilation unit is formatted on its own, at the
//! indentation it had in the file, and spliced back in. The spliced file is
//! then formatted as a whole. A formatter that handles comments consistently
//! produces the same text when it formats the original file in one pass.

use anyhow::Result;

use crate::comment_table::CommentTable;
use crate::configuration::Configuration;
use crate::document::Document;
use crate::formatter::CodeFormatter;
use crate::formatter::FormatKind;
use crate::indentation::indentation_level;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleOptions {
    /// Width of a tab and of one indentation unit when measuring comments.
    pub tab_width: usize,
    /// Passed through to the formatter; `None` lets it decide.
    pub line_separator: Option<String>,
}

impl Default for OracleOptions {
    fn default() -> Self {
        Self {
            tab_width: crate::indentation::DEFAULT_TAB_WIDTH,
            line_separator: None,
        }
    }
}

impl OracleOptions {
    pub fn from_config(config: &Configuration) -> Self {
        Self {
            tab_width: config.tab_width,
            line_separator: None,
        }
    }
}

/// Build the expected output for `source` by formatting each comment in
/// isolation, splicing the results back and formatting the spliced file.
///
/// A comment the formatter leaves unchanged keeps its original text. Errors
/// from parsing or from the formatter are returned as they are.
pub fn expected_formatted_source(
    formatter: &dyn CodeFormatter,
    source: &str,
    options: &OracleOptions,
) -> Result<String> {
    let table = CommentTable::scan(source)?;
    table.validate()?;

    let spliced = if table.is_empty() {
        tracing::debug!("no comments, formatting the unit directly");
        source.to_string()
    } else {
        let formatted_comments = format_comments(formatter, source, &table, options)?;
        splice_comments(source, &table, &formatted_comments)?
    };

    let edit = formatter.format(
        FormatKind::CompilationUnit,
        &spliced,
        0,
        spliced.len(),
        0,
        options.line_separator.as_deref(),
    )?;
    match edit {
        Some(edit) => edit.apply(&spliced),
        None => Ok(spliced),
    }
}

/// Format each comment of `table` on its own. Entries are `None` where the
/// formatter reported no change.
pub fn format_comments(
    formatter: &dyn CodeFormatter,
    source: &str,
    table: &CommentTable,
    options: &OracleOptions,
) -> Result<Vec<Option<String>>> {
    let mut formatted = Vec::with_capacity(table.spans().len());

    for span in table.spans() {
        let level = indentation_level(source, table.line_index(), span.start, options.tab_width);
        let text = span.text(source);
        tracing::debug!(
            kind = ?span.kind,
            start = span.start,
            end = span.end,
            level,
            "formatting comment"
        );

        let edit = formatter.format(
            span.kind.into(),
            text,
            0,
            text.len(),
            level,
            options.line_separator.as_deref(),
        )?;
        formatted.push(match edit {
            Some(edit) => Some(edit.apply(text)?),
            None => None,
        });
    }

    Ok(formatted)
}

/// Replace each comment span with its formatted text, from the last span to
/// the first so that the offsets of spans not yet replaced stay valid.
pub fn splice_comments(
    source: &str,
    table: &CommentTable,
    formatted: &[Option<String>],
) -> Result<String> {
    let mut document = Document::new(source);

    for (span, text) in table.spans().iter().zip(formatted).rev() {
        let Some(text) = text else {
            continue;
        };
        tracing::trace!(start = span.start, end = span.end, "splicing comment");
        document.replace(span.start, span.len(), text)?;
    }

    Ok(document.into_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comment_table::CommentKind;
    use crate::comment_table::RawCommentPosition;
    use crate::formatter::TextEdit;
    use std::cell::RefCell;

    /// Upper-cases comments and records every call it receives.
    #[derive(Default)]
    struct RecordingFormatter {
        calls: RefCell<Vec<(FormatKind, String, usize)>>,
    }

    impl CodeFormatter for RecordingFormatter {
        fn format(
            &self,
            kind: FormatKind,
            source: &str,
            offset: usize,
            length: usize,
            indentation_level: usize,
            _line_separator: Option<&str>,
        ) -> Result<Option<TextEdit>> {
            let region = &source[offset..offset + length];
            self.calls
                .borrow_mut()
                .push((kind, region.to_string(), indentation_level));
            match kind {
                FormatKind::CompilationUnit => Ok(None),
                _ if region.contains("keep") => Ok(None),
                _ => Ok(Some(TextEdit::replace(offset, length, region.to_uppercase()))),
            }
        }
    }

    struct FailingFormatter;

    impl CodeFormatter for FailingFormatter {
        fn format(
            &self,
            _kind: FormatKind,
            _source: &str,
            _offset: usize,
            _length: usize,
            _indentation_level: usize,
            _line_separator: Option<&str>,
        ) -> Result<Option<TextEdit>> {
            anyhow::bail!("formatter exploded")
        }
    }

    #[test]
    fn formats_each_comment_with_its_level() {
        crate::test_utils::init_test_logging();
        let source = "// top\nclass A {\n    /* member */\n\tvoid f() {\n\t\t/** deep */\n\t}\n}\n";
        let formatter = RecordingFormatter::default();
        let result = expected_formatted_source(&formatter, source, &OracleOptions::default()).unwrap();

        assert_eq!(
            result,
            "// TOP\nclass A {\n    /* MEMBER */\n\tvoid f() {\n\t\t/** DEEP */\n\t}\n}\n"
        );
        let calls = formatter.calls.borrow();
        assert_eq!(
            calls[..3],
            [
                (FormatKind::SingleLineComment, "// top".to_string(), 0),
                (FormatKind::MultiLineComment, "/* member */".to_string(), 1),
                (FormatKind::Javadoc, "/** deep */".to_string(), 2),
            ]
        );
        assert_eq!(calls[3].0, FormatKind::CompilationUnit);
        assert_eq!(calls[3].2, 0);
    }

    #[test]
    fn unchanged_comments_keep_source_text() {
        let source = "class A {\n    // keep me\n    // change me\n}\n";
        let formatter = RecordingFormatter::default();
        let result = expected_formatted_source(&formatter, source, &OracleOptions::default()).unwrap();
        assert_eq!(result, "class A {\n    // keep me\n    // CHANGE ME\n}\n");
    }

    #[test]
    fn no_comments_only_formats_the_unit() {
        let source = "class A {}\n";
        let formatter = RecordingFormatter::default();
        let result = expected_formatted_source(&formatter, source, &OracleOptions::default()).unwrap();
        assert_eq!(result, source);
        assert_eq!(formatter.calls.borrow().len(), 1);
    }

    #[test]
    fn formatter_errors_propagate() {
        let error = expected_formatted_source(&FailingFormatter, "// a\nclass A {}\n", &OracleOptions::default())
            .unwrap_err();
        assert_eq!(error.to_string(), "formatter exploded");
    }

    #[test]
    fn parse_errors_propagate() {
        let formatter = RecordingFormatter::default();
        assert!(expected_formatted_source(&formatter, "class {", &OracleOptions::default()).is_err());
        assert!(formatter.calls.borrow().is_empty());
    }

    #[test]
    fn splice_handles_growing_and_shrinking_comments() {
        let source = "/*a*/ x /*bb*/ y /*ccc*/";
        let positions = vec![
            RawCommentPosition::encode(0, 5, CommentKind::MultiLine),
            RawCommentPosition::encode(8, 14, CommentKind::MultiLine),
            RawCommentPosition::encode(17, 24, CommentKind::MultiLine),
        ];
        let table = CommentTable::from_positions(source, positions).unwrap();
        let formatted = vec![
            Some("/* a much longer comment */".to_string()),
            None,
            Some("/**/".to_string()),
        ];
        assert_eq!(
            splice_comments(source, &table, &formatted).unwrap(),
            "/* a much longer comment */ x /*bb*/ y /**/"
        );
    }
}

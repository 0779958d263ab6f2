use dprint_core::formatting::PrintItems;

use crate::comment_table::CommentKind;
use crate::comment_table::block_comment_kind;
use crate::configuration::Configuration;

use super::context::FormattingContext;
use super::helpers;

/// Format a comment node at the context's indentation.
pub fn gen_comment(node: tree_sitter::Node, context: &FormattingContext) -> PrintItems {
    let text = &context.source[node.start_byte()..node.end_byte()];
    let indent = context.indent_level() * (context.config.indent_width as usize);
    let lines = format_comment_lines(text, node_comment_kind(node, text), context.config, indent);
    helpers::gen_lines(&lines)
}

/// Comment kind of a `line_comment` or `block_comment` node.
pub fn node_comment_kind(node: tree_sitter::Node, text: &str) -> CommentKind {
    if node.kind() == "line_comment" {
        CommentKind::SingleLine
    } else {
        block_comment_kind(text)
    }
}

pub fn is_comment(node: tree_sitter::Node) -> bool {
    matches!(node.kind(), "line_comment" | "block_comment")
}

/// Format a single comment into lines.
///
/// The first line starts where the comment starts; continuation lines are
/// relative to the comment's indentation, which the caller supplies.
/// `indent_columns` is the width of that indentation and only narrows the
/// space available to reflowed Javadoc.
pub fn format_comment_lines(
    text: &str,
    kind: CommentKind,
    config: &Configuration,
    indent_columns: usize,
) -> Vec<String> {
    match kind {
        CommentKind::SingleLine => vec![format_line_comment(text)],
        CommentKind::Javadoc if config.format_javadoc => javadoc_lines(text, config, indent_columns),
        CommentKind::MultiLine | CommentKind::Javadoc => block_comment_lines(text),
    }
}

/// Format a line comment: `// ...`
///
/// Ensures a single space after the `//` prefix unless the comment is empty,
/// already starts with whitespace, or is a `///` or `//!` comment. Trailing
/// whitespace is dropped.
fn format_line_comment(text: &str) -> String {
    let text = text.trim_end();
    match text.strip_prefix("//") {
        Some("") => "//".to_string(),
        Some(rest) if rest.starts_with(['/', '!', ' ', '\t']) => text.to_string(),
        Some(rest) => format!("// {}", rest),
        None => text.to_string(),
    }
}

/// Lines of a block comment with continuation lines re-aligned so that `*`
/// sits one column right of the opening `/`.
fn block_comment_lines(text: &str) -> Vec<String> {
    let mut result = Vec::new();

    for (i, line) in text.split('\n').enumerate() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let line = strip_comment_line_trailing_ws(line);

        if i == 0 {
            result.push(line);
            continue;
        }

        let trimmed = line.trim_start();
        if trimmed.is_empty() {
            result.push(" *".to_string());
        } else if trimmed.starts_with('*') {
            result.push(format!(" {}", trimmed));
        } else {
            result.push(format!(" * {}", trimmed));
        }
    }

    result
}

/// Strip trailing whitespace from a block comment line, keeping a single
/// space between content and a closing `*/`.
///
/// `/***/` is left alone: spacing it out would turn it into a doc comment.
fn strip_comment_line_trailing_ws(line: &str) -> String {
    let line = line.trim_end();

    if let Some(rest) = line.strip_suffix("*/") {
        if rest == "/**" {
            return line.to_string();
        }
        let rest_trimmed = rest.trim_end();
        if rest_trimmed == "/*" || rest_trimmed.is_empty() {
            return format!("{}*/", rest_trimmed);
        }
        return format!("{} */", rest_trimmed);
    }

    line.to_string()
}

/// Reflow a Javadoc comment.
///
/// - The opening `/**` goes on its own line
/// - Continuation lines use a ` * ` prefix
/// - `@param`, `@throws`, `@exception` and `@serialField` keep their argument
/// - `{@code ...}` and `<pre>...</pre>` are kept intact
/// - Lines wrap to `config.line_width`
fn javadoc_lines(text: &str, config: &Configuration, indent_columns: usize) -> Vec<String> {
    let inner = extract_javadoc_content(text);
    let segments = parse_javadoc_segments(&inner);

    // " * " is 3 chars
    let prefix_width = indent_columns + 3;
    let max_content_width = if (config.line_width as usize) > prefix_width + 10 {
        (config.line_width as usize) - prefix_width
    } else {
        60
    };

    let mut lines = vec!["/**".to_string()];
    let mut push_content = |line: &str| {
        if line.is_empty() {
            lines.push(" *".to_string());
        } else {
            lines.push(format!(" * {}", line));
        }
    };

    for segment in &segments {
        match segment {
            JavadocSegment::Text(text) => {
                for line in wrap_text(text, max_content_width) {
                    push_content(&line);
                }
            }
            JavadocSegment::Tag { name, args, desc } => {
                let tag_line = format_tag_line(name, args.as_deref(), desc);
                for line in wrap_text(&tag_line, max_content_width) {
                    push_content(&line);
                }
            }
            JavadocSegment::PreBlock(content) => {
                push_content("<pre>");
                for line in content.split('\n') {
                    push_content(line.strip_suffix('\r').unwrap_or(line).trim_end());
                }
                push_content("</pre>");
            }
            JavadocSegment::BlankLine => push_content(""),
        }
    }

    lines.push(" */".to_string());
    lines
}

/// Extract the inner text content from a Javadoc comment.
///
/// Strips the `/**` prefix and `*/` suffix, and removes the leading ` * `
/// of each continuation line.
fn extract_javadoc_content(text: &str) -> String {
    let inner = text.strip_prefix("/**").unwrap_or(text);
    let inner = inner.strip_suffix("*/").unwrap_or(inner);

    let mut lines = Vec::new();
    for (i, line) in inner.split('\n').enumerate() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if i == 0 {
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                lines.push(trimmed.to_string());
            }
        } else {
            let trimmed = line.trim_start();
            if let Some(rest) = trimmed.strip_prefix('*') {
                let rest = rest.strip_prefix(' ').unwrap_or(rest);
                lines.push(rest.to_string());
            } else {
                lines.push(trimmed.to_string());
            }
        }
    }

    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }

    lines.join("\n")
}

#[derive(Debug, PartialEq)]
enum JavadocSegment {
    /// Free-form description text.
    Text(String),
    /// A block tag like `@param`, `@return`, `@throws`.
    Tag {
        name: String,
        args: Option<String>,
        desc: String,
    },
    /// A `<pre>...</pre>` block preserved verbatim.
    PreBlock(String),
    BlankLine,
}

fn parse_javadoc_segments(content: &str) -> Vec<JavadocSegment> {
    let mut segments = Vec::new();
    if content.is_empty() {
        return segments;
    }

    let lines: Vec<&str> = content.split('\n').collect();
    let mut i = 0;

    while i < lines.len() {
        let trimmed = lines[i].trim();

        if trimmed.is_empty() {
            segments.push(JavadocSegment::BlankLine);
            i += 1;
            continue;
        }

        if trimmed.starts_with("<pre>") {
            let mut pre_content = Vec::new();
            let after_pre = trimmed["<pre>".len()..].trim();
            let mut closed = false;
            if let Some(before) = after_pre.strip_suffix("</pre>") {
                if !before.trim().is_empty() {
                    pre_content.push(before.trim().to_string());
                }
                closed = true;
            } else if !after_pre.is_empty() {
                pre_content.push(after_pre.to_string());
            }
            i += 1;
            while !closed && i < lines.len() {
                let line = lines[i];
                if let Some(pos) = line.find("</pre>") {
                    let before = &line[..pos];
                    if !before.trim().is_empty() {
                        pre_content.push(before.trim_end().to_string());
                    }
                    i += 1;
                    break;
                }
                pre_content.push(line.to_string());
                i += 1;
            }
            segments.push(JavadocSegment::PreBlock(pre_content.join("\n")));
            continue;
        }

        if trimmed.starts_with('@') {
            let (name, args, mut desc) = parse_tag_line(trimmed);
            i += 1;
            while i < lines.len() {
                let next = lines[i].trim();
                if next.is_empty() || next.starts_with('@') || next.starts_with("<pre>") {
                    break;
                }
                if !desc.is_empty() {
                    desc.push(' ');
                }
                desc.push_str(next);
                i += 1;
            }
            segments.push(JavadocSegment::Tag { name, args, desc });
            continue;
        }

        let mut text_parts = Vec::new();
        while i < lines.len() {
            let line = lines[i].trim();
            if line.is_empty() || line.starts_with('@') || line.starts_with("<pre>") {
                break;
            }
            text_parts.push(line);
            i += 1;
        }
        segments.push(JavadocSegment::Text(text_parts.join(" ")));
    }

    segments
}

/// Split a block tag line into name, optional argument and description.
///
/// `@param name the name` -> ("@param", Some("name"), "the name")
fn parse_tag_line(line: &str) -> (String, Option<String>, String) {
    let (name, rest) = line
        .split_once(char::is_whitespace)
        .unwrap_or((line, ""));
    let rest = rest.trim();

    match name {
        "@param" | "@throws" | "@exception" | "@serialField" if !rest.is_empty() => {
            let (arg, desc) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            (name.to_string(), Some(arg.to_string()), desc.trim().to_string())
        }
        _ => (name.to_string(), None, rest.to_string()),
    }
}

fn format_tag_line(name: &str, args: Option<&str>, desc: &str) -> String {
    let mut result = name.to_string();
    if let Some(arg) = args {
        result.push(' ');
        result.push_str(arg);
    }
    if !desc.is_empty() {
        result.push(' ');
        result.push_str(desc);
    }
    result
}

/// Word-wrap text to the given maximum width, keeping inline tags whole.
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current_line = String::new();

    for word in split_preserving_inline_tags(text) {
        if current_line.is_empty() {
            current_line = word;
        } else if current_line.len() + 1 + word.len() <= max_width {
            current_line.push(' ');
            current_line.push_str(&word);
        } else {
            lines.push(std::mem::replace(&mut current_line, word));
        }
    }

    if !current_line.is_empty() || lines.is_empty() {
        lines.push(current_line);
    }
    lines
}

/// Split text into words, keeping `{@code ...}` and similar inline tags as
/// single tokens. Whitespace inside an inline tag collapses to one space.
fn split_preserving_inline_tags(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if depth == 0 && c == '{' && chars.peek() == Some(&'@') {
            depth = 1;
            current.push(c);
            continue;
        }
        if depth > 0 {
            match c {
                '{' => depth += 1,
                '}' => depth -= 1,
                _ => {}
            }
            if c.is_whitespace() {
                if !current.ends_with(' ') {
                    current.push(' ');
                }
            } else {
                current.push(c);
            }
            continue;
        }
        if c.is_whitespace() {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
        } else {
            current.push(c);
        }
    }

    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Whether a comment follows other code on the same line.
pub fn is_trailing_comment(node: tree_sitter::Node) -> bool {
    node.prev_sibling()
        .is_some_and(|prev| prev.end_position().row == node.start_position().row)
}

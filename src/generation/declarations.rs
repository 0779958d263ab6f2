use dprint_core::formatting::PrintItems;
use dprint_core::formatting::Signal;

use super::comments;
use super::context::FormattingContext;
use super::generate::gen_node;
use super::helpers;

pub fn is_type_declaration(kind: &str) -> bool {
    matches!(
        kind,
        "class_declaration"
            | "interface_declaration"
            | "enum_declaration"
            | "record_declaration"
            | "annotation_type_declaration"
    )
}

/// Format a class, interface, enum, record or annotation type declaration.
///
/// The header is collapsed onto one line with single spaces. Class-like
/// bodies get one member per line; enum bodies keep their own layout. A
/// header holding comments or literals is left as written.
pub fn gen_type_declaration(node: tree_sitter::Node, context: &mut FormattingContext) -> PrintItems {
    let base_columns = node_base_columns(node, context);
    let Some(body) = node.child_by_field_name("body") else {
        return gen_reindented(node, base_columns, context);
    };

    let mut cursor = node.walk();
    let header: Vec<_> = node
        .children(&mut cursor)
        .take_while(|child| child.id() != body.id())
        .collect();

    if header.iter().any(|child| !is_simple_header_part(*child)) {
        return gen_reindented(node, base_columns, context);
    }

    let mut header_text = String::new();
    for child in &header {
        let part = context
            .text(*child)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        if !header_text.is_empty() && !matches!(child.kind(), "type_parameters" | "formal_parameters") {
            header_text.push(' ');
        }
        header_text.push_str(&part);
    }

    let mut items = PrintItems::new();
    items.push_string(header_text);
    items.extend(helpers::gen_space());
    match body.kind() {
        "class_body" | "interface_body" | "annotation_type_body" => {
            items.extend(gen_body_with_members(body, context));
        }
        _ => items.extend(gen_reindented(body, base_columns, context)),
    }
    items
}

fn is_simple_header_part(node: tree_sitter::Node) -> bool {
    if comments::is_comment(node) || is_literal(node.kind()) {
        return false;
    }
    let mut cursor = node.walk();
    let simple = node.children(&mut cursor).all(is_simple_header_part);
    simple
}

fn is_literal(kind: &str) -> bool {
    matches!(kind, "string_literal" | "text_block" | "character_literal")
}

/// Generic handler for bodies with member declarations (class_body,
/// interface_body, annotation_type_body).
///
/// Uses dprint-core's StartIndent/FinishIndent signals so that NewLine
/// automatically gets the correct indentation. Comment nodes between members
/// stay on their own line, or on the previous line when they trailed it.
fn gen_body_with_members(node: tree_sitter::Node, context: &mut FormattingContext) -> PrintItems {
    let mut items = PrintItems::new();
    items.push_string("{".to_string());

    let mut cursor = node.walk();
    let members: Vec<_> = node
        .children(&mut cursor)
        .filter(|c| c.kind() != "{" && c.kind() != "}")
        .collect();

    if members.is_empty() {
        items.push_string("}".to_string());
        return items;
    }

    items.push_signal(Signal::StartIndent);
    context.indent();

    let mut prev_end = None;
    for member in &members {
        if comments::is_comment(*member) && comments::is_trailing_comment(*member) {
            items.extend(helpers::gen_space());
            items.extend(comments::gen_comment(*member, context));
            prev_end = Some(member.end_byte());
            continue;
        }

        if let Some(prev_end) = prev_end
            && helpers::has_blank_line_between(context.source, prev_end, member.start_byte())
        {
            items.push_signal(Signal::NewLine);
        }
        items.push_signal(Signal::NewLine);
        items.extend(gen_node(*member, context));
        prev_end = Some(member.end_byte());
    }

    items.push_signal(Signal::FinishIndent);
    context.dedent();
    items.push_signal(Signal::NewLine);
    items.push_string("}".to_string());

    items
}

/// Indentation width of the line a node starts on.
pub fn node_base_columns(node: tree_sitter::Node, context: &FormattingContext) -> usize {
    helpers::indent_columns(
        helpers::line_indent(context.source, node.start_byte()),
        context.config.tab_width,
    )
}

/// Emit a node's source with every line re-indented relative to
/// `base_columns`, formatting the comments inside it.
///
/// Lines that start inside a multi-line string literal are emitted exactly
/// as written.
pub fn gen_reindented(
    node: tree_sitter::Node,
    base_columns: usize,
    context: &FormattingContext,
) -> PrintItems {
    let (text, literal_ranges) = render_with_comments(node, base_columns, context);
    let tab_width = context.config.tab_width;

    let mut items = PrintItems::new();
    let mut line_start = 0;
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            items.push_signal(Signal::NewLine);
            let in_literal = literal_ranges
                .iter()
                .any(|&(start, end)| start < line_start && line_start < end);
            if in_literal {
                items.push_signal(Signal::StartIgnoringIndent);
                items.extend(helpers::gen_line(line));
                items.push_signal(Signal::FinishIgnoringIndent);
            } else {
                let line = helpers::strip_indent(line, base_columns, tab_width);
                items.extend(helpers::gen_line(line.trim_end()));
            }
        } else {
            items.extend(helpers::gen_line(line.trim_end()));
        }
        line_start += line.len() + 1;
    }

    items
}

/// Node text with its comments formatted in place, plus the ranges (in the
/// returned text) of multi-line string literals.
fn render_with_comments(
    node: tree_sitter::Node,
    base_columns: usize,
    context: &FormattingContext,
) -> (String, Vec<(usize, usize)>) {
    let mut embedded = Vec::new();
    collect_embedded(node, &mut embedded);

    let source = context.source;
    let tab_width = context.config.tab_width;
    let output_indent = context.indent_level() * (context.config.indent_width as usize);

    let mut text = String::new();
    let mut literal_ranges = Vec::new();
    let mut cursor = node.start_byte();
    for child in embedded {
        text.push_str(&source[cursor..child.start_byte()]);
        let child_text = context.text(child);

        if comments::is_comment(child) {
            let indent = helpers::line_indent(source, child.start_byte());
            let columns = helpers::indent_columns(indent, tab_width);
            let indent_columns = output_indent + columns.saturating_sub(base_columns);
            let kind = comments::node_comment_kind(child, child_text);
            let lines = comments::format_comment_lines(child_text, kind, context.config, indent_columns);
            text.push_str(&lines.join(&format!("\n{}", indent)));
        } else {
            let start = text.len();
            text.push_str(child_text);
            literal_ranges.push((start, text.len()));
        }
        cursor = child.end_byte();
    }
    text.push_str(&source[cursor..node.end_byte()]);

    (text, literal_ranges)
}

/// Comments and multi-line literals under `node`, in document order.
fn collect_embedded<'t>(node: tree_sitter::Node<'t>, out: &mut Vec<tree_sitter::Node<'t>>) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if comments::is_comment(child) {
            out.push(child);
        } else if is_literal(child.kind()) {
            if child.start_position().row != child.end_position().row {
                out.push(child);
            }
        } else {
            collect_embedded(child, out);
        }
    }
}

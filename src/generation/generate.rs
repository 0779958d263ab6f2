use dprint_core::formatting::PrintItems;
use dprint_core::formatting::Signal;

use crate::configuration::Configuration;

use super::comments;
use super::context::FormattingContext;
use super::declarations;
use super::helpers;

/// Generate dprint PrintItems IR from a tree-sitter parse tree.
///
/// Type declarations are normalized, comments are formatted, and every other
/// node keeps its source text re-indented to where it lands.
pub fn generate(source: &str, tree: &tree_sitter::Tree, config: &Configuration) -> PrintItems {
    let mut context = FormattingContext::new(source, config);
    gen_program(tree.root_node(), &mut context)
}

/// Generate PrintItems for a tree-sitter node.
pub fn gen_node(node: tree_sitter::Node, context: &mut FormattingContext) -> PrintItems {
    match node.kind() {
        "line_comment" | "block_comment" => comments::gen_comment(node, context),
        kind if declarations::is_type_declaration(kind) => {
            declarations::gen_type_declaration(node, context)
        }
        _ => {
            let base_columns = declarations::node_base_columns(node, context);
            declarations::gen_reindented(node, base_columns, context)
        }
    }
}

/// Generate a program node (the root of the parse tree).
///
/// Top-level items go one per line, keeping at most one blank line between
/// them. A comment that trailed an item stays on that item's line. Non-empty
/// output ends with a newline.
fn gen_program(node: tree_sitter::Node, context: &mut FormattingContext) -> PrintItems {
    let mut items = PrintItems::new();

    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();

    let mut prev_end = None;
    for child in children {
        if let Some(prev_end) = prev_end {
            if comments::is_comment(child) && comments::is_trailing_comment(child) {
                items.extend(helpers::gen_space());
            } else {
                items.push_signal(Signal::NewLine);
                if helpers::has_blank_line_between(context.source, prev_end, child.start_byte()) {
                    items.push_signal(Signal::NewLine);
                }
            }
        }

        items.extend(gen_node(child, context));
        prev_end = Some(child.end_byte());
    }

    if prev_end.is_some() {
        items.push_signal(Signal::NewLine);
    }

    items
}

use std::path::Path;

use anyhow::Result;
use dprint_core::configuration::resolve_new_line_kind;
use dprint_core::formatting::PrintOptions;

use crate::configuration::Configuration;
use crate::generation::generate;

/// Format a Java source file. Returns `Ok(None)` if no changes were made.
///
/// This is the production path: comments are formatted as part of the single
/// pass over the whole file.
pub fn format_text(
    _file_path: &Path,
    file_text: &str,
    config: &Configuration,
) -> Result<Option<String>> {
    let new_line_text = resolve_new_line_kind(file_text, config.new_line_kind);
    let formatted = format_text_inner(file_text, config, new_line_text)?;
    if formatted == file_text {
        Ok(None)
    } else {
        Ok(Some(formatted))
    }
}

pub(crate) fn format_text_inner(
    file_text: &str,
    config: &Configuration,
    new_line_text: &'static str,
) -> Result<String> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&tree_sitter_java::LANGUAGE.into())
        .map_err(|e| anyhow::anyhow!("Failed to load Java grammar: {}", e))?;

    let tree = parser
        .parse(file_text, None)
        .ok_or_else(|| anyhow::anyhow!("Failed to parse Java source"))?;

    if tree.root_node().has_error() {
        tracing::debug!("source has parse errors, leaving it unchanged");
        return Ok(file_text.to_string());
    }

    let print_items = generate(file_text, &tree, config);
    let print_options = build_print_options(config, new_line_text);

    Ok(dprint_core::formatting::format(
        || print_items,
        print_options,
    ))
}

pub(crate) fn build_print_options(config: &Configuration, new_line_text: &'static str) -> PrintOptions {
    PrintOptions {
        indent_width: config.indent_width,
        max_width: config.line_width,
        use_tabs: config.use_tabs,
        new_line_text,
    }
}

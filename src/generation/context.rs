use crate::configuration::Configuration;

/// Formatting context that tracks state during CST traversal.
pub struct FormattingContext<'a> {
    /// Reference to the source text being formatted.
    pub source: &'a str,

    /// Formatter configuration settings.
    pub config: &'a Configuration,

    /// Current indentation level (0-based). Mirrors the
    /// `StartIndent`/`FinishIndent` signals emitted so far, so comment
    /// reflow knows how much width the indentation takes.
    indent_level: usize,
}

impl<'a> FormattingContext<'a> {
    /// Create a new formatting context.
    pub fn new(source: &'a str, config: &'a Configuration) -> Self {
        Self {
            source,
            config,
            indent_level: 0,
        }
    }

    /// Get the current indentation level.
    pub fn indent_level(&self) -> usize {
        self.indent_level
    }

    /// Increase the indentation level by one.
    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    /// Decrease the indentation level by one.
    pub fn dedent(&mut self) {
        if self.indent_level > 0 {
            self.indent_level -= 1;
        }
    }

    /// Source text of a node.
    pub fn text(&self, node: tree_sitter::Node) -> &'a str {
        &self.source[node.start_byte()..node.end_byte()]
    }
}

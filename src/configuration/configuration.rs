use dprint_core::configuration::NewLineKind;
use serde::Deserialize;
use serde::Serialize;

/// Formatting style presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JavaStyle {
    /// 120-char line width, 4-space indent (palantir-java-format default).
    Palantir,
    /// 100-char line width, 2-space indent (google-java-format default).
    Google,
    /// 120-char line width, tab indent with a tab width of 4 (Eclipse JDT default).
    Eclipse,
}

dprint_core::generate_str_to_from![
    JavaStyle,
    [Palantir, "palantir"],
    [Google, "google"],
    [Eclipse, "eclipse"]
];

impl JavaStyle {
    #[must_use]
    pub fn line_width(self) -> u32 {
        match self {
            JavaStyle::Palantir | JavaStyle::Eclipse => 120,
            JavaStyle::Google => 100,
        }
    }

    #[must_use]
    pub fn indent_width(self) -> u8 {
        match self {
            JavaStyle::Palantir | JavaStyle::Eclipse => 4,
            JavaStyle::Google => 2,
        }
    }

    #[must_use]
    pub fn use_tabs(self) -> bool {
        matches!(self, JavaStyle::Eclipse)
    }
}

/// Resolved configuration shared by the formatter and the comment oracle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    /// Maximum line width before wrapping.
    pub line_width: u32,
    /// Number of spaces per indentation level.
    pub indent_width: u8,
    /// Column width of a tab character. Also the size of one indentation
    /// unit when measuring how deep a comment is indented.
    pub tab_width: usize,
    /// Whether to use tabs instead of spaces.
    pub use_tabs: bool,
    /// Newline character to use.
    pub new_line_kind: NewLineKind,
    /// Whether to reflow Javadoc comments.
    pub format_javadoc: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        let style = JavaStyle::Palantir;
        Self {
            line_width: style.line_width(),
            indent_width: style.indent_width(),
            tab_width: 4,
            use_tabs: style.use_tabs(),
            new_line_kind: NewLineKind::LineFeed,
            format_javadoc: false,
        }
    }
}

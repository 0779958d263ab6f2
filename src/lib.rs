pub mod comment_table;
pub mod configuration;
pub mod document;
pub mod fixture;
pub mod format_text;
pub mod formatter;
pub mod generation;
pub mod indentation;
pub mod oracle;

pub use format_text::format_text;
pub use formatter::CodeFormatter;
pub use formatter::JavaFormatter;
pub use oracle::expected_formatted_source;

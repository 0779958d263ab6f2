mod comments;
mod context;
mod declarations;
mod generate;
mod helpers;

pub use comments::format_comment_lines;
pub use context::FormattingContext;
pub use generate::generate;
pub use helpers::gen_line;

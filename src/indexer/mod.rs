pub mod comments;
pub mod parameters;
pub mod parser;
pub mod pipeline;
pub mod visitor;

pub use comments::CommentMap;
pub use parameters::collect_parameters;
pub use parser::{Comment, ParsedFile, Parser};
pub use pipeline::{IndexingReport, RubyIndexer};
pub use visitor::Visitor;

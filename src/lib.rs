pub mod config;
pub mod error;
pub mod index;
pub mod indexer;

pub use config::{Configuration, CONFIG_FILENAME, MAGIC_COMMENT_MARKERS};
pub use error::{IndexerError, Result};
pub use index::{
    Arity, Entry, EntryKind, Index, IndexStats, Location, Parameter, ParameterKind, Visibility,
};
pub use indexer::{IndexingReport, ParsedFile, Parser, RubyIndexer, Visitor};

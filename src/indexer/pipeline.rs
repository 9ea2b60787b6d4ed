use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use regex::Regex;
use serde::Serialize;

use crate::config::Configuration;
use crate::error::Result;
use crate::index::Index;
use crate::indexer::parser::{ParsedFile, Parser};
use crate::indexer::visitor::Visitor;

/// Summary of a batch indexing run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexingReport {
    pub files_indexed: usize,
    pub files_skipped: usize,
    pub entries: usize,
}

/// Parses Ruby sources and feeds their declarations into an [`Index`].
pub struct RubyIndexer {
    configuration: Configuration,
    magic_comments: Regex,
    excluded: Vec<glob::Pattern>,
    parser: Parser,
}

impl RubyIndexer {
    pub fn new(configuration: Configuration) -> Result<Self> {
        let magic_comments = configuration.magic_comment_regex()?;
        let excluded = configuration.excluded_globs()?;

        Ok(Self {
            configuration,
            magic_comments,
            excluded,
            parser: Parser::new(),
        })
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// False for paths matching an excluded pattern
    pub fn should_index(&self, path: &Path) -> bool {
        !self.excluded.iter().any(|pattern| pattern.matches_path(path))
    }

    /// Indexes one source. Returns the number of entries inserted.
    pub fn index_single(&self, index: &Index, file_path: &str, source: &str) -> Result<usize> {
        let parsed = self.parser.parse_source(source)?;
        Ok(self.visit(index, &parsed, file_path))
    }

    fn visit(&self, index: &Index, parsed: &ParsedFile, file_path: &str) -> usize {
        if parsed.has_errors() {
            tracing::debug!("{} has syntax errors, indexing the recovered tree", file_path);
        }
        Visitor::new(index, parsed, file_path, &self.magic_comments).run()
    }

    /// Indexes `(path, source)` pairs. Parsing runs in parallel; visiting runs
    /// in input order so entries sharing a name keep a deterministic order.
    pub fn index_all(&self, index: &Index, files: Vec<(PathBuf, String)>) -> IndexingReport {
        let mut report = IndexingReport::default();

        let (accepted, excluded): (Vec<_>, Vec<_>) = files
            .into_iter()
            .partition(|(path, _)| self.should_index(path));
        report.files_skipped += excluded.len();

        let parsed: Vec<(String, Result<ParsedFile>)> = accepted
            .par_iter()
            .map(|(path, source)| (path.display().to_string(), self.parser.parse_source(source)))
            .collect();

        for (file_path, result) in parsed {
            match result {
                Ok(parsed) => {
                    report.entries += self.visit(index, &parsed, &file_path);
                    report.files_indexed += 1;
                }
                Err(e) => {
                    tracing::warn!("Error parsing {}: {}", file_path, e);
                    report.files_skipped += 1;
                }
            }
        }

        tracing::info!(
            "Indexed {} entries from {} files ({} skipped)",
            report.entries,
            report.files_indexed,
            report.files_skipped
        );

        report
    }

    /// Reads and indexes an explicit list of files. Non-Ruby and unreadable
    /// files are skipped; a file named more than once is indexed once, at its
    /// first position.
    pub fn index_paths(&self, index: &Index, paths: &[PathBuf]) -> IndexingReport {
        let mut unreadable = 0;

        let mut seen = HashSet::new();
        let unique: Vec<&PathBuf> = paths
            .iter()
            .filter(|path| {
                let key = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
                let first = seen.insert(key);
                if !first {
                    tracing::debug!("Ignoring duplicate path {}", path.display());
                }
                first
            })
            .collect();

        let sources: Vec<Option<(PathBuf, String)>> = unique
            .par_iter()
            .map(|path| {
                if !Parser::is_supported(path) {
                    tracing::warn!("Skipping {}: not a Ruby file", path.display());
                    return None;
                }
                match std::fs::read_to_string(path) {
                    Ok(source) => Some((path.to_path_buf(), source)),
                    Err(e) => {
                        tracing::warn!("Error reading {}: {}", path.display(), e);
                        None
                    }
                }
            })
            .collect();

        let files: Vec<(PathBuf, String)> = sources
            .into_iter()
            .filter_map(|source| {
                if source.is_none() {
                    unreadable += 1;
                }
                source
            })
            .collect();

        let mut report = self.index_all(index, files);
        report.files_skipped += unreadable;
        report
    }
}

//! Indexing configuration.
//!
//! Loaded from a YAML document (conventionally `.index.yml`):
//!
//! ```yaml
//! excluded_patterns:
//!   - "**/test/fixtures/**"
//! excluded_magic_comments:
//!   - "sorbet"
//! ```

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{IndexerError, Result};

pub const CONFIG_FILENAME: &str = ".index.yml";

/// Comment directives that are never treated as documentation
pub const MAGIC_COMMENT_MARKERS: &[&str] = &[
    "frozen_string_literal",
    "typed",
    "compiled",
    "encoding",
    "shareable_constant_value",
    "warn_indent",
    "rubocop",
    "nodoc",
    "doc",
    "coding",
    "warn_past_scope",
];

static DEFAULT_MAGIC_COMMENT_REGEX: Lazy<Regex> = Lazy::new(|| {
    build_magic_comment_regex(MAGIC_COMMENT_MARKERS.iter().copied())
        .expect("built-in magic comment markers form a valid regex")
});

fn build_magic_comment_regex<'a>(markers: impl Iterator<Item = &'a str>) -> Result<Regex> {
    let alternatives: Vec<String> = markers.map(regex::escape).collect();
    let pattern = format!(r"^#\s*({}):", alternatives.join("|"));
    Regex::new(&pattern).map_err(|e| IndexerError::Config(format!("Invalid magic comment marker: {}", e)))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Configuration {
    /// Glob patterns for paths that must not be indexed
    pub excluded_patterns: Vec<String>,
    /// Extra comment directives excluded from documentation, on top of the built-in markers
    pub excluded_magic_comments: Vec<String>,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&content)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for pattern in &self.excluded_patterns {
            glob::Pattern::new(pattern)
                .map_err(|e| IndexerError::Config(format!("Invalid excluded pattern '{}': {}", pattern, e)))?;
        }
        for marker in &self.excluded_magic_comments {
            if marker.trim().is_empty() {
                return Err(IndexerError::Config("Empty magic comment marker".to_string()));
            }
        }
        Ok(())
    }

    /// Regex matching every comment directive, built-in and configured
    pub fn magic_comment_regex(&self) -> Result<Regex> {
        if self.excluded_magic_comments.is_empty() {
            return Ok(DEFAULT_MAGIC_COMMENT_REGEX.clone());
        }

        build_magic_comment_regex(
            MAGIC_COMMENT_MARKERS
                .iter()
                .copied()
                .chain(self.excluded_magic_comments.iter().map(String::as_str)),
        )
    }

    /// Compiled exclusion patterns
    pub fn excluded_globs(&self) -> Result<Vec<glob::Pattern>> {
        self.excluded_patterns
            .iter()
            .map(|pattern| {
                glob::Pattern::new(pattern)
                    .map_err(|e| IndexerError::Config(format!("Invalid excluded pattern '{}': {}", pattern, e)))
            })
            .collect()
    }
}

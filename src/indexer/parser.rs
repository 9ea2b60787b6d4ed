use std::path::Path;

use crate::error::{IndexerError, Result};

const RUBY_EXTENSIONS: &[&str] = &["rb", "rake", "gemspec", "ru", "rbi"];
const RUBY_FILENAMES: &[&str] = &["Gemfile", "Rakefile"];

/// A source comment as reported by the parser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// 1-based line the comment starts on
    pub line: usize,
    /// Literal text including the `#` marker
    pub text: String,
    /// Comment follows code on the same line (`foo # bar`)
    pub trailing: bool,
}

impl Comment {
    /// `=begin`/`=end` documents are not line comments
    pub fn is_line_comment(&self) -> bool {
        self.text.starts_with('#')
    }
}

pub struct Parser {
    language: tree_sitter::Language,
}

impl Parser {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_ruby::LANGUAGE.into(),
        }
    }

    pub fn is_supported(path: &Path) -> bool {
        let by_extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| RUBY_EXTENSIONS.contains(&ext));
        let by_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| RUBY_FILENAMES.contains(&name));
        by_extension || by_name
    }

    pub fn parse_file(&self, path: &Path) -> Result<ParsedFile> {
        if !Self::is_supported(path) {
            return Err(IndexerError::UnsupportedFile(path.display().to_string()));
        }

        let source = std::fs::read_to_string(path)?;
        self.parse_source(&source)
    }

    /// Parses `source` into a best-effort tree. Syntax errors never fail the
    /// parse; they surface as `ERROR`/missing nodes inside the tree.
    pub fn parse_source(&self, source: &str) -> Result<ParsedFile> {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| IndexerError::Parse(e.to_string()))?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| IndexerError::Parse("Failed to parse source".to_string()))?;

        let comments = collect_comments(&tree, source);

        Ok(ParsedFile {
            tree,
            source: source.to_string(),
            comments,
        })
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ParsedFile {
    pub tree: tree_sitter::Tree,
    pub source: String,
    pub comments: Vec<Comment>,
}

impl ParsedFile {
    pub fn root_node(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }

    pub fn source_bytes(&self) -> &[u8] {
        self.source.as_bytes()
    }

    pub fn node_text(&self, node: &tree_sitter::Node) -> &str {
        node.utf8_text(self.source_bytes()).unwrap_or("")
    }

    pub fn has_errors(&self) -> bool {
        self.root_node().has_error()
    }
}

/// Comments are extras in tree-sitter, so they can sit anywhere in the tree.
/// A preorder walk yields them in source order.
fn collect_comments(tree: &tree_sitter::Tree, source: &str) -> Vec<Comment> {
    let mut comments = Vec::new();
    let bytes = source.as_bytes();
    let mut cursor = tree.walk();

    'walk: loop {
        let node = cursor.node();

        if node.kind() == "comment" {
            let line_start = bytes[..node.start_byte()]
                .iter()
                .rposition(|&b| b == b'\n')
                .map_or(0, |pos| pos + 1);
            let trailing = bytes[line_start..node.start_byte()]
                .iter()
                .any(|b| !b.is_ascii_whitespace());

            comments.push(Comment {
                line: node.start_position().row + 1,
                text: node.utf8_text(bytes).unwrap_or("").to_string(),
                trailing,
            });
        }

        if cursor.goto_first_child() {
            continue;
        }

        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                break 'walk;
            }
        }
    }

    comments
}

//! Documentation comments attached to declarations.

use std::collections::HashMap;

use regex::Regex;

use crate::indexer::parser::Comment;

/// Own-line `#` comments keyed by their 1-based line.
pub struct CommentMap<'a> {
    by_line: HashMap<usize, &'a Comment>,
    magic_comments: &'a Regex,
}

impl<'a> CommentMap<'a> {
    pub fn new(comments: &'a [Comment], magic_comments: &'a Regex) -> Self {
        let mut by_line = HashMap::with_capacity(comments.len());
        for comment in comments {
            if comment.trailing || !comment.is_line_comment() {
                continue;
            }
            by_line.entry(comment.line).or_insert(comment);
        }

        Self {
            by_line,
            magic_comments,
        }
    }

    pub fn has_comment(&self, line: usize) -> bool {
        self.by_line.contains_key(&line)
    }

    /// Documentation for a declaration starting on `line`.
    ///
    /// Scans upward from the line above (tolerating one blank line directly
    /// above the declaration) until a line without a comment. Directive
    /// comments are dropped but do not end the block.
    pub fn collect(&self, line: usize) -> Vec<String> {
        let mut comments = Vec::new();

        let Some(mut current) = line.checked_sub(1) else {
            return comments;
        };
        if !self.has_comment(current) {
            current = current.saturating_sub(1);
        }

        while current >= 1 {
            let Some(comment) = self.by_line.get(&current) else {
                break;
            };

            let text = comment.text.trim_end_matches(['\r', '\n']);
            if !self.magic_comments.is_match(text) {
                let content = text.strip_prefix('#').unwrap_or(text);
                let content = content.strip_prefix(' ').unwrap_or(content);
                comments.push(content.to_string());
            }

            current -= 1;
        }

        comments.reverse();
        comments
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::index::arity::Arity;

/// Source span of a declaration: 1-based lines, 0-based byte columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl Location {
    pub fn new(start_line: u32, start_column: u32, end_line: u32, end_column: u32) -> Self {
        Self {
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }

    pub fn from_node(node: &tree_sitter::Node) -> Self {
        let start = node.start_position();
        let end = node.end_position();
        Self::new(
            start.row as u32 + 1,
            start.column as u32,
            end.row as u32 + 1,
            end.column as u32,
        )
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}:{}-{}",
            self.start_line, self.start_column, self.end_line, self.end_column
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
    Protected,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
            Visibility::Protected => "protected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "public" => Some(Visibility::Public),
            "private" => Some(Visibility::Private),
            "protected" => Some(Visibility::Protected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    /// Positional parameter before any optional or rest parameter
    Required,
    Optional,
    Rest,
    Keyword,
    KeywordRest,
    Block,
    /// Positional parameter following an optional or rest group
    PostRequired,
    /// `...` argument forwarding
    Forward,
}

impl ParameterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterKind::Required => "required",
            ParameterKind::Optional => "optional",
            ParameterKind::Rest => "rest",
            ParameterKind::Keyword => "keyword",
            ParameterKind::KeywordRest => "keyword_rest",
            ParameterKind::Block => "block",
            ParameterKind::PostRequired => "post_required",
            ParameterKind::Forward => "forward",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub kind: ParameterKind,
}

impl Parameter {
    pub fn new(name: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntryKind {
    Class {
        /// Superclass expression as written, if any
        #[serde(skip_serializing_if = "Option::is_none")]
        superclass: Option<String>,
    },
    Module,
    Constant,
    /// Constant whose value is another constant, not yet resolved against the index
    UnresolvedAlias {
        target: String,
        /// Namespace stack at the definition site
        nesting: Vec<String>,
    },
    Method {
        #[serde(skip_serializing_if = "Option::is_none")]
        owner: Option<String>,
        parameters: Vec<Parameter>,
    },
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Class { .. } => "class",
            EntryKind::Module => "module",
            EntryKind::Constant => "constant",
            EntryKind::UnresolvedAlias { .. } => "unresolved_alias",
            EntryKind::Method { .. } => "method",
        }
    }
}

/// One indexed declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    pub file_path: String,
    pub location: Location,
    pub comments: Vec<String>,
    pub visibility: Visibility,
    pub kind: EntryKind,
}

impl Entry {
    pub fn new(
        name: impl Into<String>,
        file_path: impl Into<String>,
        location: Location,
        kind: EntryKind,
    ) -> Self {
        Self {
            name: name.into(),
            file_path: file_path.into(),
            location,
            comments: Vec::new(),
            visibility: Visibility::Public,
            kind,
        }
    }

    pub fn with_comments(mut self, comments: Vec<String>) -> Self {
        self.comments = comments;
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// `file_path:start_line-start_column:end_line-end_column`
    pub fn location_string(&self) -> String {
        format!("{}:{}", self.file_path, self.location)
    }

    pub fn parameters(&self) -> &[Parameter] {
        match &self.kind {
            EntryKind::Method { parameters, .. } => parameters,
            _ => &[],
        }
    }

    pub fn owner(&self) -> Option<&str> {
        match &self.kind {
            EntryKind::Method { owner, .. } => owner.as_deref(),
            _ => None,
        }
    }

    pub fn is_method(&self) -> bool {
        matches!(self.kind, EntryKind::Method { .. })
    }

    /// Whether a call with `count` positional arguments fits this method.
    /// Always false for non-method entries.
    pub fn accepts_arity(&self, count: usize) -> bool {
        match &self.kind {
            EntryKind::Method { parameters, .. } => Arity::from_parameters(parameters).accepts(count),
            _ => false,
        }
    }
}

/// Entry counts for a populated index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub total_files: usize,
    pub total_names: usize,
    pub total_entries: usize,
    pub entries_by_kind: Vec<(String, usize)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method(parameters: Vec<Parameter>) -> Entry {
        Entry::new(
            "bar",
            "/fake/path/foo.rb",
            Location::new(2, 2, 3, 5),
            EntryKind::Method {
                owner: Some("Foo".to_string()),
                parameters,
            },
        )
    }

    #[test]
    fn test_location_display() {
        let location = Location::new(2, 2, 3, 5);
        assert_eq!(location.to_string(), "2-2:3-5");
    }

    #[test]
    fn test_location_string_includes_path() {
        let entry = method(Vec::new());
        assert_eq!(entry.location_string(), "/fake/path/foo.rb:2-2:3-5");
    }

    #[test]
    fn test_entry_defaults_to_public() {
        let entry = Entry::new("Foo", "foo.rb", Location::new(1, 0, 1, 9), EntryKind::Module);
        assert_eq!(entry.visibility, Visibility::Public);
        assert!(entry.comments.is_empty());
    }

    #[test]
    fn test_visibility_from_str() {
        assert_eq!(Visibility::from_str("private"), Some(Visibility::Private));
        assert_eq!(Visibility::from_str("protected"), Some(Visibility::Protected));
        assert_eq!(Visibility::from_str("public"), Some(Visibility::Public));
        assert_eq!(Visibility::from_str("module_function"), None);
    }

    #[test]
    fn test_accepts_arity_only_for_methods() {
        let constant = Entry::new("FOO", "foo.rb", Location::new(1, 0, 1, 7), EntryKind::Constant);
        assert!(!constant.accepts_arity(0));

        let entry = method(vec![Parameter::new("a", ParameterKind::Required)]);
        assert!(entry.accepts_arity(1));
        assert!(!entry.accepts_arity(0));
    }

    #[test]
    fn test_owner_and_parameters_accessors() {
        let entry = method(vec![Parameter::new("a", ParameterKind::Required)]);
        assert_eq!(entry.owner(), Some("Foo"));
        assert_eq!(entry.parameters().len(), 1);

        let module = Entry::new("Foo", "foo.rb", Location::new(1, 0, 2, 3), EntryKind::Module);
        assert_eq!(module.owner(), None);
        assert!(module.parameters().is_empty());
    }

    #[test]
    fn test_entry_serializes_kind_tag() {
        let entry = Entry::new(
            "A",
            "a.rb",
            Location::new(1, 0, 1, 5),
            EntryKind::UnresolvedAlias {
                target: "B".to_string(),
                nesting: vec!["Outer".to_string()],
            },
        );
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["kind"]["type"], "unresolved_alias");
        assert_eq!(json["kind"]["target"], "B");
        assert_eq!(json["visibility"], "public");
    }
}

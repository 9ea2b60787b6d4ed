//! Declaration visitor for a single Ruby file.
//!
//! Walks the tree once, keeping a stack of the lexically enclosing class and
//! module names, and inserts an [`Entry`] for every class, module, constant and
//! method it can name statically. Node kinds it does not know are traversed
//! transparently, so declarations inside conditionals, blocks and
//! error-recovered regions are still found.

use regex::Regex;
use tree_sitter::Node;

use crate::index::{Entry, EntryKind, Index, Location, Parameter, ParameterKind, Visibility};
use crate::indexer::comments::CommentMap;
use crate::indexer::parameters::collect_parameters;
use crate::indexer::parser::ParsedFile;

const NAMESPACE_SEPARATOR: &str = "::";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NamespaceKind {
    Class,
    Module,
}

pub struct Visitor<'a> {
    index: &'a Index,
    parsed: &'a ParsedFile,
    file_path: &'a str,
    comments: CommentMap<'a>,
    /// Local names of the enclosing class/module bodies, outermost first
    stack: Vec<String>,
    /// Default method visibility of each enclosing body
    visibility_scopes: Vec<Visibility>,
    inserted: usize,
}

impl<'a> Visitor<'a> {
    pub fn new(index: &'a Index, parsed: &'a ParsedFile, file_path: &'a str, magic_comments: &'a Regex) -> Self {
        Self {
            index,
            parsed,
            file_path,
            comments: CommentMap::new(&parsed.comments, magic_comments),
            stack: Vec::new(),
            visibility_scopes: vec![Visibility::Public],
            inserted: 0,
        }
    }

    /// Visits the whole file. Returns the number of entries inserted.
    pub fn run(mut self) -> usize {
        let parsed = self.parsed;
        self.visit(parsed.root_node());
        self.inserted
    }

    fn visit(&mut self, node: Node<'a>) {
        match node.kind() {
            "class" => self.visit_namespace(node, NamespaceKind::Class),
            "module" => self.visit_namespace(node, NamespaceKind::Module),
            "singleton_class" => self.within_visibility_scope(|visitor| visitor.visit_children(node)),
            "assignment" | "operator_assignment" => self.visit_assignment(node),
            "method" | "singleton_method" => self.visit_method(node, None),
            "call" => self.visit_call(node),
            "identifier" => self.visit_identifier(node),
            _ => self.visit_children(node),
        }
    }

    fn visit_children(&mut self, node: Node<'a>) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.visit(child);
        }
    }

    /// Visits every named child except the ones stored under `skipped` fields.
    fn visit_children_except(&mut self, node: Node<'a>, skipped: &[&str]) {
        let mut cursor = node.walk();
        if !cursor.goto_first_child() {
            return;
        }

        loop {
            let child = cursor.node();
            let skip = cursor.field_name().is_some_and(|field| skipped.contains(&field));
            if child.is_named() && !skip {
                self.visit(child);
            }
            if !cursor.goto_next_sibling() {
                break;
            }
        }
    }

    fn text(&self, node: Node<'a>) -> &'a str {
        let parsed = self.parsed;
        parsed.node_text(&node)
    }

    fn insert(&mut self, entry: Entry) {
        self.index.insert(entry);
        self.inserted += 1;
    }

    fn collect_comments(&self, node: Node<'a>) -> Vec<String> {
        self.comments.collect(node.start_position().row + 1)
    }

    // -- namespaces --------------------------------------------------------

    fn visit_namespace(&mut self, node: Node<'a>, kind: NamespaceKind) {
        let name = node
            .child_by_field_name("name")
            .map(|name| self.text(name))
            .unwrap_or("");

        // the superclass expression is evaluated in the enclosing scope
        let superclass = node.child_by_field_name("superclass");
        if let Some(superclass) = superclass {
            self.visit_children(superclass);
        }

        if !looks_like_constant_path(name) {
            tracing::debug!(
                "Skipping dynamically named {:?} '{}' in {}",
                kind,
                name,
                self.file_path
            );
            self.within_visibility_scope(|visitor| {
                visitor.visit_children_except(node, &["name", "superclass"])
            });
            return;
        }

        let entry_kind = match kind {
            NamespaceKind::Class => EntryKind::Class {
                superclass: superclass.and_then(|s| self.superclass_name(s)),
            },
            NamespaceKind::Module => EntryKind::Module,
        };

        let entry = Entry::new(
            self.fully_qualify(name),
            self.file_path,
            Location::from_node(&node),
            entry_kind,
        )
        .with_comments(self.collect_comments(node));
        self.insert(entry);

        self.within_namespace(name, |visitor| {
            visitor.visit_children_except(node, &["name", "superclass"])
        });
    }

    fn superclass_name(&self, superclass: Node<'a>) -> Option<String> {
        let mut cursor = superclass.walk();
        let expression = superclass.named_children(&mut cursor).next()?;
        Some(self.text(expression).to_string())
    }

    /// Runs `f` with `name` pushed on the namespace stack and a fresh public
    /// visibility scope; both are popped before returning.
    fn within_namespace<F>(&mut self, name: &str, f: F)
    where
        F: FnOnce(&mut Self),
    {
        self.stack.push(name.to_string());
        self.within_visibility_scope(f);
        self.stack.pop();
    }

    fn within_visibility_scope<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Self),
    {
        self.visibility_scopes.push(Visibility::Public);
        f(self);
        self.visibility_scopes.pop();
    }

    /// Fully-qualified name of the innermost enclosing namespace. A rooted
    /// (`::Foo`) stack element restarts qualification from the top level.
    fn current_namespace(&self) -> Option<String> {
        let start = self
            .stack
            .iter()
            .rposition(|name| name.starts_with(NAMESPACE_SEPARATOR))
            .unwrap_or(0);

        let parts: Vec<&str> = self.stack[start..]
            .iter()
            .map(|name| name.trim_start_matches(NAMESPACE_SEPARATOR))
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(NAMESPACE_SEPARATOR))
        }
    }

    fn fully_qualify(&self, name: &str) -> String {
        if let Some(rooted) = name.strip_prefix(NAMESPACE_SEPARATOR) {
            return rooted.to_string();
        }

        match self.current_namespace() {
            Some(namespace) => format!("{}{}{}", namespace, NAMESPACE_SEPARATOR, name),
            None => name.to_string(),
        }
    }

    // -- constants ---------------------------------------------------------

    fn visit_assignment(&mut self, node: Node<'a>) {
        let target = node
            .child_by_field_name("left")
            .filter(|left| is_static_constant_path(*left));

        match target {
            Some(left) => {
                let name = self.fully_qualify(self.text(left));
                self.add_constant(node, name);
            }
            None => {
                if let Some(left) = node.child_by_field_name("left") {
                    if left.kind() == "scope_resolution" {
                        tracing::debug!(
                            "Skipping constant with dynamic namespace '{}' in {}",
                            self.text(left),
                            self.file_path
                        );
                    }
                }
                self.visit_children(node);
            }
        }
    }

    fn add_constant(&mut self, node: Node<'a>, name: String) {
        let comments = self.collect_comments(node);
        let value = node.child_by_field_name("right");

        let kind = match value {
            Some(value) if is_constant_reference(value) => EntryKind::UnresolvedAlias {
                target: self.text(value).to_string(),
                nesting: self.stack.clone(),
            },
            Some(value) if is_constant_write(value) => {
                // `A = B = 1`: B is a declaration of its own
                self.visit(value);
                let target = value
                    .child_by_field_name("left")
                    .map(|left| self.text(left))
                    .unwrap_or("");
                EntryKind::UnresolvedAlias {
                    target: target.to_string(),
                    nesting: self.stack.clone(),
                }
            }
            Some(value) => {
                self.visit(value);
                EntryKind::Constant
            }
            None => EntryKind::Constant,
        };

        let entry = Entry::new(name, self.file_path, Location::from_node(&node), kind)
            .with_comments(comments);
        self.insert(entry);
    }

    // -- calls -------------------------------------------------------------

    fn visit_call(&mut self, node: Node<'a>) {
        let message = node.child_by_field_name("method").map(|method| self.text(method));
        let has_receiver = node.child_by_field_name("receiver").is_some();

        match message {
            Some("private_constant") => self.handle_private_constant(node),
            Some(attribute @ ("attr_reader" | "attr_writer" | "attr_accessor")) if !has_receiver => {
                self.handle_attribute(node, attribute)
            }
            Some(marker @ ("private" | "protected" | "public")) if !has_receiver => {
                if let Some(visibility) = Visibility::from_str(marker) {
                    self.handle_visibility_call(node, visibility);
                    return;
                }
            }
            _ => {}
        }

        self.visit_children(node);
    }

    /// `private_constant :FOO, "BAR"` marks constants of the current namespace
    /// private. The name is never resolved through ancestors or aliases.
    fn handle_private_constant(&mut self, node: Node<'a>) {
        let Some(arguments) = node.child_by_field_name("arguments") else {
            return;
        };

        let prefix = match node.child_by_field_name("receiver") {
            None => None,
            Some(receiver) if receiver.kind() == "self" => None,
            Some(receiver) if is_static_constant_path(receiver) => Some(self.text(receiver)),
            Some(receiver) => {
                tracing::debug!(
                    "Ignoring private_constant on dynamic receiver '{}' in {}",
                    self.text(receiver),
                    self.file_path
                );
                return;
            }
        };

        for name in self.literal_names(arguments) {
            let name = match prefix {
                Some(prefix) => format!("{}{}{}", prefix, NAMESPACE_SEPARATOR, name),
                None => name,
            };
            let qualified = self.fully_qualify(&name);

            if self.index.set_visibility(&qualified, Visibility::Private) == 0 {
                tracing::debug!(
                    "private_constant target '{}' not indexed (in {})",
                    qualified,
                    self.file_path
                );
            }
        }
    }

    /// `attr_reader`/`attr_writer`/`attr_accessor` define reader and writer methods.
    fn handle_attribute(&mut self, node: Node<'a>, attribute: &str) {
        let Some(arguments) = node.child_by_field_name("arguments") else {
            return;
        };

        let reader = attribute != "attr_writer";
        let writer = attribute != "attr_reader";
        let comments = self.collect_comments(node);
        let owner = self.current_namespace();
        let visibility = self.current_visibility();

        let mut cursor = arguments.walk();
        let argument_nodes: Vec<Node<'a>> = arguments.named_children(&mut cursor).collect();

        for argument in argument_nodes {
            let Some(name) = self.literal_name(argument) else {
                continue;
            };
            let location = Location::from_node(&argument);

            if reader {
                let entry = Entry::new(
                    name.clone(),
                    self.file_path,
                    location,
                    EntryKind::Method {
                        owner: owner.clone(),
                        parameters: Vec::new(),
                    },
                )
                .with_comments(comments.clone())
                .with_visibility(visibility);
                self.insert(entry);
            }

            if writer {
                let entry = Entry::new(
                    format!("{}=", name),
                    self.file_path,
                    location,
                    EntryKind::Method {
                        owner: owner.clone(),
                        parameters: vec![Parameter::new(name, ParameterKind::Required)],
                    },
                )
                .with_comments(comments.clone())
                .with_visibility(visibility);
                self.insert(entry);
            }
        }
    }

    /// `private`, `private def foo; end`, `private :foo, :bar`
    fn handle_visibility_call(&mut self, node: Node<'a>, visibility: Visibility) {
        let arguments = node.child_by_field_name("arguments");
        let argument_nodes: Vec<Node<'a>> = match arguments {
            Some(arguments) => {
                let mut cursor = arguments.walk();
                arguments.named_children(&mut cursor).collect()
            }
            None => Vec::new(),
        };

        if argument_nodes.is_empty() && is_namespace_statement(node) {
            self.set_current_visibility(visibility);
        }

        for argument in argument_nodes {
            match argument.kind() {
                "method" | "singleton_method" => self.visit_method(argument, Some(visibility)),
                _ => match self.literal_name(argument) {
                    Some(name) => self.set_method_visibility(&name, visibility),
                    None => self.visit(argument),
                },
            }
        }

        if let Some(block) = node.child_by_field_name("block") {
            self.visit(block);
        }
    }

    fn set_method_visibility(&mut self, name: &str, visibility: Visibility) {
        let owner = self.current_namespace();
        self.index.update(name, |entry| {
            if entry.is_method() && entry.owner() == owner.as_deref() {
                entry.visibility = visibility;
            }
        });
    }

    fn literal_names(&self, arguments: Node<'a>) -> Vec<String> {
        let mut cursor = arguments.walk();
        arguments
            .named_children(&mut cursor)
            .filter_map(|argument| self.literal_name(argument))
            .collect()
    }

    /// Text of a symbol or string literal without interpolation
    fn literal_name(&self, node: Node<'a>) -> Option<String> {
        match node.kind() {
            "simple_symbol" => {
                let name = self.text(node).trim_start_matches(':');
                (!name.is_empty()).then(|| name.to_string())
            }
            "string" | "delimited_symbol" => {
                let mut cursor = node.walk();
                let mut children = node.named_children(&mut cursor);
                match (children.next(), children.next()) {
                    (Some(content), None) if content.kind() == "string_content" => {
                        Some(self.text(content).to_string())
                    }
                    _ => None,
                }
            }
            _ => None,
        }
    }

    // -- methods -----------------------------------------------------------

    fn visit_method(&mut self, node: Node<'a>, visibility: Option<Visibility>) {
        if let Some(name) = node.child_by_field_name("name") {
            let name = self.text(name);
            let parameters = node
                .child_by_field_name("parameters")
                .map(|list| collect_parameters(list, self.parsed.source_bytes()))
                .unwrap_or_default();

            // section markers only apply to instance methods
            let visibility = visibility.unwrap_or_else(|| {
                if node.kind() == "singleton_method" {
                    Visibility::Public
                } else {
                    self.current_visibility()
                }
            });

            if !name.is_empty() {
                let entry = Entry::new(
                    name,
                    self.file_path,
                    Location::from_node(&node),
                    EntryKind::Method {
                        owner: self.current_namespace(),
                        parameters,
                    },
                )
                .with_comments(self.collect_comments(node))
                .with_visibility(visibility);
                self.insert(entry);
            }
        }

        self.visit_children_except(node, &["name", "object"]);
    }

    /// A bare `private`/`protected`/`public` statement changes the default
    /// visibility for the rest of the enclosing body.
    fn visit_identifier(&mut self, node: Node<'a>) {
        if let Some(visibility) = Visibility::from_str(self.text(node)) {
            if is_namespace_statement(node) {
                self.set_current_visibility(visibility);
            }
        }
    }

    fn current_visibility(&self) -> Visibility {
        self.visibility_scopes.last().copied().unwrap_or_default()
    }

    fn set_current_visibility(&mut self, visibility: Visibility) {
        if let Some(current) = self.visibility_scopes.last_mut() {
            *current = visibility;
        }
    }
}

/// Class and module names must start with an uppercase letter or `::`
fn looks_like_constant_path(name: &str) -> bool {
    name.starts_with(NAMESPACE_SEPARATOR) || name.starts_with(|c: char| c.is_ascii_uppercase())
}

/// `Foo`, `::Foo` and `Foo::Bar`, but not `foo::Bar` or `self.class::Bar`
fn is_static_constant_path(node: Node<'_>) -> bool {
    match node.kind() {
        "constant" => true,
        "scope_resolution" => {
            let name_is_constant = node
                .child_by_field_name("name")
                .is_some_and(|name| name.kind() == "constant");
            let scope_is_static = node
                .child_by_field_name("scope")
                .map_or(true, is_static_constant_path);
            name_is_constant && scope_is_static
        }
        _ => false,
    }
}

/// A read of a constant, with any receiver (`Foo`, `Foo::Bar`, `foo::Bar`)
fn is_constant_reference(node: Node<'_>) -> bool {
    match node.kind() {
        "constant" => true,
        "scope_resolution" => node
            .child_by_field_name("name")
            .is_some_and(|name| name.kind() == "constant"),
        _ => false,
    }
}

fn is_constant_write(node: Node<'_>) -> bool {
    matches!(node.kind(), "assignment" | "operator_assignment")
        && node
            .child_by_field_name("left")
            .is_some_and(is_constant_reference)
}

/// Whether `node` is a statement directly inside the top level or a
/// class/module body, as opposed to inside a method or block.
fn is_namespace_statement(node: Node<'_>) -> bool {
    let Some(parent) = node.parent() else {
        return false;
    };

    match parent.kind() {
        "program" | "class" | "module" | "singleton_class" => true,
        "body_statement" => parent
            .parent()
            .is_some_and(|owner| matches!(owner.kind(), "class" | "module" | "singleton_class")),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;
    use crate::indexer::parser::Parser;

    const FILE: &str = "/fake/path/foo.rb";

    fn index(source: &str) -> Index {
        let index = Index::new();
        let parsed = Parser::new().parse_source(source).unwrap();
        let regex = Configuration::new().magic_comment_regex().unwrap();
        Visitor::new(&index, &parsed, FILE, &regex).run();
        index
    }

    fn single(index: &Index, name: &str) -> Entry {
        let entries = index.get(name);
        assert_eq!(entries.len(), 1, "expected exactly one entry for {}", name);
        entries.into_iter().next().unwrap()
    }

    fn assert_entry(index: &Index, name: &str, kind: &str, location: &str) {
        let entry = single(index, name);
        assert_eq!(entry.kind.as_str(), kind, "kind of {}", name);
        assert_eq!(entry.location_string(), format!("{}:{}", FILE, location));
    }

    mod namespaces {
        use super::*;

        #[test]
        fn test_nested_names_are_qualified() {
            let index = index("module Foo\n  class Bar\n    BAZ = 1\n  end\nend\n");

            assert_entry(&index, "Foo", "module", "1-0:5-3");
            assert_entry(&index, "Foo::Bar", "class", "2-2:4-5");
            assert_entry(&index, "Foo::Bar::BAZ", "constant", "3-4:3-11");
        }

        #[test]
        fn test_compact_path_name() {
            let index = index("class Foo::Bar\n  BAZ = 1\nend\n");

            assert_entry(&index, "Foo::Bar", "class", "1-0:3-3");
            assert_entry(&index, "Foo::Bar::BAZ", "constant", "2-2:2-9");
        }

        #[test]
        fn test_rooted_names_ignore_the_stack() {
            let index = index(
                "module Foo\n  class ::Bar\n    BAZ = 1\n  end\n  ::TOP = 2\n  QUX = 3\nend\n",
            );

            assert!(index.contains("Bar"));
            assert!(index.contains("Bar::BAZ"));
            assert!(index.contains("TOP"));
            assert!(index.contains("Foo::QUX"));
            assert!(!index.contains("Foo::Bar"));
        }

        #[test]
        fn test_stack_is_popped_after_body() {
            let index = index("module Foo\n  class Bar\n  end\n  BAZ = 1\nend\nQUX = 2\n");

            assert!(index.contains("Foo::BAZ"));
            assert!(index.contains("QUX"));
        }

        #[test]
        fn test_reopened_class_yields_entries_in_source_order() {
            let index = index("class Foo\nend\n\nclass Foo\nend\n");

            let entries = index.get("Foo");
            assert_eq!(entries.len(), 2);
            assert_eq!(entries[0].location.start_line, 1);
            assert_eq!(entries[1].location.start_line, 4);
        }

        #[test]
        fn test_superclass_recorded() {
            let index = index("class Foo < Bar::Baz\nend\n");

            assert_eq!(
                single(&index, "Foo").kind,
                EntryKind::Class {
                    superclass: Some("Bar::Baz".to_string())
                }
            );
        }

        #[test]
        fn test_dynamic_class_name_skipped_but_body_visited() {
            let index = index("class foo::Bar\n  def baz\n  end\n  QUX = 1\nend\n");

            assert!(!index.contains("Bar"));
            assert!(!index.contains("foo::Bar"));
            assert!(index.contains("baz"));
            // no namespace was pushed
            assert!(index.contains("QUX"));
        }

        #[test]
        fn test_declarations_inside_unhandled_nodes() {
            let index = index(
                "module Foo\n  if RUBY_VERSION > \"3\"\n    class Bar\n    end\n  end\n  included do\n    def baz\n    end\n  end\nend\n",
            );

            assert!(index.contains("Foo::Bar"));
            assert_eq!(single(&index, "baz").owner(), Some("Foo"));
        }

        #[test]
        fn test_partial_source_does_not_panic() {
            let index = index("module Foo\n  class\n  def bar(\nend\nmodule Baz\n");
            // whatever was recovered, the visitor finishes
            let _ = index.names();
        }
    }

    mod constants {
        use super::*;

        #[test]
        fn test_plain_and_conditional_writes() {
            let index = index("FOO = 1\nBAR ||= 2\nBAZ &&= 3\nQUX += 4\n");

            for name in ["FOO", "BAR", "BAZ", "QUX"] {
                assert_eq!(single(&index, name).kind, EntryKind::Constant);
            }
        }

        #[test]
        fn test_path_writes() {
            let index = index("module Foo\n  Bar::BAZ = 1\n  Bar::QUX ||= 2\n  ::TOP += 3\nend\n");

            assert!(index.contains("Foo::Bar::BAZ"));
            assert!(index.contains("Foo::Bar::QUX"));
            assert!(index.contains("TOP"));
        }

        #[test]
        fn test_dynamic_receivers_are_ignored() {
            let index = index("foo::BAR = 1\nself.class::BAZ = 2\n");

            assert!(index.is_empty());
        }

        #[test]
        fn test_alias_to_constant_reference() {
            let index = index("module Outer\n  A = Foo::Bar\nend\n");

            assert_eq!(
                single(&index, "Outer::A").kind,
                EntryKind::UnresolvedAlias {
                    target: "Foo::Bar".to_string(),
                    nesting: vec!["Outer".to_string()],
                }
            );
        }

        #[test]
        fn test_chained_assignment_creates_both_entries() {
            let index = index("A = B = 1\n");

            assert_entry(&index, "A", "unresolved_alias", "1-0:1-9");
            assert_entry(&index, "B", "constant", "1-4:1-9");
            assert_eq!(
                single(&index, "A").kind,
                EntryKind::UnresolvedAlias {
                    target: "B".to_string(),
                    nesting: Vec::new(),
                }
            );
        }

        #[test]
        fn test_chained_path_assignment() {
            let index = index("A = Foo::B = 1\n");

            assert!(matches!(
                &single(&index, "A").kind,
                EntryKind::UnresolvedAlias { target, .. } if target == "Foo::B"
            ));
            assert_eq!(single(&index, "Foo::B").kind, EntryKind::Constant);
        }

        #[test]
        fn test_method_call_value_is_not_an_alias() {
            let index = index("A = Foo::bar\n");

            assert_eq!(single(&index, "A").kind, EntryKind::Constant);
        }

        #[test]
        fn test_declarations_inside_constant_values() {
            let index = index("Point = Struct.new(:x) do\n  def norm\n  end\nend\n");

            assert_eq!(single(&index, "Point").kind, EntryKind::Constant);
            assert!(index.contains("norm"));
        }
    }

    mod private_constant {
        use super::*;

        #[test]
        fn test_marks_existing_constant_private() {
            let index = index(
                "class Foo\n  BAR = 1\n  BAZ = 2\n  private_constant :BAR\nend\n",
            );

            assert_eq!(single(&index, "Foo::BAR").visibility, Visibility::Private);
            assert_eq!(single(&index, "Foo::BAZ").visibility, Visibility::Public);
        }

        #[test]
        fn test_accepts_strings_and_multiple_names() {
            let index = index("class Foo\n  A = 1\n  B = 2\n  private_constant \"A\", :B\nend\n");

            assert_eq!(single(&index, "Foo::A").visibility, Visibility::Private);
            assert_eq!(single(&index, "Foo::B").visibility, Visibility::Private);
        }

        #[test]
        fn test_missing_constant_is_a_no_op() {
            let index = index("class Foo\n  BAR = 1\n  private_constant :MISSING\nend\n");

            assert!(!index.contains("Foo::MISSING"));
            assert_eq!(single(&index, "Foo::BAR").visibility, Visibility::Public);
        }

        #[test]
        fn test_before_definition_is_a_no_op() {
            let index = index("class Foo\n  private_constant :BAR\n  BAR = 1\nend\n");

            assert_eq!(single(&index, "Foo::BAR").visibility, Visibility::Public);
        }

        #[test]
        fn test_only_current_namespace_is_searched() {
            let index = index("BAR = 1\nclass Foo\n  private_constant :BAR\nend\n");

            assert_eq!(single(&index, "BAR").visibility, Visibility::Public);
        }

        #[test]
        fn test_constant_receiver() {
            let index = index("class Foo\n  class Bar\n    BAZ = 1\n  end\n  Bar.private_constant :BAZ\nend\n");

            assert_eq!(single(&index, "Foo::Bar::BAZ").visibility, Visibility::Private);
        }

        #[test]
        fn test_all_entries_under_the_name() {
            let index = index("class Foo\n  BAR = 1\nend\nclass Foo\n  BAR ||= 2\n  private_constant :BAR\nend\n");

            let entries = index.get("Foo::BAR");
            assert_eq!(entries.len(), 2);
            assert!(entries.iter().all(|e| e.visibility == Visibility::Private));
        }
    }

    mod comments {
        use super::*;

        #[test]
        fn test_doc_comment_attached_in_order() {
            let index = index("# typed: true\n\n# Documentation\n# for Foo\nclass Foo\nend\n");

            assert_eq!(
                single(&index, "Foo").comments,
                vec!["Documentation".to_string(), "for Foo".to_string()]
            );
        }

        #[test]
        fn test_pragma_directly_above_is_excluded() {
            let index = index("# Docs\n# typed: true\nclass Foo\nend\n");

            assert_eq!(single(&index, "Foo").comments, vec!["Docs".to_string()]);
        }

        #[test]
        fn test_comments_on_nested_declarations() {
            let index = index("module Foo\n  # The answer\n  ANSWER = 42\n\n  # Does bar\n  def bar\n  end\nend\n");

            assert_eq!(single(&index, "Foo::ANSWER").comments, vec!["The answer".to_string()]);
            assert_eq!(single(&index, "bar").comments, vec!["Does bar".to_string()]);
            assert!(single(&index, "Foo").comments.is_empty());
        }

        #[test]
        fn test_trailing_comment_is_not_documentation() {
            let index = index("A = 1 # one\nB = 2\nFOO = 1 # note\nclass Bar\nend\n");

            assert!(single(&index, "B").comments.is_empty());
            assert!(single(&index, "Bar").comments.is_empty());
        }
    }

    mod methods {
        use super::*;

        #[test]
        fn test_method_with_no_parameters() {
            let index = index("class Foo\n  def bar\n  end\nend\n");

            assert_entry(&index, "bar", "method", "2-2:3-5");
            assert!(single(&index, "bar").parameters().is_empty());
        }

        #[test]
        fn test_method_with_parameters() {
            let index = index("class Foo\n  def bar(a)\n  end\nend\n");

            assert_entry(&index, "bar", "method", "2-2:3-5");
            let entry = single(&index, "bar");
            assert_eq!(entry.parameters(), &[Parameter::new("a", ParameterKind::Required)]);
            assert_eq!(entry.owner(), Some("Foo"));
            assert!(entry.accepts_arity(1));
            assert!(!entry.accepts_arity(0));
            assert!(!entry.accepts_arity(2));
        }

        #[test]
        fn test_top_level_method_has_no_owner() {
            let index = index("def helper(*args)\nend\n");

            let entry = single(&index, "helper");
            assert_eq!(entry.owner(), None);
            assert!(entry.accepts_arity(0));
            assert!(entry.accepts_arity(3));
        }

        #[test]
        fn test_singleton_method() {
            let index = index("module Foo\n  def self.build(a, b = 1)\n  end\nend\n");

            let entry = single(&index, "build");
            assert_eq!(entry.owner(), Some("Foo"));
            assert!(entry.accepts_arity(2));
            assert!(!entry.accepts_arity(3));
        }

        #[test]
        fn test_visibility_sections() {
            let index = index(
                "class Foo\n  def a; end\n  private\n  def b; end\n  protected def c; end\n  public\n  def d; end\n  def e; end\n  private :e\n  def self.f; end\nend\nclass Bar\n  def g; end\nend\n",
            );

            assert_eq!(single(&index, "a").visibility, Visibility::Public);
            assert_eq!(single(&index, "b").visibility, Visibility::Private);
            assert_eq!(single(&index, "c").visibility, Visibility::Protected);
            assert_eq!(single(&index, "d").visibility, Visibility::Public);
            assert_eq!(single(&index, "e").visibility, Visibility::Private);
            assert_eq!(single(&index, "f").visibility, Visibility::Public);
            assert_eq!(single(&index, "g").visibility, Visibility::Public);
        }

        #[test]
        fn test_visibility_restored_after_nested_namespace() {
            let index = index(
                "class Foo\n  private\n  class Bar\n    def a; end\n  end\n  def b; end\nend\n",
            );

            assert_eq!(single(&index, "a").visibility, Visibility::Public);
            assert_eq!(single(&index, "b").visibility, Visibility::Private);
        }

        #[test]
        fn test_private_symbol_only_affects_current_owner() {
            let index = index("class Foo\n  def a; end\nend\nclass Bar\n  def a; end\n  private :a\nend\n");

            let entries = index.get("a");
            assert_eq!(entries.len(), 2);
            assert_eq!(entries[0].visibility, Visibility::Public);
            assert_eq!(entries[1].visibility, Visibility::Private);
        }

        #[test]
        fn test_attribute_accessors() {
            let index = index("class Foo\n  attr_reader :a\n  attr_writer :b\n  attr_accessor :c, \"d\"\nend\n");

            assert!(index.contains("a"));
            assert!(!index.contains("a="));
            assert!(!index.contains("b"));
            assert!(index.contains("b="));
            assert!(index.contains("c"));
            assert!(index.contains("c="));
            assert!(index.contains("d="));

            let writer = single(&index, "b=");
            assert_eq!(writer.owner(), Some("Foo"));
            assert!(writer.accepts_arity(1));
            assert_eq!(writer.location.start_line, 3);
            assert_eq!(single(&index, "a").location.start_column, 14);
        }
    }
}

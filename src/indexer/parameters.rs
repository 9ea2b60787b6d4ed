use tree_sitter::Node;

use crate::index::{Parameter, ParameterKind};

/// Parameter descriptors for a `method_parameters` node, in declaration order.
///
/// A positional parameter that follows an optional or splat parameter is a
/// post-required parameter (`def m(a, b = 1, c)` makes `c` post-required).
pub fn collect_parameters(list: Node<'_>, source: &[u8]) -> Vec<Parameter> {
    let mut parameters = Vec::new();
    let mut after_optional_group = false;
    let mut cursor = list.walk();

    for node in list.named_children(&mut cursor) {
        let parameter = match node.kind() {
            "identifier" | "destructured_parameter" => {
                let kind = if after_optional_group {
                    ParameterKind::PostRequired
                } else {
                    ParameterKind::Required
                };
                Parameter::new(text(node, source), kind)
            }
            "optional_parameter" => {
                after_optional_group = true;
                Parameter::new(field_text(node, "name", source, "?"), ParameterKind::Optional)
            }
            "splat_parameter" => {
                after_optional_group = true;
                Parameter::new(field_text(node, "name", source, "*"), ParameterKind::Rest)
            }
            "keyword_parameter" => {
                Parameter::new(field_text(node, "name", source, "?"), ParameterKind::Keyword)
            }
            "hash_splat_parameter" => {
                Parameter::new(field_text(node, "name", source, "**"), ParameterKind::KeywordRest)
            }
            "block_parameter" => {
                Parameter::new(field_text(node, "name", source, "&"), ParameterKind::Block)
            }
            "forward_parameter" => Parameter::new("...", ParameterKind::Forward),
            // `**nil`, comments and error-recovery nodes
            _ => continue,
        };
        parameters.push(parameter);
    }

    parameters
}

fn text<'a>(node: Node<'_>, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

fn field_text<'a>(node: Node<'_>, field: &str, source: &'a [u8], anonymous: &'a str) -> &'a str {
    node.child_by_field_name(field)
        .map(|child| text(child, source))
        .filter(|name| !name.is_empty())
        .unwrap_or(anonymous)
}

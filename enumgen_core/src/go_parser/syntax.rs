//! Whole-file syntax check with tree-sitter-go.
//!
//! The declaration parser only bracket-matches function bodies and variable
//! initializers. This pass parses the complete file so that errors inside
//! them are reported too, and collects the names that package-level
//! variables refer to.

use super::ast::Ident;
use super::parser::ParseError;
use tree_sitter::{Node, Parser};

/// Validate the whole file and return the names referenced by the types and
/// initializers of top-level `var` declarations, in source order.
pub fn check(source: &str) -> Result<Vec<Ident>, ParseError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_go::LANGUAGE.into())
        .map_err(|e| ParseError {
            message: format!("failed to load Go grammar: {}", e),
            span: None,
        })?;
    let tree = parser.parse(source, None).ok_or_else(|| ParseError {
        message: "failed to parse file".to_string(),
        span: None,
    })?;

    let root = tree.root_node();
    if root.has_error() {
        return Err(match first_error(root) {
            Some(node) => syntax_error(node, source),
            None => ParseError {
                message: "syntax error".to_string(),
                span: None,
            },
        });
    }

    let mut refs = Vec::new();
    let mut cursor = root.walk();
    for decl in root.named_children(&mut cursor) {
        if decl.kind() == "var_declaration" {
            collect_var_specs(decl, source, &mut refs);
        }
    }
    Ok(refs)
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .filter(|child| child.has_error())
        .find_map(first_error)
}

fn syntax_error(node: Node<'_>, source: &str) -> ParseError {
    let message = if node.is_missing() {
        format!("syntax error: missing {}", node.kind())
    } else {
        let mut leaf = node;
        while let Some(child) = leaf.child(0) {
            leaf = child;
        }
        match source[leaf.byte_range()].lines().next().map(str::trim) {
            Some(text) if !text.is_empty() => format!("syntax error: unexpected {}", text),
            _ => "syntax error".to_string(),
        }
    };
    ParseError {
        message,
        span: Some(node.byte_range()),
    }
}

fn collect_var_specs(node: Node<'_>, source: &str, refs: &mut Vec<Ident>) {
    if node.kind() == "var_spec" {
        for field in ["type", "value"] {
            if let Some(child) = node.child_by_field_name(field) {
                collect_refs(child, source, refs);
            }
        }
        return;
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        collect_var_specs(child, source, refs);
    }
}

fn collect_refs(node: Node<'_>, source: &str, refs: &mut Vec<Ident>) {
    let mut cursor = node.walk();
    match node.kind() {
        "identifier" | "type_identifier" => refs.push(ident(node, source)),
        // Parameters and function literals bind their own names
        "func_literal" | "parameter_list" => {}
        "qualified_type" => {
            if let Some(package) = node.child_by_field_name("package") {
                refs.push(ident(package, source));
            }
        }
        // The key of a keyed element may be a struct field name
        "keyed_element" => {
            for child in node.named_children(&mut cursor).skip(1) {
                collect_refs(child, source, refs);
            }
        }
        _ => {
            for child in node.named_children(&mut cursor) {
                collect_refs(child, source, refs);
            }
        }
    }
}

fn ident(node: Node<'_>, source: &str) -> Ident {
    Ident {
        name: source[node.byte_range()].to_string(),
        span: node.byte_range(),
    }
}

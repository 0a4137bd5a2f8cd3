//! Tree-sitter based Java parsing adapter.
//!
//! Only named nodes are kept. Leaves carry their source text as value,
//! operator-bearing expressions and `modifiers` carry their keyword tokens,
//! and dotted names collapse into a single leaf.

use std::path::Path;
use std::rc::Rc;

use tree_sitter::{Language, Node, Parser};

use super::{SourceParser, SyntaxNode, SyntaxTree};
use crate::error::{Error, Result};

/// Kinds whose anonymous tokens become the node value.
const OPERATOR_KINDS: &[&str] = &[
    "binary_expression",
    "unary_expression",
    "update_expression",
    "assignment_expression",
    "modifiers",
];

/// Kinds folded into one leaf holding their dotted text.
const COLLAPSED_KINDS: &[&str] = &["scoped_identifier", "scoped_type_identifier"];

/// Parses Java source text.
pub fn parse(source: &str) -> Result<SyntaxTree> {
    let language: Language = tree_sitter_java::LANGUAGE.into();
    let mut parser = Parser::new();
    parser
        .set_language(&language)
        .map_err(|e| Error::Parse(e.to_string()))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| Error::Parse("tree-sitter produced no tree".to_string()))?;
    let root = tree.root_node();
    if root.has_error() {
        let line = first_error_line(root).unwrap_or(0);
        return Err(Error::Parse(format!("syntax error at line {}", line)));
    }

    Ok(SyntaxTree::new(
        convert(root, None, source.as_bytes()),
        source,
    ))
}

/// Parses a Java source file.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<SyntaxTree> {
    super::JavaParser.parse_file(path.as_ref())
}

fn convert(node: Node, field: Option<&str>, source: &[u8]) -> SyntaxNode {
    let kind = node.kind();
    let mut out = SyntaxNode::new(kind, None, node.start_position().row + 1);
    out.field = field.map(str::to_string);

    if COLLAPSED_KINDS.contains(&kind) {
        out.value = node
            .utf8_text(source)
            .ok()
            .map(|t| t.split_whitespace().collect());
        return out;
    }

    let mut tokens = Vec::new();
    let mut cursor = node.walk();
    if cursor.goto_first_child() {
        loop {
            let child = cursor.node();
            if child.is_named() {
                if !child.is_extra() {
                    let converted = convert(child, cursor.field_name(), source);
                    out.children.push(Rc::new(converted));
                }
            } else {
                tokens.push(child.kind());
            }
            if !cursor.goto_next_sibling() {
                break;
            }
        }
    }

    if OPERATOR_KINDS.contains(&kind) {
        if !tokens.is_empty() {
            out.value = Some(tokens.join(" "));
        }
    } else if out.children.is_empty() {
        out.value = node.utf8_text(source).ok().map(str::to_string);
    }

    out
}

fn first_error_line(node: Node) -> Option<usize> {
    if node.is_error() || node.is_missing() {
        return Some(node.start_position().row + 1);
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|c| c.has_error())
        .find_map(first_error_line)
}

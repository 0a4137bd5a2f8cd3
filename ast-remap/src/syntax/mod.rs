//! Syntax trees produced by parsing adapters.
//!
//! A `SyntaxTree` is the immutable input of the matcher. Adapters build it
//! from source text (tree-sitter for Java) or from the XML interchange format
//! in [`crate::xml`], so trees produced by any other parser can be fed in.

pub mod java;

use std::fs;
use std::path::Path;
use std::rc::Rc;

use crate::error::{Error, Result};

/// A labeled node of an ordered syntax tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    /// Structural type name (`method_declaration`, `identifier`, ...).
    pub kind: String,
    /// Identifier, literal, keyword or operator text, if any.
    pub value: Option<String>,
    /// Role of this node in its parent (`name`, `type`, `body`, ...).
    pub field: Option<String>,
    /// 1-based source line where the node starts.
    pub line: usize,
    /// Ordered children.
    pub children: Vec<Rc<SyntaxNode>>,
}

impl SyntaxNode {
    /// Creates a childless node.
    pub fn new(kind: impl Into<String>, value: Option<String>, line: usize) -> Self {
        SyntaxNode {
            kind: kind.into(),
            value,
            field: None,
            line,
            children: Vec::new(),
        }
    }

    /// Sets the field name of this node.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Appends a child.
    pub fn with_child(mut self, child: SyntaxNode) -> Self {
        self.children.push(Rc::new(child));
        self
    }

    /// Returns the value text, or an empty string.
    pub fn text(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }

    /// Returns the first child carrying the given field name.
    pub fn child_by_field(&self, field: &str) -> Option<&Rc<SyntaxNode>> {
        self.children
            .iter()
            .find(|c| c.field.as_deref() == Some(field))
    }

    /// Returns the first child of the given kind.
    pub fn child_by_kind(&self, kind: &str) -> Option<&Rc<SyntaxNode>> {
        self.children.iter().find(|c| c.kind == kind)
    }

    /// Returns the declared name of a declaration node.
    pub fn name(&self) -> Option<&str> {
        self.child_by_field("name").and_then(|n| n.value.as_deref())
    }

    /// Counts the nodes of this subtree.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(|c| c.size()).sum::<usize>()
    }
}

/// A parsed source file.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    root: Rc<SyntaxNode>,
    source: String,
}

impl SyntaxTree {
    /// Creates a tree from its root and the text it was parsed from.
    pub fn new(root: SyntaxNode, source: impl Into<String>) -> Self {
        SyntaxTree {
            root: Rc::new(root),
            source: source.into(),
        }
    }

    /// Returns the root node.
    pub fn root(&self) -> &Rc<SyntaxNode> {
        &self.root
    }

    /// Returns the source text. Empty for trees loaded from XML.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the trimmed text of a 1-based source line.
    pub fn line_text(&self, line: usize) -> Option<&str> {
        line.checked_sub(1)
            .and_then(|idx| self.source.lines().nth(idx))
            .map(str::trim)
    }
}

/// Parsing adapter turning source text into a [`SyntaxTree`].
pub trait SourceParser {
    /// Parses a tree from text.
    fn parse_str(&self, source: &str) -> Result<SyntaxTree>;

    /// Parses a tree from a file.
    fn parse_file(&self, path: &Path) -> Result<SyntaxTree> {
        let source = fs::read_to_string(path)?;
        self.parse_str(&source)
    }
}

/// Tree-sitter Java adapter.
pub struct JavaParser;

impl SourceParser for JavaParser {
    fn parse_str(&self, source: &str) -> Result<SyntaxTree> {
        java::parse(source)
    }
}

/// Adapter for the XML tree interchange format.
pub struct XmlTreeParser;

impl SourceParser for XmlTreeParser {
    fn parse_str(&self, source: &str) -> Result<SyntaxTree> {
        crate::xml::parse_str(source)
    }
}

/// Picks the adapter for a file based on its extension.
pub fn parser_for_path(path: &Path) -> Result<Box<dyn SourceParser>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "java" => Ok(Box::new(JavaParser)),
        "xml" => Ok(Box::new(XmlTreeParser)),
        _ => Err(Error::UnsupportedLanguage(path.display().to_string())),
    }
}

/// Parses a file with the adapter matching its extension.
pub fn parse_path(path: &Path) -> Result<SyntaxTree> {
    parser_for_path(path)?.parse_file(path)
}

//! Writer for the tree interchange format.

use std::io::Write;

use quick_xml::escape::escape;

use super::TREE_TAG;
use crate::syntax::{SyntaxNode, SyntaxTree};

/// Pretty-printing writer of `<tree>` documents, two spaces per level.
pub struct XmlPrinter<W: Write> {
    writer: W,
    indent: usize,
}

impl<W: Write> XmlPrinter<W> {
    pub fn new(writer: W) -> Self {
        XmlPrinter { writer, indent: 0 }
    }

    /// Prints a whole document, declaration included.
    pub fn print(&mut self, root: &SyntaxNode) -> std::io::Result<()> {
        writeln!(self.writer, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
        self.print_node(root)?;
        self.writer.flush()
    }

    fn print_node(&mut self, node: &SyntaxNode) -> std::io::Result<()> {
        let mut tag = format!(
            "{}<{} kind=\"{}\"",
            indent_str(self.indent),
            TREE_TAG,
            escape(node.kind.as_str())
        );
        if let Some(value) = &node.value {
            tag.push_str(&format!(" value=\"{}\"", escape(value.as_str())));
        }
        if let Some(field) = &node.field {
            tag.push_str(&format!(" field=\"{}\"", escape(field.as_str())));
        }
        tag.push_str(&format!(" line=\"{}\"", node.line));

        if node.children.is_empty() {
            return writeln!(self.writer, "{} />", tag);
        }

        writeln!(self.writer, "{}>", tag)?;
        self.indent += 1;
        for child in &node.children {
            self.print_node(child)?;
        }
        self.indent -= 1;
        writeln!(self.writer, "{}</{}>", indent_str(self.indent), TREE_TAG)
    }
}

fn indent_str(level: usize) -> String {
    "  ".repeat(level)
}

/// Prints a tree to a string.
pub fn print_to_string(tree: &SyntaxTree) -> std::io::Result<String> {
    let mut output = Vec::new();
    XmlPrinter::new(&mut output).print(tree.root())?;
    Ok(String::from_utf8_lossy(&output).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::java;
    use crate::xml::parse_str;

    #[test]
    fn test_print_layout() {
        let root = SyntaxNode::new("binary_expression", Some("<".into()), 3)
            .with_child(SyntaxNode::new("identifier", Some("a".into()), 3).with_field("left"));
        let output = print_to_string(&SyntaxTree::new(root, "")).unwrap();

        assert_eq!(
            output,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <tree kind=\"binary_expression\" value=\"&lt;\" line=\"3\">\n\
             \x20 <tree kind=\"identifier\" value=\"a\" field=\"left\" line=\"3\" />\n\
             </tree>\n"
        );
    }

    #[test]
    fn test_java_tree_survives_printing() {
        let source = "class A {\n  boolean lt(int a, int b) { return a < b && !(a == b); }\n}\n";
        let tree = java::parse(source).unwrap();
        let printed = print_to_string(&tree).unwrap();
        let reparsed = parse_str(&printed).unwrap();
        assert_eq!(tree.root(), reparsed.root());
    }
}

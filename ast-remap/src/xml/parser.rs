//! Reader for the tree interchange format.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::TREE_TAG;
use crate::error::{Error, Result};
use crate::syntax::{SyntaxNode, SyntaxTree};

/// Parses a tree from XML text.
pub fn parse_str(xml: &str) -> Result<SyntaxTree> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    parse_reader(&mut reader)
}

/// Parses a tree from an XML file.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<SyntaxTree> {
    let file = File::open(path)?;
    let mut reader = Reader::from_reader(BufReader::new(file));
    reader.config_mut().trim_text(true);
    parse_reader(&mut reader)
}

fn parse_reader<R: BufRead>(reader: &mut Reader<R>) -> Result<SyntaxTree> {
    // Open elements; each is attached to its parent when closed.
    let mut stack: Vec<SyntaxNode> = Vec::new();
    let mut root: Option<SyntaxNode> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                let node = read_node(e, stack.last())?;
                stack.push(node);
            }
            Event::Empty(ref e) => {
                let node = read_node(e, stack.last())?;
                attach(node, &mut stack, &mut root)?;
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| Error::Parse("unbalanced closing tag".to_string()))?;
                attach(node, &mut stack, &mut root)?;
            }
            Event::Text(e) => {
                let text =
                    std::str::from_utf8(e.as_ref()).map_err(|e| Error::Parse(e.to_string()))?;
                if !text.trim().is_empty() {
                    return Err(Error::Parse(format!("unexpected text '{}'", text.trim())));
                }
            }
            Event::Eof => break,
            // Declarations, comments and the like carry no tree content.
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(Error::Parse("unclosed <tree> element".to_string()));
    }
    let root = root.ok_or_else(|| Error::Parse("no <tree> element found".to_string()))?;
    Ok(SyntaxTree::new(root, ""))
}

fn attach(node: SyntaxNode, stack: &mut [SyntaxNode], root: &mut Option<SyntaxNode>) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(node.into());
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(node);
            Ok(())
        }
        None => Err(Error::Parse("more than one root <tree> element".to_string())),
    }
}

fn read_node(e: &BytesStart, parent: Option<&SyntaxNode>) -> Result<SyntaxNode> {
    if e.name().as_ref() != TREE_TAG.as_bytes() {
        return Err(Error::Parse(format!(
            "unexpected element <{}>",
            String::from_utf8_lossy(e.name().as_ref())
        )));
    }

    let mut kind = None;
    let mut value = None;
    let mut field = None;
    let mut line = parent.map_or(1, |p| p.line);

    for attr in e.attributes() {
        let attr = attr.map_err(|e| Error::Parse(format!("Attribute error: {}", e)))?;
        let text = attr
            .unescape_value()
            .map_err(|e| Error::Parse(e.to_string()))?
            .to_string();
        match attr.key.as_ref() {
            b"kind" => kind = Some(text),
            b"value" => value = Some(text),
            b"field" => field = Some(text),
            b"line" => {
                line = text
                    .parse()
                    .map_err(|_| Error::Parse(format!("invalid line '{}'", text)))?;
            }
            _ => {}
        }
    }

    let kind = kind.ok_or_else(|| Error::Parse("<tree> without kind".to_string()))?;
    let mut node = SyntaxNode::new(kind, value, line);
    node.field = field;
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<tree kind="method_declaration" line="4">
  <tree kind="integral_type" value="int" field="type" />
  <tree kind="identifier" value="add" field="name" line="4" />
  <tree kind="block" line="4">
    <tree kind="binary_expression" value="&lt;" line="5" />
  </tree>
</tree>"#;
        let tree = parse_str(xml).unwrap();
        let root = tree.root();

        assert_eq!(root.kind, "method_declaration");
        assert_eq!(root.children.len(), 3);
        assert_eq!(root.name(), Some("add"));
        assert_eq!(root.child_by_field("type").unwrap().line, 4);
        assert_eq!(root.children[2].children[0].text(), "<");
        assert_eq!(root.children[2].children[0].line, 5);
        assert_eq!(tree.source(), "");
    }

    #[test]
    fn test_missing_kind() {
        let err = parse_str(r#"<tree line="1" />"#).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_wrong_element() {
        assert!(parse_str(r#"<node kind="a" />"#).is_err());
    }

    #[test]
    fn test_two_roots() {
        assert!(parse_str(r#"<tree kind="a" /><tree kind="b" />"#).is_err());
    }

    #[test]
    fn test_empty_document() {
        assert!(parse_str("").is_err());
    }

    #[test]
    fn test_parse_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tree.xml");
        std::fs::write(&path, r#"<tree kind="program"><tree kind="identifier" value="x" /></tree>"#)
            .unwrap();

        let tree = parse_file(&path).unwrap();
        assert_eq!(tree.root().size(), 2);
        assert_eq!(tree.root().children[0].line, 1);
    }
}

//! JVM method descriptors computed from Java declarations.
//!
//! A descriptor encodes parameter and return types, e.g. `(I[Ljava/lang/String;)V`.
//! Type names are resolved without a compiler:
//!
//! - type variables of the method and of the enclosing types erase to their
//!   first bound, or `java/lang/Object`;
//! - types declared in the file resolve to their binary name
//!   (`pkg/Outer$Inner`);
//! - single-type imports resolve by simple name and shadow `java.lang`;
//! - a fixed table covers the implicitly imported `java.lang` types;
//! - dotted names resolve their first segment, unless it is a lowercase
//!   package prefix (`java.util.List`).
//!
//! Anything else (wildcard imports, same-package types from other files,
//! union types) makes the descriptor unavailable.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::constants::TYPE_KINDS;
use crate::syntax::{SyntaxNode, SyntaxTree};

/// Node kinds denoting a type in declarations.
const TYPE_NODE_KINDS: &[&str] = &[
    "integral_type",
    "floating_point_type",
    "boolean_type",
    "void_type",
    "type_identifier",
    "scoped_type_identifier",
    "generic_type",
    "array_type",
    "annotated_type",
];

/// Types of `java.lang` usable without an import.
const JAVA_LANG: &[&str] = &[
    "AutoCloseable",
    "Boolean",
    "Byte",
    "CharSequence",
    "Character",
    "Class",
    "ClassCastException",
    "Cloneable",
    "Comparable",
    "Deprecated",
    "Double",
    "Enum",
    "Error",
    "Exception",
    "Float",
    "FunctionalInterface",
    "IllegalArgumentException",
    "IllegalStateException",
    "IndexOutOfBoundsException",
    "Integer",
    "InterruptedException",
    "Iterable",
    "Long",
    "Math",
    "NullPointerException",
    "Number",
    "Object",
    "Override",
    "Record",
    "Runnable",
    "RuntimeException",
    "Short",
    "String",
    "StringBuffer",
    "StringBuilder",
    "SuppressWarnings",
    "System",
    "Thread",
    "Throwable",
    "UnsupportedOperationException",
    "Void",
];

/// Bound on nested type-variable erasure (`T extends U`, `U extends T`).
const MAX_ERASURE_DEPTH: usize = 8;

/// File-level symbol information used to resolve type names.
#[derive(Debug, Clone, Default)]
pub struct DescriptorContext {
    package: Option<String>,
    /// Simple name to internal binary name, for types declared in the file.
    declared: FxHashMap<String, String>,
    /// Simple name to internal binary name, for single-type imports.
    imports: FxHashMap<String, String>,
    /// Type variable to its first bound.
    type_variables: FxHashMap<String, Option<Rc<SyntaxNode>>>,
}

impl DescriptorContext {
    /// Collects package, imports and declared types of a parsed file.
    pub fn from_tree(tree: &SyntaxTree) -> Self {
        Self::from_root(tree.root())
    }

    /// Collects package, imports and declared types below a `program` node.
    pub fn from_root(root: &SyntaxNode) -> Self {
        let mut ctx = DescriptorContext::default();

        for child in &root.children {
            match child.kind.as_str() {
                "package_declaration" => {
                    ctx.package = child.children.first().map(|n| n.text().to_string());
                }
                "import_declaration" => {
                    if child.child_by_kind("asterisk").is_some() {
                        continue;
                    }
                    let Some(name) = child.children.first().map(|n| n.text()) else {
                        continue;
                    };
                    if let Some(simple) = name.rsplit('.').next() {
                        ctx.imports
                            .entry(simple.to_string())
                            .or_insert_with(|| binary_name(name));
                    }
                }
                _ => {}
            }
        }

        let prefix = ctx
            .package
            .as_deref()
            .map(|p| format!("{}/", p.replace('.', "/")))
            .unwrap_or_default();
        collect_declared(root, &prefix, None, &mut ctx.declared);
        ctx
    }

    /// Returns the package name in dotted form.
    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    /// Adds the type parameters declared by a class or method.
    pub fn with_type_parameters(mut self, declaration: &SyntaxNode) -> Self {
        let Some(params) = declaration.child_by_kind("type_parameters") else {
            return self;
        };
        for param in params.children.iter().filter(|p| p.kind == "type_parameter") {
            let Some(name) = param.child_by_kind("type_identifier") else {
                continue;
            };
            let bound = param
                .child_by_kind("type_bound")
                .and_then(|b| b.children.iter().find(|t| is_type_node(t)))
                .cloned();
            self.type_variables.insert(name.text().to_string(), bound);
        }
        self
    }

    /// Resolves a simple or dotted type name to its internal binary name.
    pub fn resolve(&self, name: &str) -> Option<String> {
        match name.split_once('.') {
            None => self
                .declared
                .get(name)
                .cloned()
                .or_else(|| self.imports.get(name).cloned())
                .or_else(|| JAVA_LANG.contains(&name).then(|| format!("java/lang/{}", name))),
            Some((first, rest)) => match self.resolve(first) {
                Some(outer) => Some(format!("{}${}", outer, rest.replace('.', "$"))),
                None if first.starts_with(|c: char| c.is_ascii_lowercase()) => {
                    Some(binary_name(name))
                }
                None => None,
            },
        }
    }
}

/// Computes the descriptor of a `method_declaration` or
/// `constructor_declaration`.
///
/// Returns `None` if any parameter or the return type cannot be resolved.
pub fn compute_method_descriptor(method: &SyntaxNode, ctx: &DescriptorContext) -> Option<String> {
    let ctx = ctx.clone().with_type_parameters(method);
    let mut out = String::from("(");

    if let Some(params) = method.child_by_field("parameters") {
        for param in &params.children {
            match param.kind.as_str() {
                "formal_parameter" => {
                    let ty = param.child_by_field("type")?;
                    out.push_str(&array_prefix(param.child_by_field("dimensions")));
                    out.push_str(&descriptor_of(ty, &ctx, 0)?);
                }
                "spread_parameter" => {
                    let ty = param.children.iter().find(|c| is_type_node(c))?;
                    out.push('[');
                    out.push_str(&descriptor_of(ty, &ctx, 0)?);
                }
                _ => {}
            }
        }
    }
    out.push(')');

    if method.kind == "constructor_declaration" {
        out.push('V');
    } else {
        let ty = method.child_by_field("type")?;
        out.push_str(&array_prefix(method.child_by_field("dimensions")));
        out.push_str(&descriptor_of(ty, &ctx, 0)?);
    }
    Some(out)
}

fn descriptor_of(ty: &SyntaxNode, ctx: &DescriptorContext, depth: usize) -> Option<String> {
    match ty.kind.as_str() {
        "integral_type" | "floating_point_type" | "boolean_type" | "void_type" => {
            primitive(ty.text()).map(str::to_string)
        }
        "type_identifier" => {
            let name = ty.text();
            if let Some(bound) = ctx.type_variables.get(name) {
                return match bound {
                    Some(bound) if depth < MAX_ERASURE_DEPTH => descriptor_of(bound, ctx, depth + 1),
                    _ => Some("Ljava/lang/Object;".to_string()),
                };
            }
            ctx.resolve(name).map(|n| format!("L{};", n))
        }
        "scoped_type_identifier" => ctx.resolve(ty.text()).map(|n| format!("L{};", n)),
        "generic_type" => {
            let raw = ty.children.iter().find(|c| {
                c.kind == "type_identifier" || c.kind == "scoped_type_identifier"
            })?;
            descriptor_of(raw, ctx, depth)
        }
        "array_type" => {
            let element = ty.child_by_field("element")?;
            let prefix = array_prefix(ty.child_by_field("dimensions"));
            Some(format!("{}{}", prefix, descriptor_of(element, ctx, depth)?))
        }
        "annotated_type" => {
            let inner = ty.children.iter().rev().find(|c| is_type_node(c))?;
            descriptor_of(inner, ctx, depth)
        }
        _ => None,
    }
}

fn primitive(name: &str) -> Option<&'static str> {
    Some(match name {
        "int" => "I",
        "long" => "J",
        "short" => "S",
        "byte" => "B",
        "char" => "C",
        "float" => "F",
        "double" => "D",
        "boolean" => "Z",
        "void" => "V",
        _ => return None,
    })
}

fn array_prefix(dimensions: Option<&Rc<SyntaxNode>>) -> String {
    let depth = dimensions.map_or(0, |d| d.text().matches('[').count());
    "[".repeat(depth)
}

fn is_type_node(node: &SyntaxNode) -> bool {
    TYPE_NODE_KINDS.contains(&node.kind.as_str())
}

/// Converts a dotted name to an internal binary name. Segments from the first
/// capitalized one on are taken as nested types.
fn binary_name(dotted: &str) -> String {
    let mut out = String::with_capacity(dotted.len());
    let mut in_type = false;
    for (i, segment) in dotted.split('.').enumerate() {
        if i > 0 {
            out.push(if in_type { '$' } else { '/' });
        }
        out.push_str(segment);
        if segment.starts_with(|c: char| c.is_ascii_uppercase()) {
            in_type = true;
        }
    }
    out
}

fn collect_declared(
    node: &SyntaxNode,
    prefix: &str,
    outer: Option<&str>,
    declared: &mut FxHashMap<String, String>,
) {
    for child in &node.children {
        if TYPE_KINDS.contains(&child.kind.as_str()) {
            if let Some(name) = child.name() {
                let binary = match outer {
                    Some(outer) => format!("{}${}", outer, name),
                    None => format!("{}{}", prefix, name),
                };
                declared
                    .entry(name.to_string())
                    .or_insert_with(|| binary.clone());
                collect_declared(child, prefix, Some(&binary), declared);
                continue;
            }
        }
        collect_declared(child, prefix, outer, declared);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::java;

    const SERVICE: &str = r#"package com.example;

import java.util.List;
import java.util.Map;
import java.io.*;

public class Service<T extends Comparable<T>> {
    static class Inner {}

    public Service(int size) {}

    public int add(int a, int b) { return a + b; }

    public void arrays(long[] xs, String[][] names, int legacy[]) {}

    public List<String> generic(Map.Entry<String, Integer> e) { return null; }

    public static <E> E first(E[] items) { return items[0]; }

    public T bounded(T value) { return value; }

    public Inner inner(Inner other, Object... rest) { return other; }

    public Unknown mystery() { return null; }

    public File wildcard() { return null; }

    public boolean flag(char c, byte b, short s, float f, double d) { return true; }
}
"#;

    fn find_method<'a>(node: &'a SyntaxNode, name: &str) -> Option<&'a SyntaxNode> {
        if (node.kind == "method_declaration" || node.kind == "constructor_declaration")
            && node.name() == Some(name)
        {
            return Some(node);
        }
        node.children.iter().find_map(|c| find_method(c, name))
    }

    fn descriptor(name: &str) -> Option<String> {
        let tree = java::parse(SERVICE).unwrap();
        let class = tree
            .root()
            .children
            .iter()
            .find(|c| c.kind == "class_declaration")
            .unwrap()
            .clone();
        let ctx = DescriptorContext::from_tree(&tree).with_type_parameters(&class);
        let method = find_method(tree.root(), name).unwrap();
        compute_method_descriptor(method, &ctx)
    }

    #[test]
    fn test_context_collection() {
        let tree = java::parse(SERVICE).unwrap();
        let ctx = DescriptorContext::from_tree(&tree);
        assert_eq!(ctx.package(), Some("com.example"));
        assert_eq!(ctx.resolve("List").as_deref(), Some("java/util/List"));
        assert_eq!(ctx.resolve("Inner").as_deref(), Some("com/example/Service$Inner"));
        assert_eq!(ctx.resolve("String").as_deref(), Some("java/lang/String"));
        assert_eq!(ctx.resolve("File"), None);
    }

    #[test]
    fn test_primitives() {
        assert_eq!(descriptor("add").as_deref(), Some("(II)I"));
        assert_eq!(descriptor("flag").as_deref(), Some("(CBSFD)Z"));
    }

    #[test]
    fn test_constructor() {
        assert_eq!(descriptor("Service").as_deref(), Some("(I)V"));
    }

    #[test]
    fn test_arrays() {
        assert_eq!(
            descriptor("arrays").as_deref(),
            Some("([J[[Ljava/lang/String;[I)V")
        );
    }

    #[test]
    fn test_generics_and_imports() {
        assert_eq!(
            descriptor("generic").as_deref(),
            Some("(Ljava/util/Map$Entry;)Ljava/util/List;")
        );
    }

    #[test]
    fn test_type_variables() {
        assert_eq!(
            descriptor("first").as_deref(),
            Some("([Ljava/lang/Object;)Ljava/lang/Object;")
        );
        assert_eq!(
            descriptor("bounded").as_deref(),
            Some("(Ljava/lang/Comparable;)Ljava/lang/Comparable;")
        );
    }

    #[test]
    fn test_nested_and_varargs() {
        assert_eq!(
            descriptor("inner").as_deref(),
            Some("(Lcom/example/Service$Inner;[Ljava/lang/Object;)Lcom/example/Service$Inner;")
        );
    }

    #[test]
    fn test_unresolved() {
        assert_eq!(descriptor("mystery"), None);
        assert_eq!(descriptor("wildcard"), None);
    }

    fn descriptor_in(source: &str, name: &str) -> Option<String> {
        let tree = java::parse(source).unwrap();
        let method = find_method(tree.root(), name).unwrap();
        compute_method_descriptor(method, &DescriptorContext::from_tree(&tree))
    }

    #[test]
    fn test_dotted_name_behind_wildcard_import() {
        let source = "package demo;\n\
                      import java.util.*;\n\
                      class A {\n\
                      \x20   void m(Map.Entry e) {}\n\
                      \x20   void q(java.util.Map.Entry e) {}\n\
                      }\n";
        assert_eq!(descriptor_in(source, "m"), None);
        assert_eq!(
            descriptor_in(source, "q").as_deref(),
            Some("(Ljava/util/Map$Entry;)V")
        );
    }

    #[test]
    fn test_import_shadows_java_lang() {
        let source = "package demo;\n\
                      import com.acme.String;\n\
                      class A {\n\
                      \x20   void m(String s, Integer i) {}\n\
                      }\n";
        assert_eq!(
            descriptor_in(source, "m").as_deref(),
            Some("(Lcom/acme/String;Ljava/lang/Integer;)V")
        );
    }

    #[test]
    fn test_union_type() {
        let union = SyntaxNode::new("catch_type", None, 1)
            .with_child(SyntaxNode::new("type_identifier", Some("IOException".into()), 1))
            .with_child(SyntaxNode::new("type_identifier", Some("Exception".into()), 1));
        assert_eq!(descriptor_of(&union, &DescriptorContext::default(), 0), None);
    }

    #[test]
    fn test_binary_name() {
        assert_eq!(binary_name("java.util.Map.Entry"), "java/util/Map$Entry");
        assert_eq!(binary_name("com.example.Foo"), "com/example/Foo");
    }
}

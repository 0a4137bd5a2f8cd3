//! End-to-end relocation of PIT mutations between Java revisions.

use std::path::PathBuf;

use ast_remap::syntax::java;
use ast_remap::{parse_path, remap, report, xml, MutationRecord, Remapper, SyntaxTree};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn load(name: &str) -> SyntaxTree {
    java::parse_file(fixture(name)).unwrap()
}

fn inventory_record(line: usize, method: &str, descriptor: &str) -> MutationRecord {
    MutationRecord {
        source_file: "Inventory.java".into(),
        mutated_class: "shop.Inventory".into(),
        mutated_method: method.into(),
        method_descriptor: descriptor.into(),
        line_number: line,
        operator_id: "NegateConditionalsMutator".into(),
        ..Default::default()
    }
}

#[test]
fn test_report_relocated_onto_new_revision() {
    let old = load("calculator/old/Calculator.java");
    let new = load("calculator/new/Calculator.java");

    let entries = report::parse_file(fixture("mutations.xml")).unwrap();
    assert_eq!(entries.len(), 3);
    let records: Vec<MutationRecord> = entries
        .iter()
        .filter(|r| r.is_in_file("Calculator.java"))
        .cloned()
        .collect();
    assert_eq!(records.len(), 2);

    let results = Remapper::default().remap_all(&old, &new, &records, &entries);
    let updated: Vec<_> = results.into_iter().map(Option::unwrap).collect();
    for u in &updated {
        assert_eq!(u.line_number, 6);
        assert_eq!(u.enclosing_class_name, "demo.Calculator");
        assert_eq!(u.enclosing_method_name, "add");
        assert_eq!(u.method_descriptor, "(II)I");
        assert_eq!(u.updated_source_text, "return x + b;");
        assert!(u.same_method());
    }

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("remapped.xml");
    let mut file = std::fs::File::create(&path).unwrap();
    report::write_remapped(&mut file, &updated).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("<originalLineNumber>5</originalLineNumber>"));
    assert!(written.contains("<sourceText>return x + b;</sourceText>"));

    let reread = report::parse_file(&path).unwrap();
    assert_eq!(reread.len(), 2);
    assert!(reread.iter().all(|r| r.line_number == 6));
    assert_eq!(reread[0].operator_id, records[0].operator_id);
    assert_eq!(reread[1].instruction_indices, vec![7]);
    assert_eq!(reread[0].status.as_deref(), Some("SURVIVED"));
}

#[test]
fn test_lines_follow_inserted_method() {
    let old = load("inventory/old/Inventory.java");
    let new = load("inventory/new/Inventory.java");
    let remapper = Remapper::default();

    let cases = [
        (13, "add", "(Ljava/lang/String;)V", 13, "items.add(item);"),
        (17, "count", "()I", 17, "return items.size();"),
        (22, "contains", "(Ljava/lang/String;)Z", 26, "if (candidate.equals(item)) {"),
        (26, "contains", "(Ljava/lang/String;)Z", 30, "return false;"),
    ];
    for (line, method, descriptor, new_line, text) in cases {
        let record = inventory_record(line, method, descriptor);
        let updated = remapper.remap(&old, &new, &record, &[]).unwrap();
        assert_eq!(updated.line_number, new_line, "line {}", line);
        assert_eq!(updated.enclosing_class_name, "shop.Inventory");
        assert_eq!(updated.enclosing_method_name, method);
        assert_eq!(updated.method_descriptor, descriptor);
        assert_eq!(updated.updated_source_text, text);
    }
}

#[test]
fn test_field_initializer_is_not_relocated() {
    let old = load("inventory/old/Inventory.java");
    let new = load("inventory/new/Inventory.java");
    let record = inventory_record(7, "<init>", "()V");
    assert!(remap(&old, &new, &record, &[]).is_none());
}

#[test]
fn test_killed_mutation_keeps_its_attributes() {
    let old = load("inventory/old/Inventory.java");
    let new = load("inventory/new/Inventory.java");
    let entries = report::parse_file(fixture("mutations.xml")).unwrap();
    let record = entries
        .iter()
        .find(|r| r.is_in_file("Inventory.java"))
        .unwrap();

    let updated = remap(&old, &new, record, &entries).unwrap();
    let rewritten = updated.to_record();
    assert_eq!(rewritten.line_number, 30);
    assert_eq!(rewritten.detected, Some(true));
    assert_eq!(rewritten.status.as_deref(), Some("KILLED"));
    assert_eq!(rewritten.instruction_order, vec![5]);
}

#[test]
fn test_xml_tree_as_input() {
    let old = load("calculator/old/Calculator.java");
    let new = load("calculator/new/Calculator.java");

    let dir = tempfile::tempdir().unwrap();
    let old_xml = dir.path().join("old.xml");
    let new_xml = dir.path().join("new.xml");
    std::fs::write(&old_xml, xml::print_to_string(&old).unwrap()).unwrap();
    std::fs::write(&new_xml, xml::print_to_string(&new).unwrap()).unwrap();

    let old_tree = parse_path(&old_xml).unwrap();
    let new_tree = parse_path(&new_xml).unwrap();
    assert_eq!(old_tree.root(), old.root());
    assert_eq!(new_tree.source(), "");

    let record = MutationRecord {
        source_file: "Calculator.java".into(),
        mutated_class: "demo.Calculator".into(),
        mutated_method: "add".into(),
        method_descriptor: "(II)I".into(),
        line_number: 5,
        ..Default::default()
    };

    // Trees loaded from XML carry no text, so only the source line is lost.
    let from_xml = remap(&old_tree, &new_tree, &record, &[]).unwrap();
    let from_java = remap(&old, &new, &record, &[]).unwrap();
    assert_eq!(from_xml.line_number, from_java.line_number);
    assert_eq!(from_xml.method_descriptor, from_java.method_descriptor);
    assert_eq!(from_xml.enclosing_class_name, from_java.enclosing_class_name);
    assert_eq!(from_xml.updated_source_text, "");

    // Mixed inputs work too: the text comes from the new revision.
    let mixed = remap(&old_tree, &new, &record, &[]).unwrap();
    assert_eq!(mixed.updated_source_text, "return x + b;");
}

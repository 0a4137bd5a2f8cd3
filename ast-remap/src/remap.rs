//! Relocation of mutation records onto a newer revision of a file.
//!
//! The stale line is carried over by majority vote over the mappings that
//! leave it. The enclosing method and type of the winning destination line
//! then give the new method name, class name and descriptor.

use std::collections::BTreeMap;

use log::debug;

use crate::constants::{
    CONSTRUCTOR_DESCRIPTOR, CONSTRUCTOR_NAME, ENCLOSING_TYPE_KINDS, METHOD_KINDS, TYPE_KINDS,
};
use crate::descriptor::{compute_method_descriptor, DescriptorContext};
use crate::matching::{MatchResult, Matcher, MatcherConfig};
use crate::mutation::{MutationRecord, UpdatedMutationRecord};
use crate::syntax::{SyntaxNode, SyntaxTree};
use crate::tree::NodeRef;

/// Relocates mutation records with a configurable matcher.
#[derive(Debug, Clone, Default)]
pub struct Remapper {
    matcher: Matcher,
}

impl Remapper {
    pub fn new(config: MatcherConfig) -> Self {
        Remapper {
            matcher: Matcher::new(config),
        }
    }

    /// Matches the two revisions and relocates one record.
    pub fn remap(
        &self,
        old: &SyntaxTree,
        new: &SyntaxTree,
        record: &MutationRecord,
        report: &[MutationRecord],
    ) -> Option<UpdatedMutationRecord> {
        let result = self.matcher.match_trees(old, new);
        remap_with(&result, new, record, report)
    }

    /// Matches the two revisions once and relocates every record.
    ///
    /// The output is index-aligned with `records`.
    pub fn remap_all(
        &self,
        old: &SyntaxTree,
        new: &SyntaxTree,
        records: &[MutationRecord],
        report: &[MutationRecord],
    ) -> Vec<Option<UpdatedMutationRecord>> {
        let result = self.matcher.match_trees(old, new);
        records
            .iter()
            .map(|record| remap_with(&result, new, record, report))
            .collect()
    }
}

/// Relocates a record with the default matcher configuration.
pub fn remap(
    old: &SyntaxTree,
    new: &SyntaxTree,
    record: &MutationRecord,
    report: &[MutationRecord],
) -> Option<UpdatedMutationRecord> {
    Remapper::default().remap(old, new, record, report)
}

/// Relocates a record using the mappings of a finished matching run.
///
/// `new` must be the destination tree of `result`. `report` holds the
/// entries of the original report, consulted when the descriptor cannot be
/// computed from the declaration.
pub fn remap_with(
    result: &MatchResult,
    new: &SyntaxTree,
    record: &MutationRecord,
    report: &[MutationRecord],
) -> Option<UpdatedMutationRecord> {
    let Some((line, anchor)) = vote_line(result, record.line_number) else {
        debug!("remap: no mapping leaves line {}", record.line_number);
        return None;
    };

    let Some(method) = std::iter::once(anchor.clone())
        .chain(anchor.ancestors())
        .find(|n| METHOD_KINDS.contains(&n.label()))
    else {
        debug!("remap: line {} is not inside a method", line);
        return None;
    };
    let Some(enclosing) = method
        .ancestors()
        .find(|n| ENCLOSING_TYPE_KINDS.contains(&n.label()))
    else {
        debug!("remap: method at line {} has no enclosing type", method.line());
        return None;
    };

    let type_chain: Vec<NodeRef> = std::iter::once(enclosing.clone())
        .chain(enclosing.ancestors())
        .filter(|n| TYPE_KINDS.contains(&n.label()))
        .collect();
    let ctx = type_chain
        .iter()
        .fold(DescriptorContext::from_root(result.dst_root.syntax()), |ctx, t| {
            ctx.with_type_parameters(t.syntax())
        });
    let class_name = qualified_name(ctx.package(), &type_chain)?;

    let is_constructor = method.label() == "constructor_declaration";
    let method_name = if is_constructor {
        CONSTRUCTOR_NAME.to_string()
    } else {
        method.syntax().name()?.to_string()
    };

    let descriptor = if is_constructor {
        Some(CONSTRUCTOR_DESCRIPTOR.to_string())
    } else {
        compute_method_descriptor(method.syntax(), &ctx)
            .or_else(|| own_descriptor(record, &method_name, enclosing.syntax()))
            .or_else(|| reported_descriptor(record, report))
    };
    let Some(method_descriptor) = descriptor else {
        debug!("remap: no descriptor for {}.{}", class_name, method_name);
        return None;
    };

    Some(UpdatedMutationRecord {
        original: record.clone(),
        line_number: line,
        enclosing_class_name: class_name,
        enclosing_method_name: method_name,
        method_descriptor,
        updated_source_text: new.line_text(line).unwrap_or_default().to_string(),
    })
}

/// Picks the destination line most mappings from `stale_line` lead to,
/// lowest line on ties, with the first mapped destination node on it.
fn vote_line(result: &MatchResult, stale_line: usize) -> Option<(usize, NodeRef)> {
    let mut votes: BTreeMap<usize, usize> = BTreeMap::new();
    for mapping in result.mappings.iter().filter(|m| m.src.line() == stale_line) {
        *votes.entry(mapping.dst.line()).or_default() += 1;
    }

    let mut best: Option<(usize, usize)> = None;
    for (&line, &count) in &votes {
        if best.is_none_or(|(_, c)| count > c) {
            best = Some((line, count));
        }
    }
    let (line, _) = best?;

    let anchor = result
        .mappings
        .iter()
        .find(|m| m.src.line() == stale_line && m.dst.line() == line)?
        .dst
        .clone();
    Some((line, anchor))
}

/// Builds `pkg.Outer.Inner` from the innermost-first type chain, then marks
/// nesting by turning the last `.` into `$`.
fn qualified_name(package: Option<&str>, type_chain: &[NodeRef]) -> Option<String> {
    let mut names = type_chain
        .iter()
        .rev()
        .map(|t| t.syntax().name())
        .collect::<Option<Vec<&str>>>()?;
    let nested = names.len() > 1;
    if let Some(package) = package {
        names.insert(0, package);
    }

    let mut name = names.join(".");
    if nested {
        if let Some(pos) = name.rfind('.') {
            name.replace_range(pos..pos + 1, "$");
        }
    }
    Some(name)
}

/// The record's own descriptor, if it names this method and the method is
/// not overloaded in its type.
fn own_descriptor(
    record: &MutationRecord,
    method_name: &str,
    enclosing: &SyntaxNode,
) -> Option<String> {
    if record.mutated_method != method_name || count_methods(enclosing, method_name) != 1 {
        return None;
    }
    Some(record.method_descriptor.clone())
}

/// Counts the methods named `name` declared directly in a type. Nested and
/// anonymous types are not entered.
fn count_methods(type_node: &SyntaxNode, name: &str) -> usize {
    type_node
        .children
        .iter()
        .map(|child| {
            if child.kind == "method_declaration" {
                usize::from(child.name() == Some(name))
            } else if TYPE_KINDS.contains(&child.kind.as_str())
                || child.kind == "object_creation_expression"
            {
                0
            } else {
                count_methods(child, name)
            }
        })
        .sum()
}

/// The single descriptor the report gives for the record's original class,
/// method and line.
fn reported_descriptor(record: &MutationRecord, report: &[MutationRecord]) -> Option<String> {
    let mut found: Option<&str> = None;
    for entry in report {
        if entry.line_number != record.line_number
            || entry.mutated_class != record.mutated_class
            || entry.mutated_method != record.mutated_method
        {
            continue;
        }
        match found {
            None => found = Some(&entry.method_descriptor),
            Some(d) if d == entry.method_descriptor => {}
            Some(_) => return None,
        }
    }
    found.map(str::to_string)
}

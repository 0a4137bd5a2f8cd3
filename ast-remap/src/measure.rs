//! Node similarity measurement.
//!
//! The matcher ranks container candidates with the Dice coefficient over
//! mapped descendants:
//!
//! `dice(A, B) = 2 * |common| / (|desc(A)| + |desc(B)|)`
//!
//! where a descendant of `A` is common when it is mapped to a descendant of
//! `B`. Descendants exclude the nodes themselves.

use rustc_hash::FxHashSet;

use crate::matching::MappingStore;
use crate::tree::NodeWrapper;

/// Dice coefficient between a source node and a destination node.
///
/// Returns 0.0 when either node has no descendants.
pub fn dice(src: &NodeWrapper, dst: &NodeWrapper, mappings: &MappingStore) -> f64 {
    let dst_ids: FxHashSet<usize> = dst.descendants_pre_order().map(|n| n.id()).collect();
    if dst_ids.is_empty() {
        return 0.0;
    }

    let mut src_count = 0usize;
    let mut common = 0usize;
    for node in src.descendants_pre_order() {
        src_count += 1;
        if mappings
            .destination_of(&node)
            .is_some_and(|d| dst_ids.contains(&d.id()))
        {
            common += 1;
        }
    }
    if src_count == 0 {
        return 0.0;
    }

    2.0 * common as f64 / (src_count + dst_ids.len()) as f64
}

/// Dice coefficient of the parents of two nodes, 0.0 if either is a root.
pub fn parent_dice(src: &NodeWrapper, dst: &NodeWrapper, mappings: &MappingStore) -> f64 {
    match (src.parent(), dst.parent()) {
        (Some(sp), Some(dp)) => dice(&sp, &dp, mappings),
        _ => 0.0,
    }
}

//! Committed node correspondences.

use std::rc::Rc;

use log::trace;
use rustc_hash::FxHashMap;

use crate::tree::{NodeRef, NodeWrapper};

/// A committed correspondence between a source and a destination node.
#[derive(Debug, Clone)]
pub struct Mapping {
    /// Node in the old tree.
    pub src: NodeRef,
    /// Node in the new tree.
    pub dst: NodeRef,
}

/// Append-only set of mappings for one matching run.
///
/// A node is the endpoint of at most one mapping, and mappings are never
/// retracted.
#[derive(Debug, Default)]
pub struct MappingStore {
    mappings: Vec<Mapping>,
    /// Source pre-order id to destination node.
    src_to_dst: FxHashMap<usize, NodeRef>,
    /// Destination pre-order id to source node.
    dst_to_src: FxHashMap<usize, NodeRef>,
}

impl MappingStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Commits a mapping between two unmapped nodes.
    ///
    /// Both endpoints are marked mapped and their ancestors are flagged as
    /// having matched children. Returns false, committing nothing, if either
    /// node is already mapped.
    pub fn link(&mut self, src: &NodeRef, dst: &NodeRef) -> bool {
        if src.is_mapped() || dst.is_mapped() {
            return false;
        }
        trace!("map {} -> {}", src, dst);

        src.set_mapped();
        dst.set_mapped();
        if let Some(parent) = src.parent() {
            parent.mark_matched_children();
        }
        if let Some(parent) = dst.parent() {
            parent.mark_matched_children();
        }

        self.src_to_dst.insert(src.id(), Rc::clone(dst));
        self.dst_to_src.insert(dst.id(), Rc::clone(src));
        self.mappings.push(Mapping {
            src: Rc::clone(src),
            dst: Rc::clone(dst),
        });
        true
    }

    /// Maps two isomorphic subtrees node by node in lockstep pre-order.
    ///
    /// Returns the number of pairs committed.
    pub fn link_subtrees(&mut self, src: &NodeRef, dst: &NodeRef) -> usize {
        NodeWrapper::pre_order(src)
            .zip(NodeWrapper::pre_order(dst))
            .filter(|(s, d)| self.link(s, d))
            .count()
    }

    /// Returns the destination mapped to a source node.
    pub fn destination_of(&self, src: &NodeWrapper) -> Option<&NodeRef> {
        if !src.is_mapped() {
            return None;
        }
        self.src_to_dst.get(&src.id())
    }

    /// Returns the source mapped to a destination node.
    pub fn source_of(&self, dst: &NodeWrapper) -> Option<&NodeRef> {
        if !dst.is_mapped() {
            return None;
        }
        self.dst_to_src.get(&dst.id())
    }

    /// Returns true if `src` is mapped to `dst`.
    pub fn has(&self, src: &NodeWrapper, dst: &NodeWrapper) -> bool {
        self.destination_of(src)
            .is_some_and(|d| d.id() == dst.id() && d.is_mapped())
    }

    /// Returns the mappings in commit order.
    pub fn mappings(&self) -> &[Mapping] {
        &self.mappings
    }

    /// Iterates over the mappings in commit order.
    pub fn iter(&self) -> std::slice::Iter<'_, Mapping> {
        self.mappings.iter()
    }

    /// Number of committed mappings.
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Returns true if nothing is mapped.
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

impl<'a> IntoIterator for &'a MappingStore {
    type Item = &'a Mapping;
    type IntoIter = std::slice::Iter<'a, Mapping>;

    fn into_iter(self) -> Self::IntoIter {
        self.mappings.iter()
    }
}

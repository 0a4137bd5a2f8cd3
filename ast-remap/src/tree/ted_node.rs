//! Reduced tree snapshots for edit-distance refinement.

use std::rc::Rc;

use super::{NodeRef, NodeWrapper};

/// A read-only copy of a wrapper subtree with its mapped child subtrees
/// removed, numbered for the Zhang–Shasha dynamic program.
#[derive(Debug)]
pub struct TedNode {
    node: NodeRef,
    children: Vec<TedNode>,
    /// 1-based post-order index.
    ordering: usize,
    /// Post-order index of the leftmost leaf of this subtree.
    left_most_leaf: usize,
}

impl TedNode {
    /// Copies `root` and every unmapped descendant reachable through
    /// unmapped nodes, then assigns post-order numbers.
    ///
    /// The root itself is always kept.
    pub fn reduced_copy(root: &NodeRef) -> TedNode {
        let mut copy = Self::copy_unmapped(root);
        let mut next = 0;
        copy.number(&mut next);
        copy
    }

    fn copy_unmapped(node: &NodeRef) -> TedNode {
        TedNode {
            node: Rc::clone(node),
            children: node
                .children()
                .iter()
                .filter(|c| !c.is_mapped())
                .map(Self::copy_unmapped)
                .collect(),
            ordering: 0,
            left_most_leaf: 0,
        }
    }

    fn number(&mut self, next: &mut usize) {
        for child in &mut self.children {
            child.number(next);
        }
        *next += 1;
        self.ordering = *next;
        self.left_most_leaf = self
            .children
            .first()
            .map_or(self.ordering, |c| c.left_most_leaf);
    }

    /// Returns the wrapper this node was copied from.
    pub fn node(&self) -> &NodeRef {
        &self.node
    }

    /// Returns the reduced children.
    pub fn children(&self) -> &[TedNode] {
        &self.children
    }

    /// Returns the 1-based post-order index.
    pub fn ordering(&self) -> usize {
        self.ordering
    }

    /// Returns the post-order index of the leftmost leaf.
    pub fn left_most_leaf(&self) -> usize {
        self.left_most_leaf
    }

    /// Number of nodes in the reduced subtree.
    pub fn size(&self) -> usize {
        self.ordering - self.left_most_leaf + 1
    }

    /// Returns true if both nodes carry the same label and identifier.
    pub fn same_content(&self, other: &TedNode) -> bool {
        NodeWrapper::same_content(&self.node, &other.node)
    }

    /// Flattens the subtree in post-order.
    pub fn post_order(&self) -> Vec<&TedNode> {
        let mut out = Vec::with_capacity(self.size());
        self.collect_post_order(&mut out);
        out
    }

    fn collect_post_order<'a>(&'a self, out: &mut Vec<&'a TedNode>) {
        for child in &self.children {
            child.collect_post_order(out);
        }
        out.push(self);
    }
}

//! Depth-first iterators over wrapper trees.

use std::rc::Rc;

use super::NodeRef;

/// Pre-order iterator.
pub struct PreOrderIter {
    /// Nodes still to visit, next on top.
    stack: Vec<NodeRef>,
}

impl PreOrderIter {
    /// Starts at `root`, yielding it first.
    pub fn new(root: NodeRef) -> Self {
        PreOrderIter { stack: vec![root] }
    }

    /// Yields every subtree of `children` in order, without their parent.
    pub fn from_children(children: &[NodeRef]) -> Self {
        PreOrderIter {
            stack: children.iter().rev().cloned().collect(),
        }
    }
}

impl Iterator for PreOrderIter {
    type Item = NodeRef;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev().cloned());
        Some(node)
    }
}

/// Post-order iterator.
pub struct PostOrderIter {
    /// Stack of (node, next_child_index) pairs.
    stack: Vec<(NodeRef, usize)>,
}

impl PostOrderIter {
    /// Starts at `root`, yielding it last.
    pub fn new(root: NodeRef) -> Self {
        PostOrderIter {
            stack: vec![(root, 0)],
        }
    }
}

impl Iterator for PostOrderIter {
    type Item = NodeRef;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (node, child_idx) = self.stack.last_mut()?;
            if let Some(child) = node.children().get(*child_idx) {
                let child = Rc::clone(child);
                *child_idx += 1;
                self.stack.push((child, 0));
            } else {
                let (node, _) = self.stack.pop()?;
                return Some(node);
            }
        }
    }
}

//! Edit operations recovered from the edit-distance tables.

use std::fmt;

use crate::tree::NodeRef;

/// One step of a Zhang–Shasha edit script.
#[derive(Debug, Clone)]
pub enum EditOperation {
    /// Remove a source node.
    Delete(NodeRef),
    /// Add a destination node.
    Insert(NodeRef),
    /// Align a source node with a destination node. `cost` is 0.0 when the
    /// nodes carry the same label and identifier.
    Change {
        src: NodeRef,
        dst: NodeRef,
        cost: f64,
    },
}

impl EditOperation {
    /// Returns the aligned pair if this is a free change.
    pub fn as_match(&self) -> Option<(&NodeRef, &NodeRef)> {
        match self {
            EditOperation::Change { src, dst, cost } if *cost == 0.0 => Some((src, dst)),
            _ => None,
        }
    }
}

impl fmt::Display for EditOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditOperation::Delete(node) => write!(f, "delete {}", node),
            EditOperation::Insert(node) => write!(f, "insert {}", node),
            EditOperation::Change { src, dst, cost } => {
                write!(f, "change {} -> {} ({})", src, dst, cost)
            }
        }
    }
}

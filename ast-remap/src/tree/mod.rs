//! Matching-side view of a syntax tree.
//!
//! Every syntax node is decorated with a `NodeWrapper` holding the metadata
//! the matcher needs: height, a structural hash, and mapping state. Children
//! are owned through `Rc`; the parent link is a `Weak` reference, so the tree
//! has a single owner chain from the root down.
//!
//! The structure is fixed once built. Only mapping state changes during a
//! matching run, through `Cell`s, so shared `NodeRef`s can be handed around
//! freely by the matching phases.

mod ted_node;
mod traversal;

pub use ted_node::TedNode;
pub use traversal::{PostOrderIter, PreOrderIter};

use std::cell::{Cell, OnceCell};
use std::fmt;
use std::rc::{Rc, Weak};

use bitflags::bitflags;
use md5::{Digest, Md5};

use crate::syntax::SyntaxNode;

bitflags! {
    /// Mapping state of a node.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MatchState: u8 {
        /// The node is an endpoint of a committed mapping.
        const MAPPED = 1;
        /// Some descendant of the node is mapped.
        const MATCHED_CHILDREN = 2;
    }
}

/// A reference-counted pointer to a node wrapper.
pub type NodeRef = Rc<NodeWrapper>;

/// A non-owning reference to a node wrapper.
pub type WeakNodeRef = Weak<NodeWrapper>;

/// A syntax node decorated with matching metadata.
pub struct NodeWrapper {
    /// Pre-order index, unique within one tree.
    id: usize,
    syntax: Rc<SyntaxNode>,
    children: Vec<NodeRef>,
    parent: WeakNodeRef,
    height: OnceCell<usize>,
    /// MD5 over label, identifier and child hashes.
    hash: [u8; 16],
    state: Cell<MatchState>,
    times_mapped: Cell<usize>,
}

impl NodeWrapper {
    /// Wraps a syntax tree. Heights are computed lazily by [`init`](Self::init).
    pub fn build(root: &Rc<SyntaxNode>) -> NodeRef {
        let mut next_id = 0;
        Self::build_node(root, Weak::new(), &mut next_id)
    }

    fn build_node(syntax: &Rc<SyntaxNode>, parent: WeakNodeRef, next_id: &mut usize) -> NodeRef {
        Rc::new_cyclic(|weak_self| {
            let id = *next_id;
            *next_id += 1;

            let children: Vec<NodeRef> = syntax
                .children
                .iter()
                .map(|child| Self::build_node(child, weak_self.clone(), next_id))
                .collect();

            let mut hasher = Md5::new();
            hasher.update(syntax.kind.as_bytes());
            match &syntax.value {
                Some(value) => {
                    hasher.update([1u8]);
                    hasher.update(value.as_bytes());
                }
                None => hasher.update([0u8]),
            }
            hasher.update((children.len() as u64).to_le_bytes());
            for child in &children {
                hasher.update(child.hash);
            }

            NodeWrapper {
                id,
                syntax: Rc::clone(syntax),
                children,
                parent,
                height: OnceCell::new(),
                hash: hasher.finalize().into(),
                state: Cell::new(MatchState::empty()),
                times_mapped: Cell::new(0),
            }
        })
    }

    /// Computes the height of this subtree (leaves are 1). Idempotent.
    pub fn init(&self) -> usize {
        *self.height.get_or_init(|| {
            1 + self
                .children
                .iter()
                .map(|c| c.init())
                .max()
                .unwrap_or(0)
        })
    }

    /// Returns the height, computing it on first use.
    pub fn height(&self) -> usize {
        self.init()
    }

    /// Returns the pre-order id of this node within its tree.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Returns the wrapped syntax node.
    pub fn syntax(&self) -> &Rc<SyntaxNode> {
        &self.syntax
    }

    /// Returns the structural type name.
    pub fn label(&self) -> &str {
        &self.syntax.kind
    }

    /// Returns the distinguishing value (name, literal, operator), if any.
    pub fn identifier(&self) -> Option<&str> {
        self.syntax.value.as_deref()
    }

    /// Returns the 1-based source line.
    pub fn line(&self) -> usize {
        self.syntax.line
    }

    /// Returns the children.
    pub fn children(&self) -> &[NodeRef] {
        &self.children
    }

    /// Returns the parent, if this is not the root.
    pub fn parent(&self) -> Option<NodeRef> {
        self.parent.upgrade()
    }

    /// Returns true if this node has no parent.
    pub fn is_root(&self) -> bool {
        self.parent.upgrade().is_none()
    }

    /// Iterates over the ancestors of this node, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = NodeRef> {
        std::iter::successors(self.parent(), |n| n.parent())
    }

    /// Pre-order descendants, excluding this node.
    ///
    /// The sequence is recomputed on every call.
    pub fn descendants_pre_order(&self) -> PreOrderIter {
        PreOrderIter::from_children(&self.children)
    }

    /// Pre-order traversal of a subtree, including its root.
    pub fn pre_order(node: &NodeRef) -> PreOrderIter {
        PreOrderIter::new(Rc::clone(node))
    }

    /// Post-order traversal of a subtree, including its root.
    ///
    /// The sequence is recomputed on every call.
    pub fn descendants_post_order(node: &NodeRef) -> PostOrderIter {
        PostOrderIter::new(Rc::clone(node))
    }

    /// Number of nodes in this subtree.
    pub fn size(&self) -> usize {
        1 + self.descendants_pre_order().count()
    }

    /// Returns true if this node is an endpoint of a committed mapping.
    pub fn is_mapped(&self) -> bool {
        self.state.get().contains(MatchState::MAPPED)
    }

    /// Marks this node as mapped.
    pub(crate) fn set_mapped(&self) {
        self.state.set(self.state.get() | MatchState::MAPPED);
    }

    /// Returns true if some descendant of this node is mapped.
    pub fn has_matched_children(&self) -> bool {
        self.state.get().contains(MatchState::MATCHED_CHILDREN)
    }

    /// Flags this node and its ancestors as having matched children.
    ///
    /// Stops at the first node already flagged, so repeated calls cost at
    /// most the height of the tree.
    pub fn mark_matched_children(&self) {
        if self.has_matched_children() {
            return;
        }
        self.state
            .set(self.state.get() | MatchState::MATCHED_CHILDREN);
        for ancestor in self.ancestors() {
            if ancestor.has_matched_children() {
                break;
            }
            ancestor
                .state
                .set(ancestor.state.get() | MatchState::MATCHED_CHILDREN);
        }
    }

    /// How often this node was part of an isomorphic top-down candidate.
    pub fn times_mapped(&self) -> usize {
        self.times_mapped.get()
    }

    pub(crate) fn bump_times_mapped(&self) {
        self.times_mapped.set(self.times_mapped.get() + 1);
    }

    /// Copies this subtree for edit-distance refinement, leaving out every
    /// child subtree whose root is already mapped.
    pub fn reduced_copy_excluding_mapped_children(node: &NodeRef) -> TedNode {
        TedNode::reduced_copy(node)
    }

    /// Compares label and identifier only, ignoring children.
    pub fn same_content(&self, other: &NodeWrapper) -> bool {
        self.label() == other.label() && self.identifier() == other.identifier()
    }
}

impl PartialEq for NodeWrapper {
    /// Structural equality: same label, same identifier, equal children in order.
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
            && self.same_content(other)
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(other.children.iter())
                .all(|(a, b)| a == b)
    }
}

impl fmt::Debug for NodeWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeWrapper")
            .field("id", &self.id)
            .field("label", &self.label())
            .field("identifier", &self.identifier())
            .field("line", &self.line())
            .field("state", &self.state.get())
            .finish()
    }
}

impl fmt::Display for NodeWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.identifier() {
            Some(id) => write!(f, "{}: {} [line {}]", self.label(), id, self.line()),
            None => write!(f, "{} [line {}]", self.label(), self.line()),
        }
    }
}

//! Tree matching algorithms.
//!
//! This module establishes correspondences between the nodes of an old
//! (source) and a new (destination) syntax tree. Matching runs in two phases
//! over a shared [`MappingStore`]:
//!
//! 1. [`TopDown`] maps the largest identical subtrees.
//! 2. [`BottomUp`] maps containers whose descendants are mostly mapped
//!    already, and refines each matched container with the Zhang–Shasha
//!    edit script when it is small enough.
//!
//! Mappings are never retracted and every node is the endpoint of at most one
//! mapping.

mod bottom_up;
mod mapping;
mod top_down;

pub use bottom_up::BottomUp;
pub use mapping::{Mapping, MappingStore};
pub use top_down::TopDown;

pub use crate::measure::dice;

use std::rc::Rc;

use log::debug;

use crate::constants::{MAX_SIZE, MIN_DICE, MIN_HEIGHT};
use crate::syntax::{SyntaxNode, SyntaxTree};
use crate::tree::{NodeRef, NodeWrapper};

/// Trait for one phase of the matcher.
///
/// A phase only adds mappings; it sees the mappings committed by the phases
/// before it.
pub trait MatchPhase {
    /// Short name used in log output.
    fn name(&self) -> &'static str;

    /// Extends `mappings` between the trees rooted at `src` and `dst`.
    fn run(&mut self, src: &NodeRef, dst: &NodeRef, mappings: &mut MappingStore);
}

/// Tuning knobs of the matcher.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatcherConfig {
    /// Subtrees of this height or lower are left to the bottom-up phase.
    pub min_height: usize,
    /// A container candidate must score strictly above this Dice value.
    pub min_dice: f64,
    /// Refinement is skipped when both reduced trees together reach this size.
    pub max_size: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        MatcherConfig {
            min_height: MIN_HEIGHT,
            min_dice: MIN_DICE,
            max_size: MAX_SIZE,
        }
    }
}

impl MatcherConfig {
    pub fn with_min_height(mut self, min_height: usize) -> Self {
        self.min_height = min_height;
        self
    }

    pub fn with_min_dice(mut self, min_dice: f64) -> Self {
        self.min_dice = min_dice;
        self
    }

    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }
}

/// Outcome of one matching run.
///
/// Holds the wrapped roots so the mappings stay navigable: every mapped node
/// can reach its ancestors through its parent links.
#[derive(Debug)]
pub struct MatchResult {
    pub src_root: NodeRef,
    pub dst_root: NodeRef,
    pub mappings: MappingStore,
}

impl MatchResult {
    /// Returns true if every node of both trees is mapped.
    pub fn is_complete(&self) -> bool {
        self.mappings.len() == self.src_root.size() && self.mappings.len() == self.dst_root.size()
    }
}

/// GumTree-style matcher.
#[derive(Debug, Clone, Default)]
pub struct Matcher {
    config: MatcherConfig,
}

impl Matcher {
    pub fn new(config: MatcherConfig) -> Self {
        Matcher { config }
    }

    /// Matches two parsed files.
    pub fn match_trees(&self, src: &SyntaxTree, dst: &SyntaxTree) -> MatchResult {
        self.match_nodes(src.root(), dst.root())
    }

    /// Matches two syntax trees given by their roots.
    pub fn match_nodes(&self, src: &Rc<SyntaxNode>, dst: &Rc<SyntaxNode>) -> MatchResult {
        let src_root = NodeWrapper::build(src);
        let dst_root = NodeWrapper::build(dst);
        src_root.init();
        dst_root.init();

        let mut mappings = MappingStore::new();
        let mut phases: [Box<dyn MatchPhase>; 2] = [
            Box::new(TopDown::new(&self.config)),
            Box::new(BottomUp::new(&self.config)),
        ];
        for phase in phases.iter_mut() {
            let before = mappings.len();
            phase.run(&src_root, &dst_root, &mut mappings);
            debug!(
                "{}: {} new mappings, {} total",
                phase.name(),
                mappings.len() - before,
                mappings.len()
            );
        }

        MatchResult {
            src_root,
            dst_root,
            mappings,
        }
    }
}

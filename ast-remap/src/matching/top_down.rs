//! Top-down phase: greedy matching of the largest isomorphic subtrees.

use std::collections::BTreeMap;

use log::debug;

use super::{MappingStore, MatchPhase, MatcherConfig};
use crate::measure::parent_dice;
use crate::tree::{NodeRef, NodeWrapper};

/// Candidate subtrees bucketed by height. Nodes of one height keep their
/// insertion order.
#[derive(Debug, Default)]
struct HeightPool {
    buckets: BTreeMap<usize, Vec<NodeRef>>,
}

impl HeightPool {
    fn new(root: &NodeRef) -> Self {
        let mut pool = HeightPool::default();
        pool.push(root.clone());
        pool
    }

    fn push(&mut self, node: NodeRef) {
        self.buckets.entry(node.init()).or_default().push(node);
    }

    /// Pushes the children of a node.
    fn open(&mut self, node: &NodeWrapper) {
        for child in node.children() {
            self.push(child.clone());
        }
    }

    /// Largest height in the pool, 0 when empty.
    fn peek_height(&self) -> usize {
        self.buckets.keys().next_back().copied().unwrap_or(0)
    }

    /// Removes and returns every node of the largest height.
    fn pop(&mut self) -> Vec<NodeRef> {
        self.buckets
            .pop_last()
            .map(|(_, nodes)| nodes)
            .unwrap_or_default()
    }
}

/// Matches identical subtrees from the tallest down to `min_height`.
///
/// A pair whose two subtrees are each isomorphic to exactly one subtree on
/// the other side is committed right away. Ambiguous pairs are resolved at
/// the end, preferring the pairs whose parents are most similar.
#[derive(Debug)]
pub struct TopDown {
    min_height: usize,
}

impl TopDown {
    pub fn new(config: &MatcherConfig) -> Self {
        TopDown {
            min_height: config.min_height,
        }
    }
}

impl MatchPhase for TopDown {
    fn name(&self) -> &'static str {
        "top-down"
    }

    fn run(&mut self, src: &NodeRef, dst: &NodeRef, mappings: &mut MappingStore) {
        let mut src_pool = HeightPool::new(src);
        let mut dst_pool = HeightPool::new(dst);
        let mut deferred: Vec<(NodeRef, NodeRef)> = Vec::new();

        loop {
            let hs = src_pool.peek_height();
            let hd = dst_pool.peek_height();
            if hs <= self.min_height && hd <= self.min_height {
                break;
            }

            if hs != hd {
                if hs > hd {
                    for node in src_pool.pop() {
                        src_pool.open(&node);
                    }
                } else {
                    for node in dst_pool.pop() {
                        dst_pool.open(&node);
                    }
                }
                continue;
            }

            let srcs = src_pool.pop();
            let dsts = dst_pool.pop();

            let mut candidates = Vec::new();
            for s in &srcs {
                for d in &dsts {
                    if **s == **d {
                        s.bump_times_mapped();
                        d.bump_times_mapped();
                        candidates.push((s.clone(), d.clone()));
                    }
                }
            }

            for (s, d) in candidates {
                if s.times_mapped() == 1 && d.times_mapped() == 1 {
                    mappings.link_subtrees(&s, &d);
                } else {
                    deferred.push((s, d));
                }
            }

            for s in srcs.iter().filter(|n| n.times_mapped() == 0) {
                src_pool.open(s);
            }
            for d in dsts.iter().filter(|n| n.times_mapped() == 0) {
                dst_pool.open(d);
            }
        }

        debug!(
            "top-down: {} unique mappings, {} ambiguous candidates",
            mappings.len(),
            deferred.len()
        );

        let mut scored: Vec<(f64, NodeRef, NodeRef)> = deferred
            .into_iter()
            .map(|(s, d)| (parent_dice(&s, &d, mappings), s, d))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        // Committing a pair marks both roots, so later candidates sharing an
        // endpoint fall out here.
        for (_, s, d) in scored {
            if s.is_mapped() || d.is_mapped() {
                continue;
            }
            mappings.link_subtrees(&s, &d);
        }
    }
}

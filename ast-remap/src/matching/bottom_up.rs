//! Bottom-up phase: container matching by Dice similarity, followed by
//! edit-distance refinement of the matched containers.

use log::{debug, trace};
use rustc_hash::FxHashSet;

use super::{MappingStore, MatchPhase, MatcherConfig};
use crate::measure::dice;
use crate::ted::ZsRefiner;
use crate::tree::{NodeRef, NodeWrapper};

/// Matches unmapped inner nodes whose descendants are already largely mapped
/// to the descendants of a same-label destination node.
#[derive(Debug)]
pub struct BottomUp {
    min_dice: f64,
    max_size: usize,
}

impl BottomUp {
    pub fn new(config: &MatcherConfig) -> Self {
        BottomUp {
            min_dice: config.min_dice,
            max_size: config.max_size,
        }
    }

    /// Unmapped destination nodes with the label of `src` sharing at least
    /// one mapped descendant with it, in destination post-order.
    fn candidates(
        &self,
        src: &NodeWrapper,
        dst_post_order: &[NodeRef],
        mappings: &MappingStore,
    ) -> Vec<NodeRef> {
        let mut seeds = FxHashSet::default();
        for node in src.descendants_pre_order() {
            let Some(partner) = mappings.destination_of(&node) else {
                continue;
            };
            for ancestor in partner.ancestors() {
                if !seeds.insert(ancestor.id()) {
                    break;
                }
            }
        }

        dst_post_order
            .iter()
            .filter(|d| !d.is_mapped() && d.label() == src.label() && seeds.contains(&d.id()))
            .cloned()
            .collect()
    }

    /// Highest-scoring candidate, ties to the first one.
    fn best_candidate(
        &self,
        src: &NodeWrapper,
        dst_post_order: &[NodeRef],
        mappings: &MappingStore,
    ) -> Option<(NodeRef, f64)> {
        let mut best: Option<(NodeRef, f64)> = None;
        for candidate in self.candidates(src, dst_post_order, mappings) {
            let score = dice(src, &candidate, mappings);
            if best.as_ref().is_none_or(|(_, s)| score > *s) {
                best = Some((candidate, score));
            }
        }
        best
    }

    /// Aligns the unmapped parts of two matched containers with the
    /// Zhang–Shasha edit script. Returns the number of pairs committed.
    fn refine(&self, src: &NodeRef, dst: &NodeRef, mappings: &mut MappingStore) -> usize {
        let src_copy = NodeWrapper::reduced_copy_excluding_mapped_children(src);
        let dst_copy = NodeWrapper::reduced_copy_excluding_mapped_children(dst);
        let combined = src_copy.size() + dst_copy.size();
        if combined >= self.max_size {
            debug!(
                "bottom-up: refinement of {} skipped, {} nodes over limit {}",
                src, combined, self.max_size
            );
            return 0;
        }

        let mut refiner = ZsRefiner::new(&src_copy, &dst_copy);
        let mut committed = 0;
        for op in refiner.edit_script() {
            if let Some((s, d)) = op.as_match() {
                if mappings.link(s, d) {
                    committed += 1;
                }
            }
        }
        trace!(
            "bottom-up: refined {} with distance {}, {} pairs",
            src,
            refiner.distance(),
            committed
        );
        committed
    }
}

impl MatchPhase for BottomUp {
    fn name(&self) -> &'static str {
        "bottom-up"
    }

    fn run(&mut self, src: &NodeRef, dst: &NodeRef, mappings: &mut MappingStore) {
        let dst_post_order: Vec<NodeRef> = NodeWrapper::descendants_post_order(dst).collect();
        let mut containers = 0;
        let mut refined = 0;

        for node in NodeWrapper::descendants_post_order(src) {
            if node.is_mapped() {
                continue;
            }

            // The roots always correspond, whatever their labels and overlap.
            if node.is_root() {
                if mappings.link(&node, dst) {
                    containers += 1;
                    refined += self.refine(&node, dst, mappings);
                }
                continue;
            }

            if !node.has_matched_children() {
                continue;
            }
            let Some((candidate, score)) = self.best_candidate(&node, &dst_post_order, mappings)
            else {
                continue;
            };
            if score > self.min_dice && mappings.link(&node, &candidate) {
                containers += 1;
                refined += self.refine(&node, &candidate, mappings);
            }
        }

        debug!(
            "bottom-up: {} containers, {} refined pairs",
            containers, refined
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::TopDown;
    use crate::syntax::SyntaxNode;
    use crate::tree::tests::{inner, leaf};
    use std::rc::Rc;

    fn block(name: &str) -> SyntaxNode {
        inner(
            "block",
            vec![inner(
                "call",
                vec![leaf("identifier", name), leaf("literal", "1")],
            )],
        )
    }

    fn run(
        src: SyntaxNode,
        dst: SyntaxNode,
        config: MatcherConfig,
    ) -> (NodeRef, NodeRef, MappingStore) {
        let src = NodeWrapper::build(&Rc::new(src));
        let dst = NodeWrapper::build(&Rc::new(dst));
        let mut mappings = MappingStore::new();
        TopDown::new(&config).run(&src, &dst, &mut mappings);
        BottomUp::new(&config).run(&src, &dst, &mut mappings);
        (src, dst, mappings)
    }

    #[test]
    fn test_container_matched_above_threshold() {
        // `m` keeps two of its three blocks; dice = 2*8 / (12 + 12) > 0.5.
        let src = inner(
            "r",
            vec![inner("m", vec![block("a"), block("b"), block("c")])],
        );
        let dst = inner(
            "r",
            vec![inner("m", vec![block("a"), block("b"), block("z")])],
        );
        let (src, dst, mappings) = run(src, dst, MatcherConfig::default().with_max_size(0));

        assert!(mappings.has(&src.children()[0], &dst.children()[0]));
        assert!(mappings.has(&src, &dst));
        // The third block is left to refinement, which is disabled here.
        assert!(!src.children()[0].children()[2].is_mapped());
    }

    #[test]
    fn test_container_below_threshold() {
        // One of three blocks in common: dice = 2*4 / (12 + 12) < 0.5.
        let src = inner(
            "r",
            vec![inner("m", vec![block("a"), block("b"), block("c")])],
        );
        let dst = inner(
            "r",
            vec![inner("m", vec![block("a"), block("y"), block("z")])],
        );
        let (src, _dst, mappings) = run(src, dst, MatcherConfig::default().with_max_size(0));

        assert!(!src.children()[0].is_mapped());
        assert!(src.is_mapped());
        assert_eq!(mappings.len(), 5);
    }

    #[test]
    fn test_refinement_maps_remaining_nodes() {
        let src = inner(
            "r",
            vec![inner("m", vec![block("a"), block("b"), block("c")])],
        );
        let dst = inner(
            "r",
            vec![inner("m", vec![block("a"), block("b"), block("z")])],
        );
        let (src, dst, mappings) = run(src, dst, MatcherConfig::default());

        let third_src = src.children()[0].children()[2].clone();
        let third_dst = dst.children()[0].children()[2].clone();
        assert!(mappings.has(&third_src, &third_dst));
        assert!(mappings.has(&third_src.children()[0], &third_dst.children()[0]));
        // The renamed identifier stays unmapped, the literal next to it is kept.
        let call_src = third_src.children()[0].clone();
        let call_dst = third_dst.children()[0].clone();
        assert!(!call_src.children()[0].is_mapped());
        assert!(!call_dst.children()[0].is_mapped());
        assert!(mappings.has(&call_src.children()[1], &call_dst.children()[1]));
    }

    #[test]
    fn test_roots_paired_without_overlap() {
        let (src, dst, mappings) = run(
            inner("r", vec![leaf("x", "1")]),
            inner("q", vec![leaf("x", "1")]),
            MatcherConfig::default(),
        );
        assert!(mappings.has(&src, &dst));
        // Refinement aligns the identical leaf under the roots.
        assert!(mappings.has(&src.children()[0], &dst.children()[0]));
    }

    #[test]
    fn test_size_gate() {
        let src = inner("r", vec![block("a"), leaf("x", "1")]);
        let dst = inner("r", vec![leaf("x", "1"), block("b")]);
        let (src, dst, mappings) = run(src, dst, MatcherConfig::default().with_max_size(4));

        assert_eq!(mappings.len(), 1);
        assert!(mappings.has(&src, &dst));
    }

    #[test]
    fn test_dice_equal_to_threshold_not_committed() {
        // One of two blocks in common: dice = 2*4 / (8 + 8) = 0.5 exactly.
        let src = inner("r", vec![inner("m", vec![block("a"), block("b")])]);
        let dst = inner("r", vec![inner("m", vec![block("a"), block("y")])]);

        let (src_at, _, _) = run(
            src.clone(),
            dst.clone(),
            MatcherConfig::default().with_max_size(0),
        );
        assert!(!src_at.children()[0].is_mapped());

        let (src_below, dst_below, mappings) = run(
            src,
            dst,
            MatcherConfig::default().with_min_dice(0.49).with_max_size(0),
        );
        assert!(mappings.has(&src_below.children()[0], &dst_below.children()[0]));
    }

    #[test]
    fn test_equal_dice_prefers_first_in_post_order() {
        // `m` shares one block with each destination `m`: both score 0.5.
        let src = inner("r", vec![inner("m", vec![block("a"), block("b")])]);
        let dst = inner(
            "r",
            vec![
                inner("m", vec![block("a"), block("p")]),
                inner("m", vec![block("b"), block("q")]),
            ],
        );
        let (src, dst, mappings) = run(
            src,
            dst,
            MatcherConfig::default().with_min_dice(0.4).with_max_size(0),
        );

        assert!(mappings.has(&src.children()[0], &dst.children()[0]));
        assert!(!dst.children()[1].is_mapped());
    }
}

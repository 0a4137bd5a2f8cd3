//! Zhang–Shasha tree edit distance over reduced trees.
//!
//! Nodes are addressed by their 1-based post-order index. For every pair of
//! keyroots the forest-distance table is filled with the usual three
//! recurrences, and a back-pointer is kept per cell so the edit script can be
//! read off afterwards. Ties prefer aligning two nodes over deleting, and
//! deleting over inserting.
//!
//! The tables are quadratic in the tree sizes, which is why the bottom-up
//! phase only calls this on trees below `max_size` combined nodes.

mod operation;

pub use operation::EditOperation;

use crate::constants::{CHANGE_COST, DELETE_COST, INSERT_COST};
use crate::tree::TedNode;

/// Back-pointer of a forest-distance cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Start,
    Delete,
    Insert,
    /// Both prefixes are whole trees, their roots are aligned.
    Change,
    /// The last subtrees of both forests are aligned as a block.
    Subtree,
}

/// Edit-distance computation between two reduced trees.
pub struct ZsRefiner<'a> {
    /// Nodes in post-order; index `k - 1` holds post-order number `k`.
    src: Vec<&'a TedNode>,
    dst: Vec<&'a TedNode>,
    src_keyroots: Vec<usize>,
    dst_keyroots: Vec<usize>,
    /// Tree distances, indexed by post-order numbers.
    tree_dist: Vec<Vec<f64>>,
    forest_dist: Vec<Vec<f64>>,
    steps: Vec<Vec<Step>>,
}

impl<'a> ZsRefiner<'a> {
    /// Prepares the tables and computes the distance for every keyroot pair.
    pub fn new(src: &'a TedNode, dst: &'a TedNode) -> Self {
        let src = src.post_order();
        let dst = dst.post_order();
        let (n, m) = (src.len(), dst.len());

        let mut refiner = ZsRefiner {
            src_keyroots: keyroots(&src),
            dst_keyroots: keyroots(&dst),
            src,
            dst,
            tree_dist: vec![vec![0.0; m + 1]; n + 1],
            forest_dist: vec![vec![0.0; m + 1]; n + 1],
            steps: vec![vec![Step::Start; m + 1]; n + 1],
        };

        for idx in 0..refiner.src_keyroots.len() {
            for jdx in 0..refiner.dst_keyroots.len() {
                let (i, j) = (refiner.src_keyroots[idx], refiner.dst_keyroots[jdx]);
                refiner.compute_forest_dist(i, j);
            }
        }
        refiner
    }

    /// Edit distance between the two whole trees.
    pub fn distance(&self) -> f64 {
        self.tree_dist[self.src.len()][self.dst.len()]
    }

    /// Recovers a minimal edit script for the whole trees.
    ///
    /// Every node of either tree appears in exactly one operation.
    pub fn edit_script(&mut self) -> Vec<EditOperation> {
        let mut ops = Vec::new();
        let mut pending = vec![(self.src.len(), self.dst.len())];

        while let Some((last_row, last_col)) = pending.pop() {
            self.compute_forest_dist(last_row, last_col);

            let first_row = self.src_lml(last_row) - 1;
            let first_col = self.dst_lml(last_col) - 1;
            let (mut row, mut col) = (last_row, last_col);

            while row > first_row || col > first_col {
                match self.steps[row][col] {
                    Step::Delete => {
                        ops.push(EditOperation::Delete(self.src[row - 1].node().clone()));
                        row -= 1;
                    }
                    Step::Insert => {
                        ops.push(EditOperation::Insert(self.dst[col - 1].node().clone()));
                        col -= 1;
                    }
                    Step::Change => {
                        ops.push(EditOperation::Change {
                            src: self.src[row - 1].node().clone(),
                            dst: self.dst[col - 1].node().clone(),
                            cost: self.change_cost(row, col),
                        });
                        row -= 1;
                        col -= 1;
                    }
                    Step::Subtree => {
                        pending.push((row, col));
                        row = self.src_lml(row) - 1;
                        col = self.dst_lml(col) - 1;
                    }
                    Step::Start => break,
                }
            }
        }
        ops
    }

    /// Fills the forest-distance table for the subtrees rooted at `i` and `j`.
    fn compute_forest_dist(&mut self, i: usize, j: usize) {
        let li = self.src_lml(i);
        let lj = self.dst_lml(j);

        self.forest_dist[li - 1][lj - 1] = 0.0;
        self.steps[li - 1][lj - 1] = Step::Start;
        for di in li..=i {
            self.forest_dist[di][lj - 1] = self.forest_dist[di - 1][lj - 1] + DELETE_COST;
            self.steps[di][lj - 1] = Step::Delete;
        }
        for dj in lj..=j {
            self.forest_dist[li - 1][dj] = self.forest_dist[li - 1][dj - 1] + INSERT_COST;
            self.steps[li - 1][dj] = Step::Insert;
        }

        for di in li..=i {
            for dj in lj..=j {
                let delete = self.forest_dist[di - 1][dj] + DELETE_COST;
                let insert = self.forest_dist[di][dj - 1] + INSERT_COST;

                let whole_trees = self.src_lml(di) == li && self.dst_lml(dj) == lj;
                let (mut best, mut step) = if whole_trees {
                    (
                        self.forest_dist[di - 1][dj - 1] + self.change_cost(di, dj),
                        Step::Change,
                    )
                } else {
                    (
                        self.forest_dist[self.src_lml(di) - 1][self.dst_lml(dj) - 1]
                            + self.tree_dist[di][dj],
                        Step::Subtree,
                    )
                };
                if delete < best {
                    best = delete;
                    step = Step::Delete;
                }
                if insert < best {
                    best = insert;
                    step = Step::Insert;
                }

                self.forest_dist[di][dj] = best;
                self.steps[di][dj] = step;
                if whole_trees {
                    self.tree_dist[di][dj] = best;
                }
            }
        }
    }

    fn change_cost(&self, i: usize, j: usize) -> f64 {
        if self.src[i - 1].same_content(self.dst[j - 1]) {
            0.0
        } else {
            CHANGE_COST
        }
    }

    fn src_lml(&self, i: usize) -> usize {
        self.src[i - 1].left_most_leaf()
    }

    fn dst_lml(&self, j: usize) -> usize {
        self.dst[j - 1].left_most_leaf()
    }
}

/// Keyroots in ascending post-order: the highest node of each distinct
/// leftmost leaf.
fn keyroots(nodes: &[&TedNode]) -> Vec<usize> {
    let mut seen = vec![false; nodes.len() + 1];
    let mut roots = Vec::new();
    for node in nodes.iter().rev() {
        let lml = node.left_most_leaf();
        if !seen[lml] {
            seen[lml] = true;
            roots.push(node.ordering());
        }
    }
    roots.reverse();
    roots
}

//! Maximum-weight spanning-tree construction, used both to choose the order in which pairwise
//! alignments are glued into a multi-structure alignment and to choose the order in which
//! pairwise superpositions are composed.

use std::collections::{HashMap, VecDeque};

use itertools::Itertools;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::alignment::Alignment;
use crate::error::{Context, CustomError, Error, ErrorKind};

/// One scored edge between two structures, identified by their index in `0..n`. `tie_break` is
/// consulted only when two edges have an equal `score` (e.g. the superposition orderer uses the
/// pairwise SSAP score to break ties between edges with an equal shared-column count); leave it
/// at `0.0` when there is no secondary score to prefer.
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct ScoredEdge {
    pub a: usize,
    pub b: usize,
    pub score: f64,
    pub tie_break: f64,
}

impl ScoredEdge {
    #[must_use]
    pub const fn new(a: usize, b: usize, score: f64) -> Self {
        Self {
            a,
            b,
            score,
            tie_break: 0.0,
        }
    }

    #[must_use]
    pub const fn with_tie_break(a: usize, b: usize, score: f64, tie_break: f64) -> Self {
        Self {
            a,
            b,
            score,
            tie_break,
        }
    }

    #[must_use]
    pub fn normalized(self) -> (usize, usize) {
        if self.a <= self.b {
            (self.a, self.b)
        } else {
            (self.b, self.a)
        }
    }
}

struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    fn union(&mut self, a: usize, b: usize) -> bool {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            false
        } else {
            self.parent[ra] = rb;
            true
        }
    }
}

/// Build a maximum-weight spanning tree over `n` nodes (`0..n`) given scored edges. Ties are
/// broken deterministically: among edges of equal score, the one with the lexicographically
/// smaller `(a, b)` (after normalising `a <= b`) is preferred.
///
/// # Errors
/// [`ErrorKind::SpanningTreeDisconnected`] if `edges` doesn't connect all `n` nodes; the error's
/// long description names the resulting connected components.
pub fn max_spanning_tree(n: usize, edges: &[ScoredEdge]) -> Result<Vec<ScoredEdge>, Error> {
    let sorted: Vec<ScoredEdge> = edges
        .iter()
        .copied()
        .sorted_by(|x, y| {
            OrderedFloat(y.score)
                .cmp(&OrderedFloat(x.score))
                .then_with(|| OrderedFloat(y.tie_break).cmp(&OrderedFloat(x.tie_break)))
                .then_with(|| x.normalized().cmp(&y.normalized()))
        })
        .collect();

    let mut dsu = DisjointSet::new(n);
    let mut tree = Vec::new();
    for edge in sorted {
        if dsu.union(edge.a, edge.b) {
            tree.push(edge);
        }
    }

    if tree.len() + 1 != n {
        let mut components: HashMap<usize, Vec<usize>> = HashMap::new();
        for node in 0..n {
            let root = dsu.find(node);
            components.entry(root).or_default().push(node);
        }
        let mut groups: Vec<Vec<usize>> = components.into_values().collect();
        groups.sort();
        let described = groups
            .iter()
            .map(|g| format!("{{{}}}", g.iter().map(ToString::to_string).collect::<Vec<_>>().join(",")))
            .collect::<Vec<_>>()
            .join(", ");
        return Err(Error::with_context(
            ErrorKind::SpanningTreeDisconnected,
            CustomError::error(
                "spanning tree graph is disconnected",
                format!("connected components: {described}"),
                Context::none(),
            ),
        ));
    }

    Ok(tree)
}

/// Walk a spanning tree breadth-first from `root`, returning each edge oriented `(parent,
/// child)` in the order it is first reached. Every node in `0..n` reachable from `root` via
/// `tree` appears exactly once as a `child`.
#[must_use]
pub fn bfs_tree_order(n: usize, tree: &[ScoredEdge], root: usize) -> Vec<(usize, usize)> {
    let mut adjacency: HashMap<usize, Vec<usize>> = HashMap::new();
    for edge in tree {
        adjacency.entry(edge.a).or_default().push(edge.b);
        adjacency.entry(edge.b).or_default().push(edge.a);
    }
    for neighbours in adjacency.values_mut() {
        neighbours.sort_unstable();
    }

    let mut visited = vec![false; n];
    if root < n {
        visited[root] = true;
    }
    let mut queue = VecDeque::from([root]);
    let mut order = Vec::new();

    while let Some(parent) = queue.pop_front() {
        let Some(neighbours) = adjacency.get(&parent) else {
            continue;
        };
        for &child in neighbours {
            if visited[child] {
                continue;
            }
            visited[child] = true;
            order.push((parent, child));
            queue.push_back(child);
        }
    }
    order
}

/// Glue `n` pairwise alignments (one `Alignment` per scored edge, each with exactly two entries
/// named after the structure index they refer to, e.g. `"0"`, `"1"`) into one multi-entry
/// alignment covering all `n` structures, along the maximum spanning tree of `edges`.
///
/// # Errors
/// If the graph is disconnected, or a glue step fails (mismatched shared-entry naming).
pub fn build_multi_alignment(
    n: usize,
    edges_and_alignments: &[(ScoredEdge, Alignment)],
) -> Result<Alignment, Error> {
    let edges: Vec<ScoredEdge> = edges_and_alignments.iter().map(|(e, _)| *e).collect();
    let tree = max_spanning_tree(n, &edges)?;

    let mut by_pair: HashMap<(usize, usize), &Alignment> = HashMap::new();
    for (edge, alignment) in edges_and_alignments {
        by_pair.insert(edge.normalized(), alignment);
    }

    let mut built: Option<Alignment> = None;

    for (parent, child) in bfs_tree_order(n, &tree, 0) {
        let pair = if parent <= child {
            (parent, child)
        } else {
            (child, parent)
        };
        let edge_alignment = by_pair[&pair];
        built = Some(match built {
            None => edge_alignment.clone(),
            Some(current) => {
                let ia = current.entry_index(&parent.to_string()).ok_or_else(|| {
                    Error::with_context(
                        ErrorKind::SegmentOutOfOrder,
                        CustomError::error(
                            "glue entry not found",
                            format!("structure {parent} missing from the built alignment"),
                            Context::none(),
                        ),
                    )
                })?;
                let ib = edge_alignment.entry_index(&parent.to_string()).ok_or_else(|| {
                    Error::with_context(
                        ErrorKind::SegmentOutOfOrder,
                        CustomError::error(
                            "glue entry not found",
                            format!("structure {parent} missing from its pairwise alignment"),
                            Context::none(),
                        ),
                    )
                })?;
                current.glue(ia, edge_alignment, ib)?
            }
        });
    }

    built.ok_or_else(|| {
        Error::with_context(
            ErrorKind::SpanningTreeDisconnected,
            CustomError::error(
                "no structures to glue",
                "build_multi_alignment requires at least one structure",
                Context::none(),
            ),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spanning_tree_picks_highest_scoring_edges_deterministically() {
        let edges = vec![
            ScoredEdge::new(0, 1, 85.40),
            ScoredEdge::new(0, 2, 86.25),
            ScoredEdge::new(0, 3, 87.96),
            ScoredEdge::new(1, 2, 85.21),
            ScoredEdge::new(1, 3, 84.20),
            ScoredEdge::new(2, 3, 88.34),
        ];
        let tree = max_spanning_tree(4, &edges).unwrap();
        let order: Vec<(usize, usize)> = tree.iter().map(|e| (e.a, e.b)).collect();
        assert_eq!(order, vec![(2, 3), (0, 3), (0, 1)]);
    }

    #[test]
    fn disconnected_graph_is_rejected() {
        let edges = vec![ScoredEdge::new(0, 1, 10.0)];
        let err = max_spanning_tree(3, &edges).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SpanningTreeDisconnected);
    }
}

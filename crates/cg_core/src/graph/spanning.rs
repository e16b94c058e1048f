//! # Minimum Spanning Forest
//!
//! Kruskal's algorithm, run separately inside every connected component of
//! the candidate graph. The team-edge stage leaves one component per team, so
//! the result is one tree per team and never a cross-team edge.
//!
//! ## Algorithm
//! 1. Split the nodes into connected components
//! 2. Per component: stable-sort its edges by ascending weight
//! 3. Take an edge unless both endpoints already share a root (union-find)
//! 4. Stop once the component is spanned (`len - 1` edges)

use std::collections::HashMap;

use pathfinding::undirected::connected_components::connected_components;

use super::{Edge, NodeId};

/// Disjoint-set forest with path halving and union by size.
struct UnionFind {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Returns `false` when `a` and `b` were already joined.
    fn union(&mut self, a: usize, b: usize) -> bool {
        let (mut ra, mut rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        if self.size[ra] < self.size[rb] {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.parent[rb] = ra;
        self.size[ra] += self.size[rb];
        true
    }
}

/// Kruskal over one component. `nodes` must contain every edge endpoint.
///
/// `pathfinding::undirected::kruskal` needs `Ord` weights and sorts
/// unstably; equal-weight edges here must be taken in candidate order so
/// that coincident players always produce the same tree.
fn kruskal(nodes: &[NodeId], edges: &[Edge]) -> Vec<Edge> {
    let index: HashMap<NodeId, usize> = nodes.iter().enumerate().map(|(i, &n)| (n, i)).collect();
    let target = nodes.len().saturating_sub(1);

    let mut sorted = edges.to_vec();
    // Stable: equal weights keep candidate order.
    sorted.sort_by(|x, y| x.weight.total_cmp(&y.weight));

    let mut sets = UnionFind::new(nodes.len());
    let mut tree = Vec::with_capacity(target);
    for edge in sorted {
        if tree.len() == target {
            break;
        }
        let (Some(&ia), Some(&ib)) = (index.get(&edge.a), index.get(&edge.b)) else {
            continue;
        };
        if sets.union(ia, ib) {
            tree.push(edge);
        }
    }
    tree
}

/// Minimum spanning forest of the graph `(nodes, edges)`.
///
/// Every connected component gets its own minimum spanning tree; isolated
/// nodes contribute nothing. Returned edges keep their original weights and
/// are sorted by endpoint pair.
pub fn minimum_spanning_forest(nodes: &[NodeId], edges: &[Edge]) -> Vec<Edge> {
    let mut adjacency: HashMap<NodeId, Vec<NodeId>> =
        nodes.iter().map(|&n| (n, Vec::new())).collect();
    for e in edges {
        adjacency.entry(e.a).or_default().push(e.b);
        adjacency.entry(e.b).or_default().push(e.a);
    }

    let mut components: Vec<Vec<NodeId>> = connected_components(nodes, |n| {
        adjacency.get(n).cloned().unwrap_or_default()
    })
    .into_iter()
    .map(|set| {
        let mut members: Vec<NodeId> = set.into_iter().collect();
        members.sort_unstable();
        members
    })
    .collect();
    components.sort_unstable_by_key(|members| members.first().copied());

    let mut forest = Vec::new();
    for members in &components {
        if members.len() < 2 {
            continue;
        }
        let inside: Vec<Edge> = edges
            .iter()
            .filter(|e| members.binary_search(&e.a).is_ok() && members.binary_search(&e.b).is_ok())
            .copied()
            .collect();
        forest.extend(kruskal(members, &inside));
    }
    forest.sort_by_key(|e| (e.a, e.b));
    forest
}

//! The topology arena and its structural invariants.

use crate::{NodeId, Result, Side, TopologyError, TreeNode};

/// A binary search tree of switches, ordered by id.
///
/// Invariants (checked by [`Topology::validate`], preserved by every rotation):
/// - left subtree ids < node id < right subtree ids
/// - every non-root node's parent links back to it
/// - exactly one root, and every node is reachable from it
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Topology {
    pub(crate) nodes: Vec<TreeNode>,
    pub(crate) root: NodeId,
}

impl Topology {
    /// Number of nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: construction rejects empty trees.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Current root.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// All node ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().map(|n| n.id)
    }

    /// Whether the id resolves to a node of this topology.
    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        id.index().is_some_and(|i| i < self.nodes.len())
    }

    /// Whether a link points at a real node (not absent, not out of range).
    #[inline]
    pub fn is_valid_node(&self, link: Option<NodeId>) -> bool {
        link.is_some_and(|id| self.contains(id))
    }

    /// Resolve an id.
    pub fn node(&self, id: NodeId) -> Result<&TreeNode> {
        id.index()
            .and_then(|i| self.nodes.get(i))
            .ok_or(TopologyError::UnknownNode(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut TreeNode> {
        id.index()
            .and_then(|i| self.nodes.get_mut(i))
            .ok_or(TopologyError::UnknownNode(id))
    }

    /// Parent link of `id`.
    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    /// Left child link of `id`.
    pub fn left_child(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(id)?.left)
    }

    /// Right child link of `id`.
    pub fn right_child(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(id)?.right)
    }

    /// Which child slot of its parent `id` occupies; `None` for a root.
    ///
    /// Fails if the parent does not link back to `id`.
    pub fn side_of(&self, id: NodeId) -> Result<Option<Side>> {
        let Some(parent) = self.parent(id)? else {
            return Ok(None);
        };
        let p = self.node(parent)?;
        if p.left == Some(id) {
            Ok(Some(Side::Left))
        } else if p.right == Some(id) {
            Ok(Some(Side::Right))
        } else {
            Err(TopologyError::InconsistentLink { parent, child: id })
        }
    }

    /// Number of edges between `id` and the root.
    pub fn depth(&self, id: NodeId) -> Result<usize> {
        let mut depth = 0;
        let mut cur = id;
        while let Some(parent) = self.parent(cur)? {
            depth += 1;
            if depth > self.nodes.len() {
                return Err(TopologyError::Unreachable(id));
            }
            cur = parent;
        }
        Ok(depth)
    }

    /// `id` followed by each of its ancestors up to the root.
    pub fn path_to_root(&self, id: NodeId) -> Result<Vec<NodeId>> {
        let mut path = vec![id];
        let mut cur = id;
        while let Some(parent) = self.parent(cur)? {
            if path.len() > self.nodes.len() {
                return Err(TopologyError::Unreachable(id));
            }
            path.push(parent);
            cur = parent;
        }
        Ok(path)
    }

    /// Deepest node having both `a` and `b` in its subtree.
    pub fn lowest_common_ancestor(&self, a: NodeId, b: NodeId) -> Result<NodeId> {
        let path_a = self.path_to_root(a)?;
        let path_b = self.path_to_root(b)?;

        // Both paths end at the root; walk back from there while they agree.
        let mut lca = self.root;
        for (x, y) in path_a.iter().rev().zip(path_b.iter().rev()) {
            if x != y {
                break;
            }
            lca = *x;
        }
        Ok(lca)
    }

    /// Edges a node must climb before it sits at the common ancestor with `other`.
    pub fn climb_distance(&self, from: NodeId, other: NodeId) -> Result<usize> {
        let lca = self.lowest_common_ancestor(from, other)?;
        Ok(self.depth(from)? - self.depth(lca)?)
    }

    /// Tree distance (edge count) between two nodes.
    pub fn distance(&self, a: NodeId, b: NodeId) -> Result<usize> {
        Ok(self.climb_distance(a, b)? + self.climb_distance(b, a)?)
    }

    /// Nodes on the tree path from `a` to `b`, both ends included.
    pub fn path_between(&self, a: NodeId, b: NodeId) -> Result<Vec<NodeId>> {
        let lca = self.lowest_common_ancestor(a, b)?;
        let mut path: Vec<NodeId> = self
            .path_to_root(a)?
            .into_iter()
            .take_while(|&id| id != lca)
            .collect();
        path.push(lca);

        let mut down: Vec<NodeId> = self
            .path_to_root(b)?
            .into_iter()
            .take_while(|&id| id != lca)
            .collect();
        down.reverse();
        path.extend(down);
        Ok(path)
    }

    /// The path from `a` to `b` together with every neighbour of a node on
    /// it, sorted. Any rotation lifting either end toward the other changes
    /// links only inside this set.
    pub fn path_neighbourhood(&self, a: NodeId, b: NodeId) -> Result<Vec<NodeId>> {
        let path = self.path_between(a, b)?;
        let mut zone = path.clone();
        for &id in &path {
            let node = self.node(id)?;
            zone.extend(node.parent);
            zone.extend(node.left);
            zone.extend(node.right);
        }
        zone.sort_unstable();
        zone.dedup();
        Ok(zone)
    }

    /// Node ids in in-order traversal. Equals `ids()` for a valid tree.
    pub fn in_order(&self) -> Result<Vec<NodeId>> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = Vec::new();
        let mut cur = Some(self.root);

        while cur.is_some() || !stack.is_empty() {
            while let Some(id) = cur {
                if stack.len() > self.nodes.len() {
                    return Err(TopologyError::Unreachable(id));
                }
                stack.push(id);
                cur = self.left_child(id)?;
            }
            if let Some(id) = stack.pop() {
                out.push(id);
                if out.len() > self.nodes.len() {
                    return Err(TopologyError::Unreachable(id));
                }
                cur = self.right_child(id)?;
            }
        }
        Ok(out)
    }

    /// All `(parent, child)` edges, ordered by child id.
    pub fn edges(&self) -> Vec<(NodeId, NodeId)> {
        self.nodes
            .iter()
            .filter_map(|n| n.parent.map(|p| (p, n.id)))
            .collect()
    }

    /// Check every structural invariant.
    pub fn validate(&self) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(TopologyError::Empty);
        }

        let roots: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|n| n.is_root())
            .map(|n| n.id)
            .collect();
        if roots != [self.root] {
            return Err(TopologyError::RootMismatch(roots));
        }

        // Bidirectional consistency, both ways round.
        for node in &self.nodes {
            if node.parent.is_some() {
                self.side_of(node.id)?;
            }
            for child in [node.left, node.right].into_iter().flatten() {
                if self.parent(child)? != Some(node.id) {
                    return Err(TopologyError::InconsistentLink {
                        parent: node.id,
                        child,
                    });
                }
            }
        }

        // Reachability and ordering: DFS carrying the open id interval.
        let mut seen = vec![false; self.nodes.len()];
        let mut stack: Vec<(NodeId, Option<NodeId>, Option<NodeId>, Option<NodeId>)> =
            vec![(self.root, None, None, None)];

        while let Some((id, parent, lo, hi)) = stack.pop() {
            let slot = id.index().ok_or(TopologyError::UnknownNode(id))?;
            if seen[slot] {
                return Err(TopologyError::Unreachable(id));
            }
            seen[slot] = true;

            let in_range = lo.map_or(true, |lo| id > lo) && hi.map_or(true, |hi| id < hi);
            if !in_range {
                return Err(TopologyError::OrderViolation {
                    node: parent.unwrap_or(id),
                    offender: id,
                });
            }

            let node = self.node(id)?;
            if let Some(left) = node.left {
                stack.push((left, Some(id), lo, Some(id)));
            }
            if let Some(right) = node.right {
                stack.push((right, Some(id), Some(id), hi));
            }
        }

        if let Some(slot) = seen.iter().position(|s| !s) {
            return Err(TopologyError::Unreachable(self.nodes[slot].id));
        }

        Ok(())
    }
}

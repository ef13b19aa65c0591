//! Tree construction: balanced, from an explicit edge list, or raw links.

use tracing::warn;

use crate::{NodeId, Result, Side, Topology, TopologyError, TreeNode};

impl Topology {
    /// Balanced BST over ids `1..=num_nodes`, built by recursive midpoints.
    ///
    /// ```
    /// use opticnet_topology::{NodeId, Topology};
    ///
    /// let tree = Topology::balanced(7).unwrap();
    /// assert_eq!(tree.root(), NodeId(4));
    /// ```
    pub fn balanced(num_nodes: u32) -> Result<Self> {
        if num_nodes == 0 {
            return Err(TopologyError::Empty);
        }

        let mut nodes: Vec<TreeNode> = (1..=num_nodes)
            .map(|i| TreeNode::detached(NodeId(i)))
            .collect();

        // (lo, hi, parent, side) ranges still to place, inclusive bounds.
        let mut pending = vec![(1u32, num_nodes, None::<(NodeId, Side)>)];
        let mut root = NodeId(1);

        while let Some((lo, hi, link)) = pending.pop() {
            if lo > hi {
                continue;
            }
            let mid = lo + (hi - lo) / 2;
            let id = NodeId(mid);

            match link {
                None => root = id,
                Some((parent, side)) => {
                    nodes[(mid - 1) as usize].parent = Some(parent);
                    nodes[(parent.0 - 1) as usize].set_child(side, Some(id));
                }
            }

            if mid > lo {
                pending.push((lo, mid - 1, Some((id, Side::Left))));
            }
            if mid < hi {
                pending.push((mid + 1, hi, Some((id, Side::Right))));
            }
        }

        Ok(Self { nodes, root })
    }

    /// Tree from `(parent, child)` edges over ids `1..=num_nodes`.
    ///
    /// Each child is placed on the side its id dictates, so the result is a
    /// BST whenever the edges describe one. Anything else is rejected.
    pub fn from_edges(num_nodes: u32, edges: &[(u32, u32)]) -> Result<Self> {
        if num_nodes == 0 {
            return Err(TopologyError::Empty);
        }

        let mut nodes: Vec<TreeNode> = (1..=num_nodes)
            .map(|i| TreeNode::detached(NodeId(i)))
            .collect();

        for &(parent, child) in edges {
            let (parent, child) = (NodeId(parent), NodeId(child));
            let p = parent
                .index()
                .filter(|&i| i < nodes.len())
                .ok_or(TopologyError::UnknownNode(parent))?;
            let c = child
                .index()
                .filter(|&i| i < nodes.len())
                .ok_or(TopologyError::UnknownNode(child))?;

            let side = if child < parent { Side::Left } else { Side::Right };
            if parent == child || nodes[c].parent.is_some() || nodes[p].child(side).is_some() {
                return Err(TopologyError::InvalidEdge { parent, child });
            }

            nodes[c].parent = Some(parent);
            nodes[p].set_child(side, Some(child));
        }

        let roots: Vec<NodeId> = nodes.iter().filter(|n| n.is_root()).map(|n| n.id).collect();
        if roots.len() != 1 {
            return Err(TopologyError::RootMismatch(roots));
        }
        let root = roots[0];

        let tree = Self { nodes, root };
        tree.validate()?;
        Ok(tree)
    }

    /// [`Topology::from_edges`], falling back to [`Topology::balanced`] when
    /// the edge list does not describe a BST.
    pub fn from_edges_or_balanced(num_nodes: u32, edges: &[(u32, u32)]) -> Result<Self> {
        match Self::from_edges(num_nodes, edges) {
            Ok(tree) => Ok(tree),
            Err(TopologyError::Empty) => Err(TopologyError::Empty),
            Err(e) => {
                warn!(error = %e, num_nodes, "edge list is not a BST, building a balanced tree");
                Self::balanced(num_nodes)
            }
        }
    }

    /// Restore a topology from raw links without checking invariants.
    ///
    /// `nodes[i]` must carry id `i + 1`. Call [`Topology::validate`] before
    /// trusting the result.
    pub fn from_links_unchecked(nodes: Vec<TreeNode>, root: NodeId) -> Result<Self> {
        if nodes.is_empty() {
            return Err(TopologyError::Empty);
        }
        if let Some(misplaced) = nodes
            .iter()
            .enumerate()
            .find(|(i, n)| n.id.index() != Some(*i))
        {
            return Err(TopologyError::UnknownNode(misplaced.1.id));
        }

        let tree = Self { nodes, root };
        if !tree.contains(root) {
            return Err(TopologyError::UnknownNode(root));
        }
        Ok(tree)
    }

    /// Raw links, for snapshots.
    pub fn links(&self) -> &[TreeNode] {
        &self.nodes
    }
}

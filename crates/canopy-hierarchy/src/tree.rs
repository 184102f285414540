use canopy_protocol::ManagerRole;
use serde::Serialize;

/// One manager in a built hierarchy snapshot.
///
/// Children are exclusively owned: every node except the root has exactly
/// one parent, so the structure is a tree by construction.
#[derive(Debug, Clone, Serialize)]
pub struct ManagerNode {
    pub id: String,
    pub role: ManagerRole,
    pub children: Vec<ManagerNode>,
}

impl ManagerNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Nodes in this subtree including self, never less than 1. This is
    /// the weight used to divide angular sectors in the radial layout.
    pub fn subtree_size(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(|c| c.subtree_size())
            .sum::<usize>()
    }
}

/// The rooted tree of managers for one snapshot.
///
/// Immutable once built; a refresh produces a brand-new tree rather than
/// mutating the previous one, so published trees are safe to share.
#[derive(Debug, Clone, Serialize)]
pub struct HierarchyTree {
    root: ManagerNode,
}

impl HierarchyTree {
    pub(crate) fn new(root: ManagerNode) -> Self {
        Self { root }
    }

    /// The group leader.
    pub fn root(&self) -> &ManagerNode {
        &self.root
    }

    /// Total number of managers in the tree.
    pub fn node_count(&self) -> usize {
        self.root.subtree_size()
    }

    /// Depth of the deepest manager; a leader with no members has depth 0.
    pub fn max_depth(&self) -> usize {
        fn depth_of(node: &ManagerNode) -> usize {
            node.children
                .iter()
                .map(|c| 1 + depth_of(c))
                .max()
                .unwrap_or(0)
        }
        depth_of(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, children: Vec<ManagerNode>) -> ManagerNode {
        ManagerNode {
            id: id.to_string(),
            role: ManagerRole::Member,
            children,
        }
    }

    #[test]
    fn test_subtree_size_counts_self() {
        let leaf = node("gm-1", vec![]);
        assert_eq!(leaf.subtree_size(), 1);

        let parent = node("gm-0", vec![node("gm-1", vec![]), node("gm-2", vec![])]);
        assert_eq!(parent.subtree_size(), 3);
    }

    #[test]
    fn test_max_depth() {
        let chain = node("a", vec![node("b", vec![node("c", vec![])])]);
        let tree = HierarchyTree::new(chain);
        assert_eq!(tree.max_depth(), 2);
        assert_eq!(tree.node_count(), 3);

        let single = HierarchyTree::new(node("only", vec![]));
        assert_eq!(single.max_depth(), 0);
        assert_eq!(single.node_count(), 1);
    }
}

//! Build an immutable manager tree from a cluster-reported description.

use std::collections::HashSet;

use canopy_protocol::ManagerDescription;

use crate::tree::{HierarchyTree, ManagerNode};
use crate::HierarchyError;

/// Build a rooted tree from the leader description reported by the cluster.
///
/// Pure: identical input yields an identical tree, and child order follows
/// the description. Fails if any manager identifier is blank or appears
/// more than once (a membership cycle, or a manager listed under two
/// parents, both collapse to a repeated identifier during the traversal).
pub fn build(description: &ManagerDescription) -> Result<HierarchyTree, HierarchyError> {
    let mut seen = HashSet::new();
    let root = build_node(description, &mut seen)?;
    Ok(HierarchyTree::new(root))
}

fn build_node(
    description: &ManagerDescription,
    seen: &mut HashSet<String>,
) -> Result<ManagerNode, HierarchyError> {
    if description.id.trim().is_empty() {
        return Err(HierarchyError::EmptyIdentifier);
    }
    if !seen.insert(description.id.clone()) {
        return Err(HierarchyError::DuplicateNode(description.id.clone()));
    }

    let mut children = Vec::with_capacity(description.members.len());
    for member in &description.members {
        children.push(build_node(member, seen)?);
    }

    Ok(ManagerNode {
        id: description.id.clone(),
        role: description.role,
        children,
    })
}

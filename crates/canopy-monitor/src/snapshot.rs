//! The artifact published by one successful poll.

use std::collections::HashMap;

use canopy_hierarchy::{HierarchyTree, LayoutPoint, ManagerNode};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One complete, consistent (tree + layout) pair from a single poll.
///
/// Published whole and consumed read-only; the next poll replaces it with
/// a brand-new value rather than mutating this one, so holders can keep
/// reading while the loop computes its successor.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub tree: HierarchyTree,
    /// Radial layout position per manager id.
    pub points: HashMap<String, LayoutPoint>,
    pub captured_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(tree: HierarchyTree, points: HashMap<String, LayoutPoint>) -> Self {
        Self {
            tree,
            points,
            captured_at: Utc::now(),
        }
    }

    /// Render the hierarchy as an indented text tree with coordinates.
    /// The reference consumer for the published snapshot; any richer
    /// rendering subscribes to the same data.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        self.write_node(self.tree.root(), 0, &mut out);
        out
    }

    fn write_node(&self, node: &ManagerNode, depth: usize, out: &mut String) {
        use std::fmt::Write;

        let indent = "  ".repeat(depth);
        let position = self
            .points
            .get(&node.id)
            .map(|p| format!("({:.1}, {:.1})", p.x, p.y))
            .unwrap_or_default();
        let _ = writeln!(out, "{indent}{} [{}] {}", node.id, node.role, position);
        for child in &node.children {
            self.write_node(child, depth + 1, out);
        }
    }
}

//! Radial layout: root at the origin, members on rings by depth.
//!
//! Every node owns an angular sector. The root owns the full circle; a
//! node's sector is divided among its children proportionally to their
//! subtree sizes, so branches with more descendants receive wider sectors.
//! A child sits at the midpoint angle of its sector, on a ring whose
//! radius grows linearly with depth.

use std::collections::HashMap;
use std::f64::consts::TAU;

use serde::Serialize;

use crate::tree::{HierarchyTree, ManagerNode};

/// Position of one manager on the canvas, together with the angular
/// sector allocated to its subtree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutPoint {
    pub x: f64,
    pub y: f64,
    /// Start of the node's angular sector, in radians.
    pub angle_start: f64,
    /// End of the node's angular sector, in radians (exclusive).
    pub angle_end: f64,
}

impl LayoutPoint {
    /// Width of the node's angular sector, in radians.
    pub fn span(&self) -> f64 {
        self.angle_end - self.angle_start
    }
}

/// Compute a position for every node in the tree.
///
/// The root sits at the origin with the full `[0, 2π)` sector; each ring
/// is `canvas_size / (max_depth + 1)` further out, so the deepest ring
/// stays inside the canvas. Deterministic: identical trees produce
/// identical coordinates, with ties between equal-weight siblings broken
/// by child order.
pub fn layout(tree: &HierarchyTree, canvas_size: f64) -> HashMap<String, LayoutPoint> {
    let radius_step = canvas_size / (tree.max_depth() + 1) as f64;
    let mut points = HashMap::with_capacity(tree.node_count());
    place(tree.root(), 0, 0.0, TAU, radius_step, &mut points);
    points
}

fn place(
    node: &ManagerNode,
    depth: usize,
    angle_start: f64,
    angle_end: f64,
    radius_step: f64,
    points: &mut HashMap<String, LayoutPoint>,
) {
    let (x, y) = if depth == 0 {
        (0.0, 0.0)
    } else {
        let radius = depth as f64 * radius_step;
        let angle = (angle_start + angle_end) / 2.0;
        (radius * angle.cos(), radius * angle.sin())
    };
    points.insert(
        node.id.clone(),
        LayoutPoint {
            x,
            y,
            angle_start,
            angle_end,
        },
    );

    let total: usize = node.children.iter().map(|c| c.subtree_size()).sum();
    if total == 0 {
        return;
    }

    let span = angle_end - angle_start;
    let mut cursor = angle_start;
    for child in &node.children {
        let share = span * child.subtree_size() as f64 / total as f64;
        place(child, depth + 1, cursor, cursor + share, radius_step, points);
        cursor += share;
    }
}

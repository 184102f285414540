//! Canopy hierarchy - tree construction and radial layout
//!
//! Transforms a cluster-reported leader description into an immutable
//! rooted tree and computes a 2-D position for every manager:
//! - Tree construction with duplicate-node rejection
//! - Radial layout: root at the origin, members on rings by depth,
//!   angular sectors divided by subtree weight

pub mod builder;
pub mod layout;
pub mod tree;

pub use builder::build;
pub use layout::{layout, LayoutPoint};
pub use tree::{HierarchyTree, ManagerNode};

use thiserror::Error;

/// Errors originating from the hierarchy layer.
#[derive(Error, Debug)]
pub enum HierarchyError {
    #[error("Malformed hierarchy: manager '{0}' is listed under more than one parent")]
    DuplicateNode(String),

    #[error("Malformed hierarchy: empty manager identifier")]
    EmptyIdentifier,
}

//! Canopy topology - how the monitor learns the cluster's hierarchy
//!
//! The monitor never speaks the cluster's wire protocol itself; it depends
//! on one seam:
//! - `TopologySource`: a single async call that returns the current leader
//!   description, including its known group members
//! - `BootstrapSource`: walks the configured bootstrap addresses in order
//!   and returns the first leader description any node reports
//! - Reference sources (`StaticSource`, `FileSource`) for tests, demos,
//!   and offline inspection of captured topologies

pub mod bootstrap;
pub mod file;
pub mod source;

pub use bootstrap::{BootstrapClient, BootstrapSource};
pub use file::FileSource;
pub use source::{StaticSource, TopologySource};

use canopy_protocol::ProtocolError;
use thiserror::Error;

/// Errors originating from the topology layer.
#[derive(Error, Debug)]
pub enum TopologyError {
    #[error("No bootstrap node reachable (tried {attempted} addresses)")]
    Unreachable { attempted: usize },

    #[error("Cluster reports no active group leader")]
    NoLeader,

    #[error("Bootstrap probe failed: {0}")]
    Probe(String),

    #[error("Malformed leader description: {0}")]
    Malformed(#[from] ProtocolError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

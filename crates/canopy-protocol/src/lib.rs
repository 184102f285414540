//! Canopy shared data model
//!
//! Bootstrap network addresses, the cluster-reported manager description
//! shape, and the defaults shared by the topology, hierarchy, and monitor
//! crates.

pub mod address;
pub mod constants;
pub mod description;
pub mod error;

pub use address::*;
pub use constants::*;
pub use description::*;
pub use error::*;

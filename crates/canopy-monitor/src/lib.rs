//! Canopy monitor - the polling controller and its configuration
//!
//! Owns the refresh state machine: on a configurable interval it queries a
//! `TopologySource`, builds the hierarchy tree, computes the radial layout,
//! and publishes the result as a `Snapshot` on a single-slot channel.
//! Status lines mirror every transition; iteration failures never kill the
//! loop, only `stop()` does.

pub mod config;
pub mod poller;
pub mod snapshot;

pub use config::MonitorConfig;
pub use poller::{MonitorError, PollState, PollerConfig, PollingController};
pub use snapshot::Snapshot;

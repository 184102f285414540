//! The topology query seam.

use async_trait::async_trait;
use canopy_protocol::{ManagerDescription, NetworkAddress};

use crate::TopologyError;

/// A source of cluster topology.
///
/// One query returns the current leader description, including its known
/// group members; the monitor treats it as a fallible remote call.
/// Implementations wrap whatever wire protocol the cluster speaks.
#[async_trait]
pub trait TopologySource: Send + Sync {
    async fn query(
        &self,
        bootstrap: &[NetworkAddress],
    ) -> Result<ManagerDescription, TopologyError>;
}

/// A source that always returns the same description. Useful in tests and
/// demos without a live cluster.
#[derive(Debug, Clone)]
pub struct StaticSource {
    description: ManagerDescription,
}

impl StaticSource {
    pub fn new(description: ManagerDescription) -> Self {
        Self { description }
    }
}

#[async_trait]
impl TopologySource for StaticSource {
    async fn query(
        &self,
        _bootstrap: &[NetworkAddress],
    ) -> Result<ManagerDescription, TopologyError> {
        Ok(self.description.clone())
    }
}

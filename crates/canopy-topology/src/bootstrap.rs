//! Bootstrap resolution: walk the configured addresses until one answers.
//!
//! Operators point the monitor at a short list of well-known contact
//! points, any one of which can report the current leader. Addresses are
//! probed in order and the first success wins; probe failures are logged
//! and skipped. Only when every address has failed does the query surface
//! an error:
//! - every probe failed: `Unreachable`
//! - at least one node answered, but none knew a leader: `NoLeader`

use async_trait::async_trait;
use canopy_protocol::{ManagerDescription, NetworkAddress};

use crate::source::TopologySource;
use crate::TopologyError;

/// Probe of a single bootstrap address.
///
/// `Ok(None)` means the node answered but knows no current leader (an
/// election may be in progress); an error means the node could not be
/// reached or gave an unusable answer.
#[async_trait]
pub trait BootstrapClient: Send + Sync {
    async fn fetch_leader(
        &self,
        address: &NetworkAddress,
    ) -> Result<Option<ManagerDescription>, TopologyError>;
}

/// Resolves the leader description by probing bootstrap addresses in order.
pub struct BootstrapSource<C> {
    client: C,
}

impl<C: BootstrapClient> BootstrapSource<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C: BootstrapClient> TopologySource for BootstrapSource<C> {
    async fn query(
        &self,
        bootstrap: &[NetworkAddress],
    ) -> Result<ManagerDescription, TopologyError> {
        let mut any_answered = false;

        for address in bootstrap {
            match self.client.fetch_leader(address).await {
                Ok(Some(description)) => {
                    tracing::debug!(
                        addr = %address,
                        leader = %description.id,
                        "Bootstrap node reported a leader"
                    );
                    return Ok(description);
                }
                Ok(None) => {
                    any_answered = true;
                    tracing::debug!(addr = %address, "Bootstrap node answered without a leader");
                }
                Err(err) => {
                    tracing::warn!(
                        addr = %address,
                        error = %err,
                        "Bootstrap probe failed, trying next address"
                    );
                }
            }
        }

        if any_answered {
            Err(TopologyError::NoLeader)
        } else {
            Err(TopologyError::Unreachable {
                attempted: bootstrap.len(),
            })
        }
    }
}

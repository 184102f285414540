use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// A bootstrap contact point: a cluster node that can be asked for the
/// current group-leader description.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetworkAddress {
    pub host: String,
    pub port: u16,
}

impl NetworkAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl std::fmt::Display for NetworkAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl std::str::FromStr for NetworkAddress {
    type Err = ProtocolError;

    /// Parse `"host:port"`. The port is the segment after the last colon,
    /// so bracketed IPv6 hosts with embedded colons still parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (host, port) = s
            .rsplit_once(':')
            .ok_or_else(|| ProtocolError::InvalidAddress(s.to_string()))?;
        if host.is_empty() {
            return Err(ProtocolError::InvalidAddress(s.to_string()));
        }
        let port: u16 = port
            .parse()
            .map_err(|_| ProtocolError::InvalidAddress(s.to_string()))?;
        Ok(Self::new(host, port))
    }
}

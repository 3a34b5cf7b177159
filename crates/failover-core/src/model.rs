// ── Domain model ──
//
// Appliances are fixed at startup; only their observed state changes
// from one cycle to the next.

use secrecy::SecretString;
use strum::{Display, EnumIter};
use url::Url;

use crate::error::CoreError;

/// Failover rank. Lower ranks win: Primary is preferred whenever it is reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
pub enum Priority {
    Primary,
    Secondary,
    Tertiary,
}

impl Priority {
    /// Ordinal rank, starting at 1.
    pub fn rank(self) -> u8 {
        match self {
            Self::Primary => 1,
            Self::Secondary => 2,
            Self::Tertiary => 3,
        }
    }
}

/// A configured DHCP-capable Pi-hole.
#[derive(Debug, Clone)]
pub struct Appliance {
    pub priority: Priority,
    /// Normalized base URL (scheme added, no trailing slash).
    pub address: Url,
    /// App password; exchanged for a session on first use.
    pub credential: SecretString,
}

impl Appliance {
    pub fn new(
        priority: Priority,
        address: &str,
        credential: SecretString,
    ) -> Result<Self, CoreError> {
        let address = pihole_api::normalize_base_url(address)
            .map_err(|source| CoreError::InvalidAddress { priority, source })?;
        Ok(Self {
            priority,
            address,
            credential,
        })
    }
}

/// What a probe saw this cycle. Overwritten every cycle, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    pub priority: Priority,
    pub reachable: bool,
    /// DHCP flag reported by the appliance. Always `false` when unreachable.
    pub dhcp_enabled: bool,
}

impl Observation {
    pub fn up(priority: Priority, dhcp_enabled: bool) -> Self {
        Self {
            priority,
            reachable: true,
            dhcp_enabled,
        }
    }

    pub fn down(priority: Priority) -> Self {
        Self {
            priority,
            reachable: false,
            dhcp_enabled: false,
        }
    }
}

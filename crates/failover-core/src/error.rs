use thiserror::Error;

use crate::model::Priority;

/// Errors raised by the failover controller.
///
/// Only [`InvalidTopology`](Self::InvalidTopology),
/// [`InvalidAddress`](Self::InvalidAddress) and
/// [`ClientSetup`](Self::ClientSetup) can surface to a caller, and only
/// while building a controller. Probe and reconcile failures are contained
/// per appliance: they are logged and folded into the cycle report.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid appliance set: {reason}")]
    InvalidTopology { reason: String },

    #[error("invalid address for {priority}: {source}")]
    InvalidAddress {
        priority: Priority,
        #[source]
        source: pihole_api::Error,
    },

    #[error("failed to set up HTTP client for {priority}: {source}")]
    ClientSetup {
        priority: Priority,
        #[source]
        source: pihole_api::Error,
    },

    #[error("{priority} status probe failed: {source}")]
    Probe {
        priority: Priority,
        #[source]
        source: pihole_api::Error,
    },

    #[error("failed to {verb} DHCP on {priority}: {source}")]
    Reconcile {
        priority: Priority,
        verb: &'static str,
        #[source]
        source: pihole_api::Error,
    },
}

impl CoreError {
    /// Returns `true` when the underlying API error is a credential problem
    /// (misconfiguration) rather than the appliance being down.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            Self::Probe { source, .. } | Self::Reconcile { source, .. } => {
                source.is_auth_failure()
            }
            _ => false,
        }
    }
}

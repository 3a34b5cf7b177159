use std::path::PathBuf;
use std::time::Duration;

use pihole_api::{TlsMode, TransportConfig};

use crate::error::CoreError;
use crate::model::{Appliance, Priority};

/// TLS verification mode for appliance connections.
#[derive(Debug, Clone, Default)]
pub enum TlsVerification {
    /// Use the system certificate store.
    #[default]
    SystemDefaults,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (self-signed Pi-hole web servers).
    DangerAcceptInvalid,
}

/// Everything the controller loop needs, loaded once at startup.
///
/// The appliance set is validated on construction: Primary and Secondary
/// are mandatory, Tertiary is optional, one appliance per rank.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    appliances: Vec<Appliance>,
    /// Pause between the end of one cycle and the start of the next.
    pub check_interval: Duration,
    /// Per-request timeout for every appliance call.
    pub request_timeout: Duration,
    pub tls: TlsVerification,
    /// Plan and log actions without issuing any writes.
    pub dry_run: bool,
}

impl ControllerConfig {
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn new(mut appliances: Vec<Appliance>, check_interval: Duration) -> Result<Self, CoreError> {
        appliances.sort_by_key(|a| a.priority);

        let ranks: Vec<Priority> = appliances.iter().map(|a| a.priority).collect();
        let valid = matches!(
            ranks.as_slice(),
            [Priority::Primary, Priority::Secondary]
                | [Priority::Primary, Priority::Secondary, Priority::Tertiary]
        );
        if !valid {
            return Err(CoreError::InvalidTopology {
                reason: format!(
                    "expected Primary, Secondary and optionally Tertiary exactly once, got {ranks:?}"
                ),
            });
        }

        if check_interval.is_zero() {
            return Err(CoreError::InvalidTopology {
                reason: "check interval must be positive".into(),
            });
        }

        Ok(Self {
            appliances,
            check_interval,
            request_timeout: Self::DEFAULT_REQUEST_TIMEOUT,
            tls: TlsVerification::default(),
            dry_run: false,
        })
    }

    /// Appliances in ascending priority order.
    pub fn appliances(&self) -> &[Appliance] {
        &self.appliances
    }

    pub fn transport(&self) -> TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig {
            tls,
            timeout: self.request_timeout,
        }
    }
}

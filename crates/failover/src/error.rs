//! Daemon error types with miette diagnostics.
//!
//! Only startup can fail: once the loop is running every error is
//! contained to the appliance that produced it.

use miette::Diagnostic;
use thiserror::Error;

use failover_config::ConfigError;
use failover_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const CONFIG: i32 = 3;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("configuration error: {0}")]
    #[diagnostic(
        code(dhcp_failover::config),
        help(
            "Set PRIMARY_PIHOLE_IP, PRIMARY_PIHOLE_TOKEN, SECONDARY_PIHOLE_IP and\n\
             SECONDARY_PIHOLE_TOKEN. TERTIARY_PIHOLE_IP/TOKEN are optional but must\n\
             be set together. CHECK_INTERVAL is a positive number of seconds."
        )
    )]
    Config(#[from] ConfigError),

    #[error("failed to start controller: {0}")]
    #[diagnostic(
        code(dhcp_failover::startup),
        help("Check CA_CERT points at a readable PEM file, or set INSECURE=true for self-signed Pi-holes.")
    )]
    Startup(#[from] CoreError),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => exit_code::CONFIG,
            Self::Startup(_) => exit_code::GENERAL,
        }
    }
}

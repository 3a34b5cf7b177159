//! Configuration for the DHCP failover daemon.
//!
//! Layered with figment: built-in defaults, then an optional TOML file,
//! then environment variables (`PRIMARY_PIHOLE_IP`, `CHECK_INTERVAL`, ...).
//! The result is validated once and turned into an immutable
//! `failover_core::ControllerConfig`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use failover_core::{Appliance, ControllerConfig, Priority, TlsVerification};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting {key}")]
    Missing { key: &'static str },

    #[error("incomplete Tertiary block: {present} is set but {missing} is not")]
    PartialTertiary {
        present: &'static str,
        missing: &'static str,
    },

    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config file not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Settings ────────────────────────────────────────────────────────

/// Variables parsed as typed values (integers, booleans).
const TYPED_KEYS: [&str; 3] = ["CHECK_INTERVAL", "REQUEST_TIMEOUT", "INSECURE"];

/// Variables taken verbatim. figment's env parser would read `007` as the
/// integer 7 and `[abc]` as an array.
const TEXT_KEYS: [&str; 7] = [
    "CA_CERT",
    "PRIMARY_PIHOLE_IP",
    "PRIMARY_PIHOLE_TOKEN",
    "SECONDARY_PIHOLE_IP",
    "SECONDARY_PIHOLE_TOKEN",
    "TERTIARY_PIHOLE_IP",
    "TERTIARY_PIHOLE_TOKEN",
];

/// Environment variables read by [`figment`], in the order they are documented.
pub const ENV_KEYS: [&str; 10] = [
    "CHECK_INTERVAL",
    "REQUEST_TIMEOUT",
    "INSECURE",
    "CA_CERT",
    "PRIMARY_PIHOLE_IP",
    "PRIMARY_PIHOLE_TOKEN",
    "SECONDARY_PIHOLE_IP",
    "SECONDARY_PIHOLE_TOKEN",
    "TERTIARY_PIHOLE_IP",
    "TERTIARY_PIHOLE_TOKEN",
];

/// Flat settings, keyed like the environment variables (lowercased).
///
/// Tokens are held as [`SecretString`] so `{:?}` never prints them.
#[derive(Debug, Deserialize, Serialize)]
pub struct Settings {
    /// Seconds between cycles.
    #[serde(default = "default_check_interval")]
    pub check_interval: u64,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Accept self-signed certificates.
    #[serde(default)]
    pub insecure: bool,

    /// Path to a custom CA certificate (PEM).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    #[serde(
        default,
        deserialize_with = "non_blank",
        skip_serializing_if = "Option::is_none"
    )]
    pub primary_pihole_ip: Option<String>,
    #[serde(default, deserialize_with = "secret", skip_serializing)]
    pub primary_pihole_token: Option<SecretString>,

    #[serde(
        default,
        deserialize_with = "non_blank",
        skip_serializing_if = "Option::is_none"
    )]
    pub secondary_pihole_ip: Option<String>,
    #[serde(default, deserialize_with = "secret", skip_serializing)]
    pub secondary_pihole_token: Option<SecretString>,

    #[serde(
        default,
        deserialize_with = "non_blank",
        skip_serializing_if = "Option::is_none"
    )]
    pub tertiary_pihole_ip: Option<String>,
    #[serde(default, deserialize_with = "secret", skip_serializing)]
    pub tertiary_pihole_token: Option<SecretString>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            check_interval: default_check_interval(),
            request_timeout: default_request_timeout(),
            insecure: false,
            ca_cert: None,
            primary_pihole_ip: None,
            primary_pihole_token: None,
            secondary_pihole_ip: None,
            secondary_pihole_token: None,
            tertiary_pihole_ip: None,
            tertiary_pihole_token: None,
        }
    }
}

fn default_check_interval() -> u64 {
    60
}
fn default_request_timeout() -> u64 {
    5
}

/// Addresses must be text; a bare TOML number is a type error rather than
/// being reformatted. Blank values count as unset.
fn non_blank<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<String>::deserialize(de)?.filter(|s| !s.trim().is_empty()))
}

fn secret<'de, D: Deserializer<'de>>(de: D) -> Result<Option<SecretString>, D::Error> {
    Ok(non_blank(de)?.map(SecretString::from))
}

impl Settings {
    /// Validate and build the controller configuration.
    pub fn into_controller_config(self) -> Result<ControllerConfig, ConfigError> {
        if self.check_interval == 0 {
            return Err(ConfigError::Validation {
                field: "CHECK_INTERVAL".into(),
                reason: "must be a positive number of seconds".into(),
            });
        }
        if self.request_timeout == 0 || self.request_timeout > self.check_interval {
            return Err(ConfigError::Validation {
                field: "REQUEST_TIMEOUT".into(),
                reason: format!(
                    "must be between 1 and CHECK_INTERVAL ({}) seconds, got {}",
                    self.check_interval, self.request_timeout
                ),
            });
        }

        let mut appliances = vec![
            required(
                Priority::Primary,
                self.primary_pihole_ip,
                "PRIMARY_PIHOLE_IP",
                self.primary_pihole_token,
                "PRIMARY_PIHOLE_TOKEN",
            )?,
            required(
                Priority::Secondary,
                self.secondary_pihole_ip,
                "SECONDARY_PIHOLE_IP",
                self.secondary_pihole_token,
                "SECONDARY_PIHOLE_TOKEN",
            )?,
        ];

        match (self.tertiary_pihole_ip, self.tertiary_pihole_token) {
            (Some(ip), Some(token)) => {
                appliances.push(appliance(Priority::Tertiary, &ip, token)?);
            }
            (Some(_), None) => {
                return Err(ConfigError::PartialTertiary {
                    present: "TERTIARY_PIHOLE_IP",
                    missing: "TERTIARY_PIHOLE_TOKEN",
                });
            }
            (None, Some(_)) => {
                return Err(ConfigError::PartialTertiary {
                    present: "TERTIARY_PIHOLE_TOKEN",
                    missing: "TERTIARY_PIHOLE_IP",
                });
            }
            (None, None) => {}
        }

        let mut config =
            ControllerConfig::new(appliances, Duration::from_secs(self.check_interval)).map_err(
                |e| ConfigError::Validation {
                    field: "appliances".into(),
                    reason: e.to_string(),
                },
            )?;

        config.request_timeout = Duration::from_secs(self.request_timeout);
        config.tls = if self.insecure {
            TlsVerification::DangerAcceptInvalid
        } else if let Some(ca_path) = self.ca_cert {
            TlsVerification::CustomCa(ca_path)
        } else {
            TlsVerification::SystemDefaults
        };

        Ok(config)
    }
}

fn required(
    priority: Priority,
    ip: Option<String>,
    ip_key: &'static str,
    token: Option<SecretString>,
    token_key: &'static str,
) -> Result<Appliance, ConfigError> {
    let ip = ip.ok_or(ConfigError::Missing { key: ip_key })?;
    let token = token.ok_or(ConfigError::Missing { key: token_key })?;
    appliance(priority, &ip, token)
}

fn appliance(priority: Priority, ip: &str, token: SecretString) -> Result<Appliance, ConfigError> {
    Appliance::new(priority, ip, token).map_err(|e| {
        ConfigError::Validation {
            field: format!("{}_PIHOLE_IP", priority.to_string().to_uppercase()),
            reason: e.to_string(),
        }
    })
}

// ── Config file path ────────────────────────────────────────────────

/// Platform config file location (e.g. `~/.config/dhcp-failover/config.toml`).
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "dhcp-failover").map(|dirs| dirs.config_dir().join("config.toml"))
}

// ── Config loading ──────────────────────────────────────────────────

/// Assemble the provider stack. `file` is merged when present; pass
/// `None` to use environment variables and defaults alone.
pub fn figment(file: Option<&Path>) -> Figment {
    let mut figment = Figment::new().merge(Serialized::defaults(Settings::default()));
    if let Some(path) = file {
        figment = figment.merge(Toml::file(path));
    }
    figment = figment.merge(Env::raw().only(&TYPED_KEYS));
    for key in TEXT_KEYS {
        if let Ok(value) = std::env::var(key) {
            figment = figment.merge(Serialized::default(&key.to_ascii_lowercase(), value));
        }
    }
    figment
}

/// Load, validate and translate the configuration.
///
/// An explicit `file` must exist. Without one, the platform default path
/// is used if a file is there.
pub fn load(file: Option<&Path>) -> Result<ControllerConfig, ConfigError> {
    let path = match file {
        Some(path) if !path.is_file() => {
            return Err(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        Some(path) => Some(path.to_path_buf()),
        None => default_config_path().filter(|p| p.is_file()),
    };

    let settings: Settings = figment(path.as_deref()).extract()?;
    settings.into_controller_config()
}

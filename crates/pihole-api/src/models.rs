// Pi-hole v6 wire types
//
// Only the fields the failover controller reads are modelled; everything
// else in the (large) config documents is ignored by serde.

use serde::{Deserialize, Serialize};

/// Response body of `POST /api/auth`.
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub session: SessionInfo,
}

/// The `session` object returned on login.
#[derive(Debug, Deserialize)]
pub struct SessionInfo {
    #[serde(default)]
    pub valid: bool,
    pub sid: Option<String>,
    pub csrf: Option<String>,
    /// Seconds of inactivity before Pi-hole drops the session.
    #[serde(default)]
    pub validity: i64,
    pub message: Option<String>,
}

/// Pi-hole error envelope: `{"error": {"key": "...", "message": "..."}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub key: Option<String>,
    pub message: Option<String>,
}

impl ErrorBody {
    pub(crate) fn describe(&self) -> String {
        match (self.key.as_deref(), self.message.as_deref()) {
            (Some(key), Some(msg)) => format!("{key}: {msg}"),
            (Some(s), None) | (None, Some(s)) => s.to_owned(),
            (None, None) => "unknown error".into(),
        }
    }
}

/// `{"config": {"dhcp": {...}}}` -- shape of both the GET response and the PATCH body.
#[derive(Debug, Deserialize, Serialize)]
pub struct DhcpConfigEnvelope {
    pub config: DhcpConfigSection,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DhcpConfigSection {
    pub dhcp: DhcpSettings,
}

/// The subset of `config.dhcp` the controller cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct DhcpSettings {
    pub active: bool,
}

impl DhcpConfigEnvelope {
    pub fn active(active: bool) -> Self {
        Self {
            config: DhcpConfigSection {
                dhcp: DhcpSettings { active },
            },
        }
    }
}

/// Legacy-style acknowledgement some Pi-hole builds return on config writes.
#[derive(Debug, Deserialize)]
pub(crate) struct WriteAck {
    pub success: Option<bool>,
}

use thiserror::Error;

/// Top-level error type for the `pihole-api` crate.
///
/// Covers every failure mode of a Pi-hole conversation: session login,
/// transport, API-level rejections, and response decoding.
/// `failover-core` decides which of these count as "appliance down".
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login failed (wrong app password, missing sid/csrf in the reply, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The cached session was rejected (HTTP 401) -- a fresh login is needed.
    #[error("Session expired -- re-authentication required")]
    SessionExpired,

    /// The session is valid but not allowed to perform the call (HTTP 403).
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── API ─────────────────────────────────────────────────────────
    /// Non-success HTTP status or an `{"error": {...}}` body from Pi-hole.
    #[error("Pi-hole API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error points at bad or expired credentials
    /// rather than a down appliance.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::Authentication { .. } | Self::SessionExpired | Self::Forbidden { .. }
        )
    }

    /// Returns `true` if this is a transient network-level error.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

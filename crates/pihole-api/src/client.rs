// Pi-hole HTTP client
//
// Wraps `reqwest::Client` with base-URL normalization, session caching and
// response classification. Endpoint groups (auth, dhcp) are implemented as
// inherent methods in separate files to keep this module focused on
// transport mechanics.

use std::sync::{PoisonError, RwLock};

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::ErrorEnvelope;
use crate::transport::TransportConfig;

/// An authenticated Pi-hole session. Both halves must accompany every
/// authenticated request.
#[derive(Debug, Clone)]
pub struct Session {
    pub sid: SecretString,
    pub csrf: String,
}

/// HTTP client bound to a single Pi-hole instance.
///
/// The session obtained from the app password is cached and reused across
/// calls so a long-running controller does not exhaust Pi-hole's session
/// seats. It is dropped as soon as the appliance rejects it.
pub struct PiholeClient {
    http: reqwest::Client,
    base_url: Url,
    password: SecretString,
    session: RwLock<Option<Session>>,
}

/// Turn a configured address (`192.168.1.2`, `pi.hole:8080`,
/// `https://dns.lan/`) into a base URL without a trailing slash.
pub fn normalize_base_url(address: &str) -> Result<Url, Error> {
    let trimmed = address.trim();
    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_owned()
    } else {
        format!("http://{trimmed}")
    };
    let url = Url::parse(with_scheme.trim_end_matches('/'))?;
    if url.host_str().is_none_or(str::is_empty) {
        return Err(Error::InvalidUrl(url::ParseError::EmptyHost));
    }
    Ok(url)
}

impl PiholeClient {
    /// Create a client for the Pi-hole at `address`, authenticating with
    /// the given app password.
    pub fn new(
        address: &str,
        password: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let base_url = normalize_base_url(address)?;
        let http = transport.build_client(&referer_for(&base_url))?;
        Ok(Self::with_client(http, base_url, password))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, password: SecretString) -> Self {
        Self {
            http,
            base_url,
            password,
            session: RwLock::new(None),
        }
    }

    /// The appliance base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn password(&self) -> &SecretString {
        &self.password
    }

    // ── Session management ───────────────────────────────────────────

    /// Whether a session is currently cached.
    pub fn has_session(&self) -> bool {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub(crate) fn session(&self) -> Option<Session> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn store_session(&self, session: Session) {
        debug!(url = %self.base_url, "storing session");
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
    }

    /// Forget the cached session; the next authenticated call logs in again.
    pub fn clear_session(&self) {
        trace!(url = %self.base_url, "clearing session");
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Return the cached session, logging in first if there is none.
    pub(crate) async fn ensure_session(&self) -> Result<Session, Error> {
        if let Some(session) = self.session() {
            return Ok(session);
        }
        self.login().await
    }

    /// Attach `sid` and `X-CSRF-Token` headers.
    pub(crate) fn apply_session(
        builder: reqwest::RequestBuilder,
        session: &Session,
    ) -> reqwest::RequestBuilder {
        builder
            .header("sid", session.sid.expose_secret())
            .header("X-CSRF-Token", &session.csrf)
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/api/{path}`. Keeps any path prefix on the base URL
    /// (Pi-hole behind a reverse proxy).
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/api/{path}"))?)
    }

    // ── Response handling ────────────────────────────────────────────

    /// Classify a response: 401/403 become session errors, other non-2xx
    /// and `{"error": ...}` bodies become `Error::Api`, success bodies are
    /// decoded into `T`.
    pub(crate) async fn parse_response<T: DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let body = Self::check_status(resp).await?;
        decode(&body)
    }

    /// Like [`parse_response`](Self::parse_response) but returns the raw
    /// body for endpoints whose success payload is not needed.
    pub(crate) async fn check_status(resp: reqwest::Response) -> Result<String, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::SessionExpired);
        }

        if status == StatusCode::FORBIDDEN {
            return Err(Error::Forbidden {
                message: error_message(&body)
                    .unwrap_or_else(|| "insufficient permissions (HTTP 403)".into()),
            });
        }

        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                message: error_message(&body)
                    .unwrap_or_else(|| preview(&body)),
            });
        }

        if let Some(message) = error_message(&body) {
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }
}

fn referer_for(base_url: &Url) -> String {
    format!("{}/", base_url.as_str().trim_end_matches('/'))
}

fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|env| env.error)
        .map(|err| err.describe())
}

fn preview(body: &str) -> String {
    body.chars().take(200).collect()
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    serde_json::from_str(body).map_err(|e| {
        Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(body)),
            body: body.to_owned(),
        }
    })
}

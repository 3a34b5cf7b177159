// Session login/logout
//
// Pi-hole v6 exchanges the app password for a session id (`sid`) plus a
// CSRF token. Both are cached on the client and replayed as headers.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::{debug, warn};

use crate::client::{PiholeClient, Session};
use crate::error::Error;
use crate::models::AuthResponse;

impl PiholeClient {
    /// Authenticate with the app password and cache the resulting session.
    ///
    /// `POST /api/auth` with `{"password": ...}`. A 401, a reply with
    /// `valid: false`, or a reply missing `sid`/`csrf` is reported as
    /// [`Error::Authentication`].
    pub async fn login(&self) -> Result<Session, Error> {
        let url = self.api_url("auth")?;
        debug!("logging in at {}", url);

        let body = json!({ "password": self.password().expose_secret() });

        let resp = self
            .http()
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(Error::Transport)?;

        let auth: AuthResponse = match Self::parse_response(resp).await {
            Ok(auth) => auth,
            Err(Error::SessionExpired) => {
                return Err(Error::Authentication {
                    message: "app password rejected (HTTP 401)".into(),
                });
            }
            Err(e) => return Err(e),
        };

        let info = auth.session;
        let (Some(sid), Some(csrf)) = (info.sid, info.csrf) else {
            return Err(Error::Authentication {
                message: info
                    .message
                    .unwrap_or_else(|| "sid/csrf missing from login response".into()),
            });
        };
        if !info.valid {
            return Err(Error::Authentication {
                message: "session reported as invalid".into(),
            });
        }

        let session = Session {
            sid: SecretString::from(sid),
            csrf,
        };
        self.store_session(session.clone());
        debug!(validity = info.validity, "login successful");
        Ok(session)
    }

    /// End the cached session, freeing the seat on the appliance.
    ///
    /// `DELETE /api/auth`. A no-op when no session is cached. The local
    /// session is cleared even if the request fails.
    pub async fn logout(&self) -> Result<(), Error> {
        let Some(session) = self.session() else {
            return Ok(());
        };
        self.clear_session();

        let url = self.api_url("auth")?;
        debug!("logging out at {}", url);

        let resp = Self::apply_session(self.http().delete(url), &session)
            .send()
            .await
            .map_err(Error::Transport)?;

        // 401/410: the session was already gone server-side.
        let status = resp.status();
        if status.is_success() || status.as_u16() == 401 || status.as_u16() == 410 {
            debug!("logout complete");
            return Ok(());
        }

        warn!(%status, "unexpected logout response");
        Self::check_status(resp).await.map(|_| ())
    }
}

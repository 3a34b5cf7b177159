// DHCP config endpoints
//
// Read and toggle `config.dhcp.active`. Writes pass `restart=true` so
// FTL picks up the change immediately.

use tracing::{debug, warn};

use crate::client::PiholeClient;
use crate::error::Error;
use crate::models::{DhcpConfigEnvelope, WriteAck};

impl PiholeClient {
    /// Read whether the DHCP server is active.
    ///
    /// `GET /api/config/dhcp`. If the cached session has expired the client
    /// logs in again once and repeats the read. A rejection that survives
    /// the retry, or a 403, drops the session and is returned to the caller.
    pub async fn dhcp_active(&self) -> Result<bool, Error> {
        let result = match self.fetch_dhcp_active().await {
            Err(Error::SessionExpired) => {
                debug!(url = %self.base_url(), "session expired, re-authenticating");
                self.clear_session();
                self.fetch_dhcp_active().await
            }
            other => other,
        };

        if let Err(Error::SessionExpired | Error::Forbidden { .. }) = &result {
            warn!(url = %self.base_url(), "session rejected, clearing it");
            self.clear_session();
        }
        result
    }

    async fn fetch_dhcp_active(&self) -> Result<bool, Error> {
        let session = self.ensure_session().await?;
        let url = self.api_url("config/dhcp")?;
        debug!("GET {}", url);

        let resp = Self::apply_session(self.http().get(url), &session)
            .send()
            .await
            .map_err(Error::Transport)?;

        let envelope: DhcpConfigEnvelope = Self::parse_response(resp).await?;
        Ok(envelope.config.dhcp.active)
    }

    /// Turn the DHCP server on or off.
    ///
    /// `PATCH /api/config?restart=true` with `{"config":{"dhcp":{"active":..}}}`.
    /// A 401 or 403 drops the cached session (so the next call logs in
    /// fresh) and is returned without retrying.
    pub async fn set_dhcp_active(&self, active: bool) -> Result<(), Error> {
        let session = self.ensure_session().await?;
        let mut url = self.api_url("config")?;
        url.query_pairs_mut().append_pair("restart", "true");
        debug!(active, "PATCH {}", url);

        let resp = Self::apply_session(self.http().patch(url), &session)
            .json(&DhcpConfigEnvelope::active(active))
            .send()
            .await
            .map_err(Error::Transport)?;

        let body = match Self::check_status(resp).await {
            Ok(body) => body,
            Err(e @ (Error::SessionExpired | Error::Forbidden { .. })) => {
                warn!(url = %self.base_url(), "session rejected, clearing it");
                self.clear_session();
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        if let Ok(WriteAck {
            success: Some(false),
        }) = serde_json::from_str::<WriteAck>(&body)
        {
            return Err(Error::Api {
                status: 200,
                message: "Pi-hole reported success=false".into(),
            });
        }

        Ok(())
    }
}

use std::future::Future;

use pihole_api::{Error, PiholeClient};

/// The three appliance calls the controller loop depends on.
///
/// [`PiholeClient`] is the production implementation; tests substitute
/// in-memory fakes.
pub trait DhcpApi: Send + Sync {
    /// Status query: succeeds only if the appliance answered and reported
    /// its DHCP flag.
    fn dhcp_active(&self) -> impl Future<Output = Result<bool, Error>> + Send;

    fn set_dhcp_active(&self, active: bool) -> impl Future<Output = Result<(), Error>> + Send;

    /// Release any session held on the appliance.
    fn logout(&self) -> impl Future<Output = Result<(), Error>> + Send;
}

impl DhcpApi for PiholeClient {
    async fn dhcp_active(&self) -> Result<bool, Error> {
        PiholeClient::dhcp_active(self).await
    }

    async fn set_dhcp_active(&self, active: bool) -> Result<(), Error> {
        PiholeClient::set_dhcp_active(self, active).await
    }

    async fn logout(&self) -> Result<(), Error> {
        PiholeClient::logout(self).await
    }
}

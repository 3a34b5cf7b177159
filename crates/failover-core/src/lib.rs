//! Failover logic between `pihole-api` and the `dhcp-failover` daemon.
//!
//! - **[`Controller`]**: owns the loop: [`probe`](Controller::probe) each
//!   appliance in priority order, [`select_active`] the first reachable one,
//!   [`reconcile`](Controller::reconcile) DHCP flags so only that appliance
//!   serves, sleep, repeat until cancelled.
//!
//! - **[`DhcpApi`]**: the seam to the appliances. Implemented for
//!   [`pihole_api::PiholeClient`]; tests plug in fakes.
//!
//! - **[`ControllerConfig`]**: validated, immutable startup configuration.
//!
//! - **[`CycleReport`]**: what one cycle saw and did, per appliance.

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod policy;
pub mod report;

// ── Primary re-exports ──────────────────────────────────────────────
pub use api::DhcpApi;
pub use config::{ControllerConfig, TlsVerification};
pub use controller::{Controller, Managed};
pub use error::CoreError;
pub use model::{Appliance, Observation, Priority};
pub use policy::{Action, plan, select_active};
pub use report::{ApplianceReport, CycleReport, Outcome};

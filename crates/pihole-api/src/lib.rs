// pihole-api: Async Rust client for the Pi-hole v6 REST API

pub mod auth;
pub mod client;
pub mod dhcp;
pub mod error;
pub mod models;
pub mod transport;

pub use client::{PiholeClient, Session, normalize_base_url};
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};

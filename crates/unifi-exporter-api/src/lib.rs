// unifi-exporter-api: read-only access to the UniFi controller stat endpoints
//
// The exporter needs four things from a controller: a cookie session,
// the list of sites, and per site the `stat/device` and `stat/sta`
// snapshots. Everything here is built around those calls.

pub mod client;
pub mod envelope;
pub mod error;
pub mod login;
pub mod models;
pub mod platform;
pub mod stat;
pub mod transport;

pub use client::ControllerClient;
pub use error::Error;
pub use platform::ControllerPlatform;
pub use transport::{TlsMode, TransportConfig};

//! Collector core of the UniFi Prometheus exporter.
//!
//! - **[`SessionProvider`]**: owns the single authenticated
//!   [`ControllerClient`](unifi_exporter_api::ControllerClient), logging in lazily
//!   and again after a caller reports the session as rejected.
//! - **[`select_sites`]**: resolves the operator's site filter against the
//!   controller's site list once, at startup.
//! - **[`mapper`]**: pure translation of device and station records into
//!   [`MetricSample`]s.
//! - **[`Collector`]**: one scrape: acquire a session, query every selected
//!   site concurrently with a single re-auth retry per site, map, publish.
//! - **[`ExporterMetrics`]**: the exporter's own counters plus text
//!   exposition of a scrape.

pub mod collector;
pub mod config;
pub mod convert;
pub mod error;
pub mod exposition;
pub mod mapper;
pub mod model;
pub mod session;
pub mod sites;

// ── Primary re-exports ──────────────────────────────────────────────
pub use collector::{Collector, Scrape};
pub use config::{ControllerConfig, PlatformChoice, TlsVerification};
pub use error::{CollectionError, CoreError, FailureReason, SiteError};
pub use exposition::ExporterMetrics;
pub use mapper::{MetricKind, MetricSample};
pub use model::{DeviceRecord, Record, Site, StationRecord};
pub use session::{SessionHandle, SessionProvider};
pub use sites::{discover_sites, select_sites, sites_string};

//! Clap derive structures for the `unifi_exporter` binary.
//!
//! Every setting is optional here: unset flags fall through to the
//! config file and then to built-in defaults (see [`crate::config`]).

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use serde::{Deserialize, Serialize};

/// Prometheus exporter for UniFi Network controllers
#[derive(Debug, Parser)]
#[command(
    name = "unifi_exporter",
    version,
    about = "Export UniFi controller device and client metrics to Prometheus",
    long_about = "Polls a UniFi Network controller on every Prometheus scrape and\n\
        exposes per-site device and client statistics in the Prometheus text format.\n\n\
        Settings resolve as: built-in defaults < --config file < environment < flags."
)]
pub struct Cli {
    /// Path under which to expose metrics [default: /metrics]
    #[arg(long = "metrics.path", env = "UNIFI_EXPORTER_METRICS_PATH", value_name = "PATH")]
    pub metrics_path: Option<String>,

    /// Address to listen on for HTTP requests [default: :9130]
    #[arg(long = "metrics.listen", env = "UNIFI_EXPORTER_LISTEN", value_name = "ADDR")]
    pub metrics_listen: Option<String>,

    /// UniFi controller URL [default: https://127.0.0.1:8443/]
    #[arg(long = "unifi.addr", env = "UNIFI_ADDR", value_name = "URL")]
    pub unifi_addr: Option<String>,

    /// Username for authentication against the controller [default: admin]
    #[arg(long = "unifi.username", env = "UNIFI_USERNAME", value_name = "USER")]
    pub unifi_username: Option<String>,

    /// Password for authentication against the controller [default: password]
    #[arg(
        long = "unifi.password",
        env = "UNIFI_PASSWORD",
        hide_env_values = true,
        value_name = "PASSWORD"
    )]
    pub unifi_password: Option<String>,

    /// Skip TLS certificate verification [default: true]
    #[arg(
        long = "unifi.insecure",
        env = "UNIFI_INSECURE",
        num_args = 0..=1,
        default_missing_value = "true",
        value_name = "BOOL"
    )]
    pub unifi_insecure: Option<bool>,

    /// Only export the site with this description [default: all sites]
    #[arg(long = "unifi.site", env = "UNIFI_SITE", value_name = "DESCRIPTION")]
    pub unifi_site: Option<String>,

    /// Timeout for every controller request, e.g. 5s or 1500ms [default: 5s]
    #[arg(long = "unifi.timeout", env = "UNIFI_TIMEOUT", value_name = "DURATION")]
    pub unifi_timeout: Option<String>,

    /// Controller API layout [default: auto]
    #[arg(long = "unifi.platform", env = "UNIFI_PLATFORM", value_name = "PLATFORM")]
    pub unifi_platform: Option<PlatformArg>,

    /// PEM CA certificate to verify the controller with (implies strict TLS)
    #[arg(long = "unifi.ca-cert", env = "UNIFI_CA_CERT", value_name = "FILE")]
    pub unifi_ca_cert: Option<PathBuf>,

    /// Upper bound for a whole scrape [default: 10s]
    #[arg(long = "scrape.timeout", env = "UNIFI_EXPORTER_SCRAPE_TIMEOUT", value_name = "DURATION")]
    pub scrape_timeout: Option<String>,

    /// Optional TOML config file
    #[arg(long, env = "UNIFI_EXPORTER_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = ArgAction::Count)]
    pub verbose: u8,
}

/// Which API layout the controller speaks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlatformArg {
    /// Probe the controller on first login
    #[default]
    Auto,
    /// UniFi OS console (UDM, UCG, Cloud Key Gen2+)
    UnifiOs,
    /// Standalone Network Application
    Classic,
}

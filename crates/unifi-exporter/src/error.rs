//! Startup error types with miette diagnostics.
//!
//! Scrape-time failures never get here; they are exported as metrics.
//! Everything in this module ends the process with a non-zero exit code.

use miette::Diagnostic;
use thiserror::Error;

use unifi_exporter_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const SITE_SELECTION: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to UniFi controller at {url}")]
    #[diagnostic(
        code(unifi_exporter::connection_failed),
        help(
            "Check that the controller is running and reachable from this host.\n\
             Self-signed certificate? Keep --unifi.insecure (the default) or pass --unifi.ca-cert.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("UniFi controller at {url} did not answer in time")]
    #[diagnostic(
        code(unifi_exporter::timeout),
        help("Increase --unifi.timeout or check controller responsiveness.")
    )]
    Timeout { url: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication against {url} failed")]
    #[diagnostic(
        code(unifi_exporter::auth_failed),
        help(
            "Verify --unifi.username / --unifi.password (or UNIFI_USERNAME / UNIFI_PASSWORD).\n\
             The account needs at least read-only access to the exported sites.\n\
             Controller said: {message}"
        )
    )]
    AuthFailed { url: String, message: String },

    // ── Site selection ───────────────────────────────────────────────
    #[error("site with description {description:?} was not found in UniFi Controller")]
    #[diagnostic(
        code(unifi_exporter::site_not_found),
        help("Sites visible to this account: {available}")
    )]
    SiteNotFound {
        description: String,
        available: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("UniFi controller API error: {message}")]
    #[diagnostic(code(unifi_exporter::api_error))]
    Api { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(unifi_exporter::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(unifi_exporter::config))]
    Config(Box<figment::Error>),

    // ── Server ───────────────────────────────────────────────────────
    #[error("Could not listen on {addr}")]
    #[diagnostic(
        code(unifi_exporter::bind),
        help("Is another exporter already running? Choose another --metrics.listen address.")
    )]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Timeout { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::SiteNotFound { .. } => exit_code::SITE_SELECTION,
            Self::Validation { .. } | Self::Config(_) => exit_code::USAGE,
            Self::Api { .. } | Self::Bind { .. } | Self::Io(_) | Self::Internal(_) => {
                exit_code::GENERAL
            }
        }
    }

    /// Translate a core error raised while talking to the controller at `url`.
    pub fn from_core(err: CoreError, url: &str) -> Self {
        match err {
            CoreError::ConnectionFailed { reason, .. } => CliError::ConnectionFailed {
                url: url.to_owned(),
                reason,
            },
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed {
                url: url.to_owned(),
                message,
            },
            CoreError::Timeout => CliError::Timeout {
                url: url.to_owned(),
            },
            CoreError::SiteNotFound { description } => CliError::SiteNotFound {
                description,
                available: String::new(),
            },
            CoreError::Api { message } => CliError::Api { message },
            CoreError::Config { message } => CliError::Validation {
                field: "unifi".into(),
                reason: message,
            },
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

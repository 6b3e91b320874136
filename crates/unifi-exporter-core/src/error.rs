// ── Core error types ──
//
// Errors from unifi-exporter-core. Callers never see HTTP status codes or
// JSON parse failures directly; `From<unifi_exporter_api::Error>` folds
// transport-layer errors into domain variants. Scrape-time failures are
// split into whole-scrape `CollectionError`s and per-site `SiteError`s.

use std::time::Duration;

use thiserror::Error;

/// Errors from talking to the controller.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to controller at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Controller request timed out")]
    Timeout,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("site with description {description:?} was not found in UniFi Controller")]
    SiteNotFound { description: String },

    #[error("API error: {message}")]
    Api { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Authentication-class errors are the only ones worth a re-login.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::AuthenticationFailed { .. })
    }

    /// Classification used for error-counter labels.
    pub fn reason(&self) -> FailureReason {
        match self {
            Self::AuthenticationFailed { .. } => FailureReason::Auth,
            Self::ConnectionFailed { .. } => FailureReason::Transport,
            Self::Timeout => FailureReason::Timeout,
            Self::Internal(_) => FailureReason::Decode,
            Self::SiteNotFound { .. } | Self::Api { .. } | Self::Config { .. } => {
                FailureReason::Api
            }
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<unifi_exporter_api::Error> for CoreError {
    fn from(err: unifi_exporter_api::Error) -> Self {
        use unifi_exporter_api::Error as ApiError;

        if err.is_timeout() {
            return CoreError::Timeout;
        }

        match err {
            ApiError::Authentication { message } => CoreError::AuthenticationFailed { message },
            ApiError::SessionExpired => CoreError::AuthenticationFailed {
                message: "session expired, login required".into(),
            },
            ApiError::Transport(e) if e.is_connect() => CoreError::ConnectionFailed {
                url: e
                    .url()
                    .map_or_else(|| "<unknown>".into(), ToString::to_string),
                reason: e.to_string(),
            },
            ApiError::Transport(e) => CoreError::Api {
                message: e.to_string(),
            },
            ApiError::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            ApiError::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            ApiError::Controller { message } => CoreError::Api { message },
            ApiError::Decode { message, body: _ } => {
                CoreError::Internal(format!("undecodable controller response: {message}"))
            }
        }
    }
}

// ── Scrape-time errors ───────────────────────────────────────────────

/// Coarse failure class, used as the `reason` label on error counters.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::IntoStaticStr, strum::Display, strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum FailureReason {
    Auth,
    Transport,
    Timeout,
    Api,
    Decode,
}

/// A scrape that produced nothing publishable.
#[derive(Debug, Error)]
pub enum CollectionError {
    /// No session could be acquired; no site was queried.
    #[error("session unavailable: {0}")]
    SessionUnavailable(#[source] CoreError),

    /// The scrape budget ran out; outstanding site queries were dropped.
    #[error("scrape exceeded its {budget:?} budget")]
    TimedOut { budget: Duration },
}

impl CollectionError {
    pub fn reason(&self) -> FailureReason {
        match self {
            Self::SessionUnavailable(err) => err.reason(),
            Self::TimedOut { .. } => FailureReason::Timeout,
        }
    }
}

/// One site's failure within an otherwise successful scrape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("site {site:?}: {message}")]
pub struct SiteError {
    /// Description of the failed site.
    pub site: String,
    pub reason: FailureReason,
    pub message: String,
}

impl SiteError {
    pub(crate) fn new(site: &str, err: &CoreError) -> Self {
        Self {
            site: site.to_owned(),
            reason: err.reason(),
            message: err.to_string(),
        }
    }
}

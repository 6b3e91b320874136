use thiserror::Error;

/// Everything that can go wrong between the exporter and the controller.
///
/// `unifi-exporter-core` folds these into its own error type and, at
/// scrape time, into a `reason` label.
#[derive(Debug, Error)]
pub enum Error {
    // ── Session ─────────────────────────────────────────────────────
    /// Credentials refused at login, or HTTP 401 on a stat call.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The controller answered `api.err.LoginRequired`: the cookie is gone.
    #[error("Session expired, login required")]
    SessionExpired,

    // ── Network ─────────────────────────────────────────────────────
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// CA file unreadable, bad PEM, or the TLS backend refused the setup.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Payload ─────────────────────────────────────────────────────
    /// `meta.rc` was not `ok`, or a non-success HTTP status.
    #[error("Controller error: {message}")]
    Controller { message: String },

    /// The body was not the JSON we expected. `body` keeps the raw text.
    #[error("Cannot decode controller response: {message}")]
    Decode { message: String, body: String },
}

impl Error {
    /// A fresh login may fix this.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::SessionExpired)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }
}

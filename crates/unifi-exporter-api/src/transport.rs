// HTTP client construction.
//
// Platform detection and each session's client are built from the same
// `TransportConfig`, so TLS trust, timeouts and the user agent cannot
// drift between them.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;

use crate::error::Error;

pub const DEFAULT_USER_AGENT: &str = concat!("unifi-exporter/", env!("CARGO_PKG_VERSION"));

/// How the controller's certificate is checked.
#[derive(Debug, Clone)]
pub enum TlsMode {
    /// Platform trust store.
    System,
    /// Trust the PEM bundle at this path in addition to the platform store.
    CustomCa(PathBuf),
    /// No verification at all. Most controllers ship a self-signed cert.
    DangerAcceptInvalid,
}

#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    /// Applied both as connect timeout and as whole-request timeout.
    pub timeout: Duration,
    pub user_agent: String,
    /// Session cookies live here. `None` means a cookie-less client.
    pub cookie_jar: Option<Arc<Jar>>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::DangerAcceptInvalid,
            timeout: Duration::from_secs(5),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            cookie_jar: None,
        }
    }
}

impl TransportConfig {
    /// Same settings, new empty cookie jar.
    #[must_use]
    pub fn with_cookie_jar(self) -> Self {
        Self {
            cookie_jar: Some(Arc::new(Jar::default())),
            ..self
        }
    }

    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let builder = reqwest::Client::builder()
            .user_agent(self.user_agent.as_str())
            .connect_timeout(self.timeout)
            .timeout(self.timeout);

        let builder = match &self.tls {
            TlsMode::System => builder,
            TlsMode::CustomCa(path) => builder.add_root_certificate(load_ca(path)?),
            TlsMode::DangerAcceptInvalid => builder.danger_accept_invalid_certs(true),
        };

        let builder = match &self.cookie_jar {
            Some(jar) => builder.cookie_provider(Arc::clone(jar)),
            None => builder,
        };

        builder
            .build()
            .map_err(|e| Error::Tls(format!("cannot build HTTP client: {e}")))
    }
}

fn load_ca(path: &Path) -> Result<reqwest::Certificate, Error> {
    let pem = std::fs::read(path)
        .map_err(|e| Error::Tls(format!("cannot read CA bundle {}: {e}", path.display())))?;
    reqwest::Certificate::from_pem(&pem)
        .map_err(|e| Error::Tls(format!("{} is not a PEM certificate: {e}", path.display())))
}

// ── Runtime connection configuration ──
//
// These types describe *how* to reach and authenticate against a UniFi
// controller. They carry credential data and connection tuning, but never
// touch disk. The binary resolves flags/env/file into a `ControllerConfig`
// and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use unifi_exporter_api::transport::{DEFAULT_USER_AGENT, TlsMode, TransportConfig};
use unifi_exporter_api::ControllerPlatform;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed certs). Default for local controllers.
    #[default]
    DangerAcceptInvalid,
}

/// Which controller API layout to speak.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlatformChoice {
    /// Probe the controller on first login.
    #[default]
    Auto,
    Fixed(ControllerPlatform),
}

/// Configuration for connecting to a single controller.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Controller URL (e.g., `https://127.0.0.1:8443/`).
    pub url: Url,
    pub username: String,
    pub password: SecretString,
    pub tls: TlsVerification,
    pub platform: PlatformChoice,
    /// Bound on every outbound request, login included.
    pub timeout: Duration,
    /// Identifies the exporter to the controller.
    pub user_agent: String,
}

impl ControllerConfig {
    /// Config with the exporter's defaults: insecure TLS, platform
    /// auto-detection, 5s timeout.
    pub fn new(url: Url, username: impl Into<String>, password: SecretString) -> Self {
        Self {
            url,
            username: username.into(),
            password,
            tls: TlsVerification::default(),
            platform: PlatformChoice::default(),
            timeout: Duration::from_secs(5),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }

    /// Transport settings shared by platform detection and every session.
    ///
    /// Carries no cookie jar; each session gets a fresh one.
    pub fn transport(&self) -> TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig {
            tls,
            timeout: self.timeout,
            user_agent: self.user_agent.clone(),
            cookie_jar: None,
        }
    }
}

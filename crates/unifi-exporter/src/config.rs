//! Exporter configuration: built-in defaults, an optional TOML file, and
//! environment/flag overrides, layered with figment and resolved into the
//! types core understands.
//!
//! The file mirrors the flag names:
//!
//! ```toml
//! [metrics]
//! path = "/metrics"
//! listen = ":9130"
//!
//! [unifi]
//! addr = "https://unifi.example.net/"
//! username = "exporter"
//! password = "..."
//! insecure = false
//! site = "Home"
//! timeout = "5s"
//! platform = "unifi-os"
//!
//! [scrape]
//! timeout = "10s"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use url::Url;

use unifi_exporter_api::ControllerPlatform;
use unifi_exporter_core::{ControllerConfig, PlatformChoice, TlsVerification};

use crate::cli::{Cli, PlatformArg};
use crate::error::CliError;

// ── File / default layer ─────────────────────────────────────────────

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub metrics: MetricsSettings,
    pub unifi: UnifiSettings,
    pub scrape: ScrapeSettings,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricsSettings {
    pub path: String,
    pub listen: String,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            path: "/metrics".into(),
            listen: ":9130".into(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct UnifiSettings {
    pub addr: String,
    pub username: String,
    pub password: String,
    pub insecure: bool,
    pub site: String,
    pub timeout: String,
    pub platform: PlatformArg,
    pub ca_cert: Option<PathBuf>,
}

impl Default for UnifiSettings {
    fn default() -> Self {
        Self {
            addr: "https://127.0.0.1:8443/".into(),
            username: "admin".into(),
            password: "password".into(),
            insecure: true,
            site: String::new(),
            timeout: "5s".into(),
            platform: PlatformArg::Auto,
            ca_cert: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ScrapeSettings {
    pub timeout: String,
}

impl Default for ScrapeSettings {
    fn default() -> Self {
        Self {
            timeout: "10s".into(),
        }
    }
}

// ── Flag / env layer ─────────────────────────────────────────────────

/// Only the values actually given on the command line or in the
/// environment; unset fields are skipped so they don't mask the file.
#[derive(Debug, Default, Serialize)]
struct Overrides {
    metrics: MetricsOverrides,
    unifi: UnifiOverrides,
    scrape: ScrapeOverrides,
}

#[derive(Debug, Default, Serialize)]
struct MetricsOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    listen: Option<String>,
}

#[derive(Debug, Default, Serialize)]
struct UnifiOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    addr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    insecure: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    site: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    platform: Option<PlatformArg>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ca_cert: Option<PathBuf>,
}

#[derive(Debug, Default, Serialize)]
struct ScrapeOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout: Option<String>,
}

impl From<&Cli> for Overrides {
    fn from(cli: &Cli) -> Self {
        Self {
            metrics: MetricsOverrides {
                path: cli.metrics_path.clone(),
                listen: cli.metrics_listen.clone(),
            },
            unifi: UnifiOverrides {
                addr: cli.unifi_addr.clone(),
                username: cli.unifi_username.clone(),
                password: cli.unifi_password.clone(),
                insecure: cli.unifi_insecure,
                site: cli.unifi_site.clone(),
                timeout: cli.unifi_timeout.clone(),
                platform: cli.unifi_platform,
                ca_cert: cli.unifi_ca_cert.clone(),
            },
            scrape: ScrapeOverrides {
                timeout: cli.scrape_timeout.clone(),
            },
        }
    }
}

// ── Resolved configuration ───────────────────────────────────────────

/// Everything the exporter needs at runtime, validated.
#[derive(Debug)]
pub struct ExporterConfig {
    pub metrics_path: String,
    /// Bind address; `:9130` is widened to all interfaces.
    pub listen: String,
    pub controller: ControllerConfig,
    /// Site description to export; empty means all sites.
    pub site_filter: String,
    pub scrape_timeout: Duration,
}

/// Layer defaults, the optional config file, and CLI/env values.
pub fn load(cli: &Cli) -> Result<ExporterConfig, CliError> {
    let mut figment = Figment::new().merge(Serialized::defaults(Settings::default()));

    if let Some(ref path) = cli.config {
        if !path.is_file() {
            return Err(CliError::Validation {
                field: "config".into(),
                reason: format!("file not found: {}", path.display()),
            });
        }
        figment = figment.merge(Toml::file(path));
    }

    let settings: Settings = figment
        .merge(Serialized::defaults(Overrides::from(cli)))
        .extract()?;
    resolve(settings)
}

/// Validate settings and translate them into core types.
///
/// This is the single boundary where binary config types cross into
/// core types.
pub fn resolve(settings: Settings) -> Result<ExporterConfig, CliError> {
    let Settings {
        metrics,
        unifi,
        scrape,
    } = settings;

    if !metrics.path.starts_with('/') || metrics.path == "/" {
        return Err(CliError::Validation {
            field: "metrics.path".into(),
            reason: format!("must start with '/' and not be the root path, got {:?}", metrics.path),
        });
    }

    let listen = if metrics.listen.starts_with(':') {
        format!("0.0.0.0{}", metrics.listen)
    } else {
        metrics.listen
    };

    let url = Url::parse(&unifi.addr).map_err(|e| CliError::Validation {
        field: "unifi.addr".into(),
        reason: format!("invalid URL {:?}: {e}", unifi.addr),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(CliError::Validation {
            field: "unifi.addr".into(),
            reason: format!("unsupported scheme {:?}", url.scheme()),
        });
    }

    let timeout = parse_duration("unifi.timeout", &unifi.timeout)?;
    let scrape_timeout = parse_duration("scrape.timeout", &scrape.timeout)?;

    let tls = match unifi.ca_cert {
        Some(path) => TlsVerification::CustomCa(path),
        None if unifi.insecure => TlsVerification::DangerAcceptInvalid,
        None => TlsVerification::SystemDefaults,
    };

    let platform = match unifi.platform {
        PlatformArg::Auto => PlatformChoice::Auto,
        PlatformArg::UnifiOs => PlatformChoice::Fixed(ControllerPlatform::UnifiOs),
        PlatformArg::Classic => PlatformChoice::Fixed(ControllerPlatform::ClassicController),
    };

    let mut controller =
        ControllerConfig::new(url, unifi.username, SecretString::from(unifi.password));
    controller.tls = tls;
    controller.platform = platform;
    controller.timeout = timeout;

    Ok(ExporterConfig {
        metrics_path: metrics.path,
        listen,
        controller,
        site_filter: unifi.site,
        scrape_timeout,
    })
}

fn parse_duration(field: &str, raw: &str) -> Result<Duration, CliError> {
    let duration = humantime::parse_duration(raw).map_err(|e| CliError::Validation {
        field: field.into(),
        reason: format!("invalid duration {raw:?}: {e}"),
    })?;
    if duration.is_zero() {
        return Err(CliError::Validation {
            field: field.into(),
            reason: "must be greater than zero".into(),
        });
    }
    Ok(duration)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::Parser;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["unifi_exporter"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).expect("parse")
    }

    #[test]
    fn defaults_match_documented_flags() {
        let cfg = resolve(Settings::default()).expect("defaults resolve");
        assert_eq!(cfg.metrics_path, "/metrics");
        assert_eq!(cfg.listen, "0.0.0.0:9130");
        assert_eq!(cfg.controller.url.as_str(), "https://127.0.0.1:8443/");
        assert_eq!(cfg.controller.username, "admin");
        assert_eq!(cfg.controller.password.expose_secret(), "password");
        assert_eq!(cfg.controller.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(cfg.controller.timeout, Duration::from_secs(5));
        assert_eq!(cfg.site_filter, "");
        assert_eq!(cfg.scrape_timeout, Duration::from_secs(10));
    }

    #[test]
    fn flags_override_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(
            file,
            "[unifi]\naddr = \"https://file.example/\"\nsite = \"Office\"\ntimeout = \"2s\"\n\n[metrics]\nlisten = \"127.0.0.1:9999\""
        )
        .expect("write");

        let path = file.path().to_string_lossy().into_owned();
        let cfg = load(&cli(&["--config", &path, "--unifi.site", "Home"])).expect("load");

        assert_eq!(cfg.controller.url.as_str(), "https://file.example/");
        assert_eq!(cfg.site_filter, "Home");
        assert_eq!(cfg.controller.timeout, Duration::from_secs(2));
        assert_eq!(cfg.listen, "127.0.0.1:9999");
    }

    #[test]
    fn missing_config_file_is_rejected() {
        let err = load(&cli(&["--config", "/nonexistent/unifi_exporter.toml"])).expect_err("missing");
        assert_eq!(err.exit_code(), crate::error::exit_code::USAGE);
    }

    #[test]
    fn bad_durations_are_rejected() {
        let mut settings = Settings::default();
        settings.unifi.timeout = "soon".into();
        assert!(matches!(
            resolve(settings),
            Err(CliError::Validation { ref field, .. }) if field == "unifi.timeout"
        ));

        let mut settings = Settings::default();
        settings.scrape.timeout = "0s".into();
        assert!(resolve(settings).is_err());
    }

    #[test]
    fn metrics_path_must_be_absolute_and_not_root() {
        for bad in ["metrics", "/"] {
            let mut settings = Settings::default();
            settings.metrics.path = bad.into();
            assert!(resolve(settings).is_err(), "{bad}");
        }
    }

    #[test]
    fn ca_cert_implies_strict_tls() {
        let mut settings = Settings::default();
        settings.unifi.ca_cert = Some(PathBuf::from("/etc/ssl/unifi.pem"));
        let cfg = resolve(settings).expect("resolve");
        assert_eq!(
            cfg.controller.tls,
            TlsVerification::CustomCa(PathBuf::from("/etc/ssl/unifi.pem"))
        );

        let mut settings = Settings::default();
        settings.unifi.insecure = false;
        assert_eq!(
            resolve(settings).expect("resolve").controller.tls,
            TlsVerification::SystemDefaults
        );
    }

    #[test]
    fn platform_choice_is_mapped() {
        let mut settings = Settings::default();
        settings.unifi.platform = PlatformArg::Classic;
        let cfg = resolve(settings).expect("resolve");
        assert_eq!(
            cfg.controller.platform,
            PlatformChoice::Fixed(ControllerPlatform::ClassicController)
        );
    }
}

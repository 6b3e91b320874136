// ── Exposition ──
//
// The exporter's own long-lived metrics, and text rendering of a scrape.
// Scrape samples go into a throwaway registry built per request, so a
// site that failed this time simply has no series; nothing from an
// earlier scrape can leak into the response.

use std::collections::BTreeMap;
use std::time::Duration;

use prometheus::{Counter, CounterVec, Gauge, GaugeVec, IntCounterVec, Opts, Registry, TextEncoder};
use strum::IntoEnumIterator;
use tracing::debug;

use crate::collector::Scrape;
use crate::error::{CollectionError, CoreError, FailureReason};
use crate::mapper::{MetricKind, MetricSample, NAMESPACE};

/// `Content-Type` of the rendered exposition.
pub const CONTENT_TYPE: &str = prometheus::TEXT_FORMAT;

fn metrics_err(e: prometheus::Error) -> CoreError {
    CoreError::Internal(format!("metrics: {e}"))
}

/// Self-metrics that outlive individual scrapes.
#[derive(Clone)]
pub struct ExporterMetrics {
    registry: Registry,
    up: Gauge,
    scrape_duration: Gauge,
    scrape_errors: IntCounterVec,
    site_errors: IntCounterVec,
}

impl std::fmt::Debug for ExporterMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExporterMetrics")
            .field("up", &self.up.get())
            .finish_non_exhaustive()
    }
}

impl ExporterMetrics {
    pub fn new() -> Result<Self, CoreError> {
        let registry = Registry::new();

        let up = Gauge::with_opts(Opts::new(
            format!("{NAMESPACE}_up"),
            "Whether the last scrape of the UniFi controller succeeded.",
        ))
        .map_err(metrics_err)?;
        registry.register(Box::new(up.clone())).map_err(metrics_err)?;

        let scrape_duration = Gauge::with_opts(Opts::new(
            format!("{NAMESPACE}_scrape_duration_seconds"),
            "Duration of the last scrape of the UniFi controller.",
        ))
        .map_err(metrics_err)?;
        registry
            .register(Box::new(scrape_duration.clone()))
            .map_err(metrics_err)?;

        let scrape_errors = IntCounterVec::new(
            Opts::new(
                format!("{NAMESPACE}_scrape_errors_total"),
                "Scrapes that published no controller data, by reason.",
            ),
            &["reason"],
        )
        .map_err(metrics_err)?;
        registry
            .register(Box::new(scrape_errors.clone()))
            .map_err(metrics_err)?;

        let site_errors = IntCounterVec::new(
            Opts::new(
                format!("{NAMESPACE}_site_errors_total"),
                "Per-site query failures, by site and reason.",
            ),
            &["site", "reason"],
        )
        .map_err(metrics_err)?;
        registry
            .register(Box::new(site_errors.clone()))
            .map_err(metrics_err)?;

        // Zero-valued series for every reason, so rate() works from the start.
        for reason in FailureReason::iter() {
            let label: &'static str = reason.into();
            scrape_errors.with_label_values(&[label]);
        }

        Ok(Self {
            registry,
            up,
            scrape_duration,
            scrape_errors,
            site_errors,
        })
    }

    /// Fold one scrape's outcome into the long-lived counters.
    pub fn observe(&self, outcome: &Result<Scrape, CollectionError>, elapsed: Duration) {
        self.scrape_duration.set(elapsed.as_secs_f64());
        match outcome {
            Ok(scrape) => {
                self.up.set(1.0);
                for err in &scrape.site_errors {
                    let reason: &'static str = err.reason.into();
                    self.site_errors
                        .with_label_values(&[err.site.as_str(), reason])
                        .inc();
                }
            }
            Err(err) => {
                self.up.set(0.0);
                let reason: &'static str = err.reason().into();
                self.scrape_errors.with_label_values(&[reason]).inc();
            }
        }
    }

    /// Render the self-metrics plus, on success, the scrape's samples.
    ///
    /// `logins` is the session provider's login count, exported as
    /// `unifi_session_logins_total`.
    pub fn render(
        &self,
        outcome: &Result<Scrape, CollectionError>,
        logins: u64,
    ) -> Result<String, CoreError> {
        let scrape_registry = Registry::new();
        if let Ok(scrape) = outcome {
            register_samples(&scrape_registry, &scrape.samples)?;
        }

        let login_counter = Counter::with_opts(Opts::new(
            format!("{NAMESPACE}_session_logins_total"),
            "Logins performed against the UniFi controller.",
        ))
        .map_err(metrics_err)?;
        login_counter.inc_by(as_f64(logins));
        scrape_registry
            .register(Box::new(login_counter))
            .map_err(metrics_err)?;

        let mut families = self.registry.gather();
        families.extend(scrape_registry.gather());
        families.sort_by(|a, b| a.get_name().cmp(b.get_name()));

        let mut buffer = String::new();
        TextEncoder::new()
            .encode_utf8(&families, &mut buffer)
            .map_err(metrics_err)?;
        debug!(families = families.len(), bytes = buffer.len(), "rendered metrics");
        Ok(buffer)
    }
}

#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
fn as_f64(n: u64) -> f64 {
    n as f64
}

/// One metric family per sample name, labelled by the first sample's keys.
fn register_samples(registry: &Registry, samples: &[MetricSample]) -> Result<(), CoreError> {
    let mut by_name: BTreeMap<&str, Vec<&MetricSample>> = BTreeMap::new();
    for sample in samples {
        by_name.entry(sample.name.as_str()).or_default().push(sample);
    }

    for (name, group) in by_name {
        let Some(first) = group.first() else {
            continue;
        };
        let keys: Vec<&str> = first.labels.iter().map(|(k, _)| *k).collect();
        let opts = Opts::new(name, first.help);

        match first.kind {
            MetricKind::Gauge => {
                let vec = GaugeVec::new(opts, &keys).map_err(metrics_err)?;
                for sample in &group {
                    vec.get_metric_with_label_values(&label_values(sample))
                        .map_err(metrics_err)?
                        .set(sample.value);
                }
                registry.register(Box::new(vec)).map_err(metrics_err)?;
            }
            MetricKind::Counter => {
                let vec = CounterVec::new(opts, &keys).map_err(metrics_err)?;
                for sample in &group {
                    vec.get_metric_with_label_values(&label_values(sample))
                        .map_err(metrics_err)?
                        .inc_by(sample.value);
                }
                registry.register(Box::new(vec)).map_err(metrics_err)?;
            }
        }
    }
    Ok(())
}

fn label_values(sample: &MetricSample) -> Vec<&str> {
    sample.labels.iter().map(|(_, v)| v.as_str()).collect()
}

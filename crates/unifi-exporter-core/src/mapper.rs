// ── Per-site metric mapper ──
//
// Pure translation of one site's records into metric samples. No I/O and
// no shared state, so independent sites can be mapped concurrently.
//
// Every record variant has a static attribute table. Each attribute that
// is present on a record becomes one sample named
// `unifi_<variant>_<attribute>`; absent attributes are skipped without
// affecting the record's other samples.

use crate::model::{DeviceRecord, Record, Site, StationRecord};

/// Metric name prefix.
pub const NAMESPACE: &str = "unifi";

/// Prometheus metric type of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Gauge,
    Counter,
}

/// One numeric observation with its label set.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    pub name: String,
    pub help: &'static str,
    pub kind: MetricKind,
    pub value: f64,
    /// Ordered label pairs; always starts with `site`.
    pub labels: Vec<(&'static str, String)>,
}

impl MetricSample {
    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }
}

// ── Attribute tables ─────────────────────────────────────────────

struct Attribute<T> {
    name: &'static str,
    help: &'static str,
    value: fn(&T) -> Option<f64>,
}

impl<T> Attribute<T> {
    /// `_total` attributes are monotonically increasing counters.
    fn kind(&self) -> MetricKind {
        if self.name.ends_with("_total") {
            MetricKind::Counter
        } else {
            MetricKind::Gauge
        }
    }
}

#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
fn num(v: Option<i64>) -> Option<f64> {
    v.map(|v| v as f64)
}

fn small(v: Option<i32>) -> Option<f64> {
    v.map(f64::from)
}

#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
fn count(n: usize) -> f64 {
    n as f64
}

const DEVICE_ATTRIBUTES: &[Attribute<DeviceRecord>] = &[
    Attribute {
        name: "adopted",
        help: "Whether the device is adopted by the controller (1) or not (0).",
        value: |d| Some(f64::from(u8::from(d.adopted))),
    },
    Attribute {
        name: "state",
        help: "Controller state code of the device (0=offline, 1=online, 2=pending, 4=upgrading, 5=provisioning).",
        value: |d| Some(f64::from(d.state)),
    },
    Attribute {
        name: "uptime_seconds",
        help: "Device uptime in seconds.",
        value: |d| num(d.uptime_secs),
    },
    Attribute {
        name: "stations",
        help: "Number of stations connected to the device.",
        value: |d| small(d.stations),
    },
    Attribute {
        name: "received_bytes_total",
        help: "Bytes received by the device.",
        value: |d| num(d.rx_bytes),
    },
    Attribute {
        name: "transmitted_bytes_total",
        help: "Bytes transmitted by the device.",
        value: |d| num(d.tx_bytes),
    },
    Attribute {
        name: "memory_used_bytes",
        help: "Memory in use on the device, in bytes.",
        value: |d| num(d.mem_used),
    },
    Attribute {
        name: "memory_total_bytes",
        help: "Total memory of the device, in bytes.",
        value: |d| num(d.mem_total),
    },
    Attribute {
        name: "load1",
        help: "One-minute load average of the device.",
        value: |d| d.load_1,
    },
];

const STATION_ATTRIBUTES: &[Attribute<StationRecord>] = &[
    Attribute {
        name: "uptime_seconds",
        help: "Time the client has been connected, in seconds.",
        value: |s| num(s.uptime_secs),
    },
    Attribute {
        name: "received_bytes_total",
        help: "Bytes received by the client.",
        value: |s| num(s.rx_bytes),
    },
    Attribute {
        name: "transmitted_bytes_total",
        help: "Bytes transmitted by the client.",
        value: |s| num(s.tx_bytes),
    },
];

const WIRELESS_ATTRIBUTES: &[Attribute<StationRecord>] = &[
    Attribute {
        name: "signal_dbm",
        help: "Signal strength of the wireless client in dBm.",
        value: |s| small(s.signal),
    },
    Attribute {
        name: "rssi",
        help: "Received signal strength indicator of the wireless client.",
        value: |s| small(s.rssi),
    },
    Attribute {
        name: "noise_dbm",
        help: "Noise floor seen by the wireless client in dBm.",
        value: |s| small(s.noise),
    },
    Attribute {
        name: "satisfaction",
        help: "Controller-computed experience score of the wireless client (0-100).",
        value: |s| small(s.satisfaction),
    },
    Attribute {
        name: "channel",
        help: "Radio channel the wireless client is connected on.",
        value: |s| small(s.channel),
    },
];

// ── Mapping ──────────────────────────────────────────────────────

/// Map one site's records into samples.
///
/// Deterministic: the same site and records always yield the same
/// samples in the same order. `Unknown` records produce nothing.
pub fn map_site(site: &Site, records: &[Record]) -> Vec<MetricSample> {
    let mut out = Vec::new();

    for record in records {
        let variant = record.variant();
        match record {
            Record::AccessPoint(d) | Record::Switch(d) | Record::Gateway(d) => {
                let labels = device_labels(site, d);
                emit(&mut out, variant, DEVICE_ATTRIBUTES, d, &labels);
            }
            Record::WirelessClient(s) => {
                let labels = station_labels(site, s);
                emit(&mut out, variant, STATION_ATTRIBUTES, s, &labels);
                emit(&mut out, variant, WIRELESS_ATTRIBUTES, s, &labels);
            }
            Record::WiredClient(s) => {
                let labels = station_labels(site, s);
                emit(&mut out, variant, STATION_ATTRIBUTES, s, &labels);
            }
            Record::Unknown { .. } => {}
        }
    }

    out.extend(site_aggregates(site, records));
    out
}

/// `unifi_site_up`: whether the site's records were retrieved this scrape.
pub fn site_up(site: &Site, up: bool) -> MetricSample {
    MetricSample {
        name: format!("{NAMESPACE}_site_up"),
        help: "Whether the last query of the site succeeded (1) or failed (0).",
        kind: MetricKind::Gauge,
        value: f64::from(u8::from(up)),
        labels: vec![("site", site.description.clone())],
    }
}

fn emit<T>(
    out: &mut Vec<MetricSample>,
    variant: &str,
    attributes: &[Attribute<T>],
    record: &T,
    labels: &[(&'static str, String)],
) {
    for attr in attributes {
        let Some(value) = (attr.value)(record) else {
            continue;
        };
        let kind = attr.kind();
        // Counter resets show up as negative values on some firmware.
        if kind == MetricKind::Counter && value < 0.0 {
            continue;
        }
        out.push(MetricSample {
            name: format!("{NAMESPACE}_{variant}_{}", attr.name),
            help: attr.help,
            kind,
            value,
            labels: labels.to_vec(),
        });
    }
}

fn device_labels(site: &Site, d: &DeviceRecord) -> Vec<(&'static str, String)> {
    vec![
        ("site", site.description.clone()),
        ("device_id", d.id.clone()),
        ("mac", d.mac.clone()),
        ("name", d.name.clone().unwrap_or_default()),
    ]
}

fn station_labels(site: &Site, s: &StationRecord) -> Vec<(&'static str, String)> {
    vec![
        ("site", site.description.clone()),
        ("device_id", s.id.clone()),
        ("mac", s.mac.clone()),
        ("hostname", s.hostname.clone().unwrap_or_default()),
    ]
}

fn site_aggregates(site: &Site, records: &[Record]) -> Vec<MetricSample> {
    let devices = records.iter().filter_map(Record::as_device);
    let total = devices.clone().count();
    let adopted = devices.filter(|d| d.adopted).count();
    let wireless = records
        .iter()
        .filter(|r| matches!(r, Record::WirelessClient(_)))
        .count();
    let wired = records
        .iter()
        .filter(|r| matches!(r, Record::WiredClient(_)))
        .count();

    let aggregate = |name: &str, help: &'static str, n: usize| MetricSample {
        name: format!("{NAMESPACE}_site_{name}"),
        help,
        kind: MetricKind::Gauge,
        value: count(n),
        labels: vec![("site", site.description.clone())],
    };

    vec![
        aggregate("devices", "Number of devices in the site.", total),
        aggregate(
            "devices_adopted",
            "Number of adopted devices in the site.",
            adopted,
        ),
        aggregate(
            "clients_wireless",
            "Number of wireless clients connected in the site.",
            wireless,
        ),
        aggregate(
            "clients_wired",
            "Number of wired clients connected in the site.",
            wired,
        ),
    ]
}

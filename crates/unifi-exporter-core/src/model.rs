// ── Domain model ──
//
// What the mapper consumes. Records are read fresh on every scrape and
// never cached; sites are fetched once at startup and then fixed.

/// A controller site in the working set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    /// Opaque controller-assigned key.
    pub id: String,
    /// Short name used in site-scoped API paths (`default`, `x8k2lq0a`).
    pub name: String,
    /// Human-readable description; the operator filters on this and it
    /// becomes the `site` label.
    pub description: String,
}

/// A network device (access point, switch, gateway).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceRecord {
    pub id: String,
    pub mac: String,
    pub name: Option<String>,
    pub adopted: bool,
    /// Raw controller state code (0=offline, 1=online, ...).
    pub state: i32,
    pub uptime_secs: Option<i64>,
    /// Stations currently associated with or behind the device.
    pub stations: Option<i32>,
    pub rx_bytes: Option<i64>,
    pub tx_bytes: Option<i64>,
    pub mem_used: Option<i64>,
    pub mem_total: Option<i64>,
    pub load_1: Option<f64>,
}

/// A connected client (station).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationRecord {
    pub id: String,
    pub mac: String,
    pub hostname: Option<String>,
    pub uptime_secs: Option<i64>,
    pub rx_bytes: Option<i64>,
    pub tx_bytes: Option<i64>,
    /// Signal strength in dBm.
    pub signal: Option<i32>,
    pub rssi: Option<i32>,
    /// Noise floor in dBm.
    pub noise: Option<i32>,
    /// Controller-computed experience score, 0-100.
    pub satisfaction: Option<i32>,
    pub channel: Option<i32>,
}

/// One raw entity read from a site, tagged by kind.
///
/// The tag string (`ap`, `switch`, ...) is the `<variant>` segment of the
/// metric names derived from the record.
#[derive(Debug, Clone, PartialEq, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Record {
    #[strum(serialize = "ap")]
    AccessPoint(DeviceRecord),
    Switch(DeviceRecord),
    Gateway(DeviceRecord),
    WirelessClient(StationRecord),
    WiredClient(StationRecord),
    /// Anything the controller returned that we have no attribute set for.
    Unknown { kind: String, id: String },
}

impl Record {
    /// Variant tag used in metric names.
    pub fn variant(&self) -> &'static str {
        self.into()
    }

    /// Network devices, as opposed to stations.
    pub fn as_device(&self) -> Option<&DeviceRecord> {
        match self {
            Self::AccessPoint(d) | Self::Switch(d) | Self::Gateway(d) => Some(d),
            _ => None,
        }
    }
}

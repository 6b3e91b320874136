// Payload types for `self/sites`, `stat/device` and `stat/sta`.
//
// Field presence varies by firmware and device family, so every struct
// defaults as a whole: a missing key decodes to its zero value or `None`
// rather than failing the site. Non-optional scalars also read an explicit
// `null` as their zero value. Keys we do not export are collected in
// `extra` for debugging.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// `null` decodes like a missing key.
fn null_as_default<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}

/// One entry of `GET /api/self/sites`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SiteEntry {
    #[serde(rename = "_id", deserialize_with = "null_as_default")]
    pub id: String,
    /// Short name used in site-scoped paths, e.g. `default`.
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Human-readable name shown in the controller UI.
    pub desc: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of `GET /api/s/{site}/stat/device`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeviceStat {
    #[serde(rename = "_id", deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub mac: String,
    /// Family code: `uap`, `usw`, `ugw`, `udm`, `uxg`, ...
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    pub name: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub adopted: bool,
    /// 0 offline, 1 connected, 2 pending adoption, 4 upgrading, 5 provisioning.
    #[serde(deserialize_with = "null_as_default")]
    pub state: i32,
    pub uptime: Option<i64>,
    pub num_sta: Option<i32>,
    pub rx_bytes: Option<i64>,
    pub tx_bytes: Option<i64>,
    pub sys_stats: Option<SystemStats>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `sys_stats` block of a device. Load averages arrive as strings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SystemStats {
    #[serde(rename = "loadavg_1")]
    pub load_1: Option<String>,
    pub mem_total: Option<i64>,
    pub mem_used: Option<i64>,
}

/// One entry of `GET /api/s/{site}/stat/sta`: a connected station.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StationStat {
    #[serde(rename = "_id", deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub mac: String,
    pub hostname: Option<String>,
    /// Alias set by an operator in the UI.
    pub name: Option<String>,
    pub is_wired: Option<bool>,
    pub uptime: Option<i64>,
    pub rx_bytes: Option<i64>,
    pub tx_bytes: Option<i64>,
    pub channel: Option<i32>,
    pub signal: Option<i32>,
    pub rssi: Option<i32>,
    pub noise: Option<i32>,
    pub satisfaction: Option<i32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

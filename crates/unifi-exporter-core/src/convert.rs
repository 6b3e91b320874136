// ── API-to-domain type conversions ──
//
// Bridges raw `unifi_exporter_api` response types into the records the
// mapper understands. Each `From` impl tags the record kind, parses
// strings into numbers, and leaves absent attributes as `None`.

use unifi_exporter_api::models::{DeviceStat, SiteEntry, StationStat};

use crate::model::{DeviceRecord, Record, Site, StationRecord};

// ── Site ───────────────────────────────────────────────────────────

impl From<SiteEntry> for Site {
    fn from(s: SiteEntry) -> Self {
        // The default site often comes back without a description.
        let description = match s.desc {
            Some(desc) if !desc.is_empty() => desc,
            _ => s.name.clone(),
        };
        Site {
            id: s.id,
            name: s.name,
            description,
        }
    }
}

// ── Device ─────────────────────────────────────────────────────────

impl From<DeviceStat> for Record {
    fn from(d: DeviceStat) -> Self {
        let sys = d.sys_stats.unwrap_or_default();
        let record = DeviceRecord {
            id: d.id,
            mac: d.mac,
            name: d.name,
            adopted: d.adopted,
            state: d.state,
            uptime_secs: d.uptime,
            stations: d.num_sta,
            rx_bytes: d.rx_bytes,
            tx_bytes: d.tx_bytes,
            mem_used: sys.mem_used,
            mem_total: sys.mem_total,
            load_1: sys.load_1.as_deref().and_then(|v| v.parse().ok()),
        };

        match d.kind.as_str() {
            "uap" => Record::AccessPoint(record),
            "usw" => Record::Switch(record),
            "ugw" | "udm" | "uxg" => Record::Gateway(record),
            _ => Record::Unknown {
                kind: d.kind,
                id: record.id,
            },
        }
    }
}

// ── Station ────────────────────────────────────────────────────────

impl From<StationStat> for Record {
    fn from(c: StationStat) -> Self {
        let record = StationRecord {
            id: c.id,
            mac: c.mac,
            hostname: c.hostname.or(c.name),
            uptime_secs: c.uptime,
            rx_bytes: c.rx_bytes,
            tx_bytes: c.tx_bytes,
            signal: c.signal,
            rssi: c.rssi,
            noise: c.noise,
            satisfaction: c.satisfaction,
            channel: c.channel,
        };

        match c.is_wired {
            Some(true) => Record::WiredClient(record),
            Some(false) => Record::WirelessClient(record),
            None => Record::Unknown {
                kind: "station".into(),
                id: record.id,
            },
        }
    }
}

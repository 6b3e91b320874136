// The three read calls a scrape needs.
//
// Sites are listed at controller level (`/api/self/sites`); devices and
// stations are site-scoped under `/api/s/{site}/stat/`.

use tracing::debug;

use crate::client::ControllerClient;
use crate::error::Error;
use crate::models::{DeviceStat, SiteEntry, StationStat};

impl ControllerClient {
    /// Sites visible to the logged-in account.
    pub async fn list_sites(&self) -> Result<Vec<SiteEntry>, Error> {
        let sites: Vec<SiteEntry> = self.fetch(self.api_url("self/sites")?).await?;
        debug!(count = sites.len(), "listed sites");
        Ok(sites)
    }

    /// Every device of `site` with its counters, adopted or not.
    pub async fn list_devices(&self, site: &str) -> Result<Vec<DeviceStat>, Error> {
        let devices: Vec<DeviceStat> = self.fetch(self.site_url(site, "stat/device")?).await?;
        debug!(site, count = devices.len(), "listed devices");
        Ok(devices)
    }

    /// Stations currently connected to `site`, wired and wireless.
    pub async fn list_stations(&self, site: &str) -> Result<Vec<StationStat>, Error> {
        let stations: Vec<StationStat> = self.fetch(self.site_url(site, "stat/sta")?).await?;
        debug!(site, count = stations.len(), "listed stations");
        Ok(stations)
    }
}

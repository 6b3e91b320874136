// ── Collector ──
//
// One scrape: acquire a session, query every selected site concurrently,
// map what came back. A site whose query is rejected as unauthenticated
// gets exactly one re-login and retry; any other failure, or a second
// failure, confines itself to that site. Nothing is cached between
// scrapes, so a failed site contributes no samples rather than stale ones.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::error::{CollectionError, CoreError, SiteError};
use crate::mapper::{self, MetricSample};
use crate::model::{Record, Site};
use crate::session::{SessionHandle, SessionProvider};

/// Result of one successful scrape.
#[derive(Debug, Default)]
pub struct Scrape {
    /// Samples from every site that answered, plus `unifi_site_up` for
    /// every site in the working set.
    pub samples: Vec<MetricSample>,
    /// Sites that contributed nothing this time, and why.
    pub site_errors: Vec<SiteError>,
}

/// Per-site retry state within a single scrape.
enum SiteAttempt {
    /// First query, through the scrape's session.
    Fresh(SessionHandle),
    /// The first query was rejected; this is the one retry after re-login.
    RetriedAfterReauth(SessionHandle),
    Failed(SiteError),
}

/// Scrape orchestrator, shared by every concurrent scrape request.
#[derive(Debug)]
pub struct Collector {
    session: Arc<SessionProvider>,
    sites: Vec<Site>,
    scrape_timeout: Duration,
}

impl Collector {
    pub fn new(session: Arc<SessionProvider>, sites: Vec<Site>, scrape_timeout: Duration) -> Self {
        Self {
            session,
            sites,
            scrape_timeout,
        }
    }

    /// The fixed working set.
    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    pub fn session(&self) -> &Arc<SessionProvider> {
        &self.session
    }

    pub fn scrape_timeout(&self) -> Duration {
        self.scrape_timeout
    }

    /// Run one scrape within the configured timeout.
    pub async fn scrape(&self) -> Result<Scrape, CollectionError> {
        self.scrape_within(self.scrape_timeout).await
    }

    /// Run one scrape within `budget`.
    ///
    /// When the budget runs out the outstanding site queries are dropped
    /// and the whole scrape fails.
    pub async fn scrape_within(&self, budget: Duration) -> Result<Scrape, CollectionError> {
        tokio::time::timeout(budget, self.collect())
            .await
            .map_err(|_| CollectionError::TimedOut { budget })?
    }

    async fn collect(&self) -> Result<Scrape, CollectionError> {
        let handle = self
            .session
            .acquire()
            .await
            .map_err(CollectionError::SessionUnavailable)?;

        let results = join_all(
            self.sites
                .iter()
                .map(|site| self.query_site(site, handle.clone())),
        )
        .await;

        let mut scrape = Scrape::default();
        for (site, result) in self.sites.iter().zip(results) {
            match result {
                Ok(records) => {
                    debug!(site = %site.description, records = records.len(), "site collected");
                    scrape.samples.extend(mapper::map_site(site, &records));
                    scrape.samples.push(mapper::site_up(site, true));
                }
                Err(err) => {
                    warn!(site = %site.description, reason = %err.reason, error = %err.message, "site query failed");
                    scrape.samples.push(mapper::site_up(site, false));
                    scrape.site_errors.push(err);
                }
            }
        }
        Ok(scrape)
    }

    async fn query_site(&self, site: &Site, handle: SessionHandle) -> Result<Vec<Record>, SiteError> {
        let mut attempt = SiteAttempt::Fresh(handle);
        loop {
            attempt = match attempt {
                SiteAttempt::Fresh(handle) => match fetch_records(&handle, site).await {
                    Ok(records) => return Ok(records),
                    Err(err) if err.is_auth() => {
                        debug!(site = %site.description, error = %err, "session rejected, re-authenticating");
                        self.session.invalidate(&handle).await;
                        match self.session.acquire().await {
                            Ok(fresh) => SiteAttempt::RetriedAfterReauth(fresh),
                            Err(e) => SiteAttempt::Failed(SiteError::new(&site.description, &e)),
                        }
                    }
                    Err(err) => SiteAttempt::Failed(SiteError::new(&site.description, &err)),
                },
                SiteAttempt::RetriedAfterReauth(handle) => {
                    match fetch_records(&handle, site).await {
                        Ok(records) => return Ok(records),
                        Err(err) => SiteAttempt::Failed(SiteError::new(&site.description, &err)),
                    }
                }
                SiteAttempt::Failed(err) => return Err(err),
            };
        }
    }
}

/// Devices and stations of one site, fetched concurrently.
async fn fetch_records(handle: &SessionHandle, site: &Site) -> Result<Vec<Record>, CoreError> {
    let client = handle.client();
    let (devices, stations) = tokio::try_join!(
        client.list_devices(&site.name),
        client.list_stations(&site.name)
    )?;

    Ok(devices
        .into_iter()
        .map(Record::from)
        .chain(stations.into_iter().map(Record::from))
        .collect())
}

// Controller HTTP client.
//
// Holds the reqwest client (and through it the session cookie jar), the
// controller root URL and the platform, which decides the path prefix.
// Calls live next door: `login` for the session, `stat` for the data.

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::envelope;
use crate::error::Error;
use crate::platform::ControllerPlatform;
use crate::transport::TransportConfig;

/// Client for one controller. Site-scoped calls take the site's short
/// name, so a single logged-in client serves every site.
pub struct ControllerClient {
    http: reqwest::Client,
    base_url: Url,
    platform: ControllerPlatform,
}

impl std::fmt::Debug for ControllerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerClient")
            .field("base_url", &self.base_url.as_str())
            .field("platform", &self.platform)
            .finish_non_exhaustive()
    }
}

impl ControllerClient {
    /// Build a client for `base_url`, the controller root
    /// (`https://192.168.1.1` or `https://controller:8443`).
    ///
    /// Cookie sessions need a jar; one is added when `transport` has none.
    pub fn new(
        base_url: Url,
        platform: ControllerPlatform,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = match transport.cookie_jar {
            Some(_) => transport.build_client()?,
            None => transport.clone().with_cookie_jar().build_client()?,
        };
        Ok(Self::with_client(http, base_url, platform))
    }

    /// Wrap an existing reqwest client as-is.
    pub fn with_client(http: reqwest::Client, base_url: Url, platform: ControllerPlatform) -> Self {
        Self {
            http,
            base_url,
            platform,
        }
    }

    pub fn platform(&self) -> ControllerPlatform {
        self.platform
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// `{root}{prefix}/api/{path}`
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let root = self.base_url.as_str().trim_end_matches('/');
        let prefix = self.platform.api_prefix();
        Ok(Url::parse(&format!("{root}{prefix}/api/{path}"))?)
    }

    /// `{root}{prefix}/api/s/{site}/{path}`
    pub(crate) fn site_url(&self, site: &str, path: &str) -> Result<Url, Error> {
        self.api_url(&format!("s/{site}/{path}"))
    }

    /// Absolute URL of a root-level path such as the login endpoint.
    pub(crate) fn root_url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    pub(crate) async fn fetch<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, Error> {
        debug!(%url, "GET");
        let resp = self.http.get(url).send().await?;
        envelope::unwrap(resp).await
    }
}

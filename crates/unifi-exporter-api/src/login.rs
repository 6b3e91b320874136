// Cookie session handling and platform detection.
//
// A successful login leaves the session cookie in the client's jar, and
// every later request carries it. The controller never tells us how long
// the cookie lives; callers find out when a stat call comes back 401 or
// `api.err.LoginRequired`.

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::client::ControllerClient;
use crate::error::Error;
use crate::platform::ControllerPlatform;
use crate::transport::TransportConfig;

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

impl ControllerClient {
    /// `POST` the credentials to the platform's login path.
    ///
    /// Any non-2xx answer is an [`Error::Authentication`] carrying the
    /// start of the controller's reply.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), Error> {
        let url = self.root_url(self.platform().login_path())?;
        debug!(%url, username, "logging in");

        let resp = self
            .http()
            .post(url)
            .json(&Credentials {
                username,
                password: password.expose_secret(),
            })
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            debug!("login accepted");
            return Ok(());
        }

        let reply: String = resp
            .text()
            .await
            .unwrap_or_default()
            .chars()
            .take(200)
            .collect();
        Err(Error::Authentication {
            message: format!("login rejected (HTTP {status}): {reply}"),
        })
    }

    /// Best-effort session teardown. The reply status is not checked.
    pub async fn logout(&self) -> Result<(), Error> {
        let url = self.root_url(self.platform().logout_path())?;
        debug!(%url, "logging out");
        self.http().post(url).send().await?;
        Ok(())
    }

    /// Work out which platform serves `base_url`.
    ///
    /// Only UniFi OS knows `/api/auth/login`; anything other than a 404
    /// there means a console. Otherwise the classic login path must at
    /// least answer, or the controller is unreachable and the transport
    /// error is returned.
    pub async fn detect_platform(
        base_url: &Url,
        transport: &TransportConfig,
    ) -> Result<ControllerPlatform, Error> {
        let http = transport.build_client()?;

        let console_login = base_url.join(ControllerPlatform::UnifiOs.login_path())?;
        match http.get(console_login).send().await {
            Ok(resp) if resp.status() != StatusCode::NOT_FOUND => {
                debug!(status = %resp.status(), "controller is a UniFi OS console");
                return Ok(ControllerPlatform::UnifiOs);
            }
            Ok(_) => {}
            Err(e) => debug!(error = %e, "UniFi OS login path unreachable"),
        }

        let classic_login = base_url.join(ControllerPlatform::ClassicController.login_path())?;
        let resp = http.get(classic_login).send().await?;
        debug!(status = %resp.status(), "controller is a classic Network Application");
        Ok(ControllerPlatform::ClassicController)
    }
}

// ── Authenticated session provider ──
//
// Owns the one logged-in `ControllerClient` the exporter talks through.
// Logs in lazily on first use and again after a caller reports the
// session as rejected. Every acquirer goes through a single mutex that
// is held across the login, so concurrent scrapes queue behind an
// in-flight login instead of starting their own.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use unifi_exporter_api::{ControllerClient, ControllerPlatform};

use crate::config::{ControllerConfig, PlatformChoice};
use crate::error::CoreError;

// ── SessionHandle ────────────────────────────────────────────────

/// A borrowed view of the current session, valid for one scrape.
///
/// Cloning is cheap. The generation identifies which login produced the
/// client so that a failure can be reported against the right session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    client: Arc<ControllerClient>,
    generation: u64,
}

impl SessionHandle {
    pub fn client(&self) -> &ControllerClient {
        &self.client
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

// ── SessionProvider ──────────────────────────────────────────────

#[derive(Debug, Default)]
struct SessionState {
    current: Option<SessionHandle>,
    platform: Option<ControllerPlatform>,
    generation: u64,
}

/// Produces ready-to-use API clients, logging in as needed.
#[derive(Debug)]
pub struct SessionProvider {
    config: ControllerConfig,
    state: Mutex<SessionState>,
    logins: AtomicU64,
}

impl SessionProvider {
    /// Create a provider. Nothing is sent until the first
    /// [`acquire()`](Self::acquire) logs in.
    pub fn new(config: ControllerConfig) -> Self {
        let platform = match config.platform {
            PlatformChoice::Fixed(p) => Some(p),
            PlatformChoice::Auto => None,
        };
        Self {
            config,
            state: Mutex::new(SessionState {
                platform,
                ..SessionState::default()
            }),
            logins: AtomicU64::new(0),
        }
    }

    /// Return the current session, logging in first if there is none.
    ///
    /// Repeated calls hand out the same logical session until it is
    /// [`invalidate`](Self::invalidate)d.
    pub async fn acquire(&self) -> Result<SessionHandle, CoreError> {
        let mut state = self.state.lock().await;

        if let Some(ref handle) = state.current {
            return Ok(handle.clone());
        }

        let platform = match state.platform {
            Some(p) => p,
            None => {
                let detected =
                    ControllerClient::detect_platform(&self.config.url, &self.config.transport())
                        .await?;
                debug!(?detected, "detected controller platform");
                state.platform = Some(detected);
                detected
            }
        };

        // Fresh client, fresh cookie jar: nothing from a rejected session
        // leaks into the new one.
        let client = ControllerClient::new(self.config.url.clone(), platform, &self.config.transport())?;
        self.logins.fetch_add(1, Ordering::Relaxed);
        client
            .login(&self.config.username, &self.config.password)
            .await?;

        state.generation += 1;
        let handle = SessionHandle {
            client: Arc::new(client),
            generation: state.generation,
        };
        state.current = Some(handle.clone());

        info!(
            url = %self.config.url,
            generation = handle.generation,
            "authenticated to controller"
        );
        Ok(handle)
    }

    /// Report that `handle` was rejected by the controller.
    ///
    /// Drops the session only if it is still the one `handle` came from;
    /// a session already replaced by another caller is left alone.
    pub async fn invalidate(&self, handle: &SessionHandle) {
        let mut state = self.state.lock().await;
        let is_current = state
            .current
            .as_ref()
            .is_some_and(|cur| cur.generation == handle.generation);
        if is_current {
            debug!(generation = handle.generation, "invalidating session");
            state.current = None;
        }
    }

    /// End the current session, if any. Failures are logged, not returned.
    pub async fn logout(&self) {
        let current = self.state.lock().await.current.take();
        if let Some(handle) = current {
            if let Err(e) = handle.client.logout().await {
                warn!(error = %e, "logout failed (non-fatal)");
            }
        }
    }

    /// Login attempts made so far, successful or not.
    pub fn login_count(&self) -> u64 {
        self.logins.load(Ordering::Relaxed)
    }
}

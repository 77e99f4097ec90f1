//! Client layer for the Clash/Mihomo REST control API.
//!
//! The interaction engine only ever sees the [`ClashApi`] trait; whether
//! calls go over HTTP or to the in-memory mock is decided once, in
//! [`connect`].

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::model::Snapshot;

mod error;
mod http;
mod mock;

pub use self::error::ClashError;
pub use self::http::HttpApi;
pub use self::mock::MockApi;

/// Default external controller address of a local daemon.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:9090";

/// Default latency probe target, same as the daemon's own dashboard.
pub const DEFAULT_PROBE_URL: &str = "http://www.gstatic.com/generate_204";

pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 5_000;

pub(crate) const PROXIES_PATH: &str = "/proxies";

/// Parameters for a latency probe.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DelayProbe {
    pub url: String,
    pub timeout_ms: u64,
}

impl Default for DelayProbe {
    fn default() -> Self {
        Self {
            url: DEFAULT_PROBE_URL.to_string(),
            timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
        }
    }
}

/// Capability surface the rest of the program depends on. Implemented
/// by [`HttpApi`] for a real daemon and [`MockApi`] for offline runs
/// and tests.
pub trait ClashApi: Send + Sync {
    /// Fetch the full proxy table and derive the switchable groups.
    fn fetch_snapshot(&self) -> Result<Snapshot, ClashError>;

    /// Make `member` the active member of `group`.
    fn select(&self, group: &str, member: &str) -> Result<(), ClashError>;

    /// Measure the latency of one member through the daemon's probe
    /// endpoint, in milliseconds.
    fn measure_delay(
        &self,
        group: &str,
        member: &str,
        probe: &DelayProbe,
    ) -> Result<u64, ClashError>;
}

/// Build the client for `base_url`, honoring `MOCK_CLASH=1`.
///
/// `secret` may be empty, in which case no Authorization header is
/// sent.
pub fn connect(base_url: &str, secret: &str) -> Result<Arc<dyn ClashApi>> {
    if mock_mode() {
        info!("mock mode enabled, not contacting a daemon");
        return Ok(Arc::new(MockApi::new()));
    }
    info!(base_url, "using daemon");
    Ok(Arc::new(HttpApi::new(base_url, secret)?))
}

fn mock_mode() -> bool {
    std::env::var("MOCK_CLASH").is_ok_and(|v| v == "1")
}

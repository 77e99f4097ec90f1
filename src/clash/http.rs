use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{Proxy, Snapshot};

use super::{ClashApi, ClashError, DelayProbe, PROXIES_PATH};

/// Upper bound on control-plane calls; the daemon is local, so
/// anything slower than this is effectively down.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Extra time granted on top of the probe timeout so the daemon can
/// report its own timeout instead of us cutting the connection.
const PROBE_HEADROOM_MS: u64 = 1_000;

/// Blocking client for the Clash/Mihomo REST API.
pub struct HttpApi {
    base_url: String,
    secret: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct ProxiesResponse {
    #[serde(default)]
    proxies: HashMap<String, Proxy>,
}

#[derive(Debug, Serialize)]
struct SelectRequest<'a> {
    name: &'a str,
}

/// The daemon expects `timeout` as a string of milliseconds, not a
/// number.
#[derive(Debug, Serialize)]
struct DelayRequest<'a> {
    url: &'a str,
    timeout: String,
}

#[derive(Debug, Deserialize)]
struct DelayResponse {
    #[serde(default)]
    delay: u64,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>, secret: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("switchman/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("build http client")?;
        Ok(Self {
            base_url: base_url.into(),
            secret: secret.into(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        if self.secret.is_empty() {
            req
        } else {
            req.header(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", self.secret),
            )
        }
    }

    fn ensure_success(resp: Response) -> Result<Response, ClashError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().unwrap_or_default();
        Err(ClashError::BadStatus {
            code: status.as_u16(),
            body,
        })
    }

    fn decode<T: for<'de> Deserialize<'de>>(resp: Response) -> Result<T, ClashError> {
        let body = resp.text().map_err(ClashError::Unreachable)?;
        serde_json::from_str(&body).map_err(ClashError::Malformed)
    }
}

impl ClashApi for HttpApi {
    fn fetch_snapshot(&self) -> Result<Snapshot, ClashError> {
        debug!("fetching proxy table");
        let resp = self
            .authed(self.client.get(self.url(PROXIES_PATH)))
            .send()
            .map_err(ClashError::Unreachable)?;
        let resp = Self::ensure_success(resp)?;
        let decoded: ProxiesResponse = Self::decode(resp)?;
        Ok(Snapshot::from_proxies(decoded.proxies))
    }

    fn select(&self, group: &str, member: &str) -> Result<(), ClashError> {
        debug!(group, member, "switching active member");
        let resp = self
            .authed(self.client.put(self.url(&format!("{PROXIES_PATH}/{group}"))))
            .json(&SelectRequest { name: member })
            .send()
            .map_err(ClashError::Unreachable)?;
        let status = resp.status();
        if status != StatusCode::NO_CONTENT && status != StatusCode::OK {
            let body = resp.text().unwrap_or_default();
            return Err(ClashError::BadStatus {
                code: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    fn measure_delay(
        &self,
        group: &str,
        member: &str,
        probe: &DelayProbe,
    ) -> Result<u64, ClashError> {
        debug!(group, member, url = %probe.url, "probing delay");
        let resp = self
            .authed(
                self.client
                    .get(self.url(&format!("{PROXIES_PATH}/{group}/delay"))),
            )
            .json(&DelayRequest {
                url: &probe.url,
                timeout: probe.timeout_ms.to_string(),
            })
            .timeout(Duration::from_millis(probe.timeout_ms + PROBE_HEADROOM_MS))
            .send()
            .map_err(ClashError::Unreachable)?;
        let resp = Self::ensure_success(resp)?;
        let decoded: DelayResponse = Self::decode(resp)?;
        Ok(decoded.delay)
    }
}

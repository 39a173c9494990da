use anyhow::Context;
use reqwest::StatusCode;
use reqwest::Url;
use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;
use stepguard_domain::ports::{CallContext, OracleError, ResourceOracle, StackOracle};
use stepguard_types::Mapping;
use tracing::debug;

/// JSON state endpoint.
///
/// - `GET {base}/resources/{type}/{identifier}`: 200 with a JSON object of properties, 404 when absent
/// - `GET {base}/stacks/{name}`: 200 when the stack exists, 404 when absent
///
/// Every call is bounded by the per-call timeout and the context deadline, whichever is
/// shorter.
#[derive(Clone, Debug)]
pub struct HttpOracle {
    base: Url,
    client: Client,
    timeout: Duration,
}

impl HttpOracle {
    pub fn new(base: &str, timeout: Duration) -> anyhow::Result<Self> {
        let base = Url::parse(base).with_context(|| format!("invalid endpoint URL: {base}"))?;
        if base.cannot_be_a_base() {
            anyhow::bail!("endpoint URL cannot be a base: {base}");
        }
        let client = Client::builder()
            .user_agent(concat!("stepguard/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build HTTP client")?;
        Ok(Self {
            base,
            client,
            timeout,
        })
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// `Ok(None)` on 404.
    fn get(&self, url: Url, ctx: &CallContext) -> Result<Option<Value>, OracleError> {
        if ctx.cancel.is_canceled() {
            return Err(OracleError::Canceled);
        }
        let timeout = ctx.bounded(self.timeout);
        if timeout.is_zero() {
            return Err(OracleError::Timeout(Duration::ZERO));
        }

        debug!(url = %url, timeout_ms = millis(timeout), "GET");
        let response = self
            .client
            .get(url.clone())
            .timeout(timeout)
            .send()
            .map_err(|err| {
                if err.is_timeout() {
                    OracleError::Timeout(timeout)
                } else {
                    OracleError::Network(err.to_string())
                }
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            StatusCode::UNAUTHORIZED => Err(OracleError::Authentication(format!(
                "HTTP 401 from {url}"
            ))),
            StatusCode::FORBIDDEN => Err(OracleError::PermissionDenied(format!(
                "HTTP 403 from {url}"
            ))),
            status if status.is_success() => {
                let body = response.text().map_err(|err| {
                    if err.is_timeout() {
                        OracleError::Timeout(timeout)
                    } else {
                        OracleError::Network(err.to_string())
                    }
                })?;
                if body.trim().is_empty() {
                    return Ok(Some(Value::Null));
                }
                serde_json::from_str(&body)
                    .map(Some)
                    .map_err(|err| OracleError::Upstream(format!("invalid JSON from {url}: {err}")))
            }
            status => Err(OracleError::Upstream(format!("HTTP {} from {url}", status.as_u16()))),
        }
    }
}

/// Saturates instead of truncating.
fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

impl ResourceOracle for HttpOracle {
    fn check_exists(
        &self,
        resource_type: &str,
        identifier: &str,
        ctx: &CallContext,
    ) -> Result<Option<Mapping>, OracleError> {
        let url = self.url(&["resources", resource_type, identifier]);
        match self.get(url.clone(), ctx)? {
            None => Ok(None),
            Some(Value::Object(props)) => Ok(Some(props)),
            Some(_) => Err(OracleError::Upstream(format!(
                "expected a JSON object of properties from {url}"
            ))),
        }
    }
}

impl StackOracle for HttpOracle {
    fn stack_exists(&self, name: &str, ctx: &CallContext) -> Result<bool, OracleError> {
        let url = self.url(&["stacks", name]);
        Ok(self.get(url, ctx)?.is_some())
    }
}

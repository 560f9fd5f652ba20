use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::domain::error::DomainError;
use crate::domain::ports::RandomUserSource;

/// HTTP adapter implementing [`RandomUserSource`] against a randomuser.me
/// compatible endpoint.
pub struct HttpRandomUserClient {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpRandomUserClient {
    pub fn new(base_url: Url, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("userdesk/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, base_url })
    }

    fn url_for(&self, count: u32) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("results", &count.to_string());
        url
    }
}

#[async_trait]
impl RandomUserSource for HttpRandomUserClient {
    #[instrument(
        name = "users_info.http.randomuser.fetch",
        skip_all,
        fields(base_url = %self.base_url, count)
    )]
    async fn fetch(&self, count: u32) -> Result<Vec<Value>, DomainError> {
        let response = self
            .client
            .get(self.url_for(count))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "random user service unreachable");
                DomainError::gateway("random user service is unreachable")
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            warn!(error = %e, "random user service response was cut short");
            DomainError::gateway("random user service response was cut short")
        })?;

        if !status.is_success() {
            let err = classify_failure(status.as_u16(), &body);
            warn!(status = status.as_u16(), error = %err, "random user service failed");
            return Err(err);
        }

        let records = parse_results(&body)?;
        debug!(received = records.len(), "fetched random users");
        Ok(records)
    }
}

/// Turn a non-2xx upstream response into an [`DomainError::Upstream`].
///
/// The message is taken from the body's `error`, then `details[0].message`,
/// then `message`, and defaults to `HTTP <status>`.
pub fn classify_failure(status: u16, body: &[u8]) -> DomainError {
    let parsed: Option<Value> = serde_json::from_slice(body).ok();
    let message = parsed
        .as_ref()
        .and_then(|v| {
            v.get("error")
                .and_then(Value::as_str)
                .or_else(|| {
                    v.get("details")
                        .and_then(|d| d.get(0))
                        .and_then(|d| d.get("message"))
                        .and_then(Value::as_str)
                })
                .or_else(|| v.get("message").and_then(Value::as_str))
        })
        .map(str::to_owned)
        .unwrap_or_else(|| format!("HTTP {status}"));

    DomainError::upstream(status, message)
}

/// Extract the `results` array of a successful response.
pub fn parse_results(body: &[u8]) -> Result<Vec<Value>, DomainError> {
    let mut parsed: Value = serde_json::from_slice(body)
        .map_err(|e| DomainError::gateway(format!("random user service sent invalid JSON: {e}")))?;

    match parsed.get_mut("results").map(Value::take) {
        Some(Value::Array(records)) => Ok(records),
        _ => Err(DomainError::gateway(
            "random user service response has no results",
        )),
    }
}

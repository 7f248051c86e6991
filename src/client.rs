//! Client for a remote scan service.
//!
//! Each method maps to one route of the service and decodes its envelope.
//! Transport failures surface as [`Error::Connect`] or [`Error::Timeout`];
//! error envelopes are rebuilt into local errors so not-found stays not-found.

use std::path::Path;

use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use crate::api::{
    ApiCatalog, Deleted, Envelope, ErrorBody, Health, ResultList, ScanCreated, ScanRequest,
    Statistics,
};
use crate::config::RemoteConfig;
use crate::error::{Error, Result};
use crate::store::{Record, RecordDigest};

pub struct RemoteClient {
    base_url: String,
    client: reqwest::Client,
}

impl RemoteClient {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Remote(format!("cannot build http client: {e}")))?;

        Ok(RemoteClient {
            base_url: config.base_url(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Route url with each segment percent-encoded, so ids containing `/`,
    /// `?` or `#` stay inside their own path segment.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let invalid = || Error::Remote(format!("invalid server url: {}", self.base_url));

        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|()| invalid())?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub async fn health(&self) -> Result<Health> {
        let response = self.send(self.client.get(self.url(&["api", "health"])?)).await?;
        decode(response).await
    }

    pub async fn scan(&self, name: &str, scan_type: &str) -> Result<ScanCreated> {
        let request = ScanRequest {
            test_name: Some(name.to_string()),
            scan_type: Some(scan_type.to_string()),
        };
        info!(url = %self.base_url, %name, %scan_type, "requesting remote scan");

        let response = self
            .send(self.client.post(self.url(&["api", "scan"])?).json(&request))
            .await?;
        decode::<Envelope<ScanCreated>>(response).await?.into_result()
    }

    /// The record route answers with the bare record, or an error envelope.
    pub async fn get_result(&self, id: &str) -> Result<Record> {
        let response = self
            .send(self.client.get(self.url(&["api", "scan", id])?))
            .await?;
        let value: Value = decode(response).await?;

        if value.get("status").and_then(Value::as_str) == Some("error") {
            let body: ErrorBody = serde_json::from_value(value)
                .map_err(|e| Error::Remote(format!("unexpected error body: {e}")))?;
            return Err(body.into_error());
        }

        serde_json::from_value(value).map_err(|e| Error::Remote(format!("unexpected record: {e}")))
    }

    pub async fn summary(&self, id: &str) -> Result<RecordDigest> {
        let response = self
            .send(self.client.get(self.url(&["api", "results", "summary", id])?))
            .await?;
        decode::<Envelope<RecordDigest>>(response).await?.into_result()
    }

    pub async fn list(&self, limit: Option<usize>) -> Result<ResultList> {
        let mut request = self.client.get(self.url(&["api", "results"])?);
        if let Some(limit) = limit {
            request = request.query(&[("limit", limit)]);
        }
        let response = self.send(request).await?;
        decode::<Envelope<ResultList>>(response).await?.into_result()
    }

    pub async fn delete(&self, id: &str) -> Result<Deleted> {
        let response = self
            .send(self.client.delete(self.url(&["api", "results", id])?))
            .await?;
        decode::<Envelope<Deleted>>(response).await?.into_result()
    }

    pub async fn statistics(&self) -> Result<Statistics> {
        let response = self.send(self.client.get(self.url(&["api", "statistics"])?)).await?;
        decode::<Envelope<Statistics>>(response).await?.into_result()
    }

    pub async fn apis(&self) -> Result<ApiCatalog> {
        let response = self.send(self.client.get(self.url(&["api", "apis"])?)).await?;
        decode::<Envelope<ApiCatalog>>(response).await?.into_result()
    }

    /// Download a record and write it to `output` as pretty JSON.
    pub async fn save_result_locally(&self, id: &str, output: &Path) -> Result<Record> {
        let record = self.get_result(id).await?;
        let bytes = serde_json::to_vec_pretty(&record)?;
        tokio::fs::write(output, bytes)
            .await
            .map_err(|e| Error::io("writing", output, e))?;

        info!(id = %record.id, path = %output.display(), "saved remote result");
        Ok(record)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        request.send().await.map_err(|e| {
            if e.is_connect() {
                Error::Connect {
                    url: self.base_url.clone(),
                }
            } else {
                Error::from(e)
            }
        })
    }
}

// error envelopes come back with 4xx/5xx, so the body is decoded whatever the
// status; only non-json bodies fall back to the status line
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let text = response.text().await?;
    debug!(%status, bytes = text.len(), "remote response");

    serde_json::from_str(&text).map_err(|e| {
        if status == StatusCode::OK {
            Error::Remote(format!("invalid response body: {e}"))
        } else {
            Error::Remote(format!("server returned {status}"))
        }
    })
}

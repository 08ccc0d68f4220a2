//! Whole-document access to dashboards.
//!
//! The dashboard API offers no partial update and no conditional write: the
//! only way to change a filter is to read `json_metadata`, edit it, and PUT
//! the full text back.

use crate::config::ApiConfig;
use crate::errors::RemoteError;
use crate::types::DashboardId;
use async_trait::async_trait;
use http::StatusCode;
use reqwest::header::{ACCEPT, REFERER};
use reqwest::{Method, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[async_trait]
pub trait DocumentClient: Send + Sync {
    /// Returns the dashboard's `json_metadata`, `None` when the field is unset.
    async fn get_metadata(&self, dashboard_id: DashboardId) -> Result<Option<String>, RemoteError>;

    /// Replaces the dashboard's `json_metadata` with `metadata`.
    async fn put_metadata(&self, dashboard_id: DashboardId, metadata: &str) -> Result<(), RemoteError>;
}

#[derive(Deserialize)]
struct DashboardResult {
    json_metadata: Option<String>,
}

#[derive(Deserialize)]
struct DashboardResponse {
    result: DashboardResult,
}

#[derive(Serialize)]
struct DashboardUpdate<'a> {
    json_metadata: &'a str,
}

/// [`DocumentClient`] backed by the dashboard REST API.
#[derive(Clone)]
pub struct HttpDocumentClient {
    client: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
}

impl HttpDocumentClient {
    pub fn new(config: &ApiConfig) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(HttpDocumentClient {
            client,
            base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
        })
    }

    fn dashboard_url(&self, dashboard_id: DashboardId) -> Result<Url, RemoteError> {
        let url = format!("{}/api/v1/dashboard/{dashboard_id}", self.base_url);
        Url::parse(&url).map_err(|e| RemoteError::InvalidUrl(e.to_string()))
    }

    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        let referer = url.to_string();
        let builder = self
            .client
            .request(method, url)
            .header(ACCEPT, "application/json")
            .header(REFERER, referer);

        match &self.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, RemoteError> {
        let response = request.send().await?;

        if response.status() != StatusCode::OK {
            let status = response.status();
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    tracing::debug!(%status, error = %e, "Could not read error response body");
                    String::new()
                }
            };
            return Err(RemoteError::Status { status, body });
        }

        Ok(response)
    }
}

#[async_trait]
impl DocumentClient for HttpDocumentClient {
    async fn get_metadata(&self, dashboard_id: DashboardId) -> Result<Option<String>, RemoteError> {
        let url = self.dashboard_url(dashboard_id)?;
        tracing::debug!(method = "GET", url = %url, ">> request");

        let response = self.send(self.request(Method::GET, url)).await?;
        let dashboard = response.json::<DashboardResponse>().await?;

        Ok(dashboard.result.json_metadata)
    }

    async fn put_metadata(&self, dashboard_id: DashboardId, metadata: &str) -> Result<(), RemoteError> {
        let url = self.dashboard_url(dashboard_id)?;
        let body = DashboardUpdate {
            json_metadata: metadata,
        };
        tracing::debug!(method = "PUT", url = %url, body = metadata, ">> request");

        self.send(self.request(Method::PUT, url).json(&body)).await?;
        Ok(())
    }
}

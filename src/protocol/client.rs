use crate::protocol::messages::{
    DistinctCondition, HistoryEntry, SavePayload, Settings, StatusResponse,
};
use crate::settings::{Endpoints, SaveMode};
use async_trait::async_trait;
use derive_builder::Builder;
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum BlindsClientError {
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),
    #[error("Request failed: {0}")]
    RequestError(String),
    #[error("Endpoint {endpoint} answered with status {status}")]
    StatusError { endpoint: String, status: u16 },
    #[error("Unable to decode response: {0}")]
    DecodeError(String),
}

#[derive(Builder, Debug, Clone)]
pub struct BlindsOptions {
    #[builder(setter(into))]
    pub base_url: String,
    #[builder(default)]
    pub endpoints: Endpoints,
    #[builder(default)]
    pub save_mode: SaveMode,
    #[builder(default = "Duration::from_secs(30)")]
    pub timeout: Duration,
}

impl BlindsOptions {
    pub fn builder() -> BlindsOptionsBuilder {
        BlindsOptionsBuilder::default()
    }
}

/// Everything the admin panel asks of the blinds backend.
#[async_trait]
pub trait BlindsApi: Send + Sync {
    async fn get_settings(&self) -> Result<Settings, BlindsClientError>;
    async fn save_settings(&self, payload: &SavePayload) -> Result<(), BlindsClientError>;
    async fn get_condition_history(&self) -> Result<Vec<HistoryEntry>, BlindsClientError>;
    async fn get_distinct_conditions(&self) -> Result<Vec<DistinctCondition>, BlindsClientError>;
    async fn start_ticktock(&self) -> Result<StatusResponse, BlindsClientError>;
    async fn stop_ticktock(&self) -> Result<StatusResponse, BlindsClientError>;
    async fn ticktock_status(&self) -> Result<StatusResponse, BlindsClientError>;
    async fn sync_override(&self, enabled: bool) -> Result<StatusResponse, BlindsClientError>;
    /// Seconds elapsed since the newest condition sample.
    async fn time_since_last_check(&self) -> Result<f64, BlindsClientError>;
}

#[async_trait]
impl<T> BlindsApi for Arc<T>
where
    T: BlindsApi + ?Sized,
{
    async fn get_settings(&self) -> Result<Settings, BlindsClientError> {
        self.as_ref().get_settings().await
    }

    async fn save_settings(&self, payload: &SavePayload) -> Result<(), BlindsClientError> {
        self.as_ref().save_settings(payload).await
    }

    async fn get_condition_history(&self) -> Result<Vec<HistoryEntry>, BlindsClientError> {
        self.as_ref().get_condition_history().await
    }

    async fn get_distinct_conditions(&self) -> Result<Vec<DistinctCondition>, BlindsClientError> {
        self.as_ref().get_distinct_conditions().await
    }

    async fn start_ticktock(&self) -> Result<StatusResponse, BlindsClientError> {
        self.as_ref().start_ticktock().await
    }

    async fn stop_ticktock(&self) -> Result<StatusResponse, BlindsClientError> {
        self.as_ref().stop_ticktock().await
    }

    async fn ticktock_status(&self) -> Result<StatusResponse, BlindsClientError> {
        self.as_ref().ticktock_status().await
    }

    async fn sync_override(&self, enabled: bool) -> Result<StatusResponse, BlindsClientError> {
        self.as_ref().sync_override(enabled).await
    }

    async fn time_since_last_check(&self) -> Result<f64, BlindsClientError> {
        self.as_ref().time_since_last_check().await
    }
}

#[derive(Debug, Clone)]
struct EndpointUrls {
    settings: Url,
    save: Url,
    history: Url,
    conditions: Url,
    ticktock_start: Url,
    ticktock_stop: Url,
    ticktock_status: Url,
    override_sync: Url,
    last_check: Url,
}

impl EndpointUrls {
    fn resolve(base_url: &str, endpoints: &Endpoints) -> Result<Self, BlindsClientError> {
        let base = Url::parse(base_url)
            .map_err(|e| BlindsClientError::InvalidUrl(format!("{base_url}: {e}")))?;
        let join = |path: &str| {
            base.join(path)
                .map_err(|e| BlindsClientError::InvalidUrl(format!("{path}: {e}")))
        };
        Ok(EndpointUrls {
            settings: join(&endpoints.settings)?,
            save: join(&endpoints.save)?,
            history: join(&endpoints.history)?,
            conditions: join(&endpoints.conditions)?,
            ticktock_start: join(&endpoints.ticktock_start)?,
            ticktock_stop: join(&endpoints.ticktock_stop)?,
            ticktock_status: join(&endpoints.ticktock_status)?,
            override_sync: join(&endpoints.override_sync)?,
            last_check: join(&endpoints.last_check)?,
        })
    }
}

/// [`BlindsApi`] over HTTP. A 200 status is the only success signal.
#[derive(Debug, Clone)]
pub struct HttpBlindsClient {
    client: reqwest::Client,
    urls: EndpointUrls,
    save_mode: SaveMode,
}

impl HttpBlindsClient {
    pub fn new(options: BlindsOptions) -> Result<Self, BlindsClientError> {
        let urls = EndpointUrls::resolve(&options.base_url, &options.endpoints)?;
        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|e| BlindsClientError::RequestError(e.to_string()))?;
        debug!("Blinds backend settings endpoint: {}", urls.settings);
        Ok(HttpBlindsClient {
            client,
            urls,
            save_mode: options.save_mode,
        })
    }

    async fn send(&self, request: RequestBuilder, url: &Url) -> Result<String, BlindsClientError> {
        let response = request.send().await.map_err(|e| {
            warn!("Request to {} failed: {}", url, e);
            BlindsClientError::RequestError(e.to_string())
        })?;
        let status = response.status();
        if status != StatusCode::OK {
            warn!("{} answered with status {}", url, status);
            return Err(BlindsClientError::StatusError {
                endpoint: url.path().to_string(),
                status: status.as_u16(),
            });
        }
        response
            .text()
            .await
            .map_err(|e| BlindsClientError::RequestError(e.to_string()))
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &Url,
    ) -> Result<T, BlindsClientError> {
        let contents = self.send(request, url).await?;
        serde_json::from_str(&contents).map_err(|e| {
            BlindsClientError::DecodeError(format!("{e}. Body was: \"{contents}\""))
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, BlindsClientError> {
        self.fetch_json(self.client.get(url.clone()), url).await
    }
}

#[async_trait]
impl BlindsApi for HttpBlindsClient {
    async fn get_settings(&self) -> Result<Settings, BlindsClientError> {
        self.get_json(&self.urls.settings).await
    }

    async fn save_settings(&self, payload: &SavePayload) -> Result<(), BlindsClientError> {
        let url = &self.urls.save;
        let request = match self.save_mode {
            SaveMode::JsonPost => self.client.post(url.clone()).json(payload),
            SaveMode::QueryGet => self.client.get(url.clone()).query(&payload.query_pairs()),
        };
        let body = self.send(request, url).await?;
        debug!("Save acknowledged: {}", body);
        Ok(())
    }

    async fn get_condition_history(&self) -> Result<Vec<HistoryEntry>, BlindsClientError> {
        self.get_json(&self.urls.history).await
    }

    async fn get_distinct_conditions(&self) -> Result<Vec<DistinctCondition>, BlindsClientError> {
        self.get_json(&self.urls.conditions).await
    }

    async fn start_ticktock(&self) -> Result<StatusResponse, BlindsClientError> {
        self.get_json(&self.urls.ticktock_start).await
    }

    async fn stop_ticktock(&self) -> Result<StatusResponse, BlindsClientError> {
        self.get_json(&self.urls.ticktock_stop).await
    }

    async fn ticktock_status(&self) -> Result<StatusResponse, BlindsClientError> {
        self.get_json(&self.urls.ticktock_status).await
    }

    async fn sync_override(&self, enabled: bool) -> Result<StatusResponse, BlindsClientError> {
        let url = &self.urls.override_sync;
        let state = if enabled { "1" } else { "0" };
        let request = self.client.get(url.clone()).query(&[("state", state)]);
        self.fetch_json(request, url).await
    }

    async fn time_since_last_check(&self) -> Result<f64, BlindsClientError> {
        self.get_json(&self.urls.last_check).await
    }
}

use crate::protocol::client::{BlindsClientError, BlindsOptions};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// How the save endpoint expects the settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SaveMode {
    /// JSON body with every setting and the condition buckets.
    #[default]
    JsonPost,
    /// Editable settings in the query string of a GET, for older backends.
    QueryGet,
}

/// Paths of the backend endpoints, resolved against the base URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub settings: String,
    pub save: String,
    pub history: String,
    pub conditions: String,
    pub ticktock_start: String,
    pub ticktock_stop: String,
    pub ticktock_status: String,
    pub override_sync: String,
    pub last_check: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Endpoints {
            settings: String::from("/getSettingVals"),
            save: String::from("/saveSettingVals"),
            history: String::from("/getConditionHistory"),
            conditions: String::from("/getDistinctConditions"),
            ticktock_start: String::from("/startTicktock"),
            ticktock_stop: String::from("/stopTicktock"),
            ticktock_status: String::from("/statusTicktock"),
            override_sync: String::from("/override_sync"),
            last_check: String::from("/getTimeSinceLastCheck"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelSettings {
    pub base_url: String,
    pub endpoints: Endpoints,
    pub save_mode: SaveMode,
    pub request_timeout_secs: u64,
    /// Reject a save while another one is still in flight.
    pub guard_concurrent_saves: bool,
}

impl Default for PanelSettings {
    fn default() -> Self {
        PanelSettings {
            base_url: String::from("http://127.0.0.1:5000"),
            endpoints: Endpoints::default(),
            save_mode: SaveMode::JsonPost,
            request_timeout_secs: 30,
            guard_concurrent_saves: false,
        }
    }
}

impl PanelSettings {
    /// Reads the settings file at `path`; an unreadable file falls back to the defaults.
    pub fn load(path: Option<&str>) -> Result<Self, serde_json::Error> {
        let Some(path) = path else {
            return Ok(PanelSettings::default());
        };
        match std::fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents),
            Err(e) => {
                warn!("Failed to read settings file {path}: {e}, using default settings");
                Ok(PanelSettings::default())
            }
        }
    }

    pub fn client_options(&self) -> Result<BlindsOptions, BlindsClientError> {
        BlindsOptions::builder()
            .base_url(self.base_url.clone())
            .endpoints(self.endpoints.clone())
            .save_mode(self.save_mode)
            .timeout(Duration::from_secs(self.request_timeout_secs))
            .build()
            .map_err(|e| BlindsClientError::InvalidUrl(e.to_string()))
    }
}

use anyhow::Result;
use blinds_admin::settings::PanelSettings;
use blinds_admin::{HttpBlindsClient, SettingsPanel};
use tracing::debug;

use crate::Params;

pub fn create_panel(params: &Params) -> Result<SettingsPanel<HttpBlindsClient>> {
    let mut settings = PanelSettings::load(params.config.as_deref())?;
    if let Some(base_url) = &params.base_url {
        settings.base_url = base_url.clone();
    }
    debug!("Using blinds backend at {}", settings.base_url);
    let client = HttpBlindsClient::new(settings.client_options()?)?;
    Ok(SettingsPanel::new(client).with_save_guard(settings.guard_concurrent_saves))
}

/// Parses `name=value`.
pub fn parse_assignment(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("Expected NAME=VALUE, got '{s}'")),
    }
}

pub fn parse_switch(s: &str) -> Result<bool, String> {
    match s.to_lowercase().as_str() {
        "on" | "1" | "true" => Ok(true),
        "off" | "0" | "false" => Ok(false),
        _ => Err(format!("Expected on or off, got '{s}'")),
    }
}

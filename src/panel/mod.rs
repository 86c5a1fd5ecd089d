pub mod form;

use crate::protocol::client::{BlindsApi, BlindsClientError};
use crate::protocol::manager::{RequestKind, RequestTracker};
use crate::protocol::messages::{SettingField, StatusResponse};
use form::{SAVED_NOTICE, SettingsForm};
use parking_lot::RwLock;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum PanelError {
    #[error(transparent)]
    Client(#[from] BlindsClientError),
    #[error("Backend rejected the request: {0}")]
    Rejected(String),
    #[error("A save is already in flight")]
    SaveInFlight,
    #[error("Unknown setting '{0}'")]
    UnknownField(String),
    #[error("Unknown condition '{0}'")]
    UnknownCondition(String),
}

/// Controller tying the admin form to the blinds backend.
///
/// Every operation takes `&self`, so a panel can be shared between tasks.
/// The form lock is never held across a request.
pub struct SettingsPanel<A: BlindsApi> {
    api: A,
    form: RwLock<SettingsForm>,
    requests: RequestTracker,
    guard_concurrent_saves: bool,
}

impl<A: BlindsApi> SettingsPanel<A> {
    pub fn new(api: A) -> Self {
        SettingsPanel {
            api,
            form: RwLock::new(SettingsForm::new()),
            requests: RequestTracker::new(),
            guard_concurrent_saves: false,
        }
    }

    /// Refuse a save while another one is in flight.
    pub fn with_save_guard(mut self, enabled: bool) -> Self {
        self.guard_concurrent_saves = enabled;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn requests(&self) -> &RequestTracker {
        &self.requests
    }

    /// Snapshot of the form.
    pub fn form(&self) -> SettingsForm {
        self.form.read().clone()
    }

    /// Page-load sequence: settings, history, conditions, then ticktock status.
    pub async fn on_load(&self) -> Result<(), PanelError> {
        self.load_settings().await?;
        self.load_history().await?;
        self.load_conditions().await?;
        self.load_ticktock_status().await?;
        Ok(())
    }

    pub async fn load_settings(&self) -> Result<(), PanelError> {
        let _ticket = self.requests.begin(RequestKind::LoadSettings);
        let settings = self.api.get_settings().await?;
        self.form.write().populate(&settings);
        debug!("Settings loaded");
        Ok(())
    }

    /// Appends the backend's history to the table. Returns the number of new rows.
    pub async fn load_history(&self) -> Result<usize, PanelError> {
        let _ticket = self.requests.begin(RequestKind::LoadHistory);
        let entries = self.api.get_condition_history().await?;
        let count = entries.len();
        self.form.write().append_history(entries);
        debug!("Appended {count} history rows");
        Ok(count)
    }

    pub async fn load_conditions(&self) -> Result<(), PanelError> {
        let _ticket = self.requests.begin(RequestKind::LoadConditions);
        let conditions = self.api.get_distinct_conditions().await?;
        self.form.write().set_conditions(conditions);
        Ok(())
    }

    pub fn select_condition(&self, name: &str) -> Result<(), PanelError> {
        if self.form.write().select_condition(name) {
            Ok(())
        } else {
            Err(PanelError::UnknownCondition(name.to_string()))
        }
    }

    pub fn clear_selection(&self) {
        self.form.write().clear_selection();
    }

    pub fn move_to_open(&self) -> usize {
        self.form.write().move_to_open()
    }

    pub fn move_to_close(&self) -> usize {
        self.form.write().move_to_close()
    }

    pub fn set_field(&self, field: SettingField, text: impl Into<String>) {
        self.form.write().set_field(field, text);
    }

    /// Sets an input addressed by its wire name, e.g. `startAzm`.
    pub fn set_field_by_name(&self, name: &str, text: impl Into<String>) -> Result<(), PanelError> {
        let field = name
            .parse::<SettingField>()
            .map_err(|_| PanelError::UnknownField(name.to_string()))?;
        self.set_field(field, text);
        Ok(())
    }

    pub fn set_command_override(&self, checked: bool) {
        self.form.write().set_command_override(checked);
    }

    /// Sends the whole form. The acknowledgment is only recorded on success.
    pub async fn save_settings(&self) -> Result<(), PanelError> {
        let _ticket = if self.guard_concurrent_saves {
            self.requests
                .try_begin_exclusive(RequestKind::SaveSettings)
                .ok_or(PanelError::SaveInFlight)?
        } else {
            self.requests.begin(RequestKind::SaveSettings)
        };

        let payload = {
            let mut form = self.form.write();
            form.set_notice(None);
            form.save_payload()
        };

        match self.api.save_settings(&payload).await {
            Ok(()) => {
                info!(
                    "Settings saved ({} conditions)",
                    payload.distinct_conditions.len()
                );
                self.form.write().set_notice(Some(SAVED_NOTICE.to_string()));
                Ok(())
            }
            Err(e) => {
                warn!("Failed to save settings: {}", e);
                Err(e.into())
            }
        }
    }

    pub async fn start_ticktock(&self) -> Result<String, PanelError> {
        let response = {
            let _ticket = self.requests.begin(RequestKind::Ticktock);
            self.api.start_ticktock().await?
        };
        Self::expect_success(response)?;
        info!("Ticktock started");
        self.load_ticktock_status().await
    }

    pub async fn stop_ticktock(&self) -> Result<String, PanelError> {
        let response = {
            let _ticket = self.requests.begin(RequestKind::Ticktock);
            self.api.stop_ticktock().await?
        };
        Self::expect_success(response)?;
        info!("Ticktock stopped");
        self.load_ticktock_status().await
    }

    /// Refreshes the ticktock status display and returns it.
    pub async fn load_ticktock_status(&self) -> Result<String, PanelError> {
        let _ticket = self.requests.begin(RequestKind::Ticktock);
        let response = self.api.ticktock_status().await?;
        self.form.write().set_ticktock_status(response.status.clone());
        Ok(response.status)
    }

    /// Pushes the override switch to the backend and mirrors it in the checkbox.
    pub async fn sync_override(&self, enabled: bool) -> Result<(), PanelError> {
        let response = {
            let _ticket = self.requests.begin(RequestKind::OverrideSync);
            self.api.sync_override(enabled).await?
        };
        Self::expect_success(response)?;
        self.form.write().set_command_override(enabled);
        Ok(())
    }

    pub async fn time_since_last_check(&self) -> Result<f64, PanelError> {
        let _ticket = self.requests.begin(RequestKind::LastCheck);
        Ok(self.api.time_since_last_check().await?)
    }

    fn expect_success(response: StatusResponse) -> Result<(), PanelError> {
        if response.is_success() {
            Ok(())
        } else {
            warn!("Backend answered '{}'", response.status);
            Err(PanelError::Rejected(response.status))
        }
    }
}

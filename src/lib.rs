pub mod logging;
mod panel;
mod protocol;
pub mod settings;

pub use panel::form::{HistoryRow, SAVED_NOTICE, SelectList, SelectOption, SettingsForm};
pub use panel::{PanelError, SettingsPanel};
pub use protocol::client::*;
pub use protocol::manager::{RequestKind, RequestTicket, RequestTracker};
pub use protocol::messages::*;

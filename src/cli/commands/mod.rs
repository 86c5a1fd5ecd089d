mod conditions;
mod settings;
mod show;
mod ticktock;

pub use conditions::{classify, conditions};
pub use settings::{print_defaults, set};
pub use show::{history, show};
pub use ticktock::{last_check, start_ticktock, stop_ticktock, sync_override, ticktock_status};

mod commands;
mod utils;

use anyhow::Result;
use blinds_admin::logging::{LogTarget, RotationPeriod};
use clap::{ArgAction, Parser};
use clap_derive::Subcommand;

use crate::utils::{create_panel, parse_assignment, parse_switch};

#[derive(Subcommand, Debug, Clone)]
enum TicktockCommand {
    /// Start the backend polling loop
    Start,
    /// Stop the backend polling loop
    Stop,
    /// Show whether the polling loop is running
    Status,
}

#[derive(Subcommand, Debug, Default, Clone)]
enum Commands {
    /// Load everything the admin page shows
    #[default]
    Show,
    /// Show the recent condition history
    History,
    /// Show which conditions open and which close the blinds
    Conditions,
    /// Edit settings, e.g. `set startAzm=90 endAzm=270`
    Set {
        #[arg(value_parser = parse_assignment)]
        assignments: Vec<(String, String)>,
        /// Turn the command override on or off
        #[arg(long = "override", value_parser = parse_switch)]
        command_override: Option<bool>,
    },
    /// Move conditions between the open and close groups
    Classify {
        /// Condition that should keep the blinds open
        #[arg(long)]
        open: Vec<String>,
        /// Condition that should close the blinds
        #[arg(long)]
        close: Vec<String>,
    },
    Ticktock {
        #[command(subcommand)]
        command: TicktockCommand,
    },
    /// Sync the command override switch without saving other settings
    Override {
        #[arg(value_parser = parse_switch, action = ArgAction::Set)]
        state: bool,
    },
    /// Seconds since the backend recorded the last condition
    LastCheck,
    /// Print the settings a fresh backend starts with
    Defaults,
}

#[derive(Parser, Debug)]
#[command(version, about = "Admin client for the solar blinds controller")]
pub struct Params {
    /// Base URL of the blinds backend (overrides the settings file)
    #[clap(long, env = "BLINDS_ADMIN_URL")]
    base_url: Option<String>,
    /// Settings file path (if not set, default endpoints are used)
    #[clap(long)]
    config: Option<String>,
    /// Directory for rolling log files (if not set, logs go to stderr)
    #[clap(long)]
    log_dir: Option<String>,
    /// Log rotation period: hourly, daily or never
    #[clap(long, value_enum, default_value = "daily")]
    log_rotation: RotationPeriod,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let params = Params::parse();

    let _log_guard =
        LogTarget::from_args(params.log_dir.as_deref(), params.log_rotation).install()?;

    let command = params.command.clone().unwrap_or_default();
    if let Commands::Defaults = command {
        commands::print_defaults();
        return Ok(());
    }

    let panel = create_panel(&params)?;
    match command {
        Commands::Show => commands::show(&panel).await?,
        Commands::History => commands::history(&panel).await?,
        Commands::Conditions => commands::conditions(&panel).await?,
        Commands::Set {
            assignments,
            command_override,
        } => commands::set(&panel, &assignments, command_override).await?,
        Commands::Classify { open, close } => commands::classify(&panel, &open, &close).await?,
        Commands::Ticktock { command } => match command {
            TicktockCommand::Start => commands::start_ticktock(&panel).await?,
            TicktockCommand::Stop => commands::stop_ticktock(&panel).await?,
            TicktockCommand::Status => commands::ticktock_status(&panel).await?,
        },
        Commands::Override { state } => commands::sync_override(&panel, state).await?,
        Commands::LastCheck => commands::last_check(&panel).await?,
        Commands::Defaults => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_default_to_show() {
        let params = Params::try_parse_from(["blinds-admin"]).unwrap();
        assert!(params.command.is_none());
        assert_eq!(params.log_rotation, RotationPeriod::Daily);
        assert!(matches!(params.command.unwrap_or_default(), Commands::Show));
    }

    #[test]
    fn test_params_parse_set_and_override() {
        let params = Params::try_parse_from([
            "blinds-admin",
            "--log-rotation",
            "hourly",
            "set",
            "startAzm=90",
            "endAzm=270",
            "--override",
            "off",
        ])
        .unwrap();
        assert_eq!(params.log_rotation, RotationPeriod::Hourly);
        match params.command {
            Some(Commands::Set {
                assignments,
                command_override,
            }) => {
                assert_eq!(
                    assignments,
                    vec![
                        ("startAzm".to_string(), "90".to_string()),
                        ("endAzm".to_string(), "270".to_string()),
                    ]
                );
                assert_eq!(command_override, Some(false));
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let params = Params::try_parse_from(["blinds-admin", "override", "on"]).unwrap();
        assert!(matches!(params.command, Some(Commands::Override { state: true })));
        assert!(Params::try_parse_from(["blinds-admin", "override", "maybe"]).is_err());
    }
}

use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::cmd::Commands;

/// Location-triggered reminder form.
/// Settings default to ~/.geotask/config.json or a path passed via --config.
#[derive(Parser)]
#[command(name = "geotask", version, about = "Create location-triggered reminders")]
pub struct Cli {
    /// Path to the JSON configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Report this "latitude, longitude" as the current position.
    #[arg(long, global = true, env = "GEOTASK_POSITION")]
    pub position: Option<String>,

    /// Locator command that prints "latitude, longitude". Repeat the flag
    /// once per argument; GEOTASK_LOCATE_CMD is split on whitespace instead.
    #[arg(long, global = true, action = ArgAction::Append, allow_hyphen_values = true, value_name = "ARG")]
    pub locate_cmd: Vec<String>,

    /// Reject coordinates outside latitude [-90, 90] and longitude [-180, 180].
    #[arg(long, global = true)]
    pub strict_coords: bool,

    /// Append logs to this file.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

//! # geotask - location-triggered reminders
//!
//! A terminal form for creating reminders that would fire when you arrive at,
//! or leave, a place.
//!
//! ## Key Features
//!
//! - **Typed or detected coordinates**: enter `latitude, longitude` or pull
//!   the current position from a configured locator
//! - **Geofence settings**: trigger radius (10-1000 m) and Entry / Exit / Both
//! - **Metadata**: type, priority, optional time, repeat rule and notes
//!
//! ## Quick Start
//!
//! ```bash
//! # Open the form
//! geotask
//!
//! # Create a reminder without the form
//! geotask add "Buy milk" --location "51.5074, -0.1278" --type errands
//!
//! # Use the current position from a locator program
//! geotask --locate-cmd whereami --locate-cmd --csv add "Water plants" --here
//! ```
//!
//! Nothing is stored: a created reminder is logged (and printed as JSON by
//! `add`) and then discarded.
//!
//! Settings are read from `~/.geotask/config.json`. The form logs to
//! `~/.geotask/geotask.log` unless `--log-file` says otherwise.

use clap::Parser;

pub mod cli;
pub mod cmd;
pub mod config;
pub mod controller;
pub mod fields;
pub mod geolocation;
pub mod logging;
pub mod parse;
pub mod task;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod run;
    pub mod task_form;
    pub mod utils;
}

use cli::Cli;
use cmd::*;
use config::Config;
use logging::{init_logging, LogTarget};

fn main() {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading config, using defaults: {e}");
            Config::default()
        }
    };

    // Flags override the file.
    if let Some(position) = cli.position.clone() {
        config.geolocation.position = Some(position);
    }
    let locate_env = std::env::var("GEOTASK_LOCATE_CMD").ok();
    config.override_command(&cli.locate_cmd, locate_env.as_deref());
    if cli.strict_coords {
        config.strict_coordinates = true;
    }
    if cli.log_file.is_some() {
        config.log_file = cli.log_file.clone();
    }

    let command = cli.command.unwrap_or(Commands::Ui);

    let log_path = config.log_path(matches!(command, Commands::Ui));
    let target = match &log_path {
        Some(path) => LogTarget::File(path.as_path()),
        None => LogTarget::Stderr,
    };
    if let Err(e) = init_logging(target) {
        eprintln!("Failed to open log file: {e}");
        std::process::exit(1);
    }

    let geolocator = match config.geolocator() {
        Ok(g) => g,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    let ctx = Context { geolocator, bounds: config.bounds() };

    match command {
        Commands::Ui => cmd_ui(&ctx),
        Commands::Add(args) => cmd_add(&ctx, args),
        Commands::Locate => cmd_locate(&ctx),
        Commands::Completions { shell } => cmd_completions(shell),
    }
}

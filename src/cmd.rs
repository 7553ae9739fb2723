//! Command implementations for the CLI interface.
//!
//! `ui` opens the full-screen form, `add` drives the same form controller
//! from flags, `locate` resolves the current position once.

use std::io;
use std::sync::Arc;

use clap::{Args, Subcommand};
use clap_complete::{generate, Shell};
use tracing::debug;

use crate::controller::{JsonSink, TaskFormController, SUCCESS_MESSAGE};
use crate::fields::*;
use crate::geolocation::{request_position, Geolocator, PositionOptions, UNSUPPORTED_MESSAGE};
use crate::parse::{format_coordinates, parse_date_input, parse_time_input, parse_weekdays, CoordinateBounds};
use crate::task::{DEFAULT_RADIUS, MAX_RADIUS, MIN_RADIUS};
use crate::tui::run::run_tui;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive reminder form (default).
    Ui,

    /// Create a reminder from command line flags.
    Add(AddArgs),

    /// Print the current position.
    Locate,

    /// Generate shell completion scripts.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Default)]
pub struct AddArgs {
    /// Task name.
    pub name: String,
    /// Task type.
    #[arg(long = "type", value_enum)]
    pub task_type: Option<TaskType>,
    /// Coordinates as "latitude, longitude".
    #[arg(long, allow_hyphen_values = true, conflicts_with = "here")]
    pub location: Option<String>,
    /// Use the current position.
    #[arg(long)]
    pub here: bool,
    /// Trigger radius in meters.
    #[arg(long, default_value_t = DEFAULT_RADIUS,
          value_parser = clap::value_parser!(u32).range(MIN_RADIUS as i64..=MAX_RADIUS as i64))]
    pub radius: u32,
    /// Notification trigger.
    #[arg(long, value_enum)]
    pub trigger: Option<NotificationTrigger>,
    /// Priority.
    #[arg(long, value_enum)]
    pub priority: Option<Priority>,
    /// Free-text notes.
    #[arg(long)]
    pub notes: Option<String>,
    /// Time: YYYY-MM-DD HH:MM or YYYY-MM-DDTHH:MM.
    #[arg(long)]
    pub time: Option<String>,
    /// Repeat rule.
    #[arg(long, value_enum)]
    pub repeat: Option<RepeatKind>,
    /// Comma-separated weekdays for the repeat rule, Sunday = 0.
    #[arg(long)]
    pub repeat_days: Option<String>,
    /// Interval in days for a custom repeat rule.
    #[arg(long)]
    pub custom_days: Option<u32>,
    /// Last date of the repeat rule: YYYY-MM-DD.
    #[arg(long)]
    pub repeat_until: Option<String>,
}

/// Resolved runtime settings shared by the commands.
#[derive(Clone)]
pub struct Context {
    pub geolocator: Option<Arc<dyn Geolocator>>,
    pub bounds: CoordinateBounds,
}

impl Context {
    fn controller(&self) -> TaskFormController {
        TaskFormController::new(self.geolocator.clone(), self.bounds)
    }
}

/// Launch the terminal user interface.
pub fn cmd_ui(ctx: &Context) {
    if let Err(e) = run_tui(ctx.controller()) {
        eprintln!("UI error: {e}");
        std::process::exit(1);
    }
}

/// Create a reminder from flags and print it as JSON.
pub fn cmd_add(ctx: &Context, args: AddArgs) {
    let mut form = ctx.controller();
    if let Err(msg) = fill_form(&mut form, args) {
        eprintln!("{msg}");
        std::process::exit(1);
    }

    let stdout = io::stdout();
    match form.submit(&mut JsonSink::new(stdout.lock())) {
        Ok(_) => eprintln!("{SUCCESS_MESSAGE}"),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

/// Apply `add` flags to the form through its setters.
pub fn fill_form(form: &mut TaskFormController, args: AddArgs) -> Result<(), String> {
    form.set_name(&args.name);
    if let Some(t) = args.task_type {
        form.set_task_type(t);
    }
    form.set_radius(args.radius);
    if let Some(t) = args.trigger {
        form.set_notification_trigger(t);
    }
    if let Some(p) = args.priority {
        form.set_priority(p);
    }
    if let Some(notes) = &args.notes {
        form.set_notes(notes);
    }
    if let Some(time) = &args.time {
        match parse_time_input(time) {
            Some(t) => form.set_time(Some(t)),
            None => return Err(format!("Invalid time '{}': expected YYYY-MM-DD HH:MM", time)),
        }
    }

    if let Some(kind) = args.repeat {
        form.set_repeat_kind(kind);
    }
    if let Some(days) = &args.repeat_days {
        form.set_repeat_days(parse_weekdays(days)?);
    }
    if args.custom_days.is_some() {
        form.set_repeat_custom_days(args.custom_days);
    }
    if let Some(until) = &args.repeat_until {
        match parse_date_input(until) {
            Some(d) => form.set_repeat_end_date(Some(d)),
            None => return Err(format!("Invalid repeat end date '{}': expected YYYY-MM-DD", until)),
        }
    }

    if let Some(text) = &args.location {
        form.set_location_text(text);
    } else if args.here {
        let pending = form.request_current_location();
        if let Some(pending) = pending {
            form.apply_position(pending.wait());
        }
        if let Some(err) = form.location_error() {
            return Err(err.to_string());
        }
    }
    debug!(draft = ?form.draft(), "form filled from flags");
    Ok(())
}

/// Print the current position.
pub fn cmd_locate(ctx: &Context) {
    let Some(geolocator) = ctx.geolocator.clone() else {
        eprintln!("{UNSUPPORTED_MESSAGE}");
        std::process::exit(1);
    };
    match request_position(geolocator, PositionOptions::default()).wait() {
        Ok(p) => println!("{}", format_coordinates(p.latitude, p.longitude)),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    use crate::cli::Cli;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::TaskSink;
    use crate::geolocation::FixedGeolocator;
    use crate::task::{Location, Task};

    struct Discard;

    impl TaskSink for Discard {
        fn emit(&mut self, _task: &Task) -> io::Result<()> {
            Ok(())
        }
    }

    fn args(name: &str) -> AddArgs {
        AddArgs { name: name.to_string(), radius: DEFAULT_RADIUS, ..AddArgs::default() }
    }

    #[test]
    fn add_flags_flow_into_task() {
        let mut form = TaskFormController::new(None, CoordinateBounds::Permissive);
        let a = AddArgs {
            location: Some("51.5074, -0.1278".to_string()),
            task_type: Some(TaskType::Fitness),
            priority: Some(Priority::High),
            time: Some("2025-03-01 07:15".to_string()),
            repeat: Some(RepeatKind::Weekly),
            repeat_days: Some("1,3,5".to_string()),
            repeat_until: Some("2025-06-30".to_string()),
            ..args("Morning run")
        };
        fill_form(&mut form, a).unwrap();

        let task = form.submit(&mut Discard).unwrap();
        assert_eq!(task.location, Location::new(51.5074, -0.1278));
        assert_eq!(task.task_type, TaskType::Fitness);
        assert_eq!(task.priority, Priority::High);
        assert!(task.time.is_some());
        let repeat = task.repeat.unwrap();
        assert_eq!(repeat.kind, RepeatKind::Weekly);
        assert_eq!(repeat.days, vec![1, 3, 5]);
        assert_eq!(repeat.end_date, parse_date_input("2025-06-30"));
    }

    #[test]
    fn here_uses_geolocator() {
        let geo: Arc<dyn Geolocator> = Arc::new(FixedGeolocator::new(10.0, 20.0));
        let mut form = TaskFormController::new(Some(geo), CoordinateBounds::Permissive);
        fill_form(&mut form, AddArgs { here: true, ..args("Check in") }).unwrap();
        assert_eq!(form.location_text(), "10.000000, 20.000000");
    }

    #[test]
    fn here_without_geolocator_fails() {
        let mut form = TaskFormController::new(None, CoordinateBounds::Permissive);
        let err = fill_form(&mut form, AddArgs { here: true, ..args("Check in") }).unwrap_err();
        assert_eq!(err, UNSUPPORTED_MESSAGE);
    }

    #[test]
    fn bad_time_is_rejected() {
        let mut form = TaskFormController::new(None, CoordinateBounds::Permissive);
        let err = fill_form(&mut form, AddArgs { time: Some("noon".to_string()), ..args("Lunch") }).unwrap_err();
        assert!(err.contains("Invalid time"));
    }

    #[test]
    fn cli_parses_add_command() {
        use clap::Parser;
        use crate::cli::Cli;

        let cli = Cli::try_parse_from([
            "geotask", "add", "Buy milk", "--location", "-33.86, 151.2", "--type", "errands", "--radius", "250",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Add(a)) => {
                assert_eq!(a.name, "Buy milk");
                assert_eq!(a.location.as_deref(), Some("-33.86, 151.2"));
                assert_eq!(a.task_type, Some(TaskType::Errands));
                assert_eq!(a.radius, 250);
            }
            _ => panic!("expected add command"),
        }

        assert!(Cli::try_parse_from(["geotask", "add", "x", "--radius", "5"]).is_err());
        assert!(Cli::try_parse_from(["geotask", "add", "x", "--here", "--location", "1, 2"]).is_err());
    }

    #[test]
    fn cli_collects_locate_cmd_arguments_verbatim() {
        use clap::Parser;
        use crate::cli::Cli;

        let cli = Cli::try_parse_from([
            "geotask", "--locate-cmd", "whereami", "--locate-cmd", "--label", "--locate-cmd", "my office", "locate",
        ])
        .unwrap();
        assert_eq!(cli.locate_cmd, ["whereami", "--label", "my office"]);
        assert!(matches!(cli.command, Some(Commands::Locate)));

        let cli = Cli::try_parse_from(["geotask", "locate"]).unwrap();
        assert!(cli.locate_cmd.is_empty());
    }
}

//! The reminder form controller.
//!
//! `TaskFormController` owns the in-progress draft, the raw coordinate text
//! and the last geolocation error. Host surfaces (the terminal form and the
//! `add` command) only call its setters and render what it exposes.
//!
//! Invariant: the draft carries a location if and only if the coordinate text
//! most recently parsed, or a geolocation fix most recently arrived.

use std::io::{self, Write};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::fields::*;
use crate::geolocation::{
    request_position, GeolocationError, Geolocator, PendingPosition, Position, PositionOptions,
    UNSUPPORTED_MESSAGE,
};
use crate::parse::{format_coordinates, parse_coordinates, CoordinateBounds};
use crate::task::{Location, Repeat, Task, DEFAULT_RADIUS, MAX_RADIUS, MIN_RADIUS};

/// Confirmation shown after a reminder is created.
pub const SUCCESS_MESSAGE: &str = "Task created successfully!";

/// Why a submission was refused. `Display` is the alert text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("Please enter a task name")]
    MissingName,
    #[error("Please enter a valid location (latitude, longitude)")]
    MissingLocation,
}

/// Partially filled reminder being edited.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftState {
    pub name: Option<String>,
    pub task_type: Option<TaskType>,
    pub location: Option<Location>,
    pub radius: Option<u32>,
    pub notification_trigger: Option<NotificationTrigger>,
    pub priority: Option<Priority>,
    pub notes: Option<String>,
    pub time: Option<NaiveDateTime>,
    pub repeat: Option<Repeat>,
    /// Raw text of the coordinate field.
    pub location_text: String,
    /// Last geolocation failure message, empty when there is none.
    pub location_error: String,
}

impl Default for DraftState {
    fn default() -> Self {
        Self {
            name: None,
            task_type: Some(TaskType::Personal),
            location: None,
            radius: Some(DEFAULT_RADIUS),
            notification_trigger: Some(NotificationTrigger::Entry),
            priority: Some(Priority::Medium),
            notes: None,
            time: None,
            repeat: None,
            location_text: String::new(),
            location_error: String::new(),
        }
    }
}

/// Receives every reminder created by the form.
pub trait TaskSink {
    fn emit(&mut self, task: &Task) -> io::Result<()>;
}

/// Emits created reminders as structured log events.
#[derive(Debug, Default)]
pub struct LogSink;

impl TaskSink for LogSink {
    fn emit(&mut self, task: &Task) -> io::Result<()> {
        let json = serde_json::to_string(task)?;
        info!(target: "geotask::tasks", id = %task.id, task = %json, "Task created");
        Ok(())
    }
}

/// Writes each created reminder as pretty JSON, then logs it.
pub struct JsonSink<W: Write> {
    out: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> TaskSink for JsonSink<W> {
    fn emit(&mut self, task: &Task) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut self.out, task)?;
        writeln!(self.out)?;
        self.out.flush()?;
        LogSink.emit(task)
    }
}

/// State machine behind the reminder form.
pub struct TaskFormController {
    draft: DraftState,
    bounds: CoordinateBounds,
    geolocator: Option<Arc<dyn Geolocator>>,
}

impl TaskFormController {
    /// Create a controller with a default draft.
    pub fn new(geolocator: Option<Arc<dyn Geolocator>>, bounds: CoordinateBounds) -> Self {
        Self::with_draft(DraftState::default(), geolocator, bounds)
    }

    /// Create a controller around an existing draft.
    pub fn with_draft(
        draft: DraftState,
        geolocator: Option<Arc<dyn Geolocator>>,
        bounds: CoordinateBounds,
    ) -> Self {
        Self { draft, bounds, geolocator }
    }

    pub fn draft(&self) -> &DraftState {
        &self.draft
    }

    pub fn location(&self) -> Option<&Location> {
        self.draft.location.as_ref()
    }

    pub fn location_text(&self) -> &str {
        &self.draft.location_text
    }

    /// Last geolocation failure, if any.
    pub fn location_error(&self) -> Option<&str> {
        if self.draft.location_error.is_empty() {
            None
        } else {
            Some(&self.draft.location_error)
        }
    }

    pub fn has_geolocator(&self) -> bool {
        self.geolocator.is_some()
    }

    pub fn set_name(&mut self, name: &str) {
        self.draft.name = Some(name.to_string());
    }

    pub fn set_task_type(&mut self, task_type: TaskType) {
        self.draft.task_type = Some(task_type);
    }

    pub fn set_priority(&mut self, priority: Priority) {
        self.draft.priority = Some(priority);
    }

    pub fn set_notification_trigger(&mut self, trigger: NotificationTrigger) {
        self.draft.notification_trigger = Some(trigger);
    }

    /// Set the geofence radius, clamped into the accepted range.
    pub fn set_radius(&mut self, radius: u32) -> u32 {
        let radius = radius.clamp(MIN_RADIUS, MAX_RADIUS);
        self.draft.radius = Some(radius);
        radius
    }

    /// Set the notes. Blank notes are stored as absent.
    pub fn set_notes(&mut self, notes: &str) {
        self.draft.notes = if notes.trim().is_empty() { None } else { Some(notes.to_string()) };
    }

    pub fn set_time(&mut self, time: Option<NaiveDateTime>) {
        self.draft.time = time;
    }

    /// Choose a repeat kind, replacing any previous rule.
    pub fn set_repeat_kind(&mut self, kind: RepeatKind) {
        self.draft.repeat = Some(Repeat::new(kind));
    }

    pub fn set_repeat_days(&mut self, days: Vec<u8>) {
        self.repeat_mut().days = days;
    }

    pub fn set_repeat_custom_days(&mut self, custom_days: Option<u32>) {
        self.repeat_mut().custom_days = custom_days.filter(|d| *d > 0);
    }

    pub fn set_repeat_end_date(&mut self, end_date: Option<NaiveDate>) {
        self.repeat_mut().end_date = end_date;
    }

    fn repeat_mut(&mut self) -> &mut Repeat {
        self.draft.repeat.get_or_insert_with(Repeat::default)
    }

    /// Record new coordinate text and re-parse it.
    ///
    /// A successful parse sets the draft location and clears the geolocation
    /// error. Anything else removes the location so submission refuses it.
    pub fn set_location_text(&mut self, text: &str) {
        self.draft.location_text = text.to_string();
        match parse_coordinates(text, self.bounds) {
            Ok(location) => {
                debug!(latitude = location.latitude, longitude = location.longitude, "coordinates parsed");
                self.draft.location = Some(location);
                self.draft.location_error.clear();
            }
            Err(e) => {
                debug!(error = %e, "coordinate text rejected");
                self.draft.location = None;
            }
        }
    }

    /// Start a "use current location" request.
    ///
    /// Clears any previous error. Without a geolocation provider the
    /// unsupported message is set and `None` returned. Otherwise a one-shot,
    /// high accuracy request is started; feed its outcome to
    /// [`apply_position`](Self::apply_position).
    pub fn request_current_location(&mut self) -> Option<PendingPosition> {
        self.draft.location_error.clear();

        let Some(geolocator) = self.geolocator.clone() else {
            self.draft.location_error = UNSUPPORTED_MESSAGE.to_string();
            return None;
        };

        debug!("requesting current position");
        Some(request_position(geolocator, PositionOptions::default()))
    }

    /// Apply the outcome of a geolocation request.
    ///
    /// A fix outside the configured coordinate bounds is reported as an
    /// unavailable position and leaves the location untouched.
    pub fn apply_position(&mut self, result: Result<Position, GeolocationError>) {
        match result {
            Ok(position) if !self.bounds.contains(position.latitude, position.longitude) => {
                warn!(latitude = position.latitude, longitude = position.longitude, "position outside coordinate bounds");
                self.draft.location_error = GeolocationError::PositionUnavailable.to_string();
            }
            Ok(position) => {
                self.draft.location = Some(Location::new(position.latitude, position.longitude));
                self.draft.location_text = format_coordinates(position.latitude, position.longitude);
            }
            Err(e) => {
                self.draft.location_error = e.to_string();
            }
        }
    }

    /// Validate the draft, build the reminder and hand it to `sink`.
    ///
    /// On failure the draft is left untouched. On success the draft is reset
    /// to its defaults, coordinate text included.
    pub fn submit(&mut self, sink: &mut dyn TaskSink) -> Result<Task, SubmitError> {
        let name = match self.draft.name.as_deref() {
            Some(n) if !n.trim().is_empty() => n.to_string(),
            _ => return Err(SubmitError::MissingName),
        };
        let Some(location) = self.draft.location.clone() else {
            return Err(SubmitError::MissingLocation);
        };

        let task = Task {
            id: Uuid::new_v4(),
            name,
            task_type: self.draft.task_type.unwrap_or_default(),
            location,
            radius: self.draft.radius.filter(|r| *r > 0).unwrap_or(DEFAULT_RADIUS),
            notification_trigger: self.draft.notification_trigger.unwrap_or_default(),
            priority: self.draft.priority.unwrap_or_default(),
            notes: self.draft.notes.clone(),
            time: self.draft.time,
            repeat: self.draft.repeat.clone(),
        };

        if let Err(e) = sink.emit(&task) {
            warn!(id = %task.id, error = %e, "failed to emit created task");
        }

        self.reset();
        Ok(task)
    }

    /// Restore the initial draft.
    pub fn reset(&mut self) {
        self.draft = DraftState::default();
    }
}

//! Device geolocation providers.
//!
//! A one-shot position request goes through the `Geolocator` trait. The form
//! never blocks on it: `request_position` runs the provider on a worker thread
//! and hands back a `PendingPosition` that the event loop polls. Dropping the
//! pending handle abandons the request; its result is then discarded.

use std::io;
use std::process::Stdio;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::parse::{parse_coordinates, CoordinateBounds};

/// Shown when no geolocation provider is configured.
pub const UNSUPPORTED_MESSAGE: &str = "Geolocation is not supported on this device";

/// Exit status a locator program uses to report denied access (`EX_NOPERM`).
pub const EXIT_PERMISSION_DENIED: i32 = 77;

/// Options for a single position request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached fix that may be reused. Zero forces a fresh fix.
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_millis(5000),
            maximum_age: Duration::ZERO,
        }
    }
}

/// A fix returned by a provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

/// Categorised geolocation failure. `Display` is the message shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("Please allow location access to use this feature")]
    PermissionDenied,
    #[error("Location information is unavailable")]
    PositionUnavailable,
    #[error("Location request timed out")]
    Timeout,
    #[error("An unknown error occurred")]
    Unknown,
}

/// Source of the device position.
pub trait Geolocator: Send + Sync {
    /// Resolve the current position, blocking the calling thread.
    fn current_position(&self, options: &PositionOptions) -> Result<Position, GeolocationError>;
}

/// Always reports the same configured position.
#[derive(Debug, Clone)]
pub struct FixedGeolocator {
    position: Position,
}

impl FixedGeolocator {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { position: Position { latitude, longitude } }
    }
}

impl Geolocator for FixedGeolocator {
    fn current_position(&self, _options: &PositionOptions) -> Result<Position, GeolocationError> {
        Ok(self.position)
    }
}

/// Runs an external locator program that prints `latitude, longitude`.
///
/// The program sees `GEOTASK_HIGH_ACCURACY=1` when a high accuracy fix is
/// requested. Its output is drained while it runs and it is killed once the
/// request timeout elapses.
#[derive(Debug, Clone)]
pub struct CommandGeolocator {
    program: String,
    args: Vec<String>,
}

impl CommandGeolocator {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self { program: program.into(), args }
    }

    /// Build from a `[program, args..]` list. Returns `None` for an empty list.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.clone(), args.to_vec()))
    }

    async fn locate(&self, options: &PositionOptions) -> Result<Position, GeolocationError> {
        let spawned = Command::new(&self.program)
            .args(&self.args)
            .env("GEOTASK_HIGH_ACCURACY", if options.high_accuracy { "1" } else { "0" })
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn();

        let child = match spawned {
            Ok(child) => child,
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                return Err(GeolocationError::PermissionDenied)
            }
            Err(e) => {
                warn!(program = %self.program, error = %e, "failed to start locator");
                return Err(GeolocationError::Unknown);
            }
        };

        // Dropping the wait future on expiry kills the child.
        let output = match tokio::time::timeout(options.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                warn!(program = %self.program, error = %e, "failed to wait for locator");
                return Err(GeolocationError::Unknown);
            }
            Err(_) => return Err(GeolocationError::Timeout),
        };

        if output.status.code() == Some(EXIT_PERMISSION_DENIED) {
            return Err(GeolocationError::PermissionDenied);
        }
        if !output.status.success() {
            debug!(program = %self.program, status = %output.status, "locator reported failure");
            return Err(GeolocationError::PositionUnavailable);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let line = stdout.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("");
        parse_coordinates(line, CoordinateBounds::Permissive)
            .map(|loc| Position { latitude: loc.latitude, longitude: loc.longitude })
            .map_err(|e| {
                debug!(program = %self.program, error = %e, "unparseable locator output");
                GeolocationError::PositionUnavailable
            })
    }
}

impl Geolocator for CommandGeolocator {
    fn current_position(&self, options: &PositionOptions) -> Result<Position, GeolocationError> {
        let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
            Ok(runtime) => runtime,
            Err(e) => {
                warn!(error = %e, "failed to build locator runtime");
                return Err(GeolocationError::Unknown);
            }
        };
        runtime.block_on(self.locate(options))
    }
}

/// An in-flight position request.
pub struct PendingPosition {
    rx: Receiver<Result<Position, GeolocationError>>,
}

impl PendingPosition {
    /// Take the outcome if the request has finished.
    pub fn try_take(&self) -> Option<Result<Position, GeolocationError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            // Worker went away without answering (panicked provider).
            Err(TryRecvError::Disconnected) => Some(Err(GeolocationError::Unknown)),
        }
    }

    /// Block until the request finishes.
    pub fn wait(self) -> Result<Position, GeolocationError> {
        self.rx.recv().unwrap_or(Err(GeolocationError::Unknown))
    }
}

/// Start a one-shot position request on a worker thread.
pub fn request_position(geolocator: Arc<dyn Geolocator>, options: PositionOptions) -> PendingPosition {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let result = geolocator.current_position(&options);
        match &result {
            Ok(p) => info!(latitude = p.latitude, longitude = p.longitude, "position acquired"),
            Err(e) => info!(error = ?e, "position request failed"),
        }
        // The requester may have gone away; the result is then dropped.
        let _ = tx.send(result);
    });
    PendingPosition { rx }
}

//! Enumerations for TUI state management.

/// Application state for the terminal user interface.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum AppState {
    Form,
    /// Blocking message box, dismissed with Enter or Esc.
    Alert,
    Help,
}

/// Severity of an alert, used to colour the dialog.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum AlertKind {
    Info,
    Error,
}

/// Kind of widget behind a form field.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum FieldKind {
    Text,
    Selector,
    Slider,
    Button,
}

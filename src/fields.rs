//! Enumerations and field types for location reminders.
//!
//! This module defines the structured values a reminder is categorised by:
//! task type, priority, the geofence notification trigger and the repeat kind.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Category of a reminder.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Default)]
pub enum TaskType {
    Work,
    #[default]
    Personal,
    Errands,
    Fitness,
    Travel,
    Custom,
}

impl TaskType {
    pub const ALL: [TaskType; 6] = [
        TaskType::Work,
        TaskType::Personal,
        TaskType::Errands,
        TaskType::Fitness,
        TaskType::Travel,
        TaskType::Custom,
    ];
}

/// Priority classification for reminder importance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Default)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub const ALL: [Priority; 4] = [Priority::Low, Priority::Medium, Priority::High, Priority::Urgent];
}

/// Geofence crossing that fires the notification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Default)]
pub enum NotificationTrigger {
    #[default]
    Entry,
    Exit,
    Both,
}

impl NotificationTrigger {
    pub const ALL: [NotificationTrigger; 3] =
        [NotificationTrigger::Entry, NotificationTrigger::Exit, NotificationTrigger::Both];
}

/// How often a reminder repeats.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RepeatKind {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    Custom,
}

impl RepeatKind {
    pub const ALL: [RepeatKind; 5] = [
        RepeatKind::None,
        RepeatKind::Daily,
        RepeatKind::Weekly,
        RepeatKind::Monthly,
        RepeatKind::Custom,
    ];

    /// Label shown in the repeat selector.
    pub fn label(self) -> &'static str {
        match self {
            RepeatKind::None => "No Repeat",
            RepeatKind::Daily => "Daily",
            RepeatKind::Weekly => "Weekly",
            RepeatKind::Monthly => "Monthly",
            RepeatKind::Custom => "Custom",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for NotificationTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Step the index of a selector forwards or backwards, wrapping at both ends.
pub fn cycle_index(current: usize, len: usize, forward: bool) -> usize {
    if len == 0 {
        return 0;
    }
    if forward {
        (current + 1) % len
    } else if current == 0 {
        len - 1
    } else {
        current - 1
    }
}

/// Position of `value` in `options`, falling back to the first entry.
pub fn index_of<T: PartialEq>(options: &[T], value: &T) -> usize {
    options.iter().position(|o| o == value).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_new_reminder_defaults() {
        assert_eq!(TaskType::default(), TaskType::Personal);
        assert_eq!(Priority::default(), Priority::Medium);
        assert_eq!(NotificationTrigger::default(), NotificationTrigger::Entry);
        assert_eq!(RepeatKind::default(), RepeatKind::None);
    }

    #[test]
    fn cycle_index_wraps_both_ways() {
        assert_eq!(cycle_index(5, 6, true), 0);
        assert_eq!(cycle_index(0, 6, false), 5);
        assert_eq!(cycle_index(2, 6, true), 3);
        assert_eq!(cycle_index(0, 0, true), 0);
    }

    #[test]
    fn repeat_kind_serialises_lowercase() {
        let json = serde_json::to_string(&RepeatKind::Weekly).unwrap();
        assert_eq!(json, "\"weekly\"");
        assert_eq!(serde_json::to_string(&TaskType::Errands).unwrap(), "\"Errands\"");
    }
}

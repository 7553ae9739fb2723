//! Reminder data structures.
//!
//! A `Task` is the completed reminder built on submission. It is never mutated
//! afterwards; the form hands it to an output sink and discards it.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::fields::*;

/// Default geofence radius in meters.
pub const DEFAULT_RADIUS: u32 = 100;
/// Smallest accepted geofence radius in meters.
pub const MIN_RADIUS: u32 = 10;
/// Largest accepted geofence radius in meters.
pub const MAX_RADIUS: u32 = 1000;
/// Radius slider step in meters.
pub const RADIUS_STEP: u32 = 10;

/// Target coordinate of a reminder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude, address: None }
    }
}

/// Repeat rule attached to a reminder.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repeat {
    #[serde(rename = "type")]
    pub kind: RepeatKind,
    /// Weekday numbers, Sunday = 0.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub days: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl Repeat {
    pub fn new(kind: RepeatKind) -> Self {
        Self { kind, ..Self::default() }
    }
}

/// A location-triggered reminder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub location: Location,
    /// Geofence radius in meters.
    pub radius: u32,
    pub notification_trigger: NotificationTrigger,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<Repeat>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_serialises_with_camel_case_field_names() {
        let task = Task {
            id: Uuid::nil(),
            name: "Buy milk".to_string(),
            task_type: TaskType::Errands,
            location: Location::new(51.5074, -0.1278),
            radius: 150,
            notification_trigger: NotificationTrigger::Both,
            priority: Priority::High,
            notes: None,
            time: None,
            repeat: Some(Repeat { kind: RepeatKind::Custom, custom_days: Some(3), ..Repeat::default() }),
        };

        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["type"], "Errands");
        assert_eq!(value["notificationTrigger"], "Both");
        assert_eq!(value["repeat"]["type"], "custom");
        assert_eq!(value["repeat"]["customDays"], 3);
        assert!(value.get("notes").is_none());
        assert!(value["location"].get("address").is_none());
    }
}

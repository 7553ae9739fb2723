//! Parsing and formatting helpers for free-text form input.
//!
//! Coordinates are typed as `"latitude, longitude"`, times in the
//! `datetime-local` shape (`2024-05-01T09:30` or `2024-05-01 09:30`) and
//! repeat weekdays as a comma separated list of numbers.

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::task::Location;

/// Why a coordinate string was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinateError {
    #[error("expected two comma separated values, found {0}")]
    WrongTokenCount(usize),
    #[error("'{0}' is not a finite number")]
    NotANumber(String),
    #[error("coordinates ({latitude}, {longitude}) are outside the valid range")]
    OutOfRange { latitude: f64, longitude: f64 },
}

/// Whether parsed coordinates are checked against Earth's ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordinateBounds {
    /// Any pair of finite numbers is accepted.
    #[default]
    Permissive,
    /// Latitude must lie in [-90, 90] and longitude in [-180, 180].
    Earth,
}

impl CoordinateBounds {
    /// Whether a coordinate pair satisfies these bounds.
    pub fn contains(self, latitude: f64, longitude: f64) -> bool {
        match self {
            CoordinateBounds::Permissive => true,
            CoordinateBounds::Earth => (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude),
        }
    }
}

/// Parse `"latitude, longitude"` into a location.
///
/// The text is split on commas and each side trimmed; exactly two tokens are
/// required and both must parse to finite numbers.
pub fn parse_coordinates(input: &str, bounds: CoordinateBounds) -> Result<Location, CoordinateError> {
    let tokens: Vec<&str> = input.split(',').map(str::trim).collect();
    if tokens.len() != 2 {
        return Err(CoordinateError::WrongTokenCount(tokens.len()));
    }

    let latitude = parse_finite(tokens[0])?;
    let longitude = parse_finite(tokens[1])?;

    if !bounds.contains(latitude, longitude) {
        return Err(CoordinateError::OutOfRange { latitude, longitude });
    }

    Ok(Location::new(latitude, longitude))
}

fn parse_finite(token: &str) -> Result<f64, CoordinateError> {
    match token.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(CoordinateError::NotANumber(token.to_string())),
    }
}

/// Render a coordinate pair to six decimal places.
pub fn format_coordinates(latitude: f64, longitude: f64) -> String {
    format!("{:.6}, {:.6}", latitude, longitude)
}

/// Parse a reminder time. Empty or unrecognised input yields `None`.
pub fn parse_time_input(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    const FORMATS: [&str; 4] = ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date_input(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// Parse a comma separated list of weekday numbers (Sunday = 0).
///
/// Values are deduplicated and sorted. Anything outside 0-6 is rejected.
pub fn parse_weekdays(s: &str) -> Result<Vec<u8>, String> {
    let mut days = Vec::new();
    for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.parse::<u8>() {
            Ok(d) if d <= 6 => days.push(d),
            _ => return Err(format!("Invalid weekday '{}': expected 0 (Sunday) to 6 (Saturday)", part)),
        }
    }
    days.sort_unstable();
    days.dedup();
    Ok(days)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_pair() {
        let loc = parse_coordinates("51.5074, -0.1278", CoordinateBounds::Permissive).unwrap();
        assert_eq!(loc.latitude, 51.5074);
        assert_eq!(loc.longitude, -0.1278);
        assert_eq!(loc.address, None);
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        let loc = parse_coordinates("  -33.8688 ,151.2093  ", CoordinateBounds::Permissive).unwrap();
        assert_eq!((loc.latitude, loc.longitude), (-33.8688, 151.2093));
    }

    #[test]
    fn rejects_wrong_token_counts() {
        assert_eq!(
            parse_coordinates("", CoordinateBounds::Permissive),
            Err(CoordinateError::WrongTokenCount(1))
        );
        assert_eq!(
            parse_coordinates("1, 2, 3", CoordinateBounds::Permissive),
            Err(CoordinateError::WrongTokenCount(3))
        );
        assert!(parse_coordinates("51.5074", CoordinateBounds::Permissive).is_err());
    }

    #[test]
    fn rejects_non_numeric_and_non_finite_tokens() {
        assert!(matches!(
            parse_coordinates("not a coord", CoordinateBounds::Permissive),
            Err(CoordinateError::WrongTokenCount(1))
        ));
        assert_eq!(
            parse_coordinates("abc, 1", CoordinateBounds::Permissive),
            Err(CoordinateError::NotANumber("abc".to_string()))
        );
        assert!(parse_coordinates("1,", CoordinateBounds::Permissive).is_err());
        assert!(parse_coordinates("NaN, 1", CoordinateBounds::Permissive).is_err());
        assert!(parse_coordinates("inf, 1", CoordinateBounds::Permissive).is_err());
    }

    #[test]
    fn permissive_bounds_accept_out_of_range_values() {
        let loc = parse_coordinates("120, 400", CoordinateBounds::Permissive).unwrap();
        assert_eq!((loc.latitude, loc.longitude), (120.0, 400.0));
    }

    #[test]
    fn earth_bounds_reject_out_of_range_values() {
        assert!(matches!(
            parse_coordinates("120, 10", CoordinateBounds::Earth),
            Err(CoordinateError::OutOfRange { .. })
        ));
        assert!(matches!(
            parse_coordinates("10, -180.5", CoordinateBounds::Earth),
            Err(CoordinateError::OutOfRange { .. })
        ));
        assert!(parse_coordinates("-90, 180", CoordinateBounds::Earth).is_ok());
    }

    #[test]
    fn formats_to_six_decimals() {
        assert_eq!(format_coordinates(51.5074, -0.1278), "51.507400, -0.127800");
    }

    #[test]
    fn time_input_accepts_datetime_local_shapes() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(9, 30, 0).unwrap();
        assert_eq!(parse_time_input("2024-05-01T09:30"), Some(expected));
        assert_eq!(parse_time_input("2024-05-01 09:30"), Some(expected));
        assert_eq!(parse_time_input(" 2024-05-01 09:30:00 "), Some(expected));
        assert_eq!(parse_time_input(""), None);
        assert_eq!(parse_time_input("tomorrow"), None);
    }

    #[test]
    fn weekdays_are_sorted_and_deduplicated() {
        assert_eq!(parse_weekdays("5, 1,1,3"), Ok(vec![1, 3, 5]));
        assert_eq!(parse_weekdays(""), Ok(vec![]));
        assert!(parse_weekdays("7").is_err());
        assert!(parse_weekdays("mon").is_err());
    }
}

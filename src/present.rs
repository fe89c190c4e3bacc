//! Presentation layer: timestamp formatting and the render model the UI
//! consumes. Lookup logic hands over plain data; nothing here touches the
//! terminal.

use chrono::{DateTime, FixedOffset};
use chrono_tz::Tz;

use crate::api::schedule::FlightStatus;

/// Generic user-facing message for any lookup failure that is not the
/// user's own input
pub const MSG_LOOKUP_FAILED: &str = "An error occurred. Please try again.";

/// Formatted times ready for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightTimes {
    pub departure: String,
    pub arrival: String,
}

/// What the status box is currently showing
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LookupState {
    #[default]
    Idle,
    /// A lookup is in flight; show the throbber
    Loading,
    /// Two labeled blocks: Departure Time / Arrival Time
    Complete(FlightTimes),
    /// Single alert-styled message
    Failed(String),
}

/// Resolve the viewer's IANA time zone, falling back to UTC
pub fn local_zone() -> Tz {
    match iana_time_zone::get_timezone() {
        Ok(name) => name.parse().unwrap_or_else(|_| {
            tracing::warn!("Unrecognized system time zone {:?}, using UTC", name);
            Tz::UTC
        }),
        Err(e) => {
            tracing::warn!("Could not resolve system time zone: {}", e);
            Tz::UTC
        }
    }
}

/// Format a timestamp in the viewer's zone as `MM/DD/YYYY, hh:mm AM/PM TZ`.
///
/// English (US) conventions; the zone always comes from the environment,
/// never from the input's own offset.
pub fn format_timestamp(dt: DateTime<FixedOffset>, tz: Tz) -> String {
    dt.with_timezone(&tz).format("%m/%d/%Y, %I:%M %p %Z").to_string()
}

/// Format both legs of a lookup result for display
pub fn format_status(status: &FlightStatus, tz: Tz) -> FlightTimes {
    FlightTimes {
        departure: format_timestamp(status.departure, tz),
        arrival: format_timestamp(status.arrival, tz),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::New_York;

    fn fixed() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2024-03-01T14:30:00Z").unwrap()
    }

    #[test]
    fn test_format_in_fixed_zone() {
        // March 1st is before the 2024 DST switch, so New York is EST
        assert_eq!(format_timestamp(fixed(), New_York), "03/01/2024, 09:30 AM EST");
    }

    #[test]
    fn test_format_is_idempotent() {
        let first = format_timestamp(fixed(), New_York);
        let second = format_timestamp(fixed(), New_York);
        assert_eq!(first, second);
    }

    #[test]
    fn test_format_ignores_input_offset() {
        // Same instant expressed in two offsets formats identically
        let a = DateTime::parse_from_rfc3339("2024-03-01T14:30:00Z").unwrap();
        let b = DateTime::parse_from_rfc3339("2024-03-01T15:30:00+01:00").unwrap();
        assert_eq!(
            format_timestamp(a, New_York),
            format_timestamp(b, New_York)
        );
    }

    #[test]
    fn test_format_twelve_hour_clock() {
        let midnight = DateTime::parse_from_rfc3339("2024-06-15T00:00:00Z").unwrap();
        assert_eq!(
            format_timestamp(midnight, Tz::UTC),
            "06/15/2024, 12:00 AM UTC"
        );

        let noon = DateTime::parse_from_rfc3339("2024-06-15T12:00:00Z").unwrap();
        assert_eq!(format_timestamp(noon, Tz::UTC), "06/15/2024, 12:00 PM UTC");
    }

    #[test]
    fn test_format_status_both_legs() {
        let status = FlightStatus {
            departure: DateTime::parse_from_rfc3339("2024-03-01T09:25:00+00:00").unwrap(),
            arrival: DateTime::parse_from_rfc3339("2024-03-01T12:40:00-08:00").unwrap(),
        };
        let times = format_status(&status, Tz::UTC);
        assert_eq!(times.departure, "03/01/2024, 09:25 AM UTC");
        assert_eq!(times.arrival, "03/01/2024, 08:40 PM UTC");
    }
}

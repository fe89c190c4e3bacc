//! Flight schedule lookup: one GET against `/v2/schedule/flights`, then
//! extraction of the departure and arrival timings from the first record.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Deserialize;

use super::{ApiClient, ApiError};

/// User-visible message when a required field is empty
pub const MSG_FILL_ALL_FIELDS: &str = "Please fill in all fields.";
/// User-visible message when the date does not parse
pub const MSG_BAD_DATE: &str = "Date must be YYYY-MM-DD.";

/// The three fields a schedule lookup needs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlightQuery {
    /// Two-character IATA carrier code (from the airline selection)
    pub carrier_code: String,
    /// Flight number, digits only as far as the API cares
    pub flight_number: String,
    /// Scheduled departure date, YYYY-MM-DD
    pub departure_date: String,
}

/// Departure and arrival timings of the matched flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlightStatus {
    pub departure: DateTime<FixedOffset>,
    pub arrival: DateTime<FixedOffset>,
}

#[derive(Debug, Deserialize)]
struct ScheduleResponse {
    #[serde(default)]
    data: Vec<ScheduledFlight>,
}

#[derive(Debug, Deserialize)]
struct ScheduledFlight {
    #[serde(rename = "flightPoints", default)]
    flight_points: Vec<FlightPoint>,
}

/// A stop on the route: departure leg, arrival leg, or both
#[derive(Debug, Deserialize)]
struct FlightPoint {
    departure: Option<PointTimings>,
    arrival: Option<PointTimings>,
}

#[derive(Debug, Deserialize)]
struct PointTimings {
    #[serde(default)]
    timings: Vec<Timing>,
}

#[derive(Debug, Deserialize)]
struct Timing {
    value: Option<String>,
}

impl FlightQuery {
    /// Check the query before any network call.
    ///
    /// Empty fields and a malformed date are both `ApiError::Validation`,
    /// each with its own user-facing message.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.carrier_code.is_empty()
            || self.flight_number.is_empty()
            || self.departure_date.is_empty()
        {
            return Err(ApiError::Validation(MSG_FILL_ALL_FIELDS.to_string()));
        }

        if NaiveDate::parse_from_str(&self.departure_date, "%Y-%m-%d").is_err() {
            return Err(ApiError::Validation(MSG_BAD_DATE.to_string()));
        }

        Ok(())
    }
}

impl ApiClient {
    /// Look up the scheduled departure and arrival times for a flight.
    ///
    /// Validates first, then fetches a fresh token and issues the GET.
    pub async fn lookup_flight(&self, query: &FlightQuery) -> Result<FlightStatus, ApiError> {
        query.validate()?;

        let token = self.get_access_token().await?;

        let url = format!("{}/v2/schedule/flights", self.base_url());
        let resp = self
            .http()
            .get(&url)
            .query(&[
                ("carrierCode", query.carrier_code.as_str()),
                ("flightNumber", query.flight_number.as_str()),
                ("scheduledDepartureDate", query.departure_date.as_str()),
            ])
            .bearer_auth(&token)
            .send()
            .await?;

        let body: ScheduleResponse = resp.error_for_status()?.json().await?;
        extract_status(body)
    }
}

/// Extraction policy: first record, flight point 0's departure timing,
/// flight point 1's arrival timing. Anything missing is a shape failure;
/// there is no partial result.
fn extract_status(resp: ScheduleResponse) -> Result<FlightStatus, ApiError> {
    let flight = resp
        .data
        .first()
        .ok_or_else(|| ApiError::DataShape("no matching flight".to_string()))?;

    let departure_raw = flight
        .flight_points
        .first()
        .and_then(|p| p.departure.as_ref())
        .and_then(|d| d.timings.first())
        .and_then(|t| t.value.as_deref())
        .ok_or_else(|| ApiError::DataShape("missing departure timing".to_string()))?;

    let arrival_raw = flight
        .flight_points
        .get(1)
        .and_then(|p| p.arrival.as_ref())
        .and_then(|a| a.timings.first())
        .and_then(|t| t.value.as_deref())
        .ok_or_else(|| ApiError::DataShape("missing arrival timing".to_string()))?;

    Ok(FlightStatus {
        departure: parse_timing(departure_raw)?,
        arrival: parse_timing(arrival_raw)?,
    })
}

/// Parse a timing value like `2024-03-01T09:25+01:00`.
///
/// Amadeus omits the seconds, so try the exact shape first and fall back to
/// full RFC 3339.
fn parse_timing(value: &str) -> Result<DateTime<FixedOffset>, ApiError> {
    DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M%:z")
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .map_err(|_| ApiError::DataShape(format!("unparseable timing value: {}", value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> FlightQuery {
        FlightQuery {
            carrier_code: "BA".to_string(),
            flight_number: "287".to_string(),
            departure_date: "2024-03-01".to_string(),
        }
    }

    fn well_formed_response() -> ScheduleResponse {
        serde_json::from_value(serde_json::json!({
            "data": [{
                "flightPoints": [
                    {
                        "iataCode": "LHR",
                        "departure": { "timings": [{ "qualifier": "STD", "value": "2024-03-01T09:25+00:00" }] }
                    },
                    {
                        "iataCode": "SFO",
                        "arrival": { "timings": [{ "qualifier": "STA", "value": "2024-03-01T12:40-08:00" }] }
                    }
                ]
            }]
        }))
        .unwrap()
    }

    #[test]
    fn test_validate_ok() {
        assert!(query().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_fields() {
        for field in ["carrier", "flight", "date"] {
            let mut q = query();
            match field {
                "carrier" => q.carrier_code.clear(),
                "flight" => q.flight_number.clear(),
                _ => q.departure_date.clear(),
            }
            match q.validate() {
                Err(ApiError::Validation(msg)) => assert_eq!(msg, MSG_FILL_ALL_FIELDS),
                other => panic!("expected validation error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_validate_bad_date() {
        let mut q = query();
        q.departure_date = "03/01/2024".to_string();
        match q.validate() {
            Err(ApiError::Validation(msg)) => assert_eq!(msg, MSG_BAD_DATE),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_well_formed() {
        let status = extract_status(well_formed_response()).unwrap();
        assert_eq!(status.departure.to_rfc3339(), "2024-03-01T09:25:00+00:00");
        assert_eq!(status.arrival.to_rfc3339(), "2024-03-01T12:40:00-08:00");
    }

    #[test]
    fn test_extract_empty_data() {
        let resp: ScheduleResponse = serde_json::from_value(serde_json::json!({ "data": [] })).unwrap();
        assert!(matches!(extract_status(resp), Err(ApiError::DataShape(_))));
    }

    #[test]
    fn test_extract_missing_data_key() {
        let resp: ScheduleResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(matches!(extract_status(resp), Err(ApiError::DataShape(_))));
    }

    #[test]
    fn test_extract_single_flight_point() {
        // One point only: no second point to take the arrival from
        let resp: ScheduleResponse = serde_json::from_value(serde_json::json!({
            "data": [{
                "flightPoints": [
                    { "departure": { "timings": [{ "value": "2024-03-01T09:25+00:00" }] } }
                ]
            }]
        }))
        .unwrap();
        assert!(matches!(extract_status(resp), Err(ApiError::DataShape(_))));
    }

    #[test]
    fn test_extract_missing_timing_value() {
        let resp: ScheduleResponse = serde_json::from_value(serde_json::json!({
            "data": [{
                "flightPoints": [
                    { "departure": { "timings": [{ "qualifier": "STD" }] } },
                    { "arrival": { "timings": [{ "value": "2024-03-01T12:40-08:00" }] } }
                ]
            }]
        }))
        .unwrap();
        assert!(matches!(extract_status(resp), Err(ApiError::DataShape(_))));
    }

    #[test]
    fn test_extract_unparseable_timing() {
        let resp: ScheduleResponse = serde_json::from_value(serde_json::json!({
            "data": [{
                "flightPoints": [
                    { "departure": { "timings": [{ "value": "tomorrow-ish" }] } },
                    { "arrival": { "timings": [{ "value": "2024-03-01T12:40-08:00" }] } }
                ]
            }]
        }))
        .unwrap();
        assert!(matches!(extract_status(resp), Err(ApiError::DataShape(_))));
    }

    #[test]
    fn test_parse_timing_with_seconds() {
        let dt = parse_timing("2024-03-01T14:30:00Z").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-03-01T14:30:00+00:00");
    }
}

//! Airline reference directory with prefix search.
//!
//! The full airline list is fetched once at startup and held in memory;
//! the dropdown filters it locally on every keystroke.

use serde::Deserialize;

use super::{ApiClient, ApiError};

/// One airline as shown in the autocomplete dropdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Airline {
    /// Display name (business name preferred over common name)
    pub name: String,
    /// Two-character IATA carrier code
    pub iata_code: String,
}

#[derive(Debug, Deserialize)]
struct AirlineListResponse {
    #[serde(default)]
    data: Vec<RawAirline>,
}

#[derive(Debug, Deserialize)]
struct RawAirline {
    #[serde(rename = "businessName")]
    business_name: Option<String>,
    #[serde(rename = "commonName")]
    common_name: Option<String>,
    #[serde(rename = "iataCode")]
    iata_code: Option<String>,
}

/// In-memory airline directory, loaded once and read-only afterwards
#[derive(Debug, Default)]
pub struct AirlineDirectory {
    airlines: Vec<Airline>,
}

impl AirlineDirectory {
    pub fn new(airlines: Vec<Airline>) -> Self {
        Self { airlines }
    }

    pub fn is_empty(&self) -> bool {
        self.airlines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.airlines.len()
    }

    /// Case-insensitive prefix match against airline names.
    ///
    /// Matches come back in original load order; an empty prefix returns the
    /// whole directory.
    pub fn search(&self, prefix: &str) -> Vec<&Airline> {
        let needle = prefix.to_lowercase();
        self.airlines
            .iter()
            .filter(|a| a.name.to_lowercase().starts_with(&needle))
            .collect()
    }
}

impl ApiClient {
    /// Fetch the full airline reference list.
    ///
    /// The caller decides what a failure means; at startup it is logged and
    /// swallowed since autocomplete is a convenience, not a requirement.
    pub async fn fetch_airlines(&self) -> Result<Vec<Airline>, ApiError> {
        let token = self
            .get_access_token()
            .await
            .map_err(|e| ApiError::Fetch(e.to_string()))?;

        let url = format!("{}/v1/reference-data/airlines", self.base_url());
        let resp = self
            .http()
            .get(&url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| ApiError::Fetch(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ApiError::Fetch(format!(
                "airline endpoint returned {}",
                resp.status()
            )));
        }

        let body: AirlineListResponse = resp
            .json()
            .await
            .map_err(|e| ApiError::Fetch(e.to_string()))?;

        let airlines = map_airlines(body.data);
        tracing::info!("Loaded {} airlines", airlines.len());
        Ok(airlines)
    }
}

/// Map raw records to `Airline`, preferring business name over common name.
/// Records with neither name are dropped: they could never match a prefix.
fn map_airlines(raw: Vec<RawAirline>) -> Vec<Airline> {
    raw.into_iter()
        .filter_map(|r| {
            let name = r.business_name.or(r.common_name)?;
            let iata_code = r.iata_code?;
            Some(Airline { name, iata_code })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(business: Option<&str>, common: Option<&str>, code: Option<&str>) -> RawAirline {
        RawAirline {
            business_name: business.map(String::from),
            common_name: common.map(String::from),
            iata_code: code.map(String::from),
        }
    }

    fn sample_directory() -> AirlineDirectory {
        AirlineDirectory::new(vec![
            Airline {
                name: "British Airways".to_string(),
                iata_code: "BA".to_string(),
            },
            Airline {
                name: "Brussels Airlines".to_string(),
                iata_code: "SN".to_string(),
            },
            Airline {
                name: "Air France".to_string(),
                iata_code: "AF".to_string(),
            },
            Airline {
                name: "brathens".to_string(),
                iata_code: "BU".to_string(),
            },
        ])
    }

    #[test]
    fn test_search_prefix_case_insensitive() {
        let dir = sample_directory();
        let hits = dir.search("br");
        let names: Vec<&str> = hits.iter().map(|a| a.name.as_str()).collect();
        // Matches in load order, regardless of case
        assert_eq!(
            names,
            vec!["British Airways", "Brussels Airlines", "brathens"]
        );
    }

    #[test]
    fn test_search_empty_prefix_returns_all() {
        let dir = sample_directory();
        assert_eq!(dir.search("").len(), dir.len());
    }

    #[test]
    fn test_search_no_match() {
        let dir = sample_directory();
        assert!(dir.search("Lufthansa").is_empty());
    }

    #[test]
    fn test_search_prefix_not_substring() {
        let dir = sample_directory();
        // "Airways" appears inside a name but no name starts with it
        assert!(dir.search("Airways").is_empty());
    }

    #[test]
    fn test_map_prefers_business_name() {
        let airlines = map_airlines(vec![raw(Some("British Airways"), Some("BA"), Some("BA"))]);
        assert_eq!(airlines[0].name, "British Airways");
    }

    #[test]
    fn test_map_falls_back_to_common_name() {
        let airlines = map_airlines(vec![raw(None, Some("EasyJet"), Some("U2"))]);
        assert_eq!(airlines[0].name, "EasyJet");
    }

    #[test]
    fn test_map_skips_nameless_records() {
        let airlines = map_airlines(vec![
            raw(None, None, Some("XX")),
            raw(Some("Air France"), None, Some("AF")),
        ]);
        assert_eq!(airlines.len(), 1);
        assert_eq!(airlines[0].iata_code, "AF");
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const ORIGIN_COLUMN: &str = "origin";
pub const DESTINATION_COLUMN: &str = "destination";

/// Columns appended to every output row, in output order.
pub const DERIVED_COLUMNS: [&str; 5] = [
    "distance_text",
    "duration_text",
    "distance_miles",
    "duration_minutes",
    "status",
];

pub const STATUS_OK: &str = "OK";
pub const STATUS_UNKNOWN: &str = "UNKNOWN";

pub const METERS_TO_MILES: f64 = 0.000621371;
pub const SECONDS_PER_MINUTE: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Imperial,
    Metric,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Imperial => "imperial",
            Units::Metric => "metric",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Units {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "imperial" => Ok(Units::Imperial),
            "metric" => Ok(Units::Metric),
            other => Err(format!(
                "unsupported units '{}', expected 'imperial' or 'metric'",
                other
            )),
        }
    }
}

/// One input record: column name to cell text, in header order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub fields: Vec<(String, String)>,
}

impl Row {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn origin(&self) -> &str {
        self.get(ORIGIN_COLUMN).unwrap_or_default()
    }

    pub fn destination(&self) -> &str {
        self.get(DESTINATION_COLUMN).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A provider measurement: display text plus the raw value (meters or seconds).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub text: String,
    pub value: u64,
}

/// Outcome of one provider query. Either every measurement is present with
/// status `OK`, or none is and the status carries the failure reason.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupResult {
    Found { distance: Measure, duration: Measure },
    Failed { status: String },
}

impl LookupResult {
    pub fn failed(status: impl Into<String>) -> Self {
        LookupResult::Failed {
            status: status.into(),
        }
    }

    /// Local failure, tagged so it cannot be confused with a provider status.
    pub fn error(message: impl fmt::Display) -> Self {
        LookupResult::Failed {
            status: format!("ERROR: {}", message),
        }
    }

    pub fn status(&self) -> &str {
        match self {
            LookupResult::Found { .. } => STATUS_OK,
            LookupResult::Failed { status } => status,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, LookupResult::Found { .. })
    }

    pub fn distance_text(&self) -> Option<&str> {
        match self {
            LookupResult::Found { distance, .. } => Some(&distance.text),
            LookupResult::Failed { .. } => None,
        }
    }

    pub fn distance_value_m(&self) -> Option<u64> {
        match self {
            LookupResult::Found { distance, .. } => Some(distance.value),
            LookupResult::Failed { .. } => None,
        }
    }

    pub fn duration_text(&self) -> Option<&str> {
        match self {
            LookupResult::Found { duration, .. } => Some(&duration.text),
            LookupResult::Failed { .. } => None,
        }
    }

    pub fn duration_value_s(&self) -> Option<u64> {
        match self {
            LookupResult::Found { duration, .. } => Some(duration.value),
            LookupResult::Failed { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRow {
    /// Pass-through input columns, in input order.
    pub fields: Vec<(String, String)>,
    pub distance_text: Option<String>,
    pub duration_text: Option<String>,
    pub distance_miles: Option<f64>,
    pub duration_minutes: Option<f64>,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputTable {
    /// Pass-through headers followed by [`DERIVED_COLUMNS`].
    pub headers: Vec<String>,
    pub rows: Vec<OutputRow>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn from_results(results: &[LookupResult]) -> Self {
        let succeeded = results.iter().filter(|r| r.is_ok()).count();
        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub output: OutputTable,
    pub summary: RunSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_result_has_no_measurements() {
        let result = LookupResult::failed("ZERO_RESULTS");
        assert_eq!(result.status(), "ZERO_RESULTS");
        assert!(!result.is_ok());
        assert!(result.distance_text().is_none());
        assert!(result.distance_value_m().is_none());
        assert!(result.duration_text().is_none());
        assert!(result.duration_value_s().is_none());

        let result = LookupResult::error("connection refused");
        assert_eq!(result.status(), "ERROR: connection refused");
    }

    #[test]
    fn test_found_result_reports_ok() {
        let result = LookupResult::Found {
            distance: Measure {
                text: "10.2 mi".into(),
                value: 16415,
            },
            duration: Measure {
                text: "18 mins".into(),
                value: 1080,
            },
        };
        assert_eq!(result.status(), STATUS_OK);
        assert_eq!(result.distance_value_m(), Some(16415));
        assert_eq!(result.duration_text(), Some("18 mins"));
    }

    #[test]
    fn test_units_parse() {
        assert_eq!("imperial".parse::<Units>().unwrap(), Units::Imperial);
        assert_eq!(" Metric ".parse::<Units>().unwrap(), Units::Metric);
        assert!("furlongs".parse::<Units>().is_err());
        assert_eq!(Units::default().to_string(), "imperial");
    }

    #[test]
    fn test_run_summary_counts() {
        let results = vec![
            LookupResult::failed("NOT_FOUND"),
            LookupResult::Found {
                distance: Measure {
                    text: "1 km".into(),
                    value: 1000,
                },
                duration: Measure {
                    text: "1 min".into(),
                    value: 60,
                },
            },
        ];
        let summary = RunSummary::from_results(&results);
        assert_eq!(
            summary,
            RunSummary {
                total: 2,
                succeeded: 1,
                failed: 1
            }
        );
    }
}

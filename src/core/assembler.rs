use crate::domain::model::{
    LookupResult, OutputRow, OutputTable, Table, DERIVED_COLUMNS, METERS_TO_MILES,
    SECONDS_PER_MINUTE,
};
use crate::utils::error::{EtlError, Result};

pub fn meters_to_miles(meters: u64) -> f64 {
    meters as f64 * METERS_TO_MILES
}

pub fn seconds_to_minutes(seconds: u64) -> f64 {
    seconds as f64 / SECONDS_PER_MINUTE
}

/// Result Assembler: merge each row with its lookup result.
///
/// `results` must be parallel to `table.rows`. Input columns that share a
/// name with a derived column are dropped in favour of the derived value.
pub fn assemble(table: Table, results: Vec<LookupResult>) -> Result<OutputTable> {
    if table.rows.len() != results.len() {
        return Err(EtlError::AlignmentError {
            rows: table.rows.len(),
            results: results.len(),
        });
    }

    let is_derived = |name: &str| DERIVED_COLUMNS.contains(&name);

    let mut headers: Vec<String> = table
        .headers
        .into_iter()
        .filter(|h| !is_derived(h.as_str()))
        .collect();
    headers.extend(DERIVED_COLUMNS.iter().map(|c| c.to_string()));

    let rows = table
        .rows
        .into_iter()
        .zip(results)
        .map(|(row, result)| OutputRow {
            fields: row
                .fields
                .into_iter()
                .filter(|(name, _)| !is_derived(name.as_str()))
                .collect(),
            distance_text: result.distance_text().map(str::to_string),
            duration_text: result.duration_text().map(str::to_string),
            distance_miles: result.distance_value_m().map(meters_to_miles),
            duration_minutes: result.duration_value_s().map(seconds_to_minutes),
            status: result.status().to_string(),
        })
        .collect();

    Ok(OutputTable { headers, rows })
}

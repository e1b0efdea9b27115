use crate::domain::model::OutputTable;
use crate::utils::error::{EtlError, Result};

pub const OUTPUT_FILENAME: &str = "address_with_distances.csv";
pub const OUTPUT_MEDIA_TYPE: &str = "text/csv";

/// Table Emitter: UTF-8 CSV with the output header, one line per row,
/// written with the same delimiter the input was read with.
pub fn emit_csv(table: &OutputTable, delimiter: u8) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(&table.headers)?;

    for row in &table.rows {
        let mut record: Vec<String> = row.fields.iter().map(|(_, v)| v.clone()).collect();
        record.push(row.distance_text.clone().unwrap_or_default());
        record.push(row.duration_text.clone().unwrap_or_default());
        record.push(row.distance_miles.map(format_number).unwrap_or_default());
        record.push(row.duration_minutes.map(format_number).unwrap_or_default());
        record.push(row.status.clone());
        writer.write_record(&record)?;
    }

    writer
        .into_inner()
        .map_err(|e| EtlError::IoError(e.into_error()))
}

/// Shortest round-trip form; whole numbers keep a trailing `.0`.
pub fn format_number(value: f64) -> String {
    format!("{:?}", value)
}

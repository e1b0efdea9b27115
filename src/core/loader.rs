//! Table Loader: delimited text with a header line into [`Table`] rows.

use crate::domain::model::{Row, Table, DESTINATION_COLUMN, ORIGIN_COLUMN};
use crate::utils::error::{EtlError, Result};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parse `bytes` using the first line as the header.
///
/// Fails with [`EtlError::ParseError`] on malformed text (invalid UTF-8,
/// rows wider or narrower than the header) and with
/// [`EtlError::ValidationError`] when `origin` or `destination` is missing.
/// The required-column check runs before any row is read, so a table that
/// fails it never reaches the lookup stage.
pub fn parse_table(bytes: &[u8], delimiter: u8) -> Result<Table> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(false)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(parse_error)?
        .iter()
        .map(str::to_string)
        .collect();

    ensure_required_columns(&headers)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(parse_error)?;
        let fields = headers
            .iter()
            .cloned()
            .zip(record.iter().map(str::to_string))
            .collect();
        rows.push(Row { fields });
    }

    tracing::debug!("Parsed {} rows with columns {:?}", rows.len(), headers);
    Ok(Table { headers, rows })
}

pub fn ensure_required_columns(headers: &[String]) -> Result<()> {
    let missing: Vec<&str> = [ORIGIN_COLUMN, DESTINATION_COLUMN]
        .into_iter()
        .filter(|required| !headers.iter().any(|h| h == required))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(EtlError::ValidationError {
            message: format!(
                "CSV must include columns: `origin`, `destination` (missing: {})",
                missing.join(", ")
            ),
        })
    }
}

fn parse_error(err: csv::Error) -> EtlError {
    let line = err.position().map(|p| p.line());
    let message = match err.kind() {
        csv::ErrorKind::Utf8 { err, .. } => format!("invalid UTF-8 in field {}", err.field() + 1),
        csv::ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => format!("expected {} fields but found {}", expected_len, len),
        _ => err.to_string(),
    };
    EtlError::ParseError { line, message }
}

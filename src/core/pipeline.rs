use crate::core::{assembler, emitter, loader, processor::RowProcessor};
use crate::domain::model::{RunSummary, Table, TransformResult, Units};
use crate::domain::ports::{ConfigProvider, DistanceLookup, Pipeline, Storage};
use crate::utils::error::Result;
use std::path::Path;
use std::time::Duration;

/// Run the processor and assembler over an already-validated table.
pub async fn enrich_table<L: DistanceLookup + ?Sized>(
    table: Table,
    lookup: &L,
    units: Units,
    pause: Duration,
) -> Result<TransformResult> {
    let results = RowProcessor::new(lookup, units, pause)
        .process_with_progress(&table.rows, |done, total| {
            tracing::info!("⏳ Processed {}/{} rows", done, total);
        })
        .await;

    let summary = RunSummary::from_results(&results);
    let output = assembler::assemble(table, results)?;
    Ok(TransformResult { output, summary })
}

#[derive(Debug, Clone)]
pub struct EnrichedCsv {
    pub bytes: Vec<u8>,
    pub summary: RunSummary,
}

/// Whole pipeline in memory: parse, look up every row, emit CSV with the same delimiter.
/// Parse and validation errors surface before the first lookup.
pub async fn enrich_bytes<L: DistanceLookup + ?Sized>(
    input: &[u8],
    delimiter: u8,
    lookup: &L,
    units: Units,
    pause: Duration,
) -> Result<EnrichedCsv> {
    let table = loader::parse_table(input, delimiter)?;
    let result = enrich_table(table, lookup, units, pause).await?;
    let bytes = emitter::emit_csv(&result.output, delimiter)?;
    Ok(EnrichedCsv {
        bytes,
        summary: result.summary,
    })
}

pub struct DistancePipeline<S: Storage, C: ConfigProvider, L: DistanceLookup> {
    storage: S,
    config: C,
    lookup: L,
}

impl<S: Storage, C: ConfigProvider, L: DistanceLookup> DistancePipeline<S, C, L> {
    pub fn new(storage: S, config: C, lookup: L) -> Self {
        Self {
            storage,
            config,
            lookup,
        }
    }

    fn output_file(&self) -> String {
        Path::new(self.config.output_path())
            .join(self.config.output_filename())
            .to_string_lossy()
            .into_owned()
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, L: DistanceLookup> Pipeline for DistancePipeline<S, C, L> {
    async fn extract(&self) -> Result<Table> {
        tracing::debug!("Reading input from: {}", self.config.input_path());
        let bytes = self.storage.read_file(self.config.input_path()).await?;
        loader::parse_table(&bytes, self.config.delimiter())
    }

    async fn transform(&self, table: Table) -> Result<TransformResult> {
        tracing::debug!(
            "Looking up {} rows (units: {}, pause: {:?})",
            table.len(),
            self.config.units(),
            self.config.pause()
        );
        enrich_table(table, &self.lookup, self.config.units(), self.config.pause()).await
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let bytes = emitter::emit_csv(&result.output, self.config.delimiter())?;
        let output_file = self.output_file();

        tracing::debug!("Writing {} bytes to {}", bytes.len(), output_file);
        self.storage.write_file(&output_file, &bytes).await?;
        Ok(output_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{LookupResult, Measure};
    use crate::utils::error::EtlError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn with_file(path: &str, data: &str) -> Self {
            let mut files = HashMap::new();
            files.insert(path.to_string(), data.as_bytes().to_vec());
            Self {
                files: Arc::new(Mutex::new(files)),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            self.files.lock().await.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                EtlError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            self.files
                .lock()
                .await
                .insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        input_path: String,
        output_path: String,
    }

    impl MockConfig {
        fn new() -> Self {
            Self {
                input_path: "input.csv".to_string(),
                output_path: "test_output".to_string(),
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn input_path(&self) -> &str {
            &self.input_path
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn output_filename(&self) -> &str {
            emitter::OUTPUT_FILENAME
        }

        fn units(&self) -> Units {
            Units::Imperial
        }

        fn pause(&self) -> Duration {
            Duration::ZERO
        }

        fn delimiter(&self) -> u8 {
            b','
        }
    }

    /// Answers `OK` for every origin except "Atlantis", counting calls.
    #[derive(Clone, Default)]
    struct CountingLookup {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl DistanceLookup for CountingLookup {
        async fn lookup(&self, origin: &str, _destination: &str, _units: Units) -> LookupResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if origin == "Atlantis" {
                return LookupResult::failed("NOT_FOUND");
            }
            LookupResult::Found {
                distance: Measure {
                    text: "10.2 mi".into(),
                    value: 16415,
                },
                duration: Measure {
                    text: "18 mins".into(),
                    value: 1080,
                },
            }
        }
    }

    #[tokio::test]
    async fn test_extract_transform_load() {
        let storage = MockStorage::with_file(
            "input.csv",
            "id,origin,destination\n1,Austin,Dallas\n2,Atlantis,Dallas\n",
        );
        let lookup = CountingLookup::default();
        let pipeline = DistancePipeline::new(storage.clone(), MockConfig::new(), lookup.clone());

        let table = pipeline.extract().await.unwrap();
        assert_eq!(table.len(), 2);

        let result = pipeline.transform(table).await.unwrap();
        assert_eq!(result.summary.succeeded, 1);
        assert_eq!(result.summary.failed, 1);
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 2);

        let output_path = pipeline.load(result).await.unwrap();
        assert_eq!(output_path, "test_output/address_with_distances.csv");

        let written = String::from_utf8(storage.get_file(&output_path).await.unwrap()).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(
            lines[0],
            "id,origin,destination,distance_text,duration_text,distance_miles,duration_minutes,status"
        );
        assert!(lines[1].starts_with("1,Austin,Dallas,10.2 mi,18 mins,10.19"));
        assert!(lines[1].ends_with(",18.0,OK"));
        assert_eq!(lines[2], "2,Atlantis,Dallas,,,,,NOT_FOUND");
    }

    #[tokio::test]
    async fn test_missing_input_file_fails_extract() {
        let storage = MockStorage::with_file("other.csv", "origin,destination\n");
        let pipeline = DistancePipeline::new(storage, MockConfig::new(), CountingLookup::default());
        assert!(matches!(
            pipeline.extract().await,
            Err(EtlError::IoError(_))
        ));
    }

    #[tokio::test]
    async fn test_enrich_bytes_validation_happens_before_lookups() {
        let lookup = CountingLookup::default();

        let err = enrich_bytes(
            b"from,to\nAustin,Dallas\n",
            b',',
            &lookup,
            Units::Imperial,
            Duration::ZERO,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, EtlError::ValidationError { .. }));
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_enrich_bytes_round_trips_input_columns() {
        let input = "origin,destination,note\n\"Austin, TX\",Dallas,\"multi\nline\"\nAtlantis,Dallas,\n";
        let lookup = CountingLookup::default();

        let enriched = enrich_bytes(input.as_bytes(), b',', &lookup, Units::Imperial, Duration::ZERO)
            .await
            .unwrap();

        let original = loader::parse_table(input.as_bytes(), b',').unwrap();
        let reparsed = loader::parse_table(&enriched.bytes, b',').unwrap();
        assert_eq!(reparsed.len(), original.len());
        for (before, after) in original.rows.iter().zip(&reparsed.rows) {
            for (name, value) in &before.fields {
                assert_eq!(after.get(name), Some(value.as_str()));
            }
        }
        assert_eq!(reparsed.rows[1].get("status"), Some("NOT_FOUND"));
        assert_eq!(reparsed.rows[1].get("distance_miles"), Some(""));
    }

    #[tokio::test]
    async fn test_enrich_bytes_keeps_semicolon_delimiter() {
        let input = "origin;destination;note\nAustin;Dallas;x\nAtlantis;Dallas;y\n";
        let lookup = CountingLookup::default();

        let enriched = enrich_bytes(input.as_bytes(), b';', &lookup, Units::Imperial, Duration::ZERO)
            .await
            .unwrap();

        let text = String::from_utf8(enriched.bytes.clone()).unwrap();
        assert!(text.starts_with(
            "origin;destination;note;distance_text;duration_text;distance_miles;duration_minutes;status\n"
        ));

        let reparsed = loader::parse_table(&enriched.bytes, b';').unwrap();
        assert_eq!(reparsed.len(), 2);
        assert_eq!(reparsed.rows[0].get("note"), Some("x"));
        assert_eq!(reparsed.rows[0].get("status"), Some("OK"));
        assert_eq!(reparsed.rows[1].get("status"), Some("NOT_FOUND"));
    }
}

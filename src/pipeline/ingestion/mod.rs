// Pipeline ingestion: reading the survey exports into raw records

use std::io::Read;
use std::path::Path;
use tracing::{info, instrument, warn};

use crate::error::{InsightError, Result};
use crate::types::{Dataset, RawSurveyRecord};

/// Rows read from one tabular source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub records: Vec<RawSurveyRecord>,
    /// Malformed rows that were skipped
    pub skipped: usize,
}

/// Parse CSV text into raw records keyed by header. Rows with the wrong
/// number of fields or invalid UTF-8 are skipped with a warning; a missing
/// or unreadable header row is an error.
pub fn read_csv<R: Read>(input: R, source: &str) -> Result<CsvTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(input);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut table = CsvTable {
        headers,
        ..CsvTable::default()
    };

    for (idx, result) in reader.records().enumerate() {
        let row = idx + 1;
        match result {
            Ok(fields) => {
                let mut record = RawSurveyRecord::new(row);
                for (header, value) in table.headers.iter().zip(fields.iter()) {
                    record.insert(header.clone(), value);
                }
                table.records.push(record);
            }
            Err(e) => {
                warn!(source = source, row = row, "Skipping malformed row: {}", e);
                table.skipped += 1;
            }
        }
    }

    Ok(table)
}

/// Load one survey export from `data_dir`. A missing file aborts the run.
#[instrument(skip(data_dir), fields(dataset = %dataset))]
pub fn load_dataset(dataset: Dataset, data_dir: &Path) -> Result<CsvTable> {
    let path = data_dir.join(dataset.file_name());
    if !path.exists() {
        return Err(InsightError::MissingSource { dataset, path });
    }

    let file = std::fs::File::open(&path)?;
    let table = read_csv(file, dataset.as_str())?;
    info!(
        "Loaded {} records from {} ({} malformed rows skipped)",
        table.records.len(),
        path.display(),
        table.skipped
    );
    Ok(table)
}

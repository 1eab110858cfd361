use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info};

use crate::domain::{RawRecord, RecordProvenance};
use crate::error::{Result, StandardizerError};

/// All rows read from one input file, headers preserved in file order.
#[derive(Debug, Clone)]
pub struct RecordBatch {
    pub file_name: String,
    pub headers: Vec<String>,
    pub records: Vec<RawRecord>,
}

impl RecordBatch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Read a CSV file from disk into a batch of raw records.
pub fn read_csv_path(path: &Path) -> Result<RecordBatch> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    let file = File::open(path)?;
    read_csv_reader(file, &file_name)
}

/// Read CSV data from any reader. Rows shorter or longer than the header
/// row are tolerated; extra values are dropped and missing ones are empty.
pub fn read_csv_reader<R: Read>(reader: R, file_name: &str) -> Result<RecordBatch> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.is_empty() {
        return Err(StandardizerError::EmptyInput(file_name.to_string()));
    }

    let mut records = Vec::new();
    for (index, row) in csv_reader.records().enumerate() {
        let row = row?;
        let columns = headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                let value = row.get(i).unwrap_or("").to_string();
                (header.clone(), value)
            })
            .collect();

        records.push(RawRecord {
            columns,
            provenance: RecordProvenance {
                source_file: file_name.to_string(),
                row_number: index + 1,
            },
        });
    }

    debug!(
        file = %file_name,
        rows = records.len(),
        columns = headers.len(),
        "read csv batch"
    );

    Ok(RecordBatch {
        file_name: file_name.to_string(),
        headers,
        records,
    })
}

/// Read several CSV files in input order.
pub fn read_csv_paths(paths: &[std::path::PathBuf]) -> Result<Vec<RecordBatch>> {
    let mut batches = Vec::new();
    for path in paths {
        let batch = read_csv_path(path)?;
        info!(file = %batch.file_name, rows = batch.len(), "loaded input file");
        batches.push(batch);
    }
    Ok(batches)
}

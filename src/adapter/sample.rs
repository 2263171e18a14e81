use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{AdapterError, Result};

/// How many data rows to read when sniffing a dataset's structure.
pub const SAMPLE_ROWS: usize = 5;

/// Header plus a handful of preview records from a delimited input.
#[derive(Debug, Clone)]
pub struct HeaderSample {
    pub columns: Vec<String>,
    pub preview: Vec<Vec<String>>,
}

impl HeaderSample {
    /// Read the header row and up to [`SAMPLE_ROWS`] records from a CSV.
    ///
    /// An empty file, a blank header row, or input that cannot be decoded
    /// as delimited text all fail with [`AdapterError::InputFormat`].
    pub fn read(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mut reader = csv::Reader::from_reader(BufReader::new(file));

        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| AdapterError::InputFormat(e.to_string()))?
            .iter()
            .map(str::to_string)
            .collect();
        if columns.is_empty() || columns.iter().all(|c| c.trim().is_empty()) {
            return Err(AdapterError::InputFormat(format!(
                "no header row in {}",
                path.display()
            )));
        }

        let mut preview = Vec::new();
        for result in reader.records().take(SAMPLE_ROWS) {
            let record = result.map_err(|e| AdapterError::InputFormat(e.to_string()))?;
            preview.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self { columns, preview })
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

/// Count data rows in the file, header excluded. Streams the whole file and
/// tolerates ragged rows; used only for the analysis report.
pub fn count_rows(path: &Path) -> Result<usize> {
    let file = File::open(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(BufReader::new(file));

    let mut count = 0usize;
    for result in reader.records() {
        result?;
        count += 1;
    }
    Ok(count)
}

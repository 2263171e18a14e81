//! Header cleanup for datasets whose exports use dotted column names the
//! warehouse loader rejects (common in Kaggle exports).

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use tracing::info;

use crate::error::{AdapterError, Result};

/// Outcome of a header cleanup: the header before and after rewriting and
/// how many data rows were copied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedHeader {
    pub old: Vec<String>,
    pub new: Vec<String>,
    pub rows: usize,
}

/// Copy `src` to `dst`, replacing `.` with `_` in every header column name.
/// Data rows pass through unchanged.
pub fn clean_header(src: &Path, dst: &Path) -> Result<CleanedHeader> {
    if !src.exists() {
        return Err(AdapterError::MissingFile(src.to_path_buf()));
    }

    let input = File::open(src)?;
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(BufReader::new(input));

    let old: Vec<String> = reader
        .headers()
        .map_err(|e| AdapterError::InputFormat(e.to_string()))?
        .iter()
        .map(str::to_string)
        .collect();
    if old.is_empty() || old.iter().all(|c| c.trim().is_empty()) {
        return Err(AdapterError::InputFormat(format!(
            "no header row in {}",
            src.display()
        )));
    }
    let new: Vec<String> = old.iter().map(|c| c.replace('.', "_")).collect();

    let output = File::create(dst)?;
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(BufWriter::new(output));
    writer.write_record(&new)?;

    let mut rows = 0usize;
    for result in reader.records() {
        let record = result.map_err(|e| AdapterError::InputFormat(e.to_string()))?;
        writer.write_record(&record)?;
        rows += 1;
    }
    writer.flush()?;

    info!(src = %src.display(), dst = %dst.display(), rows, "cleaned CSV header");
    Ok(CleanedHeader { old, new, rows })
}

use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::info;

use crate::encoding::decode_input;
use crate::error::{Error, Result};
use crate::record::RawRow;
use crate::sqlite;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Sqlite,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match extension.as_deref() {
            Some("csv") => Ok(InputFormat::Csv),
            Some("db") | Some("sqlite") | Some("sqlite3") => Ok(InputFormat::Sqlite),
            _ => Err(Error::UnsupportedInput(path.display().to_string())),
        }
    }
}

/// Parses CSV text with a header row holding `content` and `time` columns.
pub fn parse_csv(text: &str) -> Result<Vec<RawRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let column = |name: &'static str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or(Error::MissingColumn(name))
    };
    let content_idx = column("content")?;
    let time_idx = column("time")?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(RawRow::new(
            record.get(content_idx).unwrap_or_default(),
            record.get(time_idx).unwrap_or_default(),
        ));
    }
    Ok(rows)
}

pub fn load_csv(path: &Path) -> Result<Vec<RawRow>> {
    let bytes = fs::read(path)?;
    parse_csv(&decode_input(&bytes))
}

/// Loads every row of the dataset at `path`, picking the reader by extension.
pub fn load_rows(path: &Path, table: &str) -> Result<Vec<RawRow>> {
    let start_time = Instant::now();
    let format = InputFormat::from_path(path)?;
    info!(action = "start", component = "dataset_loading", file_path = ?path, format = ?format, "Loading dataset");

    let rows = match format {
        InputFormat::Csv => load_csv(path)?,
        InputFormat::Sqlite => sqlite::load_rows(path, table)?,
    };

    info!(
        action = "complete",
        component = "dataset_loading",
        row_count = rows.len(),
        duration_ms = start_time.elapsed().as_millis(),
        "Dataset loaded"
    );
    Ok(rows)
}

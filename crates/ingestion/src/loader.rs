//! Loading of per-asset source files.
//!
//! Files are delimited text with a fixed column order. Column names in the
//! header (if any) are ignored; columns are mapped positionally onto the
//! schema and every line must carry exactly the schema's column count.

use cryptostat_core::config::IngestConfig;
use cryptostat_core::{Error, RawRecord, Result, RAW_FIELDS};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Ordered field list a source file is validated against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<&'static str>,
}

impl Schema {
    /// Schema of a raw asset file.
    pub fn raw() -> Self {
        Self {
            fields: RAW_FIELDS.to_vec(),
        }
    }

    pub fn fields(&self) -> &[&'static str] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fail with `MalformedInput` unless `width` matches the schema.
    pub fn check_width(&self, width: usize, line: u64) -> Result<()> {
        if width != self.fields.len() {
            return Err(Error::malformed_input(format!(
                "line {}: expected {} columns ({}), found {}",
                line,
                self.fields.len(),
                self.fields.join(", "),
                width
            )));
        }
        Ok(())
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::raw()
    }
}

/// Load raw records from a file on disk.
pub fn load_raw_records(path: impl AsRef<Path>, config: &IngestConfig) -> Result<Vec<RawRecord>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        Error::Io(std::io::Error::new(e.kind(), format!("{}: {}", path.display(), e)))
    })?;

    let records = read_raw_records(file, config)?;
    info!(path = %path.display(), rows = records.len(), "Loaded asset file");
    Ok(records)
}

/// Read raw records from any reader.
///
/// Lines with an empty (or NaN) field are dropped. A wrong column count or a
/// non-numeric or infinite price/volume field aborts the load.
pub fn read_raw_records<R: Read>(reader: R, config: &IngestConfig) -> Result<Vec<RawRecord>> {
    let schema = Schema::raw();
    let delimiter = u8::try_from(config.delimiter).map_err(|_| {
        Error::config(format!(
            "delimiter '{}' must be a single-byte character",
            config.delimiter
        ))
    })?;

    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(config.has_headers)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    if config.has_headers {
        let headers = rdr.headers().map_err(csv_error)?;
        schema.check_width(headers.len(), 1)?;
    }

    let mut records = Vec::new();
    let mut dropped = 0usize;

    for result in rdr.records() {
        let row = result.map_err(csv_error)?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        schema.check_width(row.len(), line)?;

        match parse_row(&schema, &row, line)? {
            Some(record) => records.push(record),
            None => {
                dropped += 1;
                debug!(line, "Dropped row with missing field");
            }
        }
    }

    if dropped > 0 {
        debug!(dropped, kept = records.len(), "Dropped rows with missing values");
    }

    Ok(records)
}

/// Parse one validated row. Returns `None` if any field is missing.
fn parse_row(schema: &Schema, row: &StringRecord, line: u64) -> Result<Option<RawRecord>> {
    if row.iter().any(|field| field.is_empty()) {
        return Ok(None);
    }

    let mut numbers = [0.0f64; 6];
    for (slot, col) in numbers.iter_mut().zip(1..=6) {
        let text = &row[col];
        let value: f64 = text.parse().map_err(|_| {
            Error::malformed_input(format!(
                "line {}: column '{}' is not numeric: '{}'",
                line,
                schema.fields()[col],
                text
            ))
        })?;
        if value.is_nan() {
            return Ok(None);
        }
        if !value.is_finite() {
            return Err(Error::malformed_input(format!(
                "line {}: column '{}' is not finite: '{}'",
                line,
                schema.fields()[col],
                text
            )));
        }
        *slot = value;
    }

    let [open, high, low, close, volume, market_cap] = numbers;
    Ok(Some(RawRecord {
        id: row[0].to_string(),
        open,
        high,
        low,
        close,
        volume,
        market_cap,
        date_string: row[7].to_string(),
    }))
}

fn csv_error(err: csv::Error) -> Error {
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(io) => Error::Io(io),
        _ => Error::malformed_input(message),
    }
}

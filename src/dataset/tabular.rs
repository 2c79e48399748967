//! CSV datasets: candidate coordinates, model predictions, ground truth.
//!
//! Column names follow the study's spreadsheets (`Latitude`, `Longitude`,
//! `Predictions`, `Groundtruth`) and are matched case-sensitively.

use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Writer};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::diversity::Point;
use crate::error::DatasetError;
use crate::location::Location;

pub const LATITUDE_COLUMN: &str = "Latitude";
pub const LONGITUDE_COLUMN: &str = "Longitude";
pub const WEIGHT_COLUMN: &str = "Weight";
pub const PREDICTIONS_COLUMN: &str = "Predictions";
pub const GROUNDTRUTH_COLUMN: &str = "Groundtruth";

/// A candidate coordinate with its weight and the raw CSV row it came from.
#[derive(Debug, Clone)]
pub struct CandidateRow {
    pub location: Location,
    pub weight: f64,
    pub record: StringRecord,
}

impl CandidateRow {
    /// Whether any field of the row mentions one of `regions`.
    pub fn mentions_any(&self, regions: &[String]) -> bool {
        regions
            .iter()
            .any(|region| self.record.iter().any(|field| field.contains(region.as_str())))
    }
}

/// Candidate coordinates loaded from a CSV file, extra columns preserved.
#[derive(Debug, Clone)]
pub struct CandidateTable {
    pub headers: StringRecord,
    pub rows: Vec<CandidateRow>,
}

impl CandidateTable {
    /// Keeps only rows that mention one of `regions`. An empty list keeps all rows.
    pub fn retain_regions(&mut self, regions: &[String]) {
        if regions.is_empty() {
            return;
        }
        self.rows.retain(|row| row.mentions_any(regions));
    }

    /// Planar points in row order.
    pub fn points(&self) -> Vec<Point> {
        self.rows.iter().map(|row| row.location.to_point()).collect()
    }

    /// Weights in row order.
    pub fn weights(&self) -> Vec<f64> {
        self.rows.iter().map(|row| row.weight).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Reads candidates from a CSV with `Latitude`, `Longitude` and `Weight` columns.
pub fn read_candidates(path: &Path) -> Result<CandidateTable, DatasetError> {
    let mut reader = ReaderBuilder::new().from_path(path)?;
    let headers = reader.headers()?.clone();

    let lat_idx = column_index(&headers, LATITUDE_COLUMN, path)?;
    let lon_idx = column_index(&headers, LONGITUDE_COLUMN, path)?;
    let weight_idx = column_index(&headers, WEIGHT_COLUMN, path)?;

    let mut rows = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let lat = parse_field(&record, lat_idx, LATITUDE_COLUMN, row)?;
        let lon = parse_field(&record, lon_idx, LONGITUDE_COLUMN, row)?;
        let weight = parse_field(&record, weight_idx, WEIGHT_COLUMN, row)?;

        rows.push(CandidateRow {
            location: Location::new(lat, lon),
            weight,
            record,
        });
    }

    debug!(path = %path.display(), rows = rows.len(), "Loaded candidates");
    Ok(CandidateTable { headers, rows })
}

/// Writes `headers` followed by `rows` to a CSV file.
pub fn write_records<'a, I>(path: &Path, headers: &StringRecord, rows: I) -> Result<(), DatasetError>
where
    I: IntoIterator<Item = &'a StringRecord>,
{
    let mut writer = Writer::from_path(path)?;
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// One model rating at a location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    #[serde(rename = "Latitude")]
    pub latitude: f64,
    #[serde(rename = "Longitude")]
    pub longitude: f64,
    #[serde(rename = "Predictions")]
    pub prediction: f64,
}

impl PredictionRecord {
    pub fn location(&self) -> Location {
        Location::new(self.latitude, self.longitude)
    }
}

/// Reads a predictions CSV with `Latitude`, `Longitude` and `Predictions` columns.
pub fn read_predictions(path: &Path) -> Result<Vec<PredictionRecord>, DatasetError> {
    let mut reader = ReaderBuilder::new().from_path(path)?;
    let headers = reader.headers()?.clone();
    for column in [LATITUDE_COLUMN, LONGITUDE_COLUMN, PREDICTIONS_COLUMN] {
        column_index(&headers, column, path)?;
    }

    let records = reader
        .deserialize()
        .collect::<Result<Vec<PredictionRecord>, _>>()?;

    debug!(path = %path.display(), rows = records.len(), "Loaded predictions");
    Ok(records)
}

/// Writes predictions with the standard header.
pub fn write_predictions(path: &Path, records: &[PredictionRecord]) -> Result<(), DatasetError> {
    let mut writer = Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads one numeric column.
pub fn read_column(path: &Path, column: &str) -> Result<Vec<f64>, DatasetError> {
    let mut reader = ReaderBuilder::new().from_path(path)?;
    let headers = reader.headers()?.clone();
    let idx = column_index(&headers, column, path)?;

    let mut values = Vec::new();
    for (row, record) in reader.records().enumerate() {
        values.push(parse_field(&record?, idx, column, row)?);
    }

    debug!(path = %path.display(), column, rows = values.len(), "Loaded column");
    Ok(values)
}

fn column_index(headers: &StringRecord, column: &str, path: &Path) -> Result<usize, DatasetError> {
    headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| DatasetError::MissingColumn {
            path: path.display().to_string(),
            column: column.to_string(),
        })
}

fn parse_field(
    record: &StringRecord,
    idx: usize,
    column: &str,
    row: usize,
) -> Result<f64, DatasetError> {
    let raw = record.get(idx).unwrap_or("").trim();
    raw.parse().map_err(|_| DatasetError::InvalidNumber {
        column: column.to_string(),
        row,
        value: raw.to_string(),
    })
}

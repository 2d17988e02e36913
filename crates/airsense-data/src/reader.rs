//! CSV sensor reading reader with full input validation.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::DataError;
use crate::domain::{Sensor, SensorReading};

/// Reads sensor readings from a CSV file.
///
/// Expected CSV format:
/// - Header row required, naming the columns `co2`, `co`, `pm25`,
///   `temperature` and `humidity` (case-insensitive, any order)
/// - Extra columns such as timestamps or device ids are ignored
/// - One reading per row, all rows must have the same number of columns
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`DataError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`DataError::CsvParse`] | Malformed CSV record |
/// | [`DataError::MissingColumn`] | Header lacks a sensor column |
/// | [`DataError::InconsistentRowLength`] | Row has different column count than header |
/// | [`DataError::NonFiniteValue`] | Cell is NaN, Inf, or unparseable float |
/// | [`DataError::EmptyDataset`] | Zero data rows after header |
pub struct ReadingsReader {
    path: PathBuf,
}

impl ReadingsReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the CSV file.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<Vec<SensorReading>, DataError> {
        let file = std::fs::File::open(&self.path).map_err(|e| DataError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) so ragged rows surface as InconsistentRowLength
        // instead of a low-level CsvParse error.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let header = rdr.headers().map_err(|e| self.parse_error(e))?;
        let expected_cols = header.len();

        let mut columns = [0usize; Sensor::COUNT];
        for sensor in Sensor::ALL {
            columns[sensor.index()] = header
                .iter()
                .position(|name| name.eq_ignore_ascii_case(sensor.key()))
                .ok_or(DataError::MissingColumn {
                    path: self.path.clone(),
                    column: sensor.key(),
                })?;
        }
        debug!(expected_cols, ?columns, "read CSV header");

        let mut readings = Vec::new();
        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| self.parse_error(e))?;

            if record.len() != expected_cols {
                return Err(DataError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected: expected_cols,
                    got: record.len(),
                });
            }

            let mut values = [0.0f64; Sensor::COUNT];
            for sensor in Sensor::ALL {
                let raw = record.get(columns[sensor.index()]).unwrap_or("");
                values[sensor.index()] = raw
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| DataError::NonFiniteValue {
                        path: self.path.clone(),
                        row_index,
                        column: sensor.key(),
                        raw: raw.to_string(),
                    })?;
            }
            readings.push(SensorReading::from_features(&values)?);
        }

        if readings.is_empty() {
            return Err(DataError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        info!(n_readings = readings.len(), "readings loaded");

        Ok(readings)
    }

    fn parse_error(&self, e: csv::Error) -> DataError {
        DataError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        }
    }
}

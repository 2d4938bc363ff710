//! CSV reader for raw daily temperature readings.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use cyclewarp_dtw::{MAX_CYCLE_DAYS, Reading};
use cyclewarp_features::{CycleKey, RawCycle, UserId};
use tracing::{debug, info, instrument};

use crate::domain::{Columns, Row};
use crate::IoError;

/// Reads daily temperature readings from a CSV file, grouped into cycles.
///
/// Expected CSV format:
/// - Header row required: `user,cycle,day,temperature[,cycle_length]`
///   (columns located by name, extra columns ignored)
/// - One row per recorded day; an empty `temperature` marks a skipped day
/// - `cycle_length` may be empty or omitted, in which case it is inferred
///   downstream from the last reading day
///
/// Cycles are returned in order of first appearance.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::MissingColumn`] | A required column is absent |
/// | [`IoError::InvalidValue`] | Empty user, unparseable cycle, day, temperature or length, or a day or length past [`MAX_CYCLE_DAYS`] |
/// | [`IoError::ConflictingCycleLength`] | Rows of one cycle declare different lengths |
/// | [`IoError::EmptyDataset`] | Zero data rows after header |
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
    pub fn read(&self) -> Result<Vec<RawCycle>, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let header = rdr
            .headers()
            .map_err(|e| IoError::csv(&self.path, e))?
            .clone();
        let columns = Columns::new(&self.path, &header);
        let user_col = columns.required("user")?;
        let cycle_col = columns.required("cycle")?;
        let day_col = columns.required("day")?;
        let temp_col = columns.required("temperature")?;
        let length_col = columns.optional("cycle_length");
        debug!(has_cycle_length = length_col.is_some(), "read CSV header");

        let mut cycles: Vec<RawCycle> = Vec::new();
        let mut index: HashMap<CycleKey, usize> = HashMap::new();
        let mut n_rows = 0usize;

        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| IoError::csv(&self.path, e))?;
            let row = Row {
                path: &self.path,
                index: row_index,
                record: &record,
            };

            let user = UserId::new(row.text(user_col, "user")?);
            let cycle: u32 = row.parse(cycle_col, "cycle")?;
            let day: usize = row.parse(day_col, "day")?;
            let temperature: Option<f64> = row.parse_opt(Some(temp_col), "temperature")?;
            let cycle_length: Option<usize> = row.parse_opt(length_col, "cycle_length")?;
            if day >= MAX_CYCLE_DAYS {
                return Err(row.invalid(day_col, "day"));
            }
            if let Some(col) = length_col
                && cycle_length.is_some_and(|len| len > MAX_CYCLE_DAYS)
            {
                return Err(row.invalid(col, "cycle_length"));
            }

            let key = CycleKey::new(user, cycle);
            let slot = *index.entry(key.clone()).or_insert_with(|| {
                cycles.push(RawCycle {
                    key,
                    cycle_length: None,
                    readings: Vec::new(),
                });
                cycles.len() - 1
            });
            let raw = &mut cycles[slot];

            match (raw.cycle_length, cycle_length) {
                (Some(first), Some(second)) if first != second => {
                    return Err(IoError::ConflictingCycleLength {
                        path: self.path.clone(),
                        user: raw.key.user.as_str().to_string(),
                        cycle: raw.key.cycle,
                        first,
                        second,
                    });
                }
                (None, Some(len)) => raw.cycle_length = Some(len),
                _ => {}
            }

            raw.readings.push(match temperature {
                Some(t) => Reading::new(day, t),
                None => Reading::missing(day),
            });
            n_rows += 1;
        }

        if n_rows == 0 {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        info!(n_rows, n_cycles = cycles.len(), "readings loaded");
        Ok(cycles)
    }
}

//! Feature table CSV writer and reader.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use cyclewarp_features::{CycleFeatures, CycleKey, UserId};
use tracing::{info, instrument};

use crate::domain::{Columns, FEATURE_COLUMNS, FeatureRow, Row};
use crate::IoError;

/// Columns holding whole numbers; written without a fractional part.
const INTEGER_COLUMNS: [usize; 5] = [0, 2, 8, 10, 11];

/// Writes cycle feature records as `user,cycle,<FEATURE_COLUMNS>` CSV.
pub struct FeatureTableWriter {
    path: PathBuf,
}

impl FeatureTableWriter {
    /// Create a writer targeting `path`.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Write all records, replacing any existing file.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::OutputDirCreate`] | Parent directory cannot be created |
    /// | [`IoError::WriteFile`] | File cannot be created or flushed |
    /// | [`IoError::CsvWrite`] | A record cannot be written |
    #[instrument(skip_all, fields(path = %self.path.display(), n = records.len()))]
    pub fn write(&self, records: &[CycleFeatures]) -> Result<(), IoError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| IoError::OutputDirCreate {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let file = File::create(&self.path).map_err(|e| IoError::WriteFile {
            path: self.path.clone(),
            source: e,
        })?;
        let mut writer = csv::Writer::from_writer(file);
        self.write_rows(&mut writer, records)?;
        writer.flush().map_err(|e| IoError::WriteFile {
            path: self.path.clone(),
            source: e,
        })?;
        info!("feature table written");
        Ok(())
    }

    fn write_rows<W: Write>(
        &self,
        writer: &mut csv::Writer<W>,
        records: &[CycleFeatures],
    ) -> Result<(), IoError> {
        let csv_err = |e| IoError::CsvWrite {
            path: self.path.clone(),
            source: e,
        };
        let header = ["user", "cycle"].into_iter().chain(FEATURE_COLUMNS);
        writer.write_record(header).map_err(csv_err)?;

        for record in records {
            let row = FeatureRow::from(record);
            let mut fields = Vec::with_capacity(2 + FEATURE_COLUMNS.len());
            fields.push(row.key.user.as_str().to_string());
            fields.push(row.key.cycle.to_string());
            for (i, value) in row.values.iter().enumerate() {
                if INTEGER_COLUMNS.contains(&i) {
                    fields.push(format!("{}", *value as i64));
                } else {
                    fields.push(value.to_string());
                }
            }
            writer.write_record(&fields).map_err(csv_err)?;
        }
        Ok(())
    }
}

/// Reads a feature table written by [`FeatureTableWriter`].
///
/// Columns are located by name; every feature cell must be a finite number.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::MissingColumn`] | A key or feature column is absent |
/// | [`IoError::InvalidValue`] | A cell is empty, unparseable or not finite |
/// | [`IoError::EmptyDataset`] | Zero data rows after header |
pub struct FeatureTableReader {
    path: PathBuf,
}

impl FeatureTableReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the feature table.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<Vec<FeatureRow>, IoError> {
        let file = File::open(&self.path).map_err(|e| IoError::FileNotFound {
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
        let mut feature_cols = [0usize; 12];
        for (slot, name) in feature_cols.iter_mut().zip(FEATURE_COLUMNS) {
            *slot = columns.required(name)?;
        }

        let mut rows = Vec::new();
        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| IoError::csv(&self.path, e))?;
            let row = Row {
                path: &self.path,
                index: row_index,
                record: &record,
            };
            let key = CycleKey::new(
                UserId::new(row.text(user_col, "user")?),
                row.parse(cycle_col, "cycle")?,
            );
            let mut values = [0.0; 12];
            for ((value, &col), name) in values.iter_mut().zip(&feature_cols).zip(FEATURE_COLUMNS) {
                *value = row.finite(col, name)?;
            }
            rows.push(FeatureRow { key, values });
        }

        if rows.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }
        info!(n_rows = rows.len(), "feature table loaded");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use cyclewarp_features::{AsymmetryFeatures, Landmarks};
    use tempfile::TempDir;

    use super::*;

    fn record(user: &str, cycle: u32, cost: f64) -> CycleFeatures {
        CycleFeatures {
            key: CycleKey::new(UserId::new(user), cycle),
            landmarks: Landmarks {
                nadir_day: 11,
                nadir_temp_actual: -1.375,
                peak_day: 23,
                peak_temp_actual: 1.0625,
            },
            asymmetry: AsymmetryFeatures {
                cost_with_diff: cost,
                path_length_with_diff: 0.1,
                pos_count_with_diff: -0.02,
            },
            dtw_distance: 6.5,
            data_length: 24,
            cycle_length: 28,
        }
    }

    #[test]
    fn header_and_integer_columns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("features.csv");
        FeatureTableWriter::new(&path)
            .write(&[record("a", 1, 0.5)])
            .unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "user,cycle,nadir_day,nadir_temp_actual,peak_day,peak_temp_actual,\
             cost_with_diff,path_length_with_diff,pos_count_with_diff,dtw_distance,\
             nadir_to_peak,low_to_high_temp,data_length,cycle_length"
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("a,1,11,-1.375,23,1.0625,0.5,"));
        assert!(row.ends_with(",12,2.4375,24,28"));
    }

    #[test]
    fn written_table_reads_back_exactly() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("features.csv");
        let records = vec![record("a", 1, 0.1 + 0.2), record("b", 4, -1.0 / 3.0)];
        FeatureTableWriter::new(&path).write(&records).unwrap();

        let rows = FeatureTableReader::new(&path).read().unwrap();
        assert_eq!(rows.len(), 2);
        for (row, rec) in rows.iter().zip(&records) {
            assert_eq!(row, &FeatureRow::from(rec));
        }
    }

    #[test]
    fn missing_feature_column_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("f.csv");
        std::fs::write(&path, "user,cycle,nadir_day\na,1,3\n").unwrap();
        let err = FeatureTableReader::new(&path).read().unwrap_err();
        assert!(matches!(
            err,
            IoError::MissingColumn { column: "nadir_temp_actual", .. }
        ));
    }
}

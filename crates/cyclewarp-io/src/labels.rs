//! CSV reader for per-user outcome labels.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use cyclewarp_features::UserId;
use tracing::{info, instrument};

use crate::domain::{Columns, Labels, Row};
use crate::IoError;

/// Reads binary per-user labels from a `user,label` CSV file.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::MissingColumn`] | `user` or `label` column absent |
/// | [`IoError::InvalidValue`] | Empty user, or label other than `0` / `1` |
/// | [`IoError::DuplicateUser`] | Same user appears twice |
/// | [`IoError::EmptyDataset`] | Zero data rows after header |
pub struct LabelsReader {
    path: PathBuf,
}

impl LabelsReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the labels file.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<Labels, IoError> {
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
        let label_col = columns.required("label")?;

        let mut labels = Labels::default();
        let mut seen: HashMap<String, usize> = HashMap::new();

        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| IoError::csv(&self.path, e))?;
            let row = Row {
                path: &self.path,
                index: row_index,
                record: &record,
            };
            let user = row.text(user_col, "user")?.to_string();
            let label = match row.raw(label_col) {
                "0" => 0,
                "1" => 1,
                _ => return Err(row.invalid(label_col, "label")),
            };

            if let Some(&first_row) = seen.get(&user) {
                return Err(IoError::DuplicateUser {
                    path: self.path.clone(),
                    user,
                    first_row,
                    second_row: row_index,
                });
            }
            seen.insert(user.clone(), row_index);
            labels.insert(UserId::new(user), label);
        }

        if labels.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }
        info!(n_users = labels.len(), "labels loaded");
        Ok(labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn read_valid_labels() {
        let f = write_csv("user,label\na,1\nb,0\nc,1\n");
        let labels = LabelsReader::new(f.path()).read().unwrap();
        assert_eq!(labels.len(), 3);
        assert_eq!(labels.get(&UserId::new("a")), Some(1));
        assert_eq!(labels.get(&UserId::new("b")), Some(0));
    }

    #[test]
    fn non_binary_label_rejected() {
        let f = write_csv("user,label\na,2\n");
        let err = LabelsReader::new(f.path()).read().unwrap_err();
        assert!(matches!(err, IoError::InvalidValue { column: "label", .. }));
    }

    #[test]
    fn duplicate_user_rejected() {
        let f = write_csv("user,label\na,1\nb,0\na,0\n");
        let err = LabelsReader::new(f.path()).read().unwrap_err();
        assert!(matches!(
            err,
            IoError::DuplicateUser { first_row: 0, second_row: 2, .. }
        ));
    }

    #[test]
    fn header_only_is_empty_dataset() {
        let f = write_csv("user,label\n");
        let err = LabelsReader::new(f.path()).read().unwrap_err();
        assert!(matches!(err, IoError::EmptyDataset { .. }));
    }
}

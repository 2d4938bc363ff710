//! Domain types for cyclewarp-io.

use std::collections::HashMap;
use std::path::Path;

use csv::StringRecord;
use cyclewarp_features::{CycleFeatures, CycleKey, UserId};

use crate::IoError;

/// Numeric feature columns of the feature table, in file order.
///
/// The table itself is prefixed by the `user` and `cycle` key columns.
pub const FEATURE_COLUMNS: [&str; 12] = [
    "nadir_day",
    "nadir_temp_actual",
    "peak_day",
    "peak_temp_actual",
    "cost_with_diff",
    "path_length_with_diff",
    "pos_count_with_diff",
    "dtw_distance",
    "nadir_to_peak",
    "low_to_high_temp",
    "data_length",
    "cycle_length",
];

/// One row of the feature table.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    /// Identifying key.
    pub key: CycleKey,
    /// Values in [`FEATURE_COLUMNS`] order.
    pub values: [f64; 12],
}

impl From<&CycleFeatures> for FeatureRow {
    fn from(f: &CycleFeatures) -> Self {
        let lm = &f.landmarks;
        let asym = &f.asymmetry;
        Self {
            key: f.key.clone(),
            values: [
                lm.nadir_day as f64,
                lm.nadir_temp_actual,
                lm.peak_day as f64,
                lm.peak_temp_actual,
                asym.cost_with_diff,
                asym.path_length_with_diff,
                asym.pos_count_with_diff,
                f.dtw_distance,
                lm.nadir_to_peak() as f64,
                lm.low_to_high_temp(),
                f.data_length as f64,
                f.cycle_length as f64,
            ],
        }
    }
}

/// Binary outcome label per user.
///
/// Produced by [`LabelsReader`](crate::LabelsReader); `0` is negative and
/// `1` positive.
#[derive(Debug, Clone, Default)]
pub struct Labels {
    by_user: HashMap<UserId, usize>,
}

impl Labels {
    pub(crate) fn insert(&mut self, user: UserId, label: usize) -> Option<usize> {
        self.by_user.insert(user, label)
    }

    /// Label of `user`, if present.
    #[must_use]
    pub fn get(&self, user: &UserId) -> Option<usize> {
        self.by_user.get(user).copied()
    }

    /// Number of labelled users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_user.len()
    }

    /// Whether no user is labelled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_user.is_empty()
    }
}

impl FromIterator<(UserId, usize)> for Labels {
    fn from_iter<I: IntoIterator<Item = (UserId, usize)>>(iter: I) -> Self {
        Self {
            by_user: iter.into_iter().collect(),
        }
    }
}

/// Column positions resolved from a CSV header by name.
pub(crate) struct Columns<'h> {
    path: &'h Path,
    header: &'h StringRecord,
}

impl<'h> Columns<'h> {
    pub(crate) fn new(path: &'h Path, header: &'h StringRecord) -> Self {
        Self { path, header }
    }

    pub(crate) fn optional(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h.trim() == name)
    }

    pub(crate) fn required(&self, name: &'static str) -> Result<usize, IoError> {
        self.optional(name).ok_or_else(|| IoError::MissingColumn {
            path: self.path.to_path_buf(),
            column: name,
        })
    }
}

/// Typed cell access with row context for error reporting.
pub(crate) struct Row<'r> {
    pub(crate) path: &'r Path,
    pub(crate) index: usize,
    pub(crate) record: &'r StringRecord,
}

impl Row<'_> {
    pub(crate) fn raw(&self, col: usize) -> &str {
        self.record.get(col).unwrap_or("").trim()
    }

    pub(crate) fn invalid(&self, col: usize, column: &'static str) -> IoError {
        IoError::InvalidValue {
            path: self.path.to_path_buf(),
            row_index: self.index,
            column,
            raw: self.raw(col).to_string(),
        }
    }

    pub(crate) fn text(&self, col: usize, column: &'static str) -> Result<&str, IoError> {
        let raw = self.raw(col);
        if raw.is_empty() {
            return Err(self.invalid(col, column));
        }
        Ok(raw)
    }

    pub(crate) fn parse<T: std::str::FromStr>(
        &self,
        col: usize,
        column: &'static str,
    ) -> Result<T, IoError> {
        self.raw(col).parse().map_err(|_| self.invalid(col, column))
    }

    /// `None` for an empty cell.
    pub(crate) fn parse_opt<T: std::str::FromStr>(
        &self,
        col: Option<usize>,
        column: &'static str,
    ) -> Result<Option<T>, IoError> {
        match col {
            Some(c) if !self.raw(c).is_empty() => self.parse(c, column).map(Some),
            _ => Ok(None),
        }
    }

    pub(crate) fn finite(&self, col: usize, column: &'static str) -> Result<f64, IoError> {
        let value: f64 = self.parse(col, column)?;
        if !value.is_finite() {
            return Err(self.invalid(col, column));
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use cyclewarp_features::{AsymmetryFeatures, Landmarks};

    use super::*;

    #[test]
    fn feature_row_derives_extra_columns() {
        let f = CycleFeatures {
            key: CycleKey::new(UserId::new("u7"), 2),
            landmarks: Landmarks {
                nadir_day: 12,
                nadir_temp_actual: -1.5,
                peak_day: 20,
                peak_temp_actual: 1.25,
            },
            asymmetry: AsymmetryFeatures {
                cost_with_diff: 0.5,
                path_length_with_diff: 0.25,
                pos_count_with_diff: -0.1,
            },
            dtw_distance: 4.0,
            data_length: 26,
            cycle_length: 29,
        };
        let row = FeatureRow::from(&f);
        assert_eq!(row.key, f.key);
        assert_eq!(row.values[8], 8.0);
        assert_eq!(row.values[9], 2.75);
        assert_eq!(row.values[11], 29.0);
    }

    #[test]
    fn labels_lookup() {
        let labels: Labels = [(UserId::new("a"), 1), (UserId::new("b"), 0)]
            .into_iter()
            .collect();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels.get(&UserId::new("a")), Some(1));
        assert_eq!(labels.get(&UserId::new("zz")), None);
    }
}

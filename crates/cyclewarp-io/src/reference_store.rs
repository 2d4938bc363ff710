//! JSON persistence of the reference ("model") cycle curve.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use cyclewarp_dtw::{PositionedCurve, ReferenceCurve};
use cyclewarp_features::UserId;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::IoError;

/// One user's averaged curve, kept alongside the reference for inspection.
///
/// Positions the user never covered are stored as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAveragedCurve {
    /// Contributing user.
    pub user: String,
    /// Element-wise mean of the user's standardized curves.
    pub user_averaged: Vec<Option<f64>>,
    /// Normalized position of each value.
    pub normal_positions: Vec<f64>,
}

impl UserAveragedCurve {
    /// Capture a [`PositionedCurve`] for `user`.
    pub fn new(user: &UserId, curve: &PositionedCurve) -> Self {
        Self {
            user: user.as_str().to_string(),
            user_averaged: curve
                .values
                .iter()
                .map(|v| v.is_finite().then_some(*v))
                .collect(),
            normal_positions: curve.positions.clone(),
        }
    }
}

/// The persisted reference document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceDocument {
    /// Free-form identifier of this reference.
    pub id: String,
    /// Reference curve values.
    pub model_cycle: Vec<f64>,
    /// Normalized position of each reference value.
    pub normal_positions: Vec<f64>,
    /// Users whose cycles defined the reference.
    pub model_users: Vec<String>,
    /// Per-user averaged curves the reference was built from.
    #[serde(default)]
    pub user_averaged: Vec<UserAveragedCurve>,
}

impl ReferenceDocument {
    /// Assemble a document from a built reference and its inputs.
    pub fn new(
        id: impl Into<String>,
        reference: &ReferenceCurve,
        user_averaged: Vec<UserAveragedCurve>,
    ) -> Self {
        Self {
            id: id.into(),
            model_cycle: reference.values().to_vec(),
            normal_positions: reference.positions().to_vec(),
            model_users: user_averaged.iter().map(|u| u.user.clone()).collect(),
            user_averaged,
        }
    }

    /// Users to exclude from feature extraction.
    #[must_use]
    pub fn model_users(&self) -> HashSet<UserId> {
        self.model_users.iter().map(UserId::new).collect()
    }
}

/// Reads and writes [`ReferenceDocument`]s at a fixed path.
pub struct ReferenceStore {
    path: PathBuf,
}

impl ReferenceStore {
    /// Create a store for `path`.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Serialize `doc` as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::OutputDirCreate`] | Parent directory cannot be created |
    /// | [`IoError::Json`] | Serialization fails |
    /// | [`IoError::WriteFile`] | File cannot be written |
    #[instrument(skip_all, fields(path = %self.path.display(), id = %doc.id))]
    pub fn save(&self, doc: &ReferenceDocument) -> Result<(), IoError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| IoError::OutputDirCreate {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let json = serde_json::to_string_pretty(doc).map_err(|e| IoError::Json {
            path: self.path.clone(),
            source: e,
        })?;
        fs::write(&self.path, json).map_err(|e| IoError::WriteFile {
            path: self.path.clone(),
            source: e,
        })?;
        info!(len = doc.model_cycle.len(), "reference saved");
        Ok(())
    }

    /// Load a document and validate its curve.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
    /// | [`IoError::Json`] | Malformed document |
    /// | [`IoError::InvalidReference`] | The curve fails [`ReferenceCurve`] validation |
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> Result<(ReferenceDocument, ReferenceCurve), IoError> {
        let text = fs::read_to_string(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;
        let doc: ReferenceDocument = serde_json::from_str(&text).map_err(|e| IoError::Json {
            path: self.path.clone(),
            source: e,
        })?;
        let curve =
            ReferenceCurve::with_positions(doc.model_cycle.clone(), doc.normal_positions.clone())
                .map_err(|e| IoError::InvalidReference {
                    path: self.path.clone(),
                    source: e,
                })?;
        info!(
            id = %doc.id,
            len = curve.len(),
            model_users = doc.model_users.len(),
            "reference loaded"
        );
        Ok((doc, curve))
    }
}

#[cfg(test)]
mod tests {
    use cyclewarp_dtw::DtwError;
    use tempfile::TempDir;

    use super::*;

    fn doc() -> ReferenceDocument {
        let reference = ReferenceCurve::new(vec![-1.0, -0.5, 0.25, 1.0, 0.5]).unwrap();
        let avg = PositionedCurve::uniform(vec![f64::NAN, -0.5, 0.25, 1.0, f64::NAN]);
        ReferenceDocument::new(
            "pilot",
            &reference,
            vec![UserAveragedCurve::new(&UserId::new("m1"), &avg)],
        )
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = ReferenceStore::new(&dir.path().join("model_cycle.json"));
        let original = doc();
        store.save(&original).unwrap();

        let (loaded, curve) = store.load().unwrap();
        assert_eq!(loaded, original);
        assert_eq!(curve.values(), &[-1.0, -0.5, 0.25, 1.0, 0.5]);
        assert!(loaded.model_users().contains(&UserId::new("m1")));
    }

    #[test]
    fn uncovered_user_positions_are_null() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ref.json");
        ReferenceStore::new(&path).save(&doc()).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["id"], "pilot");
        assert_eq!(json["model_users"][0], "m1");
        assert!(json["user_averaged"][0]["user_averaged"][0].is_null());
        assert_eq!(json["user_averaged"][0]["user_averaged"][1], -0.5);
        assert_eq!(json["normal_positions"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn short_curve_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ref.json");
        fs::write(
            &path,
            r#"{"id":"x","model_cycle":[1.0],"normal_positions":[0.0],"model_users":[]}"#,
        )
        .unwrap();
        let err = ReferenceStore::new(&path).load().unwrap_err();
        assert!(matches!(
            err,
            IoError::InvalidReference {
                source: DtwError::ReferenceTooShort { len: 1 },
                ..
            }
        ));
    }

    #[test]
    fn malformed_json_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ref.json");
        fs::write(&path, "{ not json").unwrap();
        let err = ReferenceStore::new(&path).load().unwrap_err();
        assert!(matches!(err, IoError::Json { .. }));
    }
}

//! File I/O, validation, and serialization for the cyclewarp pipeline.

mod align;
mod config;
mod domain;
mod error;
mod labels;
mod reader;
mod reference_store;
mod table;
mod writer;

pub use align::{LabeledData, join_labels};
pub use config::PipelineConfig;
pub use domain::{FEATURE_COLUMNS, FeatureRow, Labels};
pub use error::IoError;
pub use labels::LabelsReader;
pub use reader::ReadingsReader;
pub use reference_store::{ReferenceDocument, ReferenceStore, UserAveragedCurve};
pub use table::{FeatureTableReader, FeatureTableWriter};
pub use writer::{EvaluationReport, ResultWriter};

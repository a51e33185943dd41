mod artifact;

pub use artifact::ModelArtifact;

use std::path::{Path, PathBuf};

use crate::frame::Frame;

/// The capability the rest of the service depends on: label prediction and
/// per-class probabilities over a table of rows. The loaded artifact
/// provides it in production; tests inject deterministic stubs.
pub trait Predictor {
    fn predict(&self, frame: &Frame) -> Result<Vec<String>, PredictError>;
    fn predict_proba(&self, frame: &Frame) -> Result<Vec<Vec<f32>>, PredictError>;
}

/// Why a model artifact failed to load. Fatal to the session.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model artifact not found at {}", .0.display())]
    NotFound(PathBuf),
    #[error("model artifact path must be a file: {}", .0.display())]
    NotAFile(PathBuf),
    #[error("model artifact read error: {0}")]
    Io(#[from] std::io::Error),
    #[error("model artifact parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("model artifact is invalid: {0}")]
    Invalid(String),
}

/// Why a model call failed. Recoverable; the session stays usable.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PredictError {
    #[error("input is missing column {0:?}")]
    MissingColumn(String),
    #[error("row {row}: column {column:?} has non-numeric value {value:?}")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },
}

/// Deserialize the predictor from its artifact file. The schema the model
/// expects, its preprocessing, and its class labels all live inside the
/// artifact; this only checks that the document is structurally sound.
pub fn load_model(path: &Path) -> Result<ModelArtifact, ModelError> {
    if !path.exists() {
        return Err(ModelError::NotFound(path.to_path_buf()));
    }
    if path.is_dir() {
        return Err(ModelError::NotAFile(path.to_path_buf()));
    }

    let data = std::fs::read(path)?;
    let artifact: ModelArtifact = serde_json::from_slice(&data)?;
    artifact.validate().map_err(ModelError::Invalid)?;
    Ok(artifact)
}

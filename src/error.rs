//! Error taxonomy shared by artifact loading, inference and presentation.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias used throughout the library.
pub type Result<T, E = MedcostError> = std::result::Result<T, E>;

/// Failures surfaced by the estimator pipeline.
#[derive(Debug, Error)]
pub enum MedcostError {
    /// Artifact file is missing or unreadable.
    #[error("artifact {} unavailable: {source}", path.display())]
    ArtifactUnavailable {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Artifact file exists but does not decode.
    #[error("artifact {} is corrupt: {source}", path.display())]
    ArtifactCorrupt {
        /// Path that was requested.
        path: PathBuf,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },
    /// Artifact decoded but is internally inconsistent.
    #[error("invalid {artifact} artifact: {reason}")]
    InvalidArtifact {
        /// Which artifact failed validation.
        artifact: &'static str,
        /// Human readable reason.
        reason: String,
    },
    /// Artifact columns disagree with the feature vector layout.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),
    /// Strict constructor received a value outside its documented range.
    #[error("{field} value {value} is out of range")]
    OutOfRange {
        /// Offending field name.
        field: &'static str,
        /// Offending value.
        value: f64,
    },
    /// Model returned an empty prediction sequence.
    #[error("model returned no prediction")]
    EmptyPrediction,
    /// Model returned NaN or infinity.
    #[error("model produced non-finite prediction {0}")]
    NonFinitePrediction(f64),
    /// Simulated distribution parameters are unusable.
    #[error("invalid simulation settings: {0}")]
    InvalidSimulation(String),
    /// Chart backend failed while drawing.
    #[error("chart rendering failed: {0}")]
    ChartRender(String),
}

impl MedcostError {
    pub(crate) fn invalid(artifact: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArtifact {
            artifact,
            reason: reason.into(),
        }
    }
}

//! Inference adapter: scaler + ensemble behind a one-vector contract.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::{MedcostError, Result};
use crate::features::{FeatureVector, COLUMNS, N_FEATURES};
use crate::model::VotingRegressor;
use crate::scaler::StandardScaler;

/// Read-only pair of fitted artifacts, loaded once and shared.
#[derive(Debug, Clone)]
pub struct Predictor {
    scaler: StandardScaler,
    model: VotingRegressor,
}

impl Predictor {
    /// Loads both artifacts from JSON files and checks their schema.
    pub fn load(scaler_path: impl AsRef<Path>, model_path: impl AsRef<Path>) -> Result<Self> {
        let scaler: StandardScaler = read_artifact(scaler_path.as_ref())?;
        let model: VotingRegressor = read_artifact(model_path.as_ref())?;
        Self::new(scaler, model)
    }

    /// Builds a predictor from in-memory artifacts.
    ///
    /// Fails when either artifact is inconsistent or when its recorded
    /// column order differs from [`COLUMNS`].
    pub fn new(scaler: StandardScaler, model: VotingRegressor) -> Result<Self> {
        scaler.validate()?;
        check_columns("scaler", &scaler.feature_names)?;
        if let Some(names) = &model.feature_names {
            check_columns("model", names)?;
        }
        model.validate(N_FEATURES)?;
        Ok(Self { scaler, model })
    }

    /// Fitted scaler.
    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    /// Fitted ensemble.
    pub fn model(&self) -> &VotingRegressor {
        &self.model
    }

    /// Estimated cost for one feature vector.
    pub fn predict(&self, features: &FeatureVector) -> Result<f64> {
        let row = features.as_row();
        let scaled = self.scaler.transform(&row)?;
        let prediction = self
            .model
            .predict(&[scaled])
            .into_iter()
            .next()
            .ok_or(MedcostError::EmptyPrediction)?;
        if !prediction.is_finite() {
            return Err(MedcostError::NonFinitePrediction(prediction));
        }
        tracing::debug!(?row, prediction, "prediction computed");
        Ok(prediction)
    }
}

fn check_columns(artifact: &str, names: &[String]) -> Result<()> {
    if names.len() != COLUMNS.len() || names.iter().zip(COLUMNS).any(|(a, b)| a != b) {
        return Err(MedcostError::SchemaMismatch(format!(
            "{artifact} was fit on columns {names:?}, expected {COLUMNS:?}"
        )));
    }
    Ok(())
}

fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path).map_err(|source| MedcostError::ArtifactUnavailable {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| MedcostError::ArtifactCorrupt {
        path: path.to_path_buf(),
        source,
    })
}

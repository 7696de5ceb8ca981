//! Fitted standardization transform.

use serde::{Deserialize, Serialize};

use crate::error::{MedcostError, Result};

/// Per-feature `(x - mean) / scale` transform fitted on training data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    /// Column names in fit order.
    pub feature_names: Vec<String>,
    /// Per-column training mean.
    pub mean: Vec<f64>,
    /// Per-column training standard deviation.
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Checks that the fitted parameters are usable.
    pub fn validate(&self) -> Result<()> {
        let n = self.feature_names.len();
        if n == 0 {
            return Err(MedcostError::invalid("scaler", "no features"));
        }
        if self.mean.len() != n || self.scale.len() != n {
            return Err(MedcostError::invalid(
                "scaler",
                format!(
                    "{} feature names but {} means and {} scales",
                    n,
                    self.mean.len(),
                    self.scale.len()
                ),
            ));
        }
        if let Some(idx) = self
            .mean
            .iter()
            .chain(self.scale.iter())
            .position(|value| !value.is_finite())
        {
            return Err(MedcostError::invalid(
                "scaler",
                format!("non-finite parameter at position {idx}"),
            ));
        }
        if self.scale.iter().any(|scale| *scale < 0.0) {
            return Err(MedcostError::invalid("scaler", "negative scale"));
        }
        Ok(())
    }

    /// Number of columns the scaler was fit on.
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Standardizes one row.
    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>> {
        if row.len() != self.n_features() {
            return Err(MedcostError::SchemaMismatch(format!(
                "scaler expects {} features, got {}",
                self.n_features(),
                row.len()
            )));
        }
        Ok(row
            .iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(value, (mean, scale))| {
                // Constant training columns have zero variance; leave them unscaled.
                let scale = if *scale == 0.0 { 1.0 } else { *scale };
                (value - mean) / scale
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scaler() -> StandardScaler {
        StandardScaler {
            feature_names: vec!["a".into(), "b".into(), "c".into()],
            mean: vec![10.0, 0.5, 3.0],
            scale: vec![2.0, 0.5, 0.0],
        }
    }

    #[test]
    fn standardizes_each_column() {
        let scaled = scaler().transform(&[14.0, 0.0, 5.0]).expect("transform");
        assert_eq!(scaled, vec![2.0, -1.0, 2.0]);
    }

    #[test]
    fn rejects_wrong_width() {
        let err = scaler().transform(&[1.0, 2.0]).expect_err("width");
        assert!(matches!(err, MedcostError::SchemaMismatch(_)));
    }

    #[test]
    fn validation_catches_inconsistent_parameters() {
        assert!(scaler().validate().is_ok());

        let mut short = scaler();
        short.mean.pop();
        assert!(short.validate().is_err());

        let mut nan = scaler();
        nan.scale[1] = f64::NAN;
        assert!(nan.validate().is_err());

        let mut negative = scaler();
        negative.scale[0] = -1.0;
        assert!(negative.validate().is_err());
    }
}

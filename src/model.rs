//! Pre-trained voting ensemble and the regressors it combines.
//!
//! Estimators are stored in the same array-oriented layout scikit-learn uses
//! internally (parallel node arrays for trees, coefficient vectors for linear
//! models), so exported artifacts map onto these types field for field.

use serde::{Deserialize, Serialize};

use crate::error::{MedcostError, Result};

const LEAF: i64 = -1;

/// Single-output regressor over a standardized row.
pub trait Regressor {
    /// Predicts one value. `row` must already be validated for width.
    fn predict_row(&self, row: &[f64]) -> f64;

    /// Checks internal consistency against the expected row width.
    fn validate(&self, n_features: usize) -> Result<()>;
}

/// Ordinary least squares / ridge style linear model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegressor {
    /// One weight per feature.
    pub coef: Vec<f64>,
    /// Bias term.
    pub intercept: f64,
}

impl Regressor for LinearRegressor {
    fn predict_row(&self, row: &[f64]) -> f64 {
        self.intercept
            + self
                .coef
                .iter()
                .zip(row.iter())
                .map(|(weight, value)| weight * value)
                .sum::<f64>()
    }

    fn validate(&self, n_features: usize) -> Result<()> {
        if self.coef.len() != n_features {
            return Err(MedcostError::SchemaMismatch(format!(
                "linear estimator has {} coefficients, expected {n_features}",
                self.coef.len()
            )));
        }
        if !self.intercept.is_finite() || self.coef.iter().any(|c| !c.is_finite()) {
            return Err(MedcostError::invalid("model", "non-finite linear parameter"));
        }
        Ok(())
    }
}

/// Binary regression tree in parallel-array form.
///
/// Node 0 is the root. A node is a leaf when both children are `-1`;
/// otherwise rows go left when `row[feature] <= threshold`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    /// Left child index per node.
    pub children_left: Vec<i64>,
    /// Right child index per node.
    pub children_right: Vec<i64>,
    /// Split feature per node (ignored for leaves).
    pub feature: Vec<i64>,
    /// Split threshold per node (ignored for leaves).
    pub threshold: Vec<f64>,
    /// Leaf output per node.
    pub value: Vec<f64>,
}

impl DecisionTree {
    fn node_count(&self) -> usize {
        self.children_left.len()
    }

    fn is_leaf(&self, node: usize) -> bool {
        self.children_left[node] == LEAF
    }
}

impl Regressor for DecisionTree {
    fn predict_row(&self, row: &[f64]) -> f64 {
        let mut node = 0usize;
        while !self.is_leaf(node) {
            let feature = self.feature[node] as usize;
            node = if row[feature] <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        self.value[node]
    }

    fn validate(&self, n_features: usize) -> Result<()> {
        let n = self.node_count();
        if n == 0 {
            return Err(MedcostError::invalid("model", "decision tree has no nodes"));
        }
        if [
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
            self.value.len(),
        ]
        .iter()
        .any(|len| *len != n)
        {
            return Err(MedcostError::invalid(
                "model",
                "decision tree node arrays differ in length",
            ));
        }
        for node in 0..n {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == LEAF || right == LEAF {
                if left != right {
                    return Err(MedcostError::invalid(
                        "model",
                        format!("node {node} has exactly one child"),
                    ));
                }
                if !self.value[node].is_finite() {
                    return Err(MedcostError::invalid(
                        "model",
                        format!("leaf {node} has non-finite value"),
                    ));
                }
                continue;
            }
            // Children must point forward, which rules out cycles.
            for child in [left, right] {
                if child <= node as i64 || child >= n as i64 {
                    return Err(MedcostError::invalid(
                        "model",
                        format!("node {node} has invalid child {child}"),
                    ));
                }
            }
            let feature = self.feature[node];
            if feature < 0 || feature as usize >= n_features {
                return Err(MedcostError::SchemaMismatch(format!(
                    "tree node {node} splits on feature {feature}, expected < {n_features}"
                )));
            }
        }
        Ok(())
    }
}

/// Bagged trees averaged together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    /// Member trees.
    pub trees: Vec<DecisionTree>,
}

impl Regressor for RandomForest {
    fn predict_row(&self, row: &[f64]) -> f64 {
        let total: f64 = self.trees.iter().map(|tree| tree.predict_row(row)).sum();
        total / self.trees.len() as f64
    }

    fn validate(&self, n_features: usize) -> Result<()> {
        if self.trees.is_empty() {
            return Err(MedcostError::invalid("model", "random forest has no trees"));
        }
        self.trees
            .iter()
            .try_for_each(|tree| tree.validate(n_features))
    }
}

/// Additive boosted trees on top of a constant initial prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoosting {
    /// Initial (prior) prediction.
    pub init: f64,
    /// Shrinkage applied to each stage.
    pub learning_rate: f64,
    /// Stage trees in fit order.
    pub trees: Vec<DecisionTree>,
}

impl Regressor for GradientBoosting {
    fn predict_row(&self, row: &[f64]) -> f64 {
        self.init
            + self.learning_rate
                * self
                    .trees
                    .iter()
                    .map(|tree| tree.predict_row(row))
                    .sum::<f64>()
    }

    fn validate(&self, n_features: usize) -> Result<()> {
        if !self.init.is_finite() || !self.learning_rate.is_finite() {
            return Err(MedcostError::invalid(
                "model",
                "non-finite gradient boosting parameter",
            ));
        }
        self.trees
            .iter()
            .try_for_each(|tree| tree.validate(n_features))
    }
}

/// Any estimator that may sit inside the voting ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Estimator {
    /// Linear model.
    Linear(LinearRegressor),
    /// Single regression tree.
    DecisionTree(DecisionTree),
    /// Averaged trees.
    RandomForest(RandomForest),
    /// Boosted trees.
    GradientBoosting(GradientBoosting),
}

impl Estimator {
    fn as_regressor(&self) -> &dyn Regressor {
        match self {
            Estimator::Linear(model) => model,
            Estimator::DecisionTree(model) => model,
            Estimator::RandomForest(model) => model,
            Estimator::GradientBoosting(model) => model,
        }
    }
}

/// Named ensemble member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedEstimator {
    /// Member name, used in logs.
    pub name: String,
    /// Member model.
    #[serde(flatten)]
    pub estimator: Estimator,
}

/// Ensemble that averages (optionally weighted) member predictions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VotingRegressor {
    /// Column names the ensemble was fit on, when recorded.
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    /// Member weights; `None` means equal weighting.
    #[serde(default)]
    pub weights: Option<Vec<f64>>,
    /// Ensemble members.
    pub estimators: Vec<NamedEstimator>,
}

impl VotingRegressor {
    /// Checks every member against the expected row width.
    pub fn validate(&self, n_features: usize) -> Result<()> {
        if self.estimators.is_empty() {
            return Err(MedcostError::invalid("model", "voting ensemble is empty"));
        }
        if let Some(weights) = &self.weights {
            if weights.len() != self.estimators.len() {
                return Err(MedcostError::invalid(
                    "model",
                    format!(
                        "{} weights for {} estimators",
                        weights.len(),
                        self.estimators.len()
                    ),
                ));
            }
            if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
                return Err(MedcostError::invalid("model", "weights must be non-negative"));
            }
            if weights.iter().sum::<f64>() <= 0.0 {
                return Err(MedcostError::invalid("model", "weights sum to zero"));
            }
        }
        for member in &self.estimators {
            member
                .estimator
                .as_regressor()
                .validate(n_features)
                .map_err(|err| match err {
                    MedcostError::InvalidArtifact { artifact, reason } => {
                        MedcostError::InvalidArtifact {
                            artifact,
                            reason: format!("estimator '{}': {reason}", member.name),
                        }
                    }
                    other => other,
                })?;
        }
        Ok(())
    }

    /// Predicts one value per row.
    pub fn predict(&self, rows: &[Vec<f64>]) -> Vec<f64> {
        rows.iter().map(|row| self.predict_row(row)).collect()
    }

    fn predict_row(&self, row: &[f64]) -> f64 {
        let outputs = self
            .estimators
            .iter()
            .map(|member| member.estimator.as_regressor().predict_row(row));
        match &self.weights {
            Some(weights) => {
                let total: f64 = weights.iter().sum();
                outputs.zip(weights).map(|(p, w)| p * w).sum::<f64>() / total
            }
            None => outputs.sum::<f64>() / self.estimators.len() as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(feature: i64, threshold: f64, left: f64, right: f64) -> DecisionTree {
        DecisionTree {
            children_left: vec![1, -1, -1],
            children_right: vec![2, -1, -1],
            feature: vec![feature, -2, -2],
            threshold: vec![threshold, -2.0, -2.0],
            value: vec![0.0, left, right],
        }
    }

    #[test]
    fn tree_routes_on_threshold() {
        let tree = stump(1, 0.5, 10.0, 20.0);
        assert_eq!(tree.predict_row(&[0.0, 0.5]), 10.0);
        assert_eq!(tree.predict_row(&[0.0, 0.6]), 20.0);
    }

    #[test]
    fn tree_validation_rejects_backward_edges() {
        let mut tree = stump(0, 0.0, 1.0, 2.0);
        tree.children_right[0] = 0;
        assert!(tree.validate(2).is_err());

        let tree = stump(3, 0.0, 1.0, 2.0);
        assert!(matches!(
            tree.validate(2),
            Err(MedcostError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn boosting_and_forest_combine_trees() {
        let forest = RandomForest {
            trees: vec![stump(0, 0.0, 1.0, 3.0), stump(0, 0.0, 5.0, 7.0)],
        };
        assert_eq!(forest.predict_row(&[1.0]), 5.0);

        let boosting = GradientBoosting {
            init: 100.0,
            learning_rate: 0.1,
            trees: vec![stump(0, 0.0, -10.0, 10.0), stump(0, 0.0, -20.0, 20.0)],
        };
        assert!((boosting.predict_row(&[-1.0]) - 97.0).abs() < 1e-9);
    }

    #[test]
    fn voting_averages_members() {
        let ensemble = VotingRegressor {
            feature_names: None,
            weights: None,
            estimators: vec![
                NamedEstimator {
                    name: "lr".into(),
                    estimator: Estimator::Linear(LinearRegressor {
                        coef: vec![2.0, 0.0],
                        intercept: 1.0,
                    }),
                },
                NamedEstimator {
                    name: "dt".into(),
                    estimator: Estimator::DecisionTree(stump(1, 0.0, 4.0, 8.0)),
                },
            ],
        };
        ensemble.validate(2).expect("valid");
        assert_eq!(ensemble.predict(&[vec![1.0, 1.0], vec![0.0, -1.0]]), vec![5.5, 2.5]);

        let weighted = VotingRegressor {
            weights: Some(vec![3.0, 1.0]),
            ..ensemble
        };
        weighted.validate(2).expect("valid");
        assert_eq!(weighted.predict(&[vec![1.0, 1.0]]), vec![(9.0 + 8.0) / 4.0]);
    }

    #[test]
    fn voting_validation_names_the_member() {
        let ensemble = VotingRegressor {
            feature_names: None,
            weights: None,
            estimators: vec![NamedEstimator {
                name: "rf".into(),
                estimator: Estimator::RandomForest(RandomForest { trees: Vec::new() }),
            }],
        };
        let err = ensemble.validate(6).expect_err("empty forest");
        assert!(err.to_string().contains("estimator 'rf'"));
    }

    #[test]
    fn estimators_decode_from_tagged_json() {
        let json = r#"{
            "weights": [1.0],
            "estimators": [
                {"name": "lr", "kind": "linear", "coef": [1.0, 2.0], "intercept": 0.5}
            ]
        }"#;
        let ensemble: VotingRegressor = serde_json::from_str(json).expect("decode");
        assert!(ensemble.feature_names.is_none());
        assert_eq!(ensemble.predict(&[vec![1.0, 1.0]]), vec![3.5]);
    }
}

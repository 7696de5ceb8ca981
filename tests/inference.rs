use std::fs;

use medcost::features::AGE_MAX;
use medcost::{
    format_currency, FeatureVector, MedcostError, Predictor, Region, Sex, Smoker,
};

const SCALER: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/artifacts/scaler_no_log.json");
const MODEL: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/artifacts/voting_regressor_no_log.json"
);

fn predictor() -> Predictor {
    Predictor::load(SCALER, MODEL).expect("shipped artifacts load")
}

#[test]
fn example_scenario_matches_reference_value() {
    let features = FeatureVector::new(30, 25.0, 0, Sex::Male, Smoker::No, Region::Northeast)
        .expect("features");
    assert_eq!(features.as_row(), [30.0, 0.0, 0.0, 0.0, 25.0, 1.0]);
    let prediction = predictor().predict(&features).expect("predict");
    assert!((prediction - 6149.835998664).abs() < 1e-6, "got {prediction}");
    assert_eq!(format_currency(prediction), "$6,149.84");
}

#[test]
fn smoking_raises_the_estimate() {
    let predictor = predictor();
    let non_smoker = FeatureVector::new(30, 25.0, 0, Sex::Male, Smoker::No, Region::Northeast)
        .expect("features");
    let smoker = FeatureVector::new(30, 25.0, 0, Sex::Male, Smoker::Yes, Region::Northeast)
        .expect("features");
    let base = predictor.predict(&non_smoker).expect("predict");
    let raised = predictor.predict(&smoker).expect("predict");
    assert!(raised > base + 10_000.0, "{raised} vs {base}");
}

#[test]
fn in_range_inputs_yield_finite_estimates() {
    let predictor = predictor();
    for age in [0, 30, 64, AGE_MAX] {
        for bmi in [0.0, 18.5, 30.0, 45.2, 100.0] {
            for children in [0, 10] {
                for sex in Sex::ALL {
                    for smoker in Smoker::ALL {
                        for region in Region::ALL {
                            let features =
                                FeatureVector::new(age, bmi, children, *sex, *smoker, *region)
                                    .expect("in range");
                            let prediction = predictor.predict(&features).expect("predict");
                            assert!(prediction.is_finite(), "{features:?} -> {prediction}");
                        }
                    }
                }
            }
        }
    }
}

#[test]
fn repeated_predictions_are_identical() {
    let predictor = predictor();
    let features = FeatureVector::new(47, 33.3, 2, Sex::Female, Smoker::Yes, Region::Southeast)
        .expect("features");
    let first = predictor.predict(&features).expect("predict");
    for _ in 0..10 {
        let again = predictor.predict(&features).expect("predict");
        assert_eq!(first.to_bits(), again.to_bits());
    }
}

#[test]
fn missing_artifact_is_unavailable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = Predictor::load(dir.path().join("nope.json"), MODEL).expect_err("missing");
    assert!(matches!(err, MedcostError::ArtifactUnavailable { .. }), "{err}");
}

#[test]
fn truncated_artifact_is_corrupt() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("model.json");
    let full = fs::read_to_string(MODEL).expect("read model");
    fs::write(&path, &full[..full.len() / 2]).expect("write truncated");
    let err = Predictor::load(SCALER, &path).expect_err("corrupt");
    assert!(matches!(err, MedcostError::ArtifactCorrupt { .. }), "{err}");
}

#[test]
fn reordered_scaler_columns_are_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("scaler.json");
    let mut scaler: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(SCALER).expect("read scaler")).expect("json");
    scaler["feature_names"] = serde_json::json!(["age", "bmi", "children", "smoker", "region", "sex"]);
    fs::write(&path, scaler.to_string()).expect("write scaler");
    let err = Predictor::load(&path, MODEL).expect_err("schema mismatch");
    assert!(matches!(err, MedcostError::SchemaMismatch(_)), "{err}");
}

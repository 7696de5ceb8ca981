//! Presentation-ready view of one prediction.

use serde::{Deserialize, Serialize};

use crate::features::{FeatureVector, Smoker};

/// BMI above which the obesity advisory is shown.
pub const OBESITY_BMI_THRESHOLD: f64 = 30.0;

/// Conditional banner shown under the estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Advisory {
    /// Shown for smokers.
    QuitSmoking,
    /// Shown when BMI exceeds [`OBESITY_BMI_THRESHOLD`].
    Obesity,
}

impl Advisory {
    /// Banner copy.
    pub fn message(self) -> &'static str {
        match self {
            Advisory::QuitSmoking => {
                "🚭 Pertimbangkan untuk berhenti merokok untuk mengurangi risiko kesehatan."
            }
            Advisory::Obesity => {
                "⚠️ BMI Anda menunjukkan obesitas. Pertimbangkan program diet atau olahraga."
            }
        }
    }
}

/// Advisories triggered by the raw inputs, smoking first.
pub fn advisories(features: &FeatureVector) -> Vec<Advisory> {
    let mut out = Vec::with_capacity(2);
    if features.smoker() == Smoker::Yes {
        out.push(Advisory::QuitSmoking);
    }
    if features.bmi() > OBESITY_BMI_THRESHOLD {
        out.push(Advisory::Obesity);
    }
    out
}

/// One bar of the raw-input chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InputBar {
    /// Axis label.
    pub label: &'static str,
    /// Raw (unscaled) value.
    pub value: f64,
}

/// Raw input values in chart order.
pub fn input_bars(features: &FeatureVector) -> [InputBar; 6] {
    [
        InputBar {
            label: "Usia",
            value: features.age() as f64,
        },
        InputBar {
            label: "Jumlah Anak",
            value: features.children() as f64,
        },
        InputBar {
            label: "BMI",
            value: features.bmi(),
        },
        InputBar {
            label: "Status Merokok",
            value: features.smoker().code() as f64,
        },
        InputBar {
            label: "Wilayah",
            value: features.region().code() as f64,
        },
        InputBar {
            label: "Jenis Kelamin",
            value: features.sex().code() as f64,
        },
    ]
}

/// Dollar amount with thousands separators and two decimals.
pub fn format_currency(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, digit) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if value.is_sign_negative() && value != 0.0 {
        "-"
    } else {
        ""
    };
    format!("${sign}{grouped}.{cents}")
}

/// Everything the page and the JSON API show for one submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// Inputs the estimate was computed from.
    pub features: FeatureVector,
    /// Raw model output.
    pub prediction: f64,
    /// `prediction` formatted for display.
    pub formatted: String,
    /// Triggered advisories.
    pub advisories: Vec<Advisory>,
    /// Raw-input chart data.
    pub bars: [InputBar; 6],
}

impl Report {
    /// Assembles the report for a prediction.
    pub fn new(features: FeatureVector, prediction: f64) -> Self {
        Self {
            prediction,
            formatted: format_currency(prediction),
            advisories: advisories(&features),
            bars: input_bars(&features),
            features,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{Region, Sex};
    use pretty_assertions::assert_eq;

    fn features(bmi: f64, smoker: Smoker) -> FeatureVector {
        FeatureVector::new(30, bmi, 0, Sex::Male, smoker, Region::Northeast).expect("valid")
    }

    #[test]
    fn currency_has_separators_and_two_decimals() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(999.994), "$999.99");
        assert_eq!(format_currency(1000.0), "$1,000.00");
        assert_eq!(format_currency(4_169.567), "$4,169.57");
        assert_eq!(format_currency(12_345_678.9), "$12,345,678.90");
        assert_eq!(format_currency(-1_234.5), "$-1,234.50");
        assert_eq!(format_currency(999_999.999), "$1,000,000.00");
    }

    #[test]
    fn advisories_follow_thresholds() {
        assert_eq!(advisories(&features(25.0, Smoker::No)), Vec::<Advisory>::new());
        assert_eq!(
            advisories(&features(25.0, Smoker::Yes)),
            vec![Advisory::QuitSmoking]
        );
        assert_eq!(advisories(&features(30.0, Smoker::No)), Vec::<Advisory>::new());
        assert_eq!(
            advisories(&features(30.1, Smoker::No)),
            vec![Advisory::Obesity]
        );
        assert_eq!(
            advisories(&features(42.0, Smoker::Yes)),
            vec![Advisory::QuitSmoking, Advisory::Obesity]
        );
    }

    #[test]
    fn bars_use_raw_values_in_chart_order() {
        let features =
            FeatureVector::new(52, 31.5, 2, Sex::Female, Smoker::Yes, Region::Southwest)
                .expect("valid");
        let bars = input_bars(&features);
        let labels: Vec<&str> = bars.iter().map(|bar| bar.label).collect();
        assert_eq!(
            labels,
            vec![
                "Usia",
                "Jumlah Anak",
                "BMI",
                "Status Merokok",
                "Wilayah",
                "Jenis Kelamin"
            ]
        );
        let values: Vec<f64> = bars.iter().map(|bar| bar.value).collect();
        assert_eq!(values, vec![52.0, 2.0, 31.5, 1.0, 3.0, 0.0]);
    }
}

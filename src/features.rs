//! Feature vector assembled from one form submission.
//!
//! Categorical selectors carry display labels; the model sees small integer
//! codes. Column order is fixed to the order the shipped artifacts were fit
//! with and is checked against artifact metadata at load time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{MedcostError, Result};

/// Column order expected by the scaler and the model.
pub const COLUMNS: [&str; 6] = ["age", "children", "smoker", "region", "bmi", "sex"];

/// Number of model features.
pub const N_FEATURES: usize = COLUMNS.len();

/// Upper bound for age in years.
pub const AGE_MAX: u32 = 120;
/// Upper bound for body-mass index.
pub const BMI_MAX: f64 = 100.0;
/// Upper bound for number of dependents.
pub const CHILDREN_MAX: u32 = 10;

/// Age pre-filled in the form.
pub const DEFAULT_AGE: u32 = 30;
/// BMI pre-filled in the form.
pub const DEFAULT_BMI: f64 = 25.0;
/// Dependents pre-filled in the form.
pub const DEFAULT_CHILDREN: u32 = 0;

/// Error returned when a label does not name any option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLabel {
    field: &'static str,
    label: String,
}

impl fmt::Display for UnknownLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} option '{}'", self.field, self.label)
    }
}

impl std::error::Error for UnknownLabel {}

macro_rules! coded_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $($(#[$vmeta:meta])* $variant:ident = ($code:tt, $label:tt)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            /// Every option in selector order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Integer code fed to the model.
            pub fn code(self) -> u8 {
                match self {
                    $($name::$variant => $code,)+
                }
            }

            /// Option whose code matches, if any.
            pub fn from_code(code: u8) -> Option<Self> {
                match code {
                    $($code => Some($name::$variant),)+
                    _ => None,
                }
            }

            /// Label shown in the selector.
            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownLabel;

            fn from_str(input: &str) -> Result<Self, Self::Err> {
                let trimmed = input.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|option| option.label().eq_ignore_ascii_case(trimmed))
                    .ok_or_else(|| UnknownLabel {
                        field: $field,
                        label: trimmed.to_string(),
                    })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

coded_enum! {
    /// Sex selector.
    Sex, "sex" {
        /// Male.
        Male = (1, "Laki-laki"),
        /// Female.
        Female = (0, "Perempuan"),
    }
}

coded_enum! {
    /// Smoking status selector.
    Smoker, "smoker" {
        /// Smokes.
        Yes = (1, "Ya"),
        /// Does not smoke.
        No = (0, "Tidak"),
    }
}

coded_enum! {
    /// Residential region selector.
    Region, "region" {
        /// Northeast.
        Northeast = (0, "Northeast"),
        /// Northwest.
        Northwest = (1, "Northwest"),
        /// Southeast.
        Southeast = (2, "Southeast"),
        /// Southwest.
        Southwest = (3, "Southwest"),
    }
}

/// Six validated attributes describing one prediction request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector {
    age: u32,
    bmi: f64,
    children: u32,
    sex: Sex,
    smoker: Smoker,
    region: Region,
}

impl FeatureVector {
    /// Strict constructor; rejects values outside the documented ranges.
    pub fn new(
        age: u32,
        bmi: f64,
        children: u32,
        sex: Sex,
        smoker: Smoker,
        region: Region,
    ) -> Result<Self> {
        if age > AGE_MAX {
            return Err(MedcostError::OutOfRange {
                field: "age",
                value: age as f64,
            });
        }
        if !bmi.is_finite() || !(0.0..=BMI_MAX).contains(&bmi) {
            return Err(MedcostError::OutOfRange {
                field: "bmi",
                value: bmi,
            });
        }
        if children > CHILDREN_MAX {
            return Err(MedcostError::OutOfRange {
                field: "children",
                value: children as f64,
            });
        }
        Ok(Self {
            age,
            bmi,
            children,
            sex,
            smoker,
            region,
        })
    }

    /// Age in years.
    pub fn age(&self) -> u32 {
        self.age
    }

    /// Body-mass index.
    pub fn bmi(&self) -> f64 {
        self.bmi
    }

    /// Number of dependents.
    pub fn children(&self) -> u32 {
        self.children
    }

    /// Sex option.
    pub fn sex(&self) -> Sex {
        self.sex
    }

    /// Smoking option.
    pub fn smoker(&self) -> Smoker {
        self.smoker
    }

    /// Region option.
    pub fn region(&self) -> Region {
        self.region
    }

    /// Values in [`COLUMNS`] order.
    pub fn as_row(&self) -> [f64; N_FEATURES] {
        [
            self.age as f64,
            self.children as f64,
            self.smoker.code() as f64,
            self.region.code() as f64,
            self.bmi,
            self.sex.code() as f64,
        ]
    }
}

/// Raw form submission; every field falls back to the form default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormInput {
    /// Age in years, clamped to `0..=120`.
    #[serde(deserialize_with = "age_or_default")]
    pub age: i64,
    /// BMI, clamped to `0.0..=100.0`.
    #[serde(deserialize_with = "bmi_or_default")]
    pub bmi: f64,
    /// Dependents, clamped to `0..=10`.
    #[serde(deserialize_with = "children_or_default")]
    pub children: i64,
    /// Sex selector.
    pub sex: Sex,
    /// Smoking selector.
    pub smoker: Smoker,
    /// Region selector.
    pub region: Region,
}

impl Default for FormInput {
    fn default() -> Self {
        // Selectors default to their first option.
        Self {
            age: DEFAULT_AGE as i64,
            bmi: DEFAULT_BMI,
            children: DEFAULT_CHILDREN as i64,
            sex: Sex::ALL[0],
            smoker: Smoker::ALL[0],
            region: Region::ALL[0],
        }
    }
}

/// A number as JSON sends it, or as text from a query string.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberField<T> {
    Number(T),
    Text(String),
}

/// Blank or unparsable text yields `None` so the field falls back to its default.
fn lenient_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
{
    Ok(match NumberField::<T>::deserialize(deserializer)? {
        NumberField::Number(value) => Some(value),
        NumberField::Text(text) => text.trim().parse().ok(),
    })
}

fn age_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    Ok(lenient_number(deserializer)?.unwrap_or(DEFAULT_AGE as i64))
}

fn bmi_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(lenient_number(deserializer)?.unwrap_or(DEFAULT_BMI))
}

fn children_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    Ok(lenient_number(deserializer)?.unwrap_or(DEFAULT_CHILDREN as i64))
}

impl FormInput {
    /// Builds the feature vector, clamping numbers the way bounded widgets do.
    pub fn to_features(&self) -> FeatureVector {
        let bmi = if self.bmi.is_finite() {
            self.bmi.clamp(0.0, BMI_MAX)
        } else {
            DEFAULT_BMI
        };
        FeatureVector {
            age: self.age.clamp(0, AGE_MAX as i64) as u32,
            bmi,
            children: self.children.clamp(0, CHILDREN_MAX as i64) as u32,
            sex: self.sex,
            smoker: self.smoker,
            region: self.region,
        }
    }
}

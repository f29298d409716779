use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::codec::CategoricalField;
use crate::records::{FeatureField, PatientRecord, FEATURE_COUNT};

/// How oldpeak enters the feature vector.
///
/// `Truncate` drops the fractional part, which is what predictions have
/// always been computed with. `Exact` keeps the measured decimal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OldpeakMode {
    #[default]
    Truncate,
    Exact,
}

impl OldpeakMode {
    pub fn apply(self, oldpeak: f64) -> f64 {
        match self {
            OldpeakMode::Truncate => oldpeak.trunc(),
            OldpeakMode::Exact => oldpeak,
        }
    }
}

impl fmt::Display for OldpeakMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OldpeakMode::Truncate => f.write_str("truncate"),
            OldpeakMode::Exact => f.write_str("exact"),
        }
    }
}

/// The classifier input: one value per [`FeatureField`], in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    /// Encodes the categorical fields and lays every value out in model order.
    /// Inputs are trusted; bounds are checked upstream.
    pub fn assemble(record: &PatientRecord, oldpeak: OldpeakMode) -> Self {
        let mut values = [0.0; FEATURE_COUNT];
        for field in FeatureField::ALL {
            values[field.index()] = match field {
                FeatureField::Age => f64::from(record.age),
                FeatureField::Sex => f64::from(record.sex.code()),
                FeatureField::ChestPainType => f64::from(record.chest_pain_type.code()),
                FeatureField::RestingBp => f64::from(record.resting_bp),
                FeatureField::Cholesterol => f64::from(record.cholesterol),
                FeatureField::FastingBs => f64::from(record.fasting_bs.code()),
                FeatureField::RestingEcg => f64::from(record.resting_ecg.code()),
                FeatureField::MaxHeartRate => f64::from(record.max_heart_rate),
                FeatureField::ExerciseAngina => f64::from(record.exercise_angina.code()),
                FeatureField::Oldpeak => oldpeak.apply(record.oldpeak),
                FeatureField::Slope => f64::from(record.slope.code()),
                FeatureField::MajorVessels => f64::from(record.major_vessels),
                FeatureField::Thal => f64::from(record.thal.code()),
            };
        }
        FeatureVector(values)
    }

    pub fn get(&self, field: FeatureField) -> f64 {
        self.0[field.index()]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Single-row matrix in the layout smartcore estimators predict on.
    pub fn to_matrix(&self) -> DenseMatrix<f64> {
        DenseMatrix::new(1, FEATURE_COUNT, self.0.to_vec(), false)
    }
}

impl From<[f64; FEATURE_COUNT]> for FeatureVector {
    fn from(values: [f64; FEATURE_COUNT]) -> Self {
        FeatureVector(values)
    }
}

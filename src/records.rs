use serde::{Deserialize, Serialize};

use crate::codec::{
    ChestPainType, ExerciseAngina, FastingBloodSugar, Field, RestingEcg, Sex, Slope, Thal,
};
use crate::error::{HeartError, Result};

/// Number of values the classifier consumes.
pub const FEATURE_COUNT: usize = 13;

/// The clinical attributes, declared in the order the classifier was trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureField {
    Age,
    Sex,
    ChestPainType,
    RestingBp,
    Cholesterol,
    FastingBs,
    RestingEcg,
    MaxHeartRate,
    ExerciseAngina,
    Oldpeak,
    Slope,
    MajorVessels,
    Thal,
}

/// Inclusive bounds of a numeric field, as enforced by the input controls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericBounds {
    pub min: f64,
    pub max: f64,
    pub integer: bool,
}

impl NumericBounds {
    const fn integer(min: f64, max: f64) -> Self {
        NumericBounds {
            min,
            max,
            integer: true,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl FeatureField {
    pub const ALL: [FeatureField; FEATURE_COUNT] = [
        FeatureField::Age,
        FeatureField::Sex,
        FeatureField::ChestPainType,
        FeatureField::RestingBp,
        FeatureField::Cholesterol,
        FeatureField::FastingBs,
        FeatureField::RestingEcg,
        FeatureField::MaxHeartRate,
        FeatureField::ExerciseAngina,
        FeatureField::Oldpeak,
        FeatureField::Slope,
        FeatureField::MajorVessels,
        FeatureField::Thal,
    ];

    /// Position in the feature vector.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Column / form key.
    pub fn key(self) -> &'static str {
        match self {
            FeatureField::Age => "age",
            FeatureField::Sex => "sex",
            FeatureField::ChestPainType => "chest_pain_type",
            FeatureField::RestingBp => "resting_bp",
            FeatureField::Cholesterol => "cholesterol",
            FeatureField::FastingBs => "fasting_bs",
            FeatureField::RestingEcg => "resting_ecg",
            FeatureField::MaxHeartRate => "max_heart_rate",
            FeatureField::ExerciseAngina => "exercise_angina",
            FeatureField::Oldpeak => "oldpeak",
            FeatureField::Slope => "slope",
            FeatureField::MajorVessels => "major_vessels",
            FeatureField::Thal => "thal",
        }
    }

    /// Caption shown next to the input.
    pub fn display_name(self) -> &'static str {
        match self {
            FeatureField::Age => "Age",
            FeatureField::Sex => "Sex",
            FeatureField::ChestPainType => "Chest Pain Type",
            FeatureField::RestingBp => "Resting Blood Pressure",
            FeatureField::Cholesterol => "Serum Cholestoral in mg/dl",
            FeatureField::FastingBs => "Fasting Blood Sugar > 120 mg/dl",
            FeatureField::RestingEcg => "Resting ECG",
            FeatureField::MaxHeartRate => "Maximum Heart Rate Achieved",
            FeatureField::ExerciseAngina => "Exercise Induced Angina",
            FeatureField::Oldpeak => "Oldpeak",
            FeatureField::Slope => "Slope",
            FeatureField::MajorVessels => "Number of Major Vessels",
            FeatureField::Thal => "Thal",
        }
    }

    /// The codec table for categorical fields, `None` for numeric ones.
    pub fn categorical(self) -> Option<Field> {
        match self {
            FeatureField::Sex => Some(Field::Sex),
            FeatureField::ChestPainType => Some(Field::ChestPainType),
            FeatureField::FastingBs => Some(Field::FastingBloodSugar),
            FeatureField::RestingEcg => Some(Field::RestingEcg),
            FeatureField::ExerciseAngina => Some(Field::ExerciseAngina),
            FeatureField::Slope => Some(Field::Slope),
            FeatureField::Thal => Some(Field::Thal),
            _ => None,
        }
    }

    /// Bounds for numeric fields, `None` for categorical ones.
    pub fn bounds(self) -> Option<NumericBounds> {
        match self {
            FeatureField::Age => Some(NumericBounds::integer(18.0, 100.0)),
            FeatureField::RestingBp => Some(NumericBounds::integer(80.0, 200.0)),
            FeatureField::Cholesterol => Some(NumericBounds::integer(100.0, 600.0)),
            FeatureField::MaxHeartRate => Some(NumericBounds::integer(60.0, 220.0)),
            FeatureField::Oldpeak => Some(NumericBounds {
                min: 0.0,
                max: 10.0,
                integer: false,
            }),
            FeatureField::MajorVessels => Some(NumericBounds::integer(0.0, 3.0)),
            _ => None,
        }
    }
}

/// One patient's form submission, categorical values still in label form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub age: u32,
    pub sex: Sex,
    pub chest_pain_type: ChestPainType,
    pub resting_bp: u32,
    pub cholesterol: u32,
    pub fasting_bs: FastingBloodSugar,
    pub resting_ecg: RestingEcg,
    pub max_heart_rate: u32,
    pub exercise_angina: ExerciseAngina,
    pub oldpeak: f64,
    pub slope: Slope,
    pub major_vessels: u32,
    pub thal: Thal,
}

impl Default for PatientRecord {
    /// The values the form starts with.
    fn default() -> Self {
        PatientRecord {
            age: 50,
            sex: Sex::Male,
            chest_pain_type: ChestPainType::TypicalAngina,
            resting_bp: 120,
            cholesterol: 200,
            fasting_bs: FastingBloodSugar::No,
            resting_ecg: RestingEcg::Normal,
            max_heart_rate: 120,
            exercise_angina: ExerciseAngina::No,
            oldpeak: 2.0,
            slope: Slope::Upsloping,
            major_vessels: 0,
            thal: Thal::Normal,
        }
    }
}

impl PatientRecord {
    /// Raw value of a numeric field, `None` for categorical ones.
    pub fn numeric(&self, field: FeatureField) -> Option<f64> {
        match field {
            FeatureField::Age => Some(f64::from(self.age)),
            FeatureField::RestingBp => Some(f64::from(self.resting_bp)),
            FeatureField::Cholesterol => Some(f64::from(self.cholesterol)),
            FeatureField::MaxHeartRate => Some(f64::from(self.max_heart_rate)),
            FeatureField::Oldpeak => Some(self.oldpeak),
            FeatureField::MajorVessels => Some(f64::from(self.major_vessels)),
            _ => None,
        }
    }

    /// Checks every numeric value against its input bounds. Records built from
    /// the CLI already satisfy them; CSV rows and HTTP posts may not.
    pub fn validate(&self) -> Result<()> {
        for field in FeatureField::ALL {
            let (Some(value), Some(bounds)) = (self.numeric(field), field.bounds()) else {
                continue;
            };
            if !bounds.contains(value) {
                return Err(HeartError::OutOfRange {
                    field: field.key(),
                    value,
                    min: bounds.min,
                    max: bounds.max,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_is_fixed() {
        let keys: Vec<&str> = FeatureField::ALL.iter().map(|f| f.key()).collect();
        assert_eq!(
            keys,
            vec![
                "age",
                "sex",
                "chest_pain_type",
                "resting_bp",
                "cholesterol",
                "fasting_bs",
                "resting_ecg",
                "max_heart_rate",
                "exercise_angina",
                "oldpeak",
                "slope",
                "major_vessels",
                "thal",
            ]
        );
        for (i, field) in FeatureField::ALL.iter().enumerate() {
            assert_eq!(field.index(), i);
        }
    }

    #[test]
    fn every_field_is_either_numeric_or_categorical() {
        let categorical = FeatureField::ALL
            .iter()
            .filter(|f| f.categorical().is_some())
            .count();
        let numeric = FeatureField::ALL
            .iter()
            .filter(|f| f.bounds().is_some())
            .count();
        assert_eq!(categorical, 7);
        assert_eq!(numeric, 6);
        for field in FeatureField::ALL {
            assert!(field.categorical().is_some() != field.bounds().is_some());
        }
    }

    #[test]
    fn defaults_are_valid() {
        PatientRecord::default().validate().unwrap();
    }

    #[test]
    fn out_of_range_is_reported() {
        let record = PatientRecord {
            cholesterol: 700,
            ..PatientRecord::default()
        };
        match record.validate() {
            Err(HeartError::OutOfRange { field, value, .. }) => {
                assert_eq!(field, "cholesterol");
                assert_eq!(value, 700.0);
            }
            other => panic!("expected OutOfRange, got {other:?}"),
        }

        let record = PatientRecord {
            oldpeak: 10.5,
            ..PatientRecord::default()
        };
        assert!(record.validate().is_err());
    }

    #[test]
    fn deserializes_from_labels() {
        let json = r#"{
            "age": 63, "sex": "Female", "chest_pain_type": "Asymptomatic",
            "resting_bp": 145, "cholesterol": 233, "fasting_bs": "True",
            "resting_ecg": "Left Ventricular Hypertrophy", "max_heart_rate": 150,
            "exercise_angina": "False", "oldpeak": 2.3, "slope": "Downsloping",
            "major_vessels": 0, "thal": "Fixed Defect"
        }"#;
        let record: PatientRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.sex, Sex::Female);
        assert_eq!(record.thal, Thal::FixedDefect);
        assert_eq!(record.oldpeak, 2.3);
    }
}

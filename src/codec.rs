//! Label codec for the categorical clinical fields.
//!
//! Every categorical field is an enum whose variants map, through exhaustive
//! matches, to the label shown in the form and to the integer code the
//! classifier was trained on. Within a field both mappings are one-to-one.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserialize, Deserializer};
use serde::{Serialize, Serializer};

use crate::error::{HeartError, Result};

/// Behaviour shared by the categorical field enums.
pub trait CategoricalField: Copy + Sized + 'static {
    /// The schema entry this enum implements.
    const FIELD: Field;
    /// Variants in selector order.
    const ALL: &'static [Self];

    fn label(self) -> &'static str;

    fn code(self) -> u8;

    /// Looks up a variant by its exact label.
    fn from_label(label: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.label() == label)
            .ok_or_else(|| HeartError::KeyNotFound {
                field: Self::FIELD.name(),
                label: label.to_string(),
            })
    }

    /// Reverse lookup; codes outside the table yield `None`.
    fn from_code(code: i64) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| i64::from(v.code()) == code)
    }

    fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|v| v.label()).collect()
    }
}

macro_rules! categorical_field {
    (
        $(#[$meta:meta])*
        $name:ident => $field:ident {
            $($variant:ident => ($label:literal, $code:literal)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl CategoricalField for $name {
            const FIELD: Field = Field::$field;
            const ALL: &'static [Self] = &[$($name::$variant),+];

            fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            fn code(self) -> u8 {
                match self {
                    $($name::$variant => $code),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = HeartError;

            fn from_str(s: &str) -> Result<Self> {
                Self::from_label(s)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(self.label())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                let label = String::deserialize(deserializer)?;
                Self::from_label(&label).map_err(de::Error::custom)
            }
        }
    };
}

categorical_field! {
    Sex => Sex {
        Male => ("Male", 1),
        Female => ("Female", 0),
    }
}

categorical_field! {
    ChestPainType => ChestPainType {
        TypicalAngina => ("Typical Angina", 0),
        AtypicalAngina => ("Atypical Angina", 1),
        NonAnginalPain => ("Non-Anginal Pain", 2),
        Asymptomatic => ("Asymptomatic", 3),
    }
}

categorical_field! {
    /// Fasting blood sugar above 120 mg/dl.
    FastingBloodSugar => FastingBloodSugar {
        No => ("False", 0),
        Yes => ("True", 1),
    }
}

categorical_field! {
    RestingEcg => RestingEcg {
        Normal => ("Normal", 0),
        StTWaveAbnormality => ("ST-T Wave Abnormality", 1),
        LeftVentricularHypertrophy => ("Left Ventricular Hypertrophy", 2),
    }
}

categorical_field! {
    ExerciseAngina => ExerciseAngina {
        No => ("False", 0),
        Yes => ("True", 1),
    }
}

categorical_field! {
    /// Slope of the peak exercise ST segment.
    Slope => Slope {
        Upsloping => ("Upsloping", 0),
        Flat => ("Flat", 1),
        Downsloping => ("Downsloping", 2),
    }
}

categorical_field! {
    /// Thalassemia test result. The label keeps the spelling the form has always shown.
    Thal => Thal {
        Normal => ("Normal", 0),
        FixedDefect => ("Fixed Defect", 1),
        ReversibleDefect => ("Reversable Defect", 2),
    }
}

/// Names the categorical fields, for lookups that start from a string label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Sex,
    ChestPainType,
    FastingBloodSugar,
    RestingEcg,
    ExerciseAngina,
    Slope,
    Thal,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Sex,
        Field::ChestPainType,
        Field::FastingBloodSugar,
        Field::RestingEcg,
        Field::ExerciseAngina,
        Field::Slope,
        Field::Thal,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::Sex => "sex",
            Field::ChestPainType => "chest_pain_type",
            Field::FastingBloodSugar => "fasting_bs",
            Field::RestingEcg => "resting_ecg",
            Field::ExerciseAngina => "exercise_angina",
            Field::Slope => "slope",
            Field::Thal => "thal",
        }
    }

    pub fn labels(self) -> Vec<&'static str> {
        match self {
            Field::Sex => Sex::labels(),
            Field::ChestPainType => ChestPainType::labels(),
            Field::FastingBloodSugar => FastingBloodSugar::labels(),
            Field::RestingEcg => RestingEcg::labels(),
            Field::ExerciseAngina => ExerciseAngina::labels(),
            Field::Slope => Slope::labels(),
            Field::Thal => Thal::labels(),
        }
    }

    /// `(label, code)` pairs in selector order.
    pub fn entries(self) -> Vec<(&'static str, u8)> {
        fn pairs<T: CategoricalField>() -> Vec<(&'static str, u8)> {
            T::ALL.iter().map(|v| (v.label(), v.code())).collect()
        }
        match self {
            Field::Sex => pairs::<Sex>(),
            Field::ChestPainType => pairs::<ChestPainType>(),
            Field::FastingBloodSugar => pairs::<FastingBloodSugar>(),
            Field::RestingEcg => pairs::<RestingEcg>(),
            Field::ExerciseAngina => pairs::<ExerciseAngina>(),
            Field::Slope => pairs::<Slope>(),
            Field::Thal => pairs::<Thal>(),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Converts a label to the code the classifier expects for `field`.
pub fn encode(label: &str, field: Field) -> Result<u8> {
    Ok(match field {
        Field::Sex => Sex::from_label(label)?.code(),
        Field::ChestPainType => ChestPainType::from_label(label)?.code(),
        Field::FastingBloodSugar => FastingBloodSugar::from_label(label)?.code(),
        Field::RestingEcg => RestingEcg::from_label(label)?.code(),
        Field::ExerciseAngina => ExerciseAngina::from_label(label)?.code(),
        Field::Slope => Slope::from_label(label)?.code(),
        Field::Thal => Thal::from_label(label)?.code(),
    })
}

/// Converts a code back to its label. Unknown codes are a display concern
/// only, so they give `None` instead of an error.
pub fn decode(code: i64, field: Field) -> Option<&'static str> {
    match field {
        Field::Sex => Sex::from_code(code).map(Sex::label),
        Field::ChestPainType => ChestPainType::from_code(code).map(ChestPainType::label),
        Field::FastingBloodSugar => {
            FastingBloodSugar::from_code(code).map(FastingBloodSugar::label)
        }
        Field::RestingEcg => RestingEcg::from_code(code).map(RestingEcg::label),
        Field::ExerciseAngina => ExerciseAngina::from_code(code).map(ExerciseAngina::label),
        Field::Slope => Slope::from_code(code).map(Slope::label),
        Field::Thal => Thal::from_code(code).map(Thal::label),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn every_label_round_trips() {
        for field in Field::ALL {
            for label in field.labels() {
                let code = encode(label, field).unwrap();
                assert_eq!(decode(i64::from(code), field), Some(label), "{field}");
            }
        }
    }

    #[test]
    fn codes_and_labels_are_unique_per_field() {
        for field in Field::ALL {
            let entries = field.entries();
            let codes: HashSet<u8> = entries.iter().map(|(_, c)| *c).collect();
            let labels: HashSet<&str> = entries.iter().map(|(l, _)| *l).collect();
            assert_eq!(codes.len(), entries.len(), "{field}");
            assert_eq!(labels.len(), entries.len(), "{field}");
        }
    }

    #[test]
    fn female_is_zero() {
        assert_eq!(encode("Female", Field::Sex).unwrap(), 0);
        assert_eq!(decode(0, Field::Sex), Some("Female"));
        assert_eq!(Sex::Male.code(), 1);
    }

    #[test]
    fn unknown_code_decodes_to_nothing() {
        assert_eq!(decode(99, Field::Sex), None);
        for field in Field::ALL {
            assert_eq!(decode(-1, field), None);
            assert_eq!(decode(4, field), None);
        }
    }

    #[test]
    fn unlisted_label_is_key_not_found() {
        for field in Field::ALL {
            match encode("Unknown", field) {
                Err(HeartError::KeyNotFound { field: name, label }) => {
                    assert_eq!(name, field.name());
                    assert_eq!(label, "Unknown");
                }
                other => panic!("expected KeyNotFound, got {other:?}"),
            }
        }
        // labels are matched exactly
        assert!("male".parse::<Sex>().is_err());
    }

    #[test]
    fn selector_order_matches_the_form() {
        assert_eq!(Sex::labels(), vec!["Male", "Female"]);
        assert_eq!(ExerciseAngina::labels(), vec!["False", "True"]);
        assert_eq!(Thal::ReversibleDefect.to_string(), "Reversable Defect");
    }

    #[test]
    fn serde_uses_labels() {
        let json = serde_json::to_string(&RestingEcg::StTWaveAbnormality).unwrap();
        assert_eq!(json, "\"ST-T Wave Abnormality\"");
        let slope: Slope = serde_json::from_str("\"Flat\"").unwrap();
        assert_eq!(slope, Slope::Flat);
        assert!(serde_json::from_str::<Slope>("\"Sideways\"").is_err());
    }
}

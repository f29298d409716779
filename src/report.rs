use std::fmt;

use serde::Serialize;

use crate::codec;
use crate::features::FeatureVector;
use crate::predictor::PredictionResult;
use crate::records::{FeatureField, PatientRecord};

/// Shown in place of a code the codec has no label for.
pub const MISSING_LABEL: &str = "-";

/// One submitted value as it is echoed back to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EchoedInput {
    pub key: &'static str,
    pub name: &'static str,
    pub value: String,
}

/// Everything displayed after a prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionReport {
    pub class_code: i32,
    pub diagnosis: &'static str,
    pub features: FeatureVector,
    pub inputs: Vec<EchoedInput>,
}

impl PredictionReport {
    /// Categorical inputs are decoded back from the codes that were sent to
    /// the model; numeric inputs are echoed as submitted.
    pub fn new(record: &PatientRecord, features: FeatureVector, result: PredictionResult) -> Self {
        let inputs = FeatureField::ALL
            .iter()
            .map(|&field| EchoedInput {
                key: field.key(),
                name: field.display_name(),
                value: echo_value(record, &features, field),
            })
            .collect();
        PredictionReport {
            class_code: result.class_code,
            diagnosis: result.diagnosis().map_or("Unknown", |d| d.label()),
            features,
            inputs,
        }
    }

    pub fn color(&self) -> &'static str {
        PredictionResult::new(self.class_code)
            .diagnosis()
            .map_or("#585858", |d| d.color())
    }
}

fn echo_value(record: &PatientRecord, features: &FeatureVector, field: FeatureField) -> String {
    if let Some(table) = field.categorical() {
        let code = features.get(field) as i64;
        return codec::decode(code, table)
            .unwrap_or(MISSING_LABEL)
            .to_string();
    }
    match record.numeric(field) {
        Some(value) => format!("{value}"),
        None => MISSING_LABEL.to_string(),
    }
}

impl fmt::Display for PredictionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Prediction: {}", self.diagnosis)?;
        writeln!(f)?;
        writeln!(f, "User Inputs:")?;
        for input in &self.inputs {
            writeln!(f, "  {}: {}", input.name, input.value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Thal;
    use crate::features::OldpeakMode;

    #[test]
    fn echoes_labels_not_codes() {
        let record = PatientRecord {
            thal: Thal::FixedDefect,
            oldpeak: 2.5,
            ..PatientRecord::default()
        };
        let features = FeatureVector::assemble(&record, OldpeakMode::Truncate);
        let report = PredictionReport::new(&record, features, PredictionResult::new(1));

        assert_eq!(report.diagnosis, "Heart Disease");
        assert_eq!(report.inputs.len(), 13);
        let value = |key: &str| {
            report
                .inputs
                .iter()
                .find(|i| i.key == key)
                .map(|i| i.value.clone())
                .unwrap()
        };
        assert_eq!(value("sex"), "Male");
        assert_eq!(value("thal"), "Fixed Defect");
        assert_eq!(value("chest_pain_type"), "Typical Angina");
        // the echo shows what was entered, not the truncated model input
        assert_eq!(value("oldpeak"), "2.5");
        assert_eq!(value("age"), "50");
    }

    #[test]
    fn oldpeak_echo_is_the_submitted_value() {
        let echoed = |oldpeak: f64, mode: OldpeakMode| {
            let record = PatientRecord {
                oldpeak,
                ..PatientRecord::default()
            };
            let features = FeatureVector::assemble(&record, mode);
            let report = PredictionReport::new(&record, features, PredictionResult::new(0));
            (
                features.get(FeatureField::Oldpeak),
                report.inputs[FeatureField::Oldpeak.index()].value.clone(),
            )
        };
        assert_eq!(echoed(9.96, OldpeakMode::Truncate), (9.0, "9.96".to_string()));
        assert_eq!(echoed(2.55, OldpeakMode::Exact), (2.55, "2.55".to_string()));
        assert_eq!(echoed(1.25, OldpeakMode::Exact), (1.25, "1.25".to_string()));
    }

    #[test]
    fn unknown_codes_show_placeholders() {
        let record = PatientRecord::default();
        let mut values = [0.0; 13];
        values.copy_from_slice(
            FeatureVector::assemble(&record, OldpeakMode::Truncate).as_slice(),
        );
        values[FeatureField::Sex.index()] = 99.0;
        let report = PredictionReport::new(&record, values.into(), PredictionResult::new(5));

        assert_eq!(report.diagnosis, "Unknown");
        assert_eq!(report.inputs[FeatureField::Sex.index()].value, MISSING_LABEL);
    }

    #[test]
    fn text_rendering() {
        let record = PatientRecord::default();
        let features = FeatureVector::assemble(&record, OldpeakMode::Truncate);
        let text = PredictionReport::new(&record, features, PredictionResult::new(0)).to_string();
        assert!(text.starts_with("Prediction: No Heart Disease\n"));
        assert!(text.contains("  Serum Cholestoral in mg/dl: 200\n"));
    }
}

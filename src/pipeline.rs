use log::debug;

use crate::error::Result;
use crate::features::{FeatureVector, OldpeakMode};
use crate::predictor::Predictor;
use crate::records::PatientRecord;
use crate::report::PredictionReport;

/// Runs one submission end to end. Either the whole report comes back or the
/// first failure does.
pub fn predict_record(
    predictor: &dyn Predictor,
    record: &PatientRecord,
    oldpeak: OldpeakMode,
) -> Result<PredictionReport> {
    record.validate()?;
    let features = FeatureVector::assemble(record, oldpeak);
    debug!("feature vector {:?}", features.as_slice());
    let result = predictor.predict(&features)?;
    Ok(PredictionReport::new(record, features, result))
}

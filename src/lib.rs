//! Heart disease prediction from a patient form.
//!
//! Categorical labels are encoded through [`codec`], laid out in the
//! classifier's fixed order by [`features`], and classified by a
//! [`predictor::Predictor`] loaded once at startup.

pub mod batch;
pub mod codec;
pub mod error;
pub mod features;
pub mod monitor;
pub mod pipeline;
pub mod predictor;
pub mod records;
pub mod report;
pub mod server;

pub use error::{HeartError, Result};
pub use features::{FeatureVector, OldpeakMode};
pub use pipeline::predict_record;
pub use predictor::{Predictor, PredictionResult, SmartcorePredictor};
pub use records::{FeatureField, PatientRecord};
pub use report::PredictionReport;

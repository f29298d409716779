//! The classifier behind the form.
//!
//! The model itself is opaque: it takes one [`FeatureVector`] and returns a
//! class code. [`SmartcorePredictor`] loads a persisted smartcore estimator
//! once at startup; afterwards it is only read, so it can be shared freely.

use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_classifier::RandomForestClassifier;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::metrics::distance::euclidian::Euclidian;
use smartcore::neighbors::knn_classifier::KNNClassifier;

use crate::error::{HeartError, Result};
use crate::features::FeatureVector;

pub type KnnModel = KNNClassifier<f64, i32, DenseMatrix<f64>, Vec<i32>, Euclidian<f64>>;
pub type ForestModel = RandomForestClassifier<f64, i32, DenseMatrix<f64>, Vec<i32>>;

/// Anything that can classify a feature vector.
pub trait Predictor: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<PredictionResult>;
}

/// Class code returned by the classifier, kept exactly as returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub class_code: i32,
}

impl PredictionResult {
    pub fn new(class_code: i32) -> Self {
        PredictionResult { class_code }
    }

    pub fn diagnosis(&self) -> Option<Diagnosis> {
        Diagnosis::from_code(self.class_code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Diagnosis {
    NoHeartDisease,
    HeartDisease,
}

impl Diagnosis {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Diagnosis::NoHeartDisease),
            1 => Some(Diagnosis::HeartDisease),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Diagnosis::NoHeartDisease => "No Heart Disease",
            Diagnosis::HeartDisease => "Heart Disease",
        }
    }

    /// Display colour for the result line.
    pub fn color(self) -> &'static str {
        match self {
            Diagnosis::NoHeartDisease => "#1abc9c",
            Diagnosis::HeartDisease => "#e74c3c",
        }
    }
}

impl fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// On-disk form of a trained estimator.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", content = "model", rename_all = "snake_case")]
pub enum ModelArtifact {
    Knn(KnnModel),
    RandomForest(ForestModel),
}

impl ModelArtifact {
    pub fn kind(&self) -> &'static str {
        match self {
            ModelArtifact::Knn(_) => "knn",
            ModelArtifact::RandomForest(_) => "random_forest",
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer(file, self)?;
        Ok(())
    }
}

pub struct SmartcorePredictor {
    artifact: ModelArtifact,
    source: PathBuf,
}

impl SmartcorePredictor {
    /// Reads the artifact at `path`. Any failure here leaves nothing to predict
    /// with, so callers treat it as fatal.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| HeartError::ModelRead {
            path: path.to_path_buf(),
            source,
        })?;
        let artifact: ModelArtifact = serde_json::from_reader(BufReader::new(file))
            .map_err(|source| HeartError::ModelFormat {
                path: path.to_path_buf(),
                source,
            })?;
        info!("loaded {} model from {:?}", artifact.kind(), path);
        Ok(SmartcorePredictor::new(artifact, path))
    }

    pub fn new<P: AsRef<Path>>(artifact: ModelArtifact, source: P) -> Self {
        SmartcorePredictor {
            artifact,
            source: source.as_ref().to_path_buf(),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn kind(&self) -> &'static str {
        self.artifact.kind()
    }
}

impl Predictor for SmartcorePredictor {
    fn predict(&self, features: &FeatureVector) -> Result<PredictionResult> {
        let x = features.to_matrix();
        let classes = match &self.artifact {
            ModelArtifact::Knn(model) => model.predict(&x)?,
            ModelArtifact::RandomForest(model) => model.predict(&x)?,
        };
        debug!("{} model returned {:?}", self.kind(), classes);
        classes
            .first()
            .copied()
            .map(PredictionResult::new)
            .ok_or_else(|| HeartError::Prediction("model returned no class".to_string()))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use smartcore::ensemble::random_forest_classifier::RandomForestClassifierParameters;
    use smartcore::neighbors::knn_classifier::KNNClassifierParameters;
    use tempfile::NamedTempFile;

    use super::*;

    /// A predictor that always answers with the same class.
    pub(crate) struct FixedPredictor(pub i32);

    impl Predictor for FixedPredictor {
        fn predict(&self, _features: &FeatureVector) -> Result<PredictionResult> {
            Ok(PredictionResult::new(self.0))
        }
    }

    /// Two rows per class, far apart in cholesterol and vessel count, so a
    /// 2-NN model separates them cleanly.
    fn fixture_data() -> (DenseMatrix<f64>, Vec<i32>) {
        let x = DenseMatrix::from_2d_vec(&vec![
            vec![50., 1., 0., 120., 200., 0., 0., 170., 0., 0., 0., 0., 0.],
            vec![45., 0., 1., 118., 190., 0., 0., 165., 0., 1., 0., 0., 0.],
            vec![67., 1., 3., 160., 560., 1., 2., 90., 1., 6., 2., 3., 2.],
            vec![70., 1., 3., 170., 580., 1., 2., 80., 1., 7., 2., 3., 2.],
        ]);
        (x, vec![0, 0, 1, 1])
    }

    pub(crate) fn knn_fixture() -> KnnModel {
        let (x, y) = fixture_data();
        KNNClassifier::fit(&x, &y, KNNClassifierParameters::default().with_k(2)).unwrap()
    }

    #[test]
    fn knn_artifact_loads_and_predicts() {
        let file = NamedTempFile::new().unwrap();
        ModelArtifact::Knn(knn_fixture()).save(file.path()).unwrap();

        let predictor = SmartcorePredictor::load(file.path()).unwrap();
        assert_eq!(predictor.kind(), "knn");

        let healthy = FeatureVector::from([
            52., 1., 0., 121., 205., 0., 0., 168., 0., 0., 0., 0., 0.,
        ]);
        let sick = FeatureVector::from([
            68., 1., 3., 165., 570., 1., 2., 85., 1., 6., 2., 3., 2.,
        ]);
        assert_eq!(predictor.predict(&healthy).unwrap().class_code, 0);
        assert_eq!(predictor.predict(&sick).unwrap().class_code, 1);
    }

    #[test]
    fn forest_artifact_loads() {
        let (x, y) = fixture_data();
        let forest: ForestModel = RandomForestClassifier::fit(
            &x,
            &y,
            RandomForestClassifierParameters::default().with_n_trees(5),
        )
        .unwrap();
        let file = NamedTempFile::new().unwrap();
        ModelArtifact::RandomForest(forest).save(file.path()).unwrap();

        let predictor = SmartcorePredictor::load(file.path()).unwrap();
        assert_eq!(predictor.kind(), "random_forest");
        let class = predictor
            .predict(&FeatureVector::from([0.0; 13]))
            .unwrap()
            .class_code;
        assert!(class == 0 || class == 1);
    }

    #[test]
    fn missing_artifact_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SmartcorePredictor::load(dir.path().join("absent.json"))
            .err()
            .unwrap();
        assert!(matches!(err, HeartError::ModelRead { .. }));
    }

    #[test]
    fn malformed_artifact_is_a_format_error() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), r#"{"kind": "svm", "model": {}}"#).unwrap();
        let err = SmartcorePredictor::load(file.path()).err().unwrap();
        assert!(matches!(err, HeartError::ModelFormat { .. }));
    }

    #[test]
    fn diagnosis_codes() {
        assert_eq!(
            PredictionResult::new(1).diagnosis(),
            Some(Diagnosis::HeartDisease)
        );
        assert_eq!(
            PredictionResult::new(0).diagnosis(),
            Some(Diagnosis::NoHeartDisease)
        );
        assert_eq!(PredictionResult::new(7).diagnosis(), None);
    }
}

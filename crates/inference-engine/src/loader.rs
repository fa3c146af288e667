//! Artifact Loading

use crate::model::LinearRegressor;
use crate::onnx::OnnxRegressor;
use crate::pipeline::{Predictor, Transformer};
use crate::preprocessor::ColumnPreprocessor;
use crate::LoadError;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Description of what was loaded, for health reporting
#[derive(Debug, Clone, Default, Serialize)]
pub struct ArtifactInfo {
    pub preprocessor_path: Option<PathBuf>,
    pub model_path: Option<PathBuf>,
    pub model_format: String,
    pub input_columns: Vec<String>,
    pub output_width: usize,
}

/// The preprocessor and model pair. Built once at startup and only read afterwards.
pub struct LoadedArtifacts {
    preprocessor: Box<dyn Transformer>,
    model: Box<dyn Predictor>,
    info: ArtifactInfo,
}

impl LoadedArtifacts {
    /// Wrap already constructed capabilities
    pub fn new(
        preprocessor: impl Transformer + 'static,
        model: impl Predictor + 'static,
        info: ArtifactInfo,
    ) -> Self {
        Self {
            preprocessor: Box::new(preprocessor),
            model: Box::new(model),
            info,
        }
    }

    /// Load both artifacts from disk.
    ///
    /// The model format is chosen by extension: `.json` for a linear
    /// regressor, `.onnx` for a graph run with tract. The model's input
    /// width must equal the preprocessor's output width.
    pub fn load(
        preprocessor_path: impl AsRef<Path>,
        model_path: impl AsRef<Path>,
    ) -> Result<Self, LoadError> {
        let preprocessor_path = preprocessor_path.as_ref();
        let model_path = model_path.as_ref();

        info!(path = %preprocessor_path.display(), "Loading preprocessor");
        let json = read(preprocessor_path)?;
        let preprocessor =
            ColumnPreprocessor::from_json(&json).map_err(|source| LoadError::Parse {
                path: preprocessor_path.to_path_buf(),
                source,
            })?;
        let width = preprocessor.output_width();
        debug!(
            output_width = width,
            features = ?preprocessor.feature_names_out(),
            "Preprocessor loaded"
        );

        let mut info = ArtifactInfo {
            preprocessor_path: Some(preprocessor_path.to_path_buf()),
            model_path: Some(model_path.to_path_buf()),
            model_format: String::new(),
            input_columns: preprocessor.input_columns(),
            output_width: width,
        };

        let extension = model_path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        let artifacts = match extension.as_deref() {
            Some("json") => {
                info!(path = %model_path.display(), "Loading linear model");
                let json = read(model_path)?;
                let model =
                    LinearRegressor::from_json(&json).map_err(|source| LoadError::Parse {
                        path: model_path.to_path_buf(),
                        source,
                    })?;
                if model.n_features_in() != width {
                    return Err(LoadError::Incompatible(format!(
                        "model expects {} features but preprocessor produces {}",
                        model.n_features_in(),
                        width
                    )));
                }
                info.model_format = "linear-json".to_string();
                Self::new(preprocessor, model, info)
            }
            Some("onnx") => {
                let model = OnnxRegressor::load(model_path, width)?;
                info.model_format = "onnx".to_string();
                Self::new(preprocessor, model, info)
            }
            _ => return Err(LoadError::UnsupportedFormat(model_path.to_path_buf())),
        };

        info!(
            model_format = %artifacts.info.model_format,
            output_width = width,
            "Artifacts loaded"
        );
        Ok(artifacts)
    }

    pub fn preprocessor(&self) -> &dyn Transformer {
        self.preprocessor.as_ref()
    }

    pub fn model(&self) -> &dyn Predictor {
        self.model.as_ref()
    }

    pub fn info(&self) -> &ArtifactInfo {
        &self.info
    }
}

/// Load the preprocessor and model pair; see [`LoadedArtifacts::load`]
pub fn load_artifacts(
    preprocessor_path: impl AsRef<Path>,
    model_path: impl AsRef<Path>,
) -> Result<LoadedArtifacts, LoadError> {
    LoadedArtifacts::load(preprocessor_path, model_path)
}

fn read(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::infer;
    use feature_assembler::{assemble, Categories, StudentFlags, SubjectScores};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const PREPROCESSOR: &str = r#"{
        "steps": [
            {"kind": "standard_scaler", "name": "num", "columns": ["math_score"], "mean": [50.0], "scale": [10.0]},
            {"kind": "one_hot", "name": "cat", "columns": ["gender"], "categories": [["Female", "Male"]]}
        ]
    }"#;

    fn write(suffix: &str, contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_linear_pair() {
        let pre = write(".json", PREPROCESSOR);
        let model = write(".json", r#"{"intercept": 60.0, "coefficients": [5.0, 0.0, 1.0]}"#);
        let artifacts = LoadedArtifacts::load(pre.path(), model.path()).unwrap();
        assert_eq!(artifacts.info().output_width, 3);
        assert_eq!(artifacts.info().model_format, "linear-json");
        assert_eq!(artifacts.info().input_columns, vec!["math_score", "gender"]);
    }

    #[test]
    fn test_width_mismatch_is_incompatible() {
        let pre = write(".json", PREPROCESSOR);
        let model = write(".json", r#"{"intercept": 60.0, "coefficients": [5.0]}"#);
        let err = LoadedArtifacts::load(pre.path(), model.path()).err().unwrap();
        assert!(matches!(err, LoadError::Incompatible(_)));
    }

    #[test]
    fn test_missing_preprocessor() {
        let model = write(".json", r#"{"intercept": 0.0, "coefficients": []}"#);
        let err = load_artifacts("/nonexistent/preprocessor.json", model.path())
            .err()
            .unwrap();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_malformed_preprocessor() {
        let pre = write(".json", r#"{"steps": [{"kind": "pca"}]}"#);
        let model = write(".json", r#"{"intercept": 0.0, "coefficients": []}"#);
        let err = LoadedArtifacts::load(pre.path(), model.path()).err().unwrap();
        assert!(matches!(err, LoadError::Parse { .. }));
    }

    #[test]
    fn test_load_onnx_pair() {
        let pre = write(".json", PREPROCESSOR);
        let model = crate::onnx::fixtures::linear_model(&[2.0, -1.0, 0.5], 10.0);
        let artifacts = load_artifacts(pre.path(), model.path()).unwrap();
        assert_eq!(artifacts.info().model_format, "onnx");
        assert_eq!(artifacts.info().output_width, 3);

        let record = assemble(
            SubjectScores {
                math: 75.0,
                ..Default::default()
            },
            StudentFlags::default(),
            Categories::new("Male", "Engineering"),
        );
        // (75 - 50) / 10 = 2.5, gender one-hot [0, 1]
        let prediction = infer(&record, &artifacts).unwrap();
        assert_eq!(prediction.value(), 15.5);
    }

    #[test]
    fn test_unsupported_model_format() {
        let pre = write(".json", PREPROCESSOR);
        let model = write(".pkl", "not loadable");
        let err = LoadedArtifacts::load(pre.path(), model.path()).err().unwrap();
        assert!(matches!(err, LoadError::UnsupportedFormat(_)));
    }
}

//! Column-wise preprocessor exported from the training pipeline
//!
//! Mirrors a fitted column transformer: an ordered list of steps, each bound
//! to named input columns, whose outputs are concatenated in step order.

use crate::pipeline::{ProcessedFeatureVector, Transformer};
use crate::ArtifactError;
use feature_assembler::{FeatureFrame, FeatureValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::trace;

/// Behaviour of a one-hot step on labels it was not fitted on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleUnknown {
    /// Fail the transform
    #[default]
    Error,
    /// Emit an all-zero block
    Ignore,
}

/// One fitted step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Step {
    /// `(x - mean) / scale`
    StandardScaler {
        name: String,
        columns: Vec<String>,
        mean: Vec<f64>,
        scale: Vec<f64>,
    },
    /// One indicator per fitted category
    OneHot {
        name: String,
        columns: Vec<String>,
        categories: Vec<Vec<String>>,
        #[serde(default)]
        handle_unknown: HandleUnknown,
        #[serde(default)]
        drop_first: bool,
    },
    /// Numeric columns copied as-is
    Passthrough { name: String, columns: Vec<String> },
}

impl Step {
    fn columns(&self) -> &[String] {
        match self {
            Step::StandardScaler { columns, .. }
            | Step::OneHot { columns, .. }
            | Step::Passthrough { columns, .. } => columns,
        }
    }

    fn name(&self) -> &str {
        match self {
            Step::StandardScaler { name, .. }
            | Step::OneHot { name, .. }
            | Step::Passthrough { name, .. } => name,
        }
    }

    fn feature_names(&self) -> Vec<String> {
        let prefix = self.name();
        match self {
            Step::OneHot {
                columns,
                categories,
                drop_first,
                ..
            } => columns
                .iter()
                .zip(categories)
                .flat_map(|(column, cats)| {
                    let skip = usize::from(*drop_first);
                    cats.iter()
                        .skip(skip)
                        .map(move |c| format!("{}__{}_{}", prefix, column, c))
                })
                .collect(),
            _ => self
                .columns()
                .iter()
                .map(|c| format!("{}__{}", prefix, c))
                .collect(),
        }
    }

    fn check(&self) -> Result<(), String> {
        match self {
            Step::StandardScaler {
                name,
                columns,
                mean,
                scale,
            } => {
                if mean.len() != columns.len() || scale.len() != columns.len() {
                    return Err(format!(
                        "step '{}': {} columns but {} means and {} scales",
                        name,
                        columns.len(),
                        mean.len(),
                        scale.len()
                    ));
                }
            }
            Step::OneHot {
                name,
                columns,
                categories,
                drop_first,
                ..
            } => {
                if categories.len() != columns.len() {
                    return Err(format!(
                        "step '{}': {} columns but {} category lists",
                        name,
                        columns.len(),
                        categories.len()
                    ));
                }
                if let Some((column, _)) = columns
                    .iter()
                    .zip(categories)
                    .find(|(_, cats)| cats.is_empty() || (*drop_first && cats.len() < 2))
                {
                    return Err(format!(
                        "step '{}': column '{}' has too few categories",
                        name, column
                    ));
                }
            }
            Step::Passthrough { .. } => {}
        }
        Ok(())
    }

    fn apply(&self, frame: &FeatureFrame, out: &mut Vec<f64>) -> Result<(), ArtifactError> {
        match self {
            Step::StandardScaler {
                columns,
                mean,
                scale,
                ..
            } => {
                for ((column, mean), scale) in columns.iter().zip(mean).zip(scale) {
                    let x = numeric(frame, column)?;
                    // zero variance columns are left unscaled
                    let scale = if *scale == 0.0 { 1.0 } else { *scale };
                    out.push((x - mean) / scale);
                }
            }
            Step::OneHot {
                columns,
                categories,
                handle_unknown,
                drop_first,
                ..
            } => {
                let skip = usize::from(*drop_first);
                for (index, (column, cats)) in columns.iter().zip(categories).enumerate() {
                    let value = label(frame, column)?;
                    let position = cats.iter().position(|c| c == value);
                    if position.is_none() && *handle_unknown == HandleUnknown::Error {
                        return Err(ArtifactError::UnknownCategories {
                            index,
                            column: column.clone(),
                            values: vec![value.to_string()],
                        });
                    }
                    out.extend(
                        (skip..cats.len()).map(|i| if Some(i) == position { 1.0 } else { 0.0 }),
                    );
                }
            }
            Step::Passthrough { columns, .. } => {
                for column in columns {
                    out.push(numeric(frame, column)?);
                }
            }
        }
        Ok(())
    }
}

fn numeric(frame: &FeatureFrame, column: &str) -> Result<f64, ArtifactError> {
    let value = frame
        .get(column)
        .ok_or_else(|| ArtifactError::MissingColumns(vec![column.to_string()]))?;
    value.as_f64().ok_or_else(|| ArtifactError::DtypeMismatch {
        column: column.to_string(),
        expected: "numeric",
        actual: value.dtype(),
    })
}

fn label<'a>(frame: &'a FeatureFrame, column: &str) -> Result<&'a str, ArtifactError> {
    let value = frame
        .get(column)
        .ok_or_else(|| ArtifactError::MissingColumns(vec![column.to_string()]))?;
    match value {
        FeatureValue::Text(s) => Ok(s.as_str()),
        other => Err(ArtifactError::DtypeMismatch {
            column: column.to_string(),
            expected: "object",
            actual: other.dtype(),
        }),
    }
}

/// A fitted column transformer
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnPreprocessor {
    steps: Vec<Step>,
    feature_names: Vec<String>,
}

impl ColumnPreprocessor {
    /// Build from fitted steps, checking that each step is self-consistent
    pub fn new(steps: Vec<Step>) -> Result<Self, String> {
        if steps.is_empty() {
            return Err("preprocessor has no steps".to_string());
        }
        for step in &steps {
            step.check()?;
        }
        let feature_names = steps.iter().flat_map(Step::feature_names).collect();
        Ok(Self {
            steps,
            feature_names,
        })
    }

    /// Parse the JSON export
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        #[derive(Deserialize)]
        struct Export {
            steps: Vec<Step>,
        }
        let export: Export = serde_json::from_str(json)?;
        Self::new(export.steps).map_err(serde::de::Error::custom)
    }

    /// Number of output features
    pub fn output_width(&self) -> usize {
        self.feature_names.len()
    }

    /// Output feature names in order
    pub fn feature_names_out(&self) -> &[String] {
        &self.feature_names
    }

    /// Input columns consumed, in step order
    pub fn input_columns(&self) -> Vec<String> {
        self.steps
            .iter()
            .flat_map(|s| s.columns().iter().cloned())
            .collect()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

impl Transformer for ColumnPreprocessor {
    fn transform(&self, frame: &FeatureFrame) -> Result<ProcessedFeatureVector, ArtifactError> {
        let missing: BTreeSet<String> = self
            .input_columns()
            .into_iter()
            .filter(|c| frame.get(c).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ArtifactError::MissingColumns(missing.into_iter().collect()));
        }

        let mut values = Vec::with_capacity(self.output_width());
        for step in &self.steps {
            step.apply(frame, &mut values)?;
            trace!(step = step.name(), width = values.len(), "Applied preprocessing step");
        }

        ProcessedFeatureVector::new(self.feature_names.clone(), values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feature_assembler::{assemble, Categories, StudentFlags, SubjectScores};

    fn fitted() -> ColumnPreprocessor {
        ColumnPreprocessor::new(vec![
            Step::StandardScaler {
                name: "num".into(),
                columns: vec!["math_score".into(), "english_score".into()],
                mean: vec![70.0, 60.0],
                scale: vec![10.0, 0.0],
            },
            Step::OneHot {
                name: "cat".into(),
                columns: vec!["gender".into(), "career_aspiration".into()],
                categories: vec![
                    vec!["Female".into(), "Male".into()],
                    vec!["Arts".into(), "Engineering".into()],
                ],
                handle_unknown: HandleUnknown::Error,
                drop_first: false,
            },
            Step::Passthrough {
                name: "remainder".into(),
                columns: vec!["part_time_job".into()],
            },
        ])
        .unwrap()
    }

    fn frame(gender: &str) -> FeatureFrame {
        assemble(
            SubjectScores {
                math: 80.0,
                english: 65.0,
                ..Default::default()
            },
            StudentFlags {
                part_time_job: true,
                extracurricular_activities: false,
            },
            Categories::new(gender, "Engineering"),
        )
        .to_frame()
    }

    #[test]
    fn test_transform_values_and_names() {
        let pre = fitted();
        let out = pre.transform(&frame("Male")).unwrap();
        assert_eq!(
            out.feature_names(),
            &[
                "num__math_score",
                "num__english_score",
                "cat__gender_Female",
                "cat__gender_Male",
                "cat__career_aspiration_Arts",
                "cat__career_aspiration_Engineering",
                "remainder__part_time_job",
            ]
        );
        assert_eq!(out.row().to_vec(), vec![1.0, 5.0, 0.0, 1.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_unknown_label_fails() {
        let err = fitted().transform(&frame("Other")).unwrap_err();
        assert_eq!(
            err,
            ArtifactError::UnknownCategories {
                index: 0,
                column: "gender".into(),
                values: vec!["Other".into()],
            }
        );
    }

    #[test]
    fn test_unknown_label_ignored() {
        let mut steps = fitted().steps().to_vec();
        if let Step::OneHot { handle_unknown, .. } = &mut steps[1] {
            *handle_unknown = HandleUnknown::Ignore;
        }
        let pre = ColumnPreprocessor::new(steps).unwrap();
        let out = pre.transform(&frame("Other")).unwrap();
        assert_eq!(&out.row().to_vec()[2..4], &[0.0, 0.0]);
    }

    #[test]
    fn test_missing_columns_reported_together() {
        let f = frame("Male").without("gender").without("math_score");
        let err = fitted().transform(&f).unwrap_err();
        assert_eq!(
            err,
            ArtifactError::MissingColumns(vec!["gender".into(), "math_score".into()])
        );
    }

    #[test]
    fn test_renamed_column_is_missing() {
        let f = frame("Male").without("gender").with("Gender", FeatureValue::Text("Male".into()));
        assert!(matches!(
            fitted().transform(&f),
            Err(ArtifactError::MissingColumns(_))
        ));
    }

    #[test]
    fn test_dtype_mismatch() {
        let f = frame("Male").with("math_score", FeatureValue::Text("80".into()));
        let err = fitted().transform(&f).unwrap_err();
        assert!(matches!(err, ArtifactError::DtypeMismatch { expected: "numeric", .. }));

        let f = frame("Male").with("gender", FeatureValue::Int(1));
        let err = fitted().transform(&f).unwrap_err();
        assert!(matches!(err, ArtifactError::DtypeMismatch { expected: "object", .. }));
    }

    #[test]
    fn test_drop_first() {
        let pre = ColumnPreprocessor::new(vec![Step::OneHot {
            name: "cat".into(),
            columns: vec!["gender".into()],
            categories: vec![vec!["Female".into(), "Male".into(), "Other".into()]],
            handle_unknown: HandleUnknown::Error,
            drop_first: true,
        }])
        .unwrap();
        assert_eq!(pre.output_width(), 2);
        let out = pre.transform(&frame("Female")).unwrap();
        assert_eq!(out.row().to_vec(), vec![0.0, 0.0]);
        let out = pre.transform(&frame("Other")).unwrap();
        assert_eq!(out.row().to_vec(), vec![0.0, 1.0]);
    }

    #[test]
    fn test_inconsistent_step_rejected() {
        let err = ColumnPreprocessor::new(vec![Step::StandardScaler {
            name: "num".into(),
            columns: vec!["math_score".into()],
            mean: vec![],
            scale: vec![1.0],
        }])
        .unwrap_err();
        assert!(err.contains("num"));
        assert!(ColumnPreprocessor::new(vec![]).is_err());
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "steps": [
                {"kind": "passthrough", "name": "remainder", "columns": ["part_time_job"]},
                {"kind": "one_hot", "name": "cat", "columns": ["gender"], "categories": [["Male"]]}
            ]
        }"#;
        let pre = ColumnPreprocessor::from_json(json).unwrap();
        assert_eq!(pre.output_width(), 2);
        assert_eq!(pre.input_columns(), vec!["part_time_job", "gender"]);
        match &pre.steps()[1] {
            Step::OneHot { handle_unknown, drop_first, .. } => {
                assert_eq!(*handle_unknown, HandleUnknown::Error);
                assert!(!drop_first);
            }
            other => panic!("unexpected step {:?}", other),
        }
    }
}

//! Raw Input Record

use crate::frame::{FeatureFrame, FeatureValue};
use serde::{Deserialize, Serialize};

/// Column names of the training-time schema, in order
pub const COLUMNS: [&str; 11] = [
    "math_score",
    "history_score",
    "physics_score",
    "chemistry_score",
    "biology_score",
    "english_score",
    "geography_score",
    "part_time_job",
    "extracurricular_activities",
    "gender",
    "career_aspiration",
];

/// The seven subject scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubjectScores {
    pub math: f64,
    pub history: f64,
    pub physics: f64,
    pub chemistry: f64,
    pub biology: f64,
    pub english: f64,
    pub geography: f64,
}

impl SubjectScores {
    /// Scores keyed by their column name, in schema order
    pub fn named(&self) -> [(&'static str, f64); 7] {
        [
            (COLUMNS[0], self.math),
            (COLUMNS[1], self.history),
            (COLUMNS[2], self.physics),
            (COLUMNS[3], self.chemistry),
            (COLUMNS[4], self.biology),
            (COLUMNS[5], self.english),
            (COLUMNS[6], self.geography),
        ]
    }

    /// Same score for every subject
    pub fn uniform(score: f64) -> Self {
        Self {
            math: score,
            history: score,
            physics: score,
            chemistry: score,
            biology: score,
            english: score,
            geography: score,
        }
    }
}

impl Default for SubjectScores {
    fn default() -> Self {
        Self {
            math: 75.0,
            history: 70.0,
            physics: 72.0,
            chemistry: 68.0,
            biology: 65.0,
            english: 78.0,
            geography: 66.0,
        }
    }
}

/// Boolean attributes as entered by the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentFlags {
    pub part_time_job: bool,
    pub extracurricular_activities: bool,
}

/// Categorical selections. Labels must match the fitted vocabulary exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Categories {
    pub gender: String,
    pub career_aspiration: String,
}

impl Categories {
    pub fn new(gender: impl Into<String>, career_aspiration: impl Into<String>) -> Self {
        Self {
            gender: gender.into(),
            career_aspiration: career_aspiration.into(),
        }
    }
}

impl Default for Categories {
    fn default() -> Self {
        Self::new("Male", "Engineering")
    }
}

/// One submission, shaped like the training data.
///
/// Field order matches [`COLUMNS`]. Flags are stored as 0/1 because the
/// pipeline was fitted on integer columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawInputRecord {
    pub math_score: f64,
    pub history_score: f64,
    pub physics_score: f64,
    pub chemistry_score: f64,
    pub biology_score: f64,
    pub english_score: f64,
    pub geography_score: f64,
    pub part_time_job: u8,
    pub extracurricular_activities: u8,
    pub gender: String,
    pub career_aspiration: String,
}

impl RawInputRecord {
    /// Convert to the named-column table consumed by the preprocessor
    pub fn to_frame(&self) -> FeatureFrame {
        FeatureFrame::from_columns([
            (COLUMNS[0], FeatureValue::Float(self.math_score)),
            (COLUMNS[1], FeatureValue::Float(self.history_score)),
            (COLUMNS[2], FeatureValue::Float(self.physics_score)),
            (COLUMNS[3], FeatureValue::Float(self.chemistry_score)),
            (COLUMNS[4], FeatureValue::Float(self.biology_score)),
            (COLUMNS[5], FeatureValue::Float(self.english_score)),
            (COLUMNS[6], FeatureValue::Float(self.geography_score)),
            (COLUMNS[7], FeatureValue::Int(i64::from(self.part_time_job))),
            (
                COLUMNS[8],
                FeatureValue::Int(i64::from(self.extracurricular_activities)),
            ),
            (COLUMNS[9], FeatureValue::Text(self.gender.clone())),
            (COLUMNS[10], FeatureValue::Text(self.career_aspiration.clone())),
        ])
    }
}

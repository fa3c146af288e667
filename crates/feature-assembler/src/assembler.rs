//! Record Assembly

use crate::error::ValidationError;
use crate::record::{Categories, RawInputRecord, StudentFlags, SubjectScores};
use crate::validator::{ValidationConfig, Validator};
use tracing::debug;

/// Build a record from already-bounded form input.
///
/// Scores are copied as given; flags become 0/1; labels are not checked
/// against their domains, so an unknown label surfaces later as a transform
/// failure.
pub fn assemble(scores: SubjectScores, flags: StudentFlags, categories: Categories) -> RawInputRecord {
    RawInputRecord {
        math_score: scores.math,
        history_score: scores.history,
        physics_score: scores.physics,
        chemistry_score: scores.chemistry,
        biology_score: scores.biology,
        english_score: scores.english,
        geography_score: scores.geography,
        part_time_job: u8::from(flags.part_time_job),
        extracurricular_activities: u8::from(flags.extracurricular_activities),
        gender: categories.gender,
        career_aspiration: categories.career_aspiration,
    }
}

/// Assembler for callers outside the trusted form, which re-checks score ranges
#[derive(Debug, Clone, Default)]
pub struct FeatureAssembler {
    validator: Validator,
}

impl FeatureAssembler {
    /// Create an assembler with the given validation config
    pub fn new(config: ValidationConfig) -> Self {
        Self {
            validator: Validator::new(config),
        }
    }

    /// Validate scores, then assemble
    pub fn assemble_checked(
        &self,
        scores: SubjectScores,
        flags: StudentFlags,
        categories: Categories,
    ) -> Result<RawInputRecord, ValidationError> {
        self.validator.validate_scores(&scores)?;
        let record = assemble(scores, flags, categories);
        debug!(
            gender = %record.gender,
            career_aspiration = %record.career_aspiration,
            "Assembled input record"
        );
        Ok(record)
    }
}

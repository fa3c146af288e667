//! Student Feature Assembly
//!
//! Collects the eleven student attributes into the single-row, named-column
//! record the trained preprocessing pipeline was fitted on.

mod assembler;
mod domain;
mod error;
mod frame;
mod record;
mod validator;

pub use assembler::{assemble, FeatureAssembler};
pub use domain::{
    form_schema, CategoricalField, FlagField, FormSchema, NumericField, CAREER_ASPIRATION_OPTIONS,
    GENDER_OPTIONS, SCORE_MAX, SCORE_MIN, SCORE_STEP,
};
pub use error::ValidationError;
pub use frame::{FeatureFrame, FeatureValue};
pub use record::{Categories, RawInputRecord, StudentFlags, SubjectScores, COLUMNS};
pub use validator::{ValidationConfig, Validator};

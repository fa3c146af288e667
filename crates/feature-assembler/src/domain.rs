//! Fixed value domains and the input form description

use crate::record::{Categories, SubjectScores, COLUMNS};
use serde::Serialize;

pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 100.0;
pub const SCORE_STEP: f64 = 0.5;

/// Gender labels offered by the form
pub const GENDER_OPTIONS: [&str; 3] = ["Male", "Female", "Other"];

/// Career aspiration labels offered by the form
pub const CAREER_ASPIRATION_OPTIONS: [&str; 5] =
    ["Engineering", "Medicine", "Arts", "Commerce", "Others"];

const VOCABULARY_NOTE: &str = "Dropdown values must match the original labels in the training data \
     for gender and career_aspiration. If the dataset used different labels (for example 'M'/'F' \
     instead of 'Male'/'Female'), change the options accordingly.";

/// A bounded numeric input
#[derive(Debug, Clone, Serialize)]
pub struct NumericField {
    pub name: &'static str,
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
}

/// A dropdown input
#[derive(Debug, Clone, Serialize)]
pub struct CategoricalField {
    pub name: &'static str,
    pub label: &'static str,
    pub options: Vec<&'static str>,
    pub default: &'static str,
}

/// A checkbox input
#[derive(Debug, Clone, Serialize)]
pub struct FlagField {
    pub name: &'static str,
    pub label: &'static str,
    pub default: bool,
}

/// Everything a presentation layer needs to render the input form
#[derive(Debug, Clone, Serialize)]
pub struct FormSchema {
    pub scores: Vec<NumericField>,
    pub categories: Vec<CategoricalField>,
    pub flags: Vec<FlagField>,
    pub note: &'static str,
}

const SCORE_LABELS: [&str; 7] = [
    "Math score",
    "History score",
    "Physics score",
    "Chemistry score",
    "Biology score",
    "English score",
    "Geography score",
];

/// Build the form description from the schema constants
pub fn form_schema() -> FormSchema {
    let scores = SubjectScores::default()
        .named()
        .into_iter()
        .zip(SCORE_LABELS)
        .map(|((name, default), label)| NumericField {
            name,
            label,
            min: SCORE_MIN,
            max: SCORE_MAX,
            step: SCORE_STEP,
            default,
        })
        .collect();

    let defaults = Categories::default();
    let default_of = |options: &[&'static str], wanted: &str| {
        options
            .iter()
            .copied()
            .find(|o| *o == wanted)
            .unwrap_or(options[0])
    };

    let categories = vec![
        CategoricalField {
            name: COLUMNS[9],
            label: "Gender",
            options: GENDER_OPTIONS.to_vec(),
            default: default_of(&GENDER_OPTIONS, &defaults.gender),
        },
        CategoricalField {
            name: COLUMNS[10],
            label: "Career aspiration",
            options: CAREER_ASPIRATION_OPTIONS.to_vec(),
            default: default_of(&CAREER_ASPIRATION_OPTIONS, &defaults.career_aspiration),
        },
    ];

    let flags = vec![
        FlagField {
            name: COLUMNS[7],
            label: "Has a part-time job",
            default: false,
        },
        FlagField {
            name: COLUMNS[8],
            label: "Participates in extracurricular activities",
            default: false,
        },
    ];

    FormSchema {
        scores,
        categories,
        flags,
        note: VOCABULARY_NOTE,
    }
}

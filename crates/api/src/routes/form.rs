//! Form Route

use axum::Json;
use feature_assembler::{form_schema, FormSchema};

/// Describe the input form: fields, bounds, defaults and dropdown options
pub async fn get_form() -> Json<FormSchema> {
    Json(form_schema())
}

use actix_web::{HttpResponse, error::UrlencodedError, web};
use serde::Serialize;
use validator::ValidationErrors;

/// Error envelope shared by every failing endpoint
#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        ErrorResponse {
            success: false,
            error: error.into(),
        }
    }
}

/// Creates a configured FormConfig with standardized error handling for the entire project
pub fn form_config() -> web::FormConfig {
    web::FormConfig::default().error_handler(|err, _req| {
        let message = match &err {
            UrlencodedError::ContentType => "Request must be form-encoded".to_string(),
            other => format!("Invalid form data: {}", other),
        };

        actix_web::error::InternalError::from_response(
            "",
            HttpResponse::BadRequest().json(ErrorResponse::new(message)),
        )
        .into()
    })
}

/// Flattens validator output into a single user-facing message
pub fn validation_message(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errors| errors.iter())
        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .next()
        .unwrap_or_else(|| "Validation failed".to_string())
}

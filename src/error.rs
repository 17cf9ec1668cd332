use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use serde_json::json;
use validator::ValidationErrors;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ErrorMessage {
    #[error("Email or password is wrong")]
    WrongCredentials,
    #[error("Email already registered")]
    EmailExist,
    #[error("User belonging to this token no longer exists")]
    UserNoLongerExist,
    #[error("You are not logged in, please provide a token")]
    TokenNotProvided,
    #[error("Authentication token is invalid or expired")]
    InvalidToken,
    #[error("You are not allowed to perform this action")]
    PermissionDenied,
    #[error("User is not authenticated")]
    UserNotAuthenticated,
    #[error("Password cannot be empty")]
    EmptyPassword,
    #[error("Password must not be more than {0} characters")]
    ExceededMaxPasswordLength(usize),
    #[error("Invalid password hash format")]
    InvalidHashFormat,
    #[error("Error while hashing password")]
    HashingError,
    #[error("Server error")]
    ServerError,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct HttpError {
    pub message: String,
    pub status: StatusCode,
    pub errors: Option<Vec<FieldError>>,
}

impl HttpError {
    pub fn new(message: impl Into<String>, status: StatusCode) -> Self {
        HttpError {
            message: message.into(),
            status,
            errors: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        HttpError::new(message, StatusCode::BAD_REQUEST)
    }

    /// Field-level validation failure, serialized as an `errors` list.
    pub fn validation(errors: ValidationErrors) -> Self {
        let errors = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| FieldError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();

        HttpError {
            message: "Validation failed".to_string(),
            status: StatusCode::BAD_REQUEST,
            errors: Some(errors),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        HttpError::new(message, StatusCode::UNAUTHORIZED)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        HttpError::new(message, StatusCode::FORBIDDEN)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        HttpError::new(message, StatusCode::NOT_FOUND)
    }

    /// Internal failure. The detail is logged server-side only; clients get
    /// the generic message.
    pub fn server_error(detail: impl Into<String>) -> Self {
        tracing::error!("internal error: {}", detail.into());
        HttpError::new(ErrorMessage::ServerError.to_string(), StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HttpError: message: {}, status: {}", self.message, self.status)
    }
}

impl std::error::Error for HttpError {}

impl IntoResponse for HttpError {
    fn into_response(self) -> axum::response::Response {
        let body = match self.errors {
            Some(errors) => json!({
                "success": false,
                "message": self.message,
                "errors": errors,
            }),
            None => json!({
                "success": false,
                "message": self.message,
            }),
        };

        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 3, message = "Name must be at least 3 characters"))]
        name: String,
    }

    #[test]
    fn constructors_map_to_status_codes() {
        assert_eq!(HttpError::bad_request("x").status, StatusCode::BAD_REQUEST);
        assert_eq!(HttpError::unauthorized("x").status, StatusCode::UNAUTHORIZED);
        assert_eq!(HttpError::forbidden("x").status, StatusCode::FORBIDDEN);
        assert_eq!(HttpError::not_found("x").status, StatusCode::NOT_FOUND);
        assert_eq!(
            HttpError::server_error("boom").status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn server_error_hides_internal_detail() {
        let err = HttpError::server_error("connection refused (db=10.0.0.3)");
        assert_eq!(err.message, ErrorMessage::ServerError.to_string());
        assert!(!err.message.contains("10.0.0.3"));
    }

    #[test]
    fn validation_failure_carries_field_errors() {
        let probe = Probe { name: "ab".to_string() };
        let err = HttpError::validation(probe.validate().unwrap_err());
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        let errors = err.errors.expect("field errors");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "name");
        assert_eq!(errors[0].message, "Name must be at least 3 characters");
    }
}

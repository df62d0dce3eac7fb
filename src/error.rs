use crate::repository::database::DatabaseError;
use crate::util::token::TokenError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use diesel::result::DatabaseErrorKind;
use log::error;
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Current password is incorrect")]
    WrongCurrentPassword,
    #[error("Not authenticated: {0}")]
    Unauthorized(&'static str),
    #[error("Forbidden: {0}")]
    Forbidden(&'static str),
    #[error("Invalid token: {0}")]
    InvalidToken(#[from] TokenError),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Conflict: {0}")]
    Conflict(&'static str),
    #[error("Transaction rolled back")]
    Transaction,
    #[error("Database timeout")]
    Timeout,
    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    fn body(&self) -> ErrorResponse {
        let (error, message): (&str, Option<String>) = match self {
            ApiError::Validation(msg) => ("Validation failed", Some(msg.clone())),
            ApiError::InvalidCredentials => (
                "Invalid credentials",
                Some("Incorrect username or password".to_string()),
            ),
            ApiError::WrongCurrentPassword => (
                "Incorrect password",
                Some("The current password is not correct".to_string()),
            ),
            ApiError::Unauthorized(msg) => ("Access denied", Some(msg.to_string())),
            ApiError::Forbidden(msg) => ("Access denied", Some(msg.to_string())),
            ApiError::InvalidToken(TokenError::Expired) => {
                ("Invalid token", Some("Token has expired".to_string()))
            }
            ApiError::InvalidToken(_) => ("Invalid token", Some("Token is malformed".to_string())),
            ApiError::NotFound(what) => {
                return ErrorResponse {
                    error: format!("{what} not found"),
                    message: None,
                }
            }
            ApiError::Conflict(msg) => ("Already exists", Some(msg.to_string())),
            ApiError::Transaction => (
                "Transaction failed",
                Some("The change was rolled back".to_string()),
            ),
            ApiError::Timeout => (
                "Database timeout",
                Some("The database did not answer in time".to_string()),
            ),
            ApiError::Internal => ("Internal server error", None),
        };
        ErrorResponse {
            error: error.to_string(),
            message,
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials
            | ApiError::WrongCurrentPassword
            | ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) | ApiError::InvalidToken(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Transaction | ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Timeout => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.body())
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(describe_validation_errors(&errors))
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(what) => ApiError::NotFound(what),
            DatabaseError::Timeout(after) => {
                error!("Database operation timed out after {:?}", after);
                ApiError::Timeout
            }
            DatabaseError::Query(diesel::result::Error::DatabaseError(
                DatabaseErrorKind::UniqueViolation,
                _,
            )) => ApiError::Conflict("A record with that identifier already exists"),
            DatabaseError::Transaction(source) => {
                error!("Transaction rolled back. The error: {:?}", source);
                ApiError::Transaction
            }
            other => {
                error!("Unhandled database error. The error: {:?}", other);
                ApiError::Internal
            }
        }
    }
}

impl From<actix_web::error::BlockingError> for ApiError {
    fn from(err: actix_web::error::BlockingError) -> Self {
        error!("Blocking task failed. The error: {:?}", err);
        ApiError::Internal
    }
}

impl From<argon2::password_hash::Error> for ApiError {
    fn from(err: argon2::password_hash::Error) -> Self {
        error!("Password hashing failed. The error: {:?}", err);
        ApiError::Internal
    }
}

/// Flattens validator output into `field: message; field: message`, sorted by field.
pub fn describe_validation_errors(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .errors()
        .iter()
        .filter_map(|(field, kind)| match kind {
            validator::ValidationErrorsKind::Field(list) => Some((*field, list)),
            _ => None,
        })
        .flat_map(|(field, list)| {
            list.iter().map(move |e| {
                let text = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                if field == "__all__" {
                    text
                } else {
                    format!("{field}: {text}")
                }
            })
        })
        .collect();
    parts.sort();
    parts.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 3, message = "too short"))]
        name: String,
    }

    #[test]
    fn statuses_follow_the_error_taxonomy() {
        assert_eq!(ApiError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Unauthorized("x").status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden("x").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::InvalidToken(TokenError::Expired).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(ApiError::NotFound("Team").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Conflict("x").status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::Transaction.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::Timeout.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn unique_violation_maps_to_conflict() {
        struct Info;
        impl diesel::result::DatabaseErrorInformation for Info {
            fn message(&self) -> &str {
                "duplicate key value violates unique constraint \"teams_pkey\""
            }
            fn details(&self) -> Option<&str> {
                None
            }
            fn hint(&self) -> Option<&str> {
                None
            }
            fn table_name(&self) -> Option<&str> {
                Some("teams")
            }
            fn column_name(&self) -> Option<&str> {
                None
            }
            fn constraint_name(&self) -> Option<&str> {
                Some("teams_pkey")
            }
            fn statement_position(&self) -> Option<i32> {
                None
            }
        }

        let err = DatabaseError::Query(diesel::result::Error::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new(Info),
        ));
        assert!(matches!(ApiError::from(err), ApiError::Conflict(_)));
    }

    #[actix_web::test]
    async fn internal_errors_do_not_leak_details() {
        let err = ApiError::from(DatabaseError::Query(diesel::result::Error::NotFound));
        let body = to_bytes(err.error_response().into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["error"], "Internal server error");
        assert!(json.get("message").is_none());
    }

    #[test]
    fn validation_messages_name_the_field() {
        let errors = Probe {
            name: "ab".to_string(),
        }
        .validate()
        .unwrap_err();
        assert_eq!(describe_validation_errors(&errors), "name: too short");
    }
}

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::types::ApiErrorResponse;

/// Application error codes following the pattern E{area}{sequence}
///
/// Ranges:
/// - E0xxx: Shared/infrastructure errors
/// - E1xxx: General user and approval errors
/// - E2xxx: Token errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Shared (E0xxx)
    InternalError,
    ValidationError,
    NotFound,
    Unauthorized,
    Forbidden,

    // General user / approval (E1xxx)
    GeneralUserInvalidPassword,
    GeneralUserReqExists,
    ApprovalPending,
    ApprovalRejected,
    InvalidApprovalStatus,
    InvalidStatusTransition,

    // Token (E2xxx)
    TokenExpired,
    TokenInvalid,
    InvalidSignature,
    InvalidSignatureMethod,
}

impl ErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            // Shared
            Self::InternalError => "E0001",
            Self::ValidationError => "E0002",
            Self::NotFound => "E0003",
            Self::Unauthorized => "E0004",
            Self::Forbidden => "E0005",

            // General user / approval
            Self::GeneralUserInvalidPassword => "E1001",
            Self::GeneralUserReqExists => "E1002",
            Self::ApprovalPending => "E1003",
            Self::ApprovalRejected => "E1004",
            Self::InvalidApprovalStatus => "E1005",
            Self::InvalidStatusTransition => "E1006",

            // Token
            Self::TokenExpired => "E2001",
            Self::TokenInvalid => "E2002",
            Self::InvalidSignature => "E2003",
            Self::InvalidSignatureMethod => "E2004",
        }
    }

    /// Human readable error name surfaced next to the machine code.
    pub fn name(&self) -> &'static str {
        match self {
            Self::InternalError => "INTERNAL_ERROR",
            Self::ValidationError => "INVALID_INPUT",
            Self::NotFound => "ENTITY_NOT_FOUND",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::GeneralUserInvalidPassword => "ERROR_GENERAL_USER_INVALID_PASSWORD",
            Self::GeneralUserReqExists => "ERROR_GENERAL_USER_REQ_EXISTS",
            Self::ApprovalPending => "ERROR_GENERAL_USER_REQ_PENDING",
            Self::ApprovalRejected => "ERROR_GENERAL_USER_REQ_REJECTED",
            Self::InvalidApprovalStatus => "ERROR_GENERAL_USER_INVALID_STATUS",
            Self::InvalidStatusTransition => "ERROR_GENERAL_USER_INVALID_STATUS_TRANSITION",
            Self::TokenExpired => "ERROR_TOKEN_EXPIRED",
            Self::TokenInvalid => "ERROR_INVALID_TOKEN",
            Self::InvalidSignature => "ERROR_INVALID_TOKEN_SIGNATURE",
            Self::InvalidSignatureMethod => "ERROR_INVALID_TOKEN_SIGNATURE_METHOD",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InternalError | Self::InvalidApprovalStatus => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ValidationError | Self::GeneralUserInvalidPassword
            | Self::GeneralUserReqExists | Self::InvalidStatusTransition => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Unauthorized | Self::TokenExpired | Self::TokenInvalid
            | Self::InvalidSignature | Self::InvalidSignatureMethod => StatusCode::UNAUTHORIZED,
            Self::Forbidden | Self::ApprovalPending | Self::ApprovalRejected => StatusCode::FORBIDDEN,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Known {
        code: ErrorCode,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(code: ErrorCode, message: impl Into<String>, details: serde_json::Value) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Builds an `INVALID_INPUT` error carrying the per-field violation list.
    pub fn invalid_input(errors: &validator::ValidationErrors) -> Self {
        let violations = collect_violations(None, errors);
        Self::with_details(
            ErrorCode::ValidationError,
            "validation failed",
            serde_json::Value::Array(violations),
        )
    }

    /// The taxonomy code this error is surfaced with.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            AppError::Known { code, .. } => *code,
            AppError::Internal(_) => ErrorCode::InternalError,
            AppError::Database(diesel::result::Error::NotFound) => ErrorCode::NotFound,
            AppError::Database(_) => ErrorCode::InternalError,
        }
    }

    pub fn is(&self, code: ErrorCode) -> bool {
        self.error_code() == code
    }
}

fn collect_violations(
    prefix: Option<&str>,
    errors: &validator::ValidationErrors,
) -> Vec<serde_json::Value> {
    use validator::ValidationErrorsKind;

    let mut out = Vec::new();
    for (field, kind) in errors.errors() {
        let path = match prefix {
            Some(p) => format!("{p}.{field}"),
            None => field.to_string(),
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for e in field_errors {
                    out.push(serde_json::json!({
                        "field": path,
                        "code": e.code,
                        "message": e.message.as_ref().map(|m| m.to_string()),
                    }));
                }
            }
            ValidationErrorsKind::Struct(nested) => {
                out.extend(collect_violations(Some(&path), nested));
            }
            ValidationErrorsKind::List(items) => {
                for (idx, nested) in items {
                    out.extend(collect_violations(Some(&format!("{path}[{idx}]")), nested));
                }
            }
        }
    }
    // HashMap iteration order is not stable
    out.sort_by(|a, b| a["field"].as_str().cmp(&b["field"].as_str()));
    out
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            AppError::Known { code, message, details } => {
                let status = code.status_code();
                if status.is_server_error() {
                    tracing::error!(code = code.code(), "{message}");
                } else {
                    tracing::warn!(code = code.code(), "{message}");
                }
                let mut resp = ApiErrorResponse::from_code(*code, message);
                if let Some(d) = details {
                    resp = resp.with_extra(d.clone());
                }
                (status, resp)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorResponse::from_code(ErrorCode::InternalError, "internal server error"),
                )
            }
            AppError::Database(err) => {
                tracing::error!(error = %err, "database error");
                match err {
                    diesel::result::Error::NotFound => (
                        StatusCode::NOT_FOUND,
                        ApiErrorResponse::from_code(ErrorCode::NotFound, "resource not found"),
                    ),
                    _ => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ApiErrorResponse::from_code(ErrorCode::InternalError, "database error"),
                    ),
                }
            }
        };

        (status, Json(error_response)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "name is required"))]
        name: String,
        #[validate(range(min = 1))]
        count: u32,
    }

    async fn body_json(err: AppError) -> serde_json::Value {
        let response = err.into_response();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn known_error_envelope() {
        let value = body_json(AppError::new(ErrorCode::ApprovalPending, "request pending")).await;

        assert_eq!(value["success"], false);
        assert_eq!(value["error"]["statusCode"], 403);
        assert_eq!(value["error"]["code"], "E1003");
        assert_eq!(value["error"]["name"], "ERROR_GENERAL_USER_REQ_PENDING");
        assert_eq!(value["error"]["message"], "request pending");
        assert!(value["error"].get("extra").is_none());
    }

    #[tokio::test]
    async fn invalid_input_carries_violations() {
        let sample = Sample { name: String::new(), count: 0 };
        let errors = sample.validate().unwrap_err();
        let err = AppError::invalid_input(&errors);
        assert!(err.is(ErrorCode::ValidationError));

        let value = body_json(err).await;
        assert_eq!(value["error"]["statusCode"], 400);
        assert_eq!(value["error"]["name"], "INVALID_INPUT");

        let extra = value["error"]["extra"].as_array().unwrap();
        assert_eq!(extra.len(), 2);
        assert_eq!(extra[0]["field"], "count");
        assert_eq!(extra[1]["field"], "name");
        assert_eq!(extra[1]["message"], "name is required");
    }

    #[test]
    fn error_code_of_internal_variants() {
        let err = AppError::Internal(anyhow::anyhow!("boom"));
        assert_eq!(err.error_code(), ErrorCode::InternalError);

        let err = AppError::Database(diesel::result::Error::NotFound);
        assert_eq!(err.error_code(), ErrorCode::NotFound);
    }

    #[test]
    fn codes_are_unique() {
        let all = [
            ErrorCode::InternalError,
            ErrorCode::ValidationError,
            ErrorCode::NotFound,
            ErrorCode::Unauthorized,
            ErrorCode::Forbidden,
            ErrorCode::GeneralUserInvalidPassword,
            ErrorCode::GeneralUserReqExists,
            ErrorCode::ApprovalPending,
            ErrorCode::ApprovalRejected,
            ErrorCode::InvalidApprovalStatus,
            ErrorCode::InvalidStatusTransition,
            ErrorCode::TokenExpired,
            ErrorCode::TokenInvalid,
            ErrorCode::InvalidSignature,
            ErrorCode::InvalidSignatureMethod,
        ];
        let mut codes: Vec<_> = all.iter().map(|c| c.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
    }
}

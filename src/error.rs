use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::editor::ValidationError;
use crate::store::StoreError;
use crate::toollist::ToolListError;

/// A structured application error that can be serialized and surfaced to a
/// UI layer as a notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppError {
    /// Machine readable error code.
    pub code: String,
    /// Human friendly message that can be shown directly to the user.
    pub message: String,
    /// Arbitrary key/value pairs that provide additional context.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, String>,
}

pub type AppResult<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Default code used when an upstream error does not expose a specific code.
    pub const UNKNOWN_CODE: &'static str = "APP/UNKNOWN";

    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        AppError {
            code: code.into(),
            message: message.into(),
            context: HashMap::new(),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn context(&self) -> &HashMap<String, String> {
        &self.context
    }

    /// Adds a contextual key/value pair to the error.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.context.is_empty() {
            write!(f, "[{}] {}", self.code, self.message)
        } else {
            write!(f, "[{}] {} ({:?})", self.code, self.message, self.context)
        }
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => AppError::new("DB/ROW_NOT_FOUND", "Record not found"),
            sqlx::Error::PoolTimedOut => AppError::new(
                "DB/POOL_TIMEOUT",
                "Timed out acquiring a database connection",
            ),
            sqlx::Error::PoolClosed => AppError::new("DB/POOL_CLOSED", "Database pool is closed"),
            sqlx::Error::Database(db) => {
                let code = db
                    .code()
                    .map(|code| format!("Sqlite/{code}"))
                    .unwrap_or_else(|| "DB/DATABASE".to_string());
                AppError::new(code, db.message().to_string())
            }
            other => AppError::new("DB/ERROR", other.to_string()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        let code = if error.is_data() {
            "JSON/DATA"
        } else if error.is_syntax() {
            "JSON/SYNTAX"
        } else if error.is_eof() {
            "JSON/EOF"
        } else {
            "JSON/ERROR"
        };
        AppError::new(code, error.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound => AppError::new("STORE/NOT_FOUND", "Setup sheet not found"),
            StoreError::Constraint(msg) => AppError::new("STORE/CONSTRAINT", msg),
            StoreError::Closed => AppError::new("STORE/CLOSED", "The record store has shut down"),
            StoreError::Db(err) => AppError::from(err),
        }
    }
}

impl From<ToolListError> for AppError {
    fn from(error: ToolListError) -> Self {
        AppError::new("TOOL_LIST/MALFORMED", error.to_string())
    }
}

impl From<ValidationError> for AppError {
    fn from(error: ValidationError) -> Self {
        let code = match error {
            ValidationError::MissingTitle => "VALIDATION/TITLE",
            ValidationError::MissingCoordinates => "VALIDATION/COORDINATES",
            ValidationError::MissingMainSpindleTool => "VALIDATION/MAIN_TOOLS",
            ValidationError::MissingProjectionLength => "VALIDATION/PROJECTION_LENGTH",
            ValidationError::MissingBarSize => "VALIDATION/BAR_SIZE",
        };
        AppError::new(code, error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_error_with_context() {
        let error = AppError::new("TEST/CODE", "Something went wrong")
            .with_context("operation", "add")
            .with_context("id", "7");

        assert_eq!(error.code(), "TEST/CODE");
        assert_eq!(error.message(), "Something went wrong");
        assert_eq!(error.context().get("operation"), Some(&"add".to_string()));
        assert_eq!(error.context().get("id"), Some(&"7".to_string()));
    }

    #[test]
    fn store_not_found_translates_to_specific_code() {
        let error = AppError::from(StoreError::NotFound);
        assert_eq!(error.code(), "STORE/NOT_FOUND");
    }

    #[test]
    fn validation_errors_keep_their_field_code() {
        let error = AppError::from(ValidationError::MissingBarSize);
        assert_eq!(error.code(), "VALIDATION/BAR_SIZE");
        assert_eq!(error.message(), "bar size is required");
    }

    #[test]
    fn json_shape_is_flat_struct() {
        let error = AppError::new("VALIDATION/TITLE", "part name is required")
            .with_context("field", "title");
        let json = serde_json::to_string(&error).expect("serialize app error");

        let value: serde_json::Value = serde_json::from_str(&json).expect("parse serialized error");
        assert_eq!(
            value.get("code").and_then(|v| v.as_str()),
            Some("VALIDATION/TITLE")
        );
        assert_eq!(
            value
                .get("context")
                .and_then(|c| c.get("field"))
                .and_then(|v| v.as_str()),
            Some("title")
        );
    }
}

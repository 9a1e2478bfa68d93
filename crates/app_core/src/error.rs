//! Application error types

use app_api::FetchError;
use thiserror::Error;

/// Upload candidate rejected before any network call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unsupported file type")]
    UnsupportedFileType { media_type: Option<String> },

    #[error("Please select a file")]
    NoFileSelected,

    #[error("Cannot read {path}: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("An upload is already in progress")]
    UploadPending,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    // ===== Recoverable Errors (notify user, continue) =====
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Preview unavailable: {0}")]
    Render(String),

    #[error("Preference store error: {0}")]
    Preferences(#[from] app_db::DbError),

    // ===== Fatal Errors (application termination) =====
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Initialization failed: {0}")]
    Init(String),
}

impl AppError {
    /// Is this error recoverable?
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::Fetch(_)
                | AppError::Validation(_)
                | AppError::Render(_)
                | AppError::Preferences(_)
        )
    }

    /// Get a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            AppError::Fetch(e) => match e.operation() {
                Some(op) => op.failure_message().to_string(),
                None => e.to_string(),
            },
            AppError::Validation(ValidationError::UnsupportedFileType { .. }) => {
                "Please select a PDF or image file".to_string()
            }
            AppError::Render(_) => "Preview unavailable".to_string(),
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use app_api::Operation;

    #[test]
    fn test_fetch_error_user_message() {
        let err: AppError = FetchError::Status {
            op: Operation::ListFiles,
            status: 503,
            body: String::new(),
        }
        .into();
        assert!(err.is_recoverable());
        assert_eq!(err.user_message(), "Failed to fetch files");
    }

    #[test]
    fn test_validation_messages() {
        let unsupported = ValidationError::UnsupportedFileType { media_type: Some("text/plain".into()) };
        assert_eq!(unsupported.to_string(), "unsupported file type");

        let err: AppError = unsupported.into();
        assert_eq!(err.user_message(), "Please select a PDF or image file");
        assert_eq!(AppError::from(ValidationError::NoFileSelected).user_message(), "Please select a file");
    }

    #[test]
    fn test_config_and_init_are_not_recoverable() {
        assert!(!AppError::Config("bad".into()).is_recoverable());
        assert!(!AppError::Init("no window".into()).is_recoverable());
        assert!(AppError::Render("broken".into()).is_recoverable());
    }
}

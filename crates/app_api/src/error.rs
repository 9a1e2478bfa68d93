//! Fetch error taxonomy

use thiserror::Error;

/// The logical action a request performed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListFiles,
    GetFile,
    CreateFile,
    UpdateFile,
    DeleteFile,
}

impl Operation {
    /// Message shown to the user when this operation fails
    pub fn failure_message(self) -> &'static str {
        match self {
            Operation::ListFiles => "Failed to fetch files",
            Operation::GetFile => "Failed to fetch file",
            Operation::CreateFile => "Failed to add file",
            Operation::UpdateFile => "Failed to update file",
            Operation::DeleteFile => "Failed to delete file",
        }
    }
}

/// Any failed call against the files resource
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("{} (HTTP {status})", .op.failure_message())]
    Status { op: Operation, status: u16, body: String },

    #[error("{}: {source}", .op.failure_message())]
    Transport {
        op: Operation,
        #[source]
        source: reqwest::Error,
    },

    #[error("{}: unexpected response body ({source})", .op.failure_message())]
    Decode {
        op: Operation,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid API base URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP client error: {0}")]
    Client(#[source] reqwest::Error),
}

impl FetchError {
    /// Operation that failed, when the failure came from a request
    pub fn operation(&self) -> Option<Operation> {
        match self {
            FetchError::Status { op, .. }
            | FetchError::Transport { op, .. }
            | FetchError::Decode { op, .. } => Some(*op),
            FetchError::InvalidUrl(_) | FetchError::Client(_) => None,
        }
    }

    /// The server answered 404 for the requested record
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::Status { status: 404, .. })
    }

    /// HTTP status, when the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

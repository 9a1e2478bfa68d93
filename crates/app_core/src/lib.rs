//! FileDesk Core Domain Logic
//!
//! This crate contains:
//! - Application state management
//! - Configuration
//! - Error types
//! - The dashboard list query (filter, sort, paginate)
//! - Upload staging
//! - Detail view navigation
//! - The cached files query
//! - Routes and commands

pub mod command;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod files_query;
pub mod navigation;
pub mod query;
pub mod route;
pub mod state;
pub mod upload;

#[cfg(test)]
mod test_support;

pub use command::{Command, CommandId};
pub use config::{
    AppConfig, ApiConfig, DashboardConfig, GeneralConfig, QueryConfig, API_URL_ENV,
};
pub use dashboard::DashboardState;
pub use error::{AppError, ValidationError};
pub use files_query::{FetchOutcome, FilesQuery, FilesSnapshot, QueryOptions};
pub use navigation::{DetailNavigation, DetailState, SIDE_LIST_SIZE};
pub use query::{
    filter_records, paginate, sort_records, total_pages, ListQuery, QueryPage, SortConfig,
    SortDirection, SortKey,
};
pub use route::Route;
pub use state::AppState;
pub use upload::{
    stage, validate, IdGenerator, SubmitLatch, UploadCandidate, UploadSource, ALLOWED_MEDIA_TYPES,
    PICKER_EXTENSIONS,
};

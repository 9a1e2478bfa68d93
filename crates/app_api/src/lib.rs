//! FileDesk backend access
//!
//! Provides:
//! - The `FileRecord` resource model
//! - `FileSource`, the CRUD seam over the `/files` resource
//! - `FilesApi`, the HTTP implementation

mod client;
mod error;
mod record;

pub use client::{FileSource, FilesApi};
pub use error::{FetchError, Operation};
pub use record::{FileRecord, FileType, RecordPatch, ANONYMOUS};

pub use reqwest::Url;

pub type Result<T> = std::result::Result<T, FetchError>;

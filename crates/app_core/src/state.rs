//! Application state management

use crate::error::ValidationError;
use crate::files_query::{FetchOutcome, FilesQuery, QueryOptions};
use crate::upload::{stage, IdGenerator, SubmitLatch, UploadCandidate};
use crate::{AppConfig, AppError};
use app_api::{FetchError, FileRecord, FileSource};
use app_db::PreferenceStore;
use parking_lot::RwLock;
use std::sync::Arc;

/// Main application state, shared between the UI thread and async tasks
pub struct AppState {
    /// Application configuration
    pub config: RwLock<AppConfig>,

    /// Persisted UI preferences
    pub prefs: PreferenceStore,

    /// Backend access
    pub source: Arc<dyn FileSource>,

    /// Cached file list
    pub files: FilesQuery,

    /// Ids for staged uploads
    pub ids: IdGenerator,

    /// Held while a create call is pending
    pub upload_latch: SubmitLatch,
}

impl AppState {
    pub fn new(config: AppConfig, prefs: PreferenceStore, source: Arc<dyn FileSource>) -> Self {
        let files = FilesQuery::new(source.clone(), QueryOptions::from(&config.query));
        Self {
            config: RwLock::new(config),
            prefs,
            source,
            files,
            ids: IdGenerator::new(),
            upload_latch: SubmitLatch::new(),
        }
    }

    /// Fetch the file list into the query cache
    pub async fn refresh_files(&self) -> Result<FetchOutcome, FetchError> {
        self.files.fetch().await
    }

    pub fn is_uploading(&self) -> bool {
        self.upload_latch.is_busy()
    }

    /// Validate, stage and create `candidate`, then invalidate the file list.
    ///
    /// Rejected candidates and overlapping submissions never reach the backend.
    pub async fn upload(
        &self,
        candidate: &UploadCandidate,
        uploaded_by: &str,
    ) -> Result<FileRecord, AppError> {
        let _guard = self
            .upload_latch
            .try_acquire()
            .ok_or(ValidationError::UploadPending)?;

        let record = stage(candidate, uploaded_by, &self.ids)?;
        let created = self.source.create(&record).await?;

        tracing::info!(id = %created.id, name = %created.file_name, "File uploaded");
        self.files.invalidate();
        Ok(created)
    }
}

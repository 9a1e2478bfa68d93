//! Cached `GET /files` query
//!
//! One logical query key. Each fetch takes a sequence number at start; a
//! completed fetch is applied only if no newer fetch has been applied
//! already, so a slow older request can never overwrite fresher data.

use crate::config::QueryConfig;
use app_api::{FetchError, FileRecord, FileSource};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Retry and freshness policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// Extra attempts after the first failure
    pub retry: u32,
    pub retry_delay: Duration,
    pub stale_time: Duration,
    pub refetch_on_focus: bool,
}

impl From<&QueryConfig> for QueryOptions {
    fn from(config: &QueryConfig) -> Self {
        Self {
            retry: config.retry,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            stale_time: Duration::from_secs(config.stale_time_secs),
            refetch_on_focus: config.refetch_on_focus,
        }
    }
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self::from(&QueryConfig::default())
    }
}

/// What became of a completed fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    /// A newer fetch had already been applied
    Discarded,
}

/// Point-in-time view of the query for rendering
#[derive(Debug, Clone, Default)]
pub struct FilesSnapshot {
    /// Last successfully fetched list, if any
    pub records: Option<Arc<Vec<FileRecord>>>,
    /// Failure message of the last applied fetch
    pub error: Option<String>,
    pub is_fetching: bool,
}

impl FilesSnapshot {
    /// Nothing to show yet and no error to report
    pub fn is_loading(&self) -> bool {
        self.records.is_none() && self.error.is_none()
    }

    pub fn records(&self) -> &[FileRecord] {
        self.records.as_deref().map(Vec::as_slice).unwrap_or(&[])
    }
}

#[derive(Debug, Default)]
struct QueryState {
    records: Option<Arc<Vec<FileRecord>>>,
    error: Option<String>,
    applied_seq: u64,
    in_flight: usize,
    fetched_at: Option<Instant>,
    invalidated: bool,
}

pub struct FilesQuery {
    source: Arc<dyn FileSource>,
    options: QueryOptions,
    state: RwLock<QueryState>,
    next_seq: AtomicU64,
}

impl FilesQuery {
    pub fn new(source: Arc<dyn FileSource>, options: QueryOptions) -> Self {
        Self {
            source,
            options,
            state: RwLock::new(QueryState::default()),
            next_seq: AtomicU64::new(0),
        }
    }

    pub fn options(&self) -> QueryOptions {
        self.options
    }

    pub fn snapshot(&self) -> FilesSnapshot {
        let state = self.state.read();
        FilesSnapshot {
            records: state.records.clone(),
            error: state.error.clone(),
            is_fetching: state.in_flight > 0,
        }
    }

    pub fn is_fetching(&self) -> bool {
        self.state.read().in_flight > 0
    }

    /// No successful fetch yet, or the last one is older than the stale time
    pub fn is_stale(&self) -> bool {
        let state = self.state.read();
        state.invalidated
            || state
                .fetched_at
                .map_or(true, |at| at.elapsed() >= self.options.stale_time)
    }

    pub fn is_invalidated(&self) -> bool {
        self.state.read().invalidated
    }

    /// Should a view that just mounted start a fetch?
    pub fn should_fetch_on_mount(&self) -> bool {
        !self.is_fetching() && self.is_stale()
    }

    /// Mark the cached list as outdated; the next check refetches it
    pub fn invalidate(&self) {
        tracing::debug!("Files query invalidated");
        self.state.write().invalidated = true;
    }

    /// Fetch the list, retrying per the options, and apply it unless a
    /// newer fetch got there first.
    pub async fn fetch(&self) -> Result<FetchOutcome, FetchError> {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.state.write();
            state.in_flight += 1;
            // Claimed by this fetch; a later invalidate() starts another one
            state.invalidated = false;
        }

        let result = self.fetch_with_retry().await;

        let mut state = self.state.write();
        state.in_flight -= 1;

        if seq <= state.applied_seq {
            tracing::debug!(seq, applied = state.applied_seq, "Discarding stale files result");
            return Ok(FetchOutcome::Discarded);
        }
        state.applied_seq = seq;

        match result {
            Ok(records) => {
                tracing::debug!(seq, count = records.len(), "Files query updated");
                state.records = Some(Arc::new(records));
                state.error = None;
                state.fetched_at = Some(Instant::now());
                Ok(FetchOutcome::Applied)
            }
            Err(e) => {
                tracing::error!("Files query failed: {}", e);
                state.error = Some(
                    e.operation()
                        .map(|op| op.failure_message().to_string())
                        .unwrap_or_else(|| e.to_string()),
                );
                state.fetched_at = None;
                Err(e)
            }
        }
    }

    async fn fetch_with_retry(&self) -> Result<Vec<FileRecord>, FetchError> {
        let mut attempt = 0;
        loop {
            match self.source.list_all().await {
                Ok(records) => return Ok(records),
                Err(e) if attempt < self.options.retry => {
                    attempt += 1;
                    tracing::warn!(attempt, "Files fetch failed, retrying: {}", e);
                    tokio::time::sleep(self.options.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

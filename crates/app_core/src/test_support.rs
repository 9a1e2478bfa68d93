//! In-memory `FileSource` for tests

use app_api::{FetchError, FileRecord, FileSource, Operation, RecordPatch};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Default)]
pub(crate) struct FakeSource {
    records: Mutex<Vec<FileRecord>>,
    /// Scripted `list_all` responses, served before `records`
    script: Mutex<VecDeque<(Duration, Vec<FileRecord>)>>,
    failures: AtomicUsize,
    list_calls: AtomicUsize,
    create_calls: AtomicUsize,
    create_delay: Mutex<Duration>,
}

impl FakeSource {
    pub(crate) fn with_records(records: Vec<FileRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Self::default()
        }
    }

    /// Fail the next `n` calls with a 500
    pub(crate) fn fail_next(&self, n: usize) {
        self.failures.store(n, Ordering::SeqCst);
    }

    pub(crate) fn push_delayed(&self, delay: Duration, records: Vec<FileRecord>) {
        self.script.lock().push_back((delay, records));
    }

    pub(crate) fn set_create_delay(&self, delay: Duration) {
        *self.create_delay.lock() = delay;
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn stored(&self) -> Vec<FileRecord> {
        self.records.lock().clone()
    }

    fn take_failure(&self, op: Operation) -> Result<(), FetchError> {
        let failed = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            Err(FetchError::Status { op, status: 500, body: String::new() })
        } else {
            Ok(())
        }
    }

    fn not_found(op: Operation) -> FetchError {
        FetchError::Status { op, status: 404, body: String::new() }
    }
}

#[async_trait]
impl FileSource for FakeSource {
    async fn list_all(&self) -> app_api::Result<Vec<FileRecord>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.take_failure(Operation::ListFiles)?;

        let scripted = self.script.lock().pop_front();
        match scripted {
            Some((delay, records)) => {
                tokio::time::sleep(delay).await;
                Ok(records)
            }
            None => Ok(self.records.lock().clone()),
        }
    }

    async fn get_by_id(&self, id: &str) -> app_api::Result<FileRecord> {
        self.take_failure(Operation::GetFile)?;
        self.records
            .lock()
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| Self::not_found(Operation::GetFile))
    }

    async fn create(&self, record: &FileRecord) -> app_api::Result<FileRecord> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.create_delay.lock();
        tokio::time::sleep(delay).await;
        self.take_failure(Operation::CreateFile)?;
        self.records.lock().push(record.clone());
        Ok(record.clone())
    }

    async fn update(&self, id: &str, patch: &RecordPatch) -> app_api::Result<FileRecord> {
        self.take_failure(Operation::UpdateFile)?;
        let mut records = self.records.lock();
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| Self::not_found(Operation::UpdateFile))?;
        if let Some(name) = &patch.file_name {
            record.file_name = name.clone();
        }
        if let Some(by) = &patch.uploaded_by {
            record.uploaded_by = by.clone();
        }
        if let Some(t) = patch.file_type {
            record.file_type = t;
        }
        if let Some(url) = &patch.file_url {
            record.file_url = url.clone();
        }
        Ok(record.clone())
    }

    async fn delete(&self, id: &str) -> app_api::Result<serde_json::Value> {
        self.take_failure(Operation::DeleteFile)?;
        let mut records = self.records.lock();
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Err(Self::not_found(Operation::DeleteFile));
        }
        Ok(serde_json::json!({}))
    }
}

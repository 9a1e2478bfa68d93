//! HTTP client for the `/files` resource

use crate::{FetchError, FileRecord, Operation, RecordPatch, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// CRUD access to file records.
///
/// Each method maps one logical action to one request. Dropping the returned
/// future abandons the call.
#[async_trait]
pub trait FileSource: Send + Sync {
    /// `GET /files`
    async fn list_all(&self) -> Result<Vec<FileRecord>>;

    /// `GET /files/{id}`; a missing id fails with a 404 status error
    async fn get_by_id(&self, id: &str) -> Result<FileRecord>;

    /// `POST /files` with a fully populated record
    async fn create(&self, record: &FileRecord) -> Result<FileRecord>;

    /// `PUT /files/{id}` with the fields to change
    async fn update(&self, id: &str, patch: &RecordPatch) -> Result<FileRecord>;

    /// `DELETE /files/{id}`; returns the server's confirmation payload.
    ///
    /// Deleting an id that is already gone reports a 404 status error
    /// (`FetchError::is_not_found`), which callers may treat as done.
    async fn delete(&self, id: &str) -> Result<serde_json::Value>;
}

/// `FileSource` over HTTP + JSON
#[derive(Debug, Clone)]
pub struct FilesApi {
    client: Client,
    base_url: Url,
}

impl FilesApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(FetchError::InvalidUrl(base_url.to_string()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/files` or `{base}/files/{id}`, with the id percent-encoded
    fn files_url(&self, id: Option<&str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| FetchError::InvalidUrl(self.base_url.to_string()))?;
            segments.pop_if_empty().push("files");
            if let Some(id) = id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client.request(method, url)
    }

    async fn send<T: DeserializeOwned>(&self, op: Operation, request: RequestBuilder) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|source| FetchError::Transport { op, source })?;

        let status = response.status();
        let url = response.url().path().to_string();
        tracing::debug!(?op, status = status.as_u16(), path = %url, "files request completed");

        let body = response
            .text()
            .await
            .map_err(|source| FetchError::Transport { op, source })?;

        if !status.is_success() {
            return Err(FetchError::Status { op, status: status.as_u16(), body });
        }

        // 204 / empty confirmations decode as JSON null
        let body = if body.trim().is_empty() { "null" } else { body.as_str() };
        serde_json::from_str(body).map_err(|source| FetchError::Decode { op, source })
    }
}

#[async_trait]
impl FileSource for FilesApi {
    async fn list_all(&self) -> Result<Vec<FileRecord>> {
        let url = self.files_url(None)?;
        let entries: Vec<serde_json::Value> = self.send(Operation::ListFiles, self.request(Method::GET, url)).await?;

        // One malformed record must not hide the rest of the list
        let records = entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value::<FileRecord>(entry) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(index, "Skipping malformed file record: {}", e);
                    None
                }
            })
            .collect();
        Ok(records)
    }

    async fn get_by_id(&self, id: &str) -> Result<FileRecord> {
        let url = self.files_url(Some(id))?;
        self.send(Operation::GetFile, self.request(Method::GET, url)).await
    }

    async fn create(&self, record: &FileRecord) -> Result<FileRecord> {
        let url = self.files_url(None)?;
        let request = self.request(Method::POST, url).json(record);
        self.send(Operation::CreateFile, request).await
    }

    async fn update(&self, id: &str, patch: &RecordPatch) -> Result<FileRecord> {
        let url = self.files_url(Some(id))?;
        let request = self.request(Method::PUT, url).json(patch);
        self.send(Operation::UpdateFile, request).await
    }

    async fn delete(&self, id: &str) -> Result<serde_json::Value> {
        let url = self.files_url(Some(id))?;
        self.send(Operation::DeleteFile, self.request(Method::DELETE, url)).await
    }
}

//! Typed preferences persisted across sessions
//!
//! Two logical keys are stored, each as an independent JSON value:
//! the id of the last file opened in the detail view, and the dashboard
//! pagination settings. Reads never fail: anything missing or unreadable
//! yields the documented default. Writes are fire-and-forget.

use crate::kv::{KeyValueStore, MemoryStore};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Logical preference keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefKey {
    SelectedFile,
    Pagination,
}

impl PrefKey {
    pub fn as_str(self) -> &'static str {
        match self {
            PrefKey::SelectedFile => "fileManager_selectedFile",
            PrefKey::Pagination => "fileManager_pagination",
        }
    }
}

/// Allowed dashboard page sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
pub enum PageSize {
    Five,
    #[default]
    Ten,
    Twenty,
    Fifty,
}

impl PageSize {
    pub const ALL: [PageSize; 4] = [PageSize::Five, PageSize::Ten, PageSize::Twenty, PageSize::Fifty];

    pub fn get(self) -> usize {
        match self {
            PageSize::Five => 5,
            PageSize::Ten => 10,
            PageSize::Twenty => 20,
            PageSize::Fifty => 50,
        }
    }
}

impl From<PageSize> for u32 {
    fn from(size: PageSize) -> Self {
        size.get() as u32
    }
}

impl TryFrom<u32> for PageSize {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            5 => Ok(PageSize::Five),
            10 => Ok(PageSize::Ten),
            20 => Ok(PageSize::Twenty),
            50 => Ok(PageSize::Fifty),
            other => Err(format!("unsupported page size: {}", other)),
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// Dashboard pagination settings (`{"page": n, "pageSize": n}` on disk)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationPreference {
    /// 1-indexed page
    pub page: u32,
    pub page_size: PageSize,
}

impl Default for PaginationPreference {
    fn default() -> Self {
        Self { page: 1, page_size: PageSize::Ten }
    }
}

/// Preference store with explicit get/set/clear per key
#[derive(Clone)]
pub struct PreferenceStore {
    backend: Arc<dyn KeyValueStore>,
}

impl PreferenceStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Store that lives only as long as the process
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Id of the last file opened in the detail view
    pub fn selected_file(&self) -> Option<String> {
        let value: serde_json::Value = self.load_typed(PrefKey::SelectedFile)?;
        match value {
            serde_json::Value::String(id) => Some(id),
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::Null => None,
            other => {
                tracing::warn!("Ignoring malformed selected file preference: {}", other);
                None
            }
        }
    }

    pub fn set_selected_file(&self, id: &str) {
        self.save_typed(PrefKey::SelectedFile, &id);
    }

    pub fn clear_selected_file(&self) {
        self.clear(PrefKey::SelectedFile);
    }

    /// Dashboard pagination, `{page: 1, pageSize: 10}` when absent or invalid
    pub fn pagination(&self) -> PaginationPreference {
        match self.load_typed::<PaginationPreference>(PrefKey::Pagination) {
            Some(p) if p.page >= 1 => p,
            Some(p) => {
                tracing::warn!("Ignoring pagination preference with page {}", p.page);
                PaginationPreference::default()
            }
            None => PaginationPreference::default(),
        }
    }

    pub fn set_pagination(&self, pagination: PaginationPreference) {
        self.save_typed(PrefKey::Pagination, &pagination);
    }

    pub fn clear_pagination(&self) {
        self.clear(PrefKey::Pagination);
    }

    /// Remove a stored preference; the next read returns its default
    pub fn clear(&self, key: PrefKey) {
        if let Err(e) = self.backend.remove(key.as_str()) {
            tracing::warn!("Failed to clear preference {}: {}", key.as_str(), e);
        }
    }

    fn load_typed<T: DeserializeOwned>(&self, key: PrefKey) -> Option<T> {
        let raw = match self.backend.load(key.as_str()) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!("Failed to read preference {}: {}", key.as_str(), e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Corrupt preference {} ({}), using default", key.as_str(), e);
                None
            }
        }
    }

    fn save_typed<T: Serialize>(&self, key: PrefKey, value: &T) {
        let result = serde_json::to_string(value)
            .map_err(crate::DbError::from)
            .and_then(|raw| self.backend.save(key.as_str(), &raw));

        match result {
            Ok(()) => tracing::debug!("Saved preference {}", key.as_str()),
            Err(e) => tracing::warn!("Failed to save preference {}: {}", key.as_str(), e),
        }
    }
}

impl fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreferenceStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(key: PrefKey, raw: &str) -> PreferenceStore {
        let backend = Arc::new(MemoryStore::new());
        backend.save(key.as_str(), raw).unwrap();
        PreferenceStore::new(backend)
    }

    #[test]
    fn test_defaults_when_absent() {
        let store = PreferenceStore::in_memory();
        assert_eq!(store.selected_file(), None);
        assert_eq!(store.pagination(), PaginationPreference { page: 1, page_size: PageSize::Ten });
    }

    #[test]
    fn test_pagination_round_trip_and_clear() {
        let store = PreferenceStore::in_memory();
        let wanted = PaginationPreference { page: 3, page_size: PageSize::Twenty };

        store.set_pagination(wanted);
        assert_eq!(store.pagination(), wanted);

        store.clear_pagination();
        assert_eq!(store.pagination(), PaginationPreference::default());
    }

    #[test]
    fn test_pagination_wire_format() {
        let backend = Arc::new(MemoryStore::new());
        let store = PreferenceStore::new(backend.clone());
        store.set_pagination(PaginationPreference { page: 2, page_size: PageSize::Fifty });

        let raw = backend.load(PrefKey::Pagination.as_str()).unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json, serde_json::json!({"page": 2, "pageSize": 50}));
    }

    #[test]
    fn test_corrupt_pagination_falls_back() {
        for raw in ["{not json", r#"{"page":0,"pageSize":10}"#, r#"{"page":2,"pageSize":7}"#, "null"] {
            let store = store_with(PrefKey::Pagination, raw);
            assert_eq!(store.pagination(), PaginationPreference::default(), "raw: {}", raw);
        }
    }

    #[test]
    fn test_selected_file_accepts_string_and_number() {
        assert_eq!(store_with(PrefKey::SelectedFile, r#""abc""#).selected_file().as_deref(), Some("abc"));
        assert_eq!(store_with(PrefKey::SelectedFile, "1700000000000").selected_file().as_deref(), Some("1700000000000"));
        assert_eq!(store_with(PrefKey::SelectedFile, "null").selected_file(), None);
        assert_eq!(store_with(PrefKey::SelectedFile, "[1,2]").selected_file(), None);
        assert_eq!(store_with(PrefKey::SelectedFile, "garbage").selected_file(), None);
    }

    #[test]
    fn test_selected_file_set_and_clear() {
        let store = PreferenceStore::in_memory();
        store.set_selected_file("7");
        assert_eq!(store.selected_file().as_deref(), Some("7"));

        store.set_selected_file("8");
        assert_eq!(store.selected_file().as_deref(), Some("8"));

        store.clear_selected_file();
        assert_eq!(store.selected_file(), None);
    }

    #[test]
    fn test_page_size_conversions() {
        for size in PageSize::ALL {
            assert_eq!(PageSize::try_from(u32::from(size)).unwrap(), size);
        }
        assert!(PageSize::try_from(0).is_err());
        assert!(PageSize::try_from(15).is_err());
    }
}

//! Detail view navigation state
//!
//! The detail view always walks the full, unfiltered record list in the
//! order the backend returned it. Dashboard search and sort do not apply.

use app_api::FileRecord;
use app_db::PreferenceStore;

/// Records per side-list window; independent of the dashboard page size
pub const SIDE_LIST_SIZE: usize = 4;

/// Selection, preview page and side-list window of the detail view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailNavigation {
    selected_id: Option<String>,

    /// 1-indexed page of the PDF preview
    preview_page: u32,

    /// Reported by the renderer once the document is loaded
    preview_page_count: Option<u32>,

    /// 0-indexed window of the side list
    list_page: usize,

    /// Whether the side list has been moved to the selection yet
    window_placed: bool,
}

impl DetailNavigation {
    pub fn new() -> Self {
        Self {
            selected_id: None,
            preview_page: 1,
            preview_page_count: None,
            list_page: 0,
            window_placed: false,
        }
    }

    /// Start from a previously persisted selection
    pub fn with_selection(selected_id: Option<String>) -> Self {
        Self {
            selected_id,
            ..Self::new()
        }
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    pub fn selected<'a>(&self, records: &'a [FileRecord]) -> Option<&'a FileRecord> {
        self.current_index(records).map(|i| &records[i])
    }

    /// Position of the selection in `records`
    pub fn current_index(&self, records: &[FileRecord]) -> Option<usize> {
        let id = self.selected_id.as_deref()?;
        records.iter().position(|r| r.id == id)
    }

    /// Reconcile the selection with a freshly loaded list.
    ///
    /// Keeps a selection that still resolves; otherwise falls back to the
    /// first record. An empty list leaves the selection untouched since the
    /// records may simply not have arrived yet. Returns true if the
    /// selection changed.
    pub fn sync(&mut self, records: &[FileRecord]) -> bool {
        match self.current_index(records) {
            Some(index) => {
                if !self.window_placed {
                    self.list_page = index / SIDE_LIST_SIZE;
                    self.window_placed = true;
                }
                false
            }
            None => match records.first() {
                Some(first) => self.select_index(records, 0, first.id.clone()),
                None => false,
            },
        }
    }

    /// Select `id`; unknown ids are ignored. Returns true if it changed.
    pub fn select(&mut self, records: &[FileRecord], id: &str) -> bool {
        match records.iter().position(|r| r.id == id) {
            Some(index) => self.select_index(records, index, id.to_string()),
            None => {
                tracing::debug!("Ignoring selection of unknown file {}", id);
                false
            }
        }
    }

    fn select_index(&mut self, records: &[FileRecord], index: usize, id: String) -> bool {
        debug_assert!(index < records.len());
        self.list_page = index / SIDE_LIST_SIZE;
        self.window_placed = true;
        if self.selected_id.as_deref() == Some(id.as_str()) {
            return false;
        }
        self.selected_id = Some(id);
        self.preview_page = 1;
        self.preview_page_count = None;
        true
    }

    pub fn can_next(&self, records: &[FileRecord]) -> bool {
        self.current_index(records)
            .is_some_and(|i| i + 1 < records.len())
    }

    pub fn can_previous(&self, records: &[FileRecord]) -> bool {
        self.current_index(records).is_some_and(|i| i > 0)
    }

    /// Step to the following record; no-op on the last one
    pub fn next(&mut self, records: &[FileRecord]) -> bool {
        match self.current_index(records) {
            Some(i) if i + 1 < records.len() => {
                self.select_index(records, i + 1, records[i + 1].id.clone())
            }
            _ => false,
        }
    }

    /// Step to the preceding record; no-op on the first one
    pub fn previous(&mut self, records: &[FileRecord]) -> bool {
        match self.current_index(records) {
            Some(i) if i > 0 => self.select_index(records, i - 1, records[i - 1].id.clone()),
            _ => false,
        }
    }

    // ===== PDF preview pages =====

    pub fn preview_page(&self) -> u32 {
        self.preview_page
    }

    pub fn preview_page_count(&self) -> Option<u32> {
        self.preview_page_count
    }

    /// Record the page count reported for the selected document
    pub fn set_preview_page_count(&mut self, count: u32) {
        let count = count.max(1);
        self.preview_page_count = Some(count);
        self.preview_page = self.preview_page.clamp(1, count);
    }

    pub fn next_preview_page(&mut self) -> bool {
        match self.preview_page_count {
            Some(count) if self.preview_page < count => {
                self.preview_page += 1;
                true
            }
            _ => false,
        }
    }

    pub fn prev_preview_page(&mut self) -> bool {
        if self.preview_page > 1 {
            self.preview_page -= 1;
            true
        } else {
            false
        }
    }

    // ===== Side list window =====

    pub fn list_page(&self) -> usize {
        self.list_page
    }

    pub fn list_page_count(&self, len: usize) -> usize {
        len.div_ceil(SIDE_LIST_SIZE)
    }

    /// Records shown in the side list
    pub fn list_window<'a>(&self, records: &'a [FileRecord]) -> &'a [FileRecord] {
        let start = (self.list_page * SIDE_LIST_SIZE).min(records.len());
        let end = (start + SIDE_LIST_SIZE).min(records.len());
        &records[start..end]
    }

    /// `"5-8"` for the second window of four
    pub fn list_range_label(&self, len: usize) -> String {
        if len == 0 {
            return "0-0".to_string();
        }
        let start = self.list_page * SIDE_LIST_SIZE + 1;
        let end = ((self.list_page + 1) * SIDE_LIST_SIZE).min(len);
        format!("{}-{}", start, end)
    }

    pub fn can_next_list_page(&self, len: usize) -> bool {
        self.list_page + 1 < self.list_page_count(len)
    }

    pub fn can_prev_list_page(&self) -> bool {
        self.list_page > 0
    }

    pub fn next_list_page(&mut self, len: usize) -> bool {
        if self.can_next_list_page(len) {
            self.list_page += 1;
            true
        } else {
            false
        }
    }

    pub fn prev_list_page(&mut self) -> bool {
        if self.list_page > 0 {
            self.list_page -= 1;
            true
        } else {
            false
        }
    }
}

impl Default for DetailNavigation {
    fn default() -> Self {
        Self::new()
    }
}

/// Detail view state bound to the preference store.
///
/// Every selection change is written through as the selected-file preference.
pub struct DetailState {
    nav: DetailNavigation,
    prefs: PreferenceStore,
}

impl DetailState {
    /// Seed from the persisted selection
    pub fn mount(prefs: PreferenceStore) -> Self {
        let nav = DetailNavigation::with_selection(prefs.selected_file());
        Self { nav, prefs }
    }

    pub fn nav(&self) -> &DetailNavigation {
        &self.nav
    }

    pub fn nav_mut(&mut self) -> &mut DetailNavigation {
        &mut self.nav
    }

    pub fn sync(&mut self, records: &[FileRecord]) {
        if self.nav.sync(records) {
            self.persist();
        }
    }

    pub fn select(&mut self, records: &[FileRecord], id: &str) {
        if self.nav.select(records, id) {
            self.persist();
        }
    }

    pub fn next(&mut self, records: &[FileRecord]) {
        if self.nav.next(records) {
            self.persist();
        }
    }

    pub fn previous(&mut self, records: &[FileRecord]) {
        if self.nav.previous(records) {
            self.persist();
        }
    }

    fn persist(&self) {
        if let Some(id) = self.nav.selected_id() {
            self.prefs.set_selected_file(id);
        }
    }
}

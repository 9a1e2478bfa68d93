//! Dashboard view state
//!
//! Wraps the list query with the persisted pagination preference: the
//! page and page size are read once at mount and written on every change.

use crate::config::DashboardConfig;
use crate::query::{ListQuery, QueryPage, SortConfig, SortKey};
use crate::route::Route;
use app_api::FileRecord;
use app_db::{PageSize, PreferenceStore};

pub struct DashboardState {
    query: ListQuery,
    prefs: PreferenceStore,
}

impl DashboardState {
    pub fn mount(prefs: PreferenceStore, config: &DashboardConfig) -> Self {
        let sort = SortConfig::new(config.sort_key, config.sort_direction);
        let query = ListQuery::new(sort, prefs.pagination());
        tracing::debug!(page = query.page(), page_size = %query.page_size(), "Dashboard mounted");
        Self { query, prefs }
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    pub fn run<'a>(&self, records: &'a [FileRecord]) -> QueryPage<'a> {
        self.query.run(records)
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        let before = self.query.page();
        self.query.set_search(term);
        if self.query.page() != before {
            self.persist();
        }
    }

    pub fn toggle_sort(&mut self, key: SortKey) {
        self.query.toggle_sort(key);
    }

    pub fn set_page(&mut self, page: u32) {
        if page.max(1) != self.query.page() {
            self.query.set_page(page);
            self.persist();
        }
    }

    pub fn set_page_size(&mut self, page_size: PageSize) {
        if page_size != self.query.page_size() {
            self.query.set_page_size(page_size);
            self.persist();
        }
    }

    /// Step forward, staying within `total_pages`
    pub fn next_page(&mut self, total_pages: usize) {
        let page = self.query.page() as usize;
        if page < total_pages {
            self.set_page(page as u32 + 1);
        }
    }

    pub fn prev_page(&mut self) {
        if self.query.page() > 1 {
            self.set_page(self.query.page() - 1);
        }
    }

    /// Remember `id` for the detail view and route there
    pub fn open_file(&self, id: &str) -> Route {
        tracing::debug!("Opening file {}", id);
        self.prefs.set_selected_file(id);
        Route::Details
    }

    fn persist(&self) {
        self.prefs.set_pagination(self.query.pagination());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::tests::sample;
    use crate::query::SortDirection;
    use app_db::PaginationPreference;

    fn mounted(prefs: &PreferenceStore) -> DashboardState {
        DashboardState::mount(prefs.clone(), &DashboardConfig::default())
    }

    #[test]
    fn test_mount_reads_pagination_and_default_sort() {
        let prefs = PreferenceStore::in_memory();
        prefs.set_pagination(PaginationPreference { page: 2, page_size: PageSize::Five });

        let state = mounted(&prefs);
        assert_eq!(state.query().page(), 2);
        assert_eq!(state.query().page_size(), PageSize::Five);
        assert_eq!(
            state.query().sort(),
            SortConfig::new(SortKey::UploadedDate, SortDirection::Desc)
        );
    }

    #[test]
    fn test_newest_upload_first_by_default() {
        let prefs = PreferenceStore::in_memory();
        let records = sample(3);
        let page = mounted(&prefs).run(&records);
        assert_eq!(page.items[0].id, "3");
    }

    #[test]
    fn test_page_changes_are_persisted() {
        let prefs = PreferenceStore::in_memory();
        let mut state = mounted(&prefs);

        state.set_page_size(PageSize::Twenty);
        assert_eq!(prefs.pagination(), PaginationPreference { page: 1, page_size: PageSize::Twenty });

        state.next_page(3);
        state.next_page(3);
        state.next_page(3);
        assert_eq!(prefs.pagination().page, 3);

        state.prev_page();
        assert_eq!(prefs.pagination().page, 2);

        state.set_search("alice");
        assert_eq!(prefs.pagination().page, 1);
    }

    #[test]
    fn test_prev_page_stops_at_one() {
        let prefs = PreferenceStore::in_memory();
        let mut state = mounted(&prefs);
        state.prev_page();
        assert_eq!(state.query().page(), 1);
        state.next_page(0);
        assert_eq!(state.query().page(), 1);
    }

    #[test]
    fn test_open_file_remembers_selection() {
        let prefs = PreferenceStore::in_memory();
        let state = mounted(&prefs);
        assert_eq!(state.open_file("12"), Route::Details);
        assert_eq!(prefs.selected_file().as_deref(), Some("12"));
    }
}

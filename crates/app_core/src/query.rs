//! Dashboard list processing: filter, then sort, then paginate
//!
//! Everything here is pure and recomputed on demand from the current
//! inputs. Pagination indices are only meaningful against the filtered and
//! sorted sequence, so the stages always run in that order.

use app_api::FileRecord;
use app_db::{PageSize, PaginationPreference};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Column the dashboard can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortKey {
    #[serde(rename = "fileName")]
    FileName,
    #[serde(rename = "uploadedDate")]
    UploadedDate,
    #[serde(rename = "uploadedBy")]
    UploadedBy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "asc")]
    Asc,
    #[serde(rename = "desc")]
    Desc,
}

/// Active sort column and direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortConfig {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortConfig {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// Result of clicking the `key` header: the active ascending column flips
    /// to descending, anything else becomes ascending on `key`.
    pub fn toggled(self, key: SortKey) -> Self {
        let direction = if self.key == key && self.direction == SortDirection::Asc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        Self { key, direction }
    }

    /// Header suffix for `key`
    pub fn indicator(&self, key: SortKey) -> &'static str {
        if self.key != key {
            return " ↕";
        }
        match self.direction {
            SortDirection::Asc => " ↑",
            SortDirection::Desc => " ↓",
        }
    }

    fn compare(&self, a: &FileRecord, b: &FileRecord) -> Ordering {
        let ord = match self.key {
            SortKey::FileName => a.file_name.cmp(&b.file_name),
            SortKey::UploadedBy => a.uploaded_by.cmp(&b.uploaded_by),
            // Unparseable timestamps order before every valid one
            SortKey::UploadedDate => a.uploaded_at().cmp(&b.uploaded_at()),
        };
        match self.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }
}

/// Does `record` match an already-lowercased, non-empty search term?
fn matches_term(record: &FileRecord, term_lower: &str) -> bool {
    record.file_name.to_lowercase().contains(term_lower)
        || record.uploaded_by.to_lowercase().contains(term_lower)
}

/// Keep records whose name or uploader contains `term`, ignoring case.
/// An empty term keeps everything.
pub fn filter_records<'a>(records: &'a [FileRecord], term: &str) -> Vec<&'a FileRecord> {
    if term.is_empty() {
        return records.iter().collect();
    }
    let term_lower = term.to_lowercase();
    records.iter().filter(|r| matches_term(r, &term_lower)).collect()
}

/// Stable sort; equal elements keep their incoming order in both directions
pub fn sort_records(records: &mut [&FileRecord], sort: SortConfig) {
    records.sort_by(|a, b| sort.compare(a, b));
}

/// `ceil(count / page_size)`; zero when there is nothing to show
pub fn total_pages(count: usize, page_size: PageSize) -> usize {
    count.div_ceil(page_size.get())
}

/// Slice for the 1-indexed `page`; pages past the end are empty
pub fn paginate<T>(items: &[T], page: u32, page_size: PageSize) -> &[T] {
    let size = page_size.get();
    let start = (page.max(1) as usize - 1).saturating_mul(size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(size).min(items.len());
    &items[start..end]
}

/// Inputs of the dashboard list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    search: String,
    sort: SortConfig,
    page: u32,
    page_size: PageSize,
}

impl ListQuery {
    pub fn new(sort: SortConfig, pagination: PaginationPreference) -> Self {
        Self {
            search: String::new(),
            sort,
            page: pagination.page.max(1),
            page_size: pagination.page_size,
        }
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// New search term; a fresh result set starts on page 1
    pub fn set_search(&mut self, term: impl Into<String>) {
        let term = term.into();
        if term != self.search {
            self.search = term;
            self.page = 1;
        }
    }

    pub fn sort(&self) -> SortConfig {
        self.sort
    }

    pub fn toggle_sort(&mut self, key: SortKey) {
        self.sort = self.sort.toggled(key);
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    /// New page size; offsets from the old size are meaningless, back to page 1
    pub fn set_page_size(&mut self, page_size: PageSize) {
        if page_size != self.page_size {
            self.page_size = page_size;
            self.page = 1;
        }
    }

    /// The subset of this query that is persisted
    pub fn pagination(&self) -> PaginationPreference {
        PaginationPreference { page: self.page, page_size: self.page_size }
    }

    /// Run the filter → sort → paginate pipeline over `records`
    pub fn run<'a>(&self, records: &'a [FileRecord]) -> QueryPage<'a> {
        let mut matched = filter_records(records, &self.search);
        sort_records(&mut matched, self.sort);

        let total_count = matched.len();
        let items = paginate(&matched, self.page, self.page_size).to_vec();

        QueryPage {
            items,
            page: self.page,
            page_size: self.page_size,
            total_pages: total_pages(total_count, self.page_size),
            total_count,
        }
    }
}

/// One page of query results plus pagination metadata
#[derive(Debug, Clone)]
pub struct QueryPage<'a> {
    pub items: Vec<&'a FileRecord>,
    pub page: u32,
    pub page_size: PageSize,
    pub total_pages: usize,
    /// Records matching the search, across all pages
    pub total_count: usize,
}

impl QueryPage<'_> {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        (self.page as usize) < self.total_pages
    }

    /// `"11-15 of 32"`; `"0-0 of n"` when the page is empty
    pub fn range_label(&self) -> String {
        if self.items.is_empty() {
            return format!("0-0 of {}", self.total_count);
        }
        let start = (self.page as usize - 1) * self.page_size.get() + 1;
        let end = start + self.items.len() - 1;
        format!("{}-{} of {}", start, end, self.total_count)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use app_api::FileType;

    pub(crate) fn record(id: usize, name: &str, by: &str, date: &str) -> FileRecord {
        FileRecord {
            id: id.to_string(),
            file_name: name.to_string(),
            uploaded_date: date.to_string(),
            uploaded_by: by.to_string(),
            file_type: if name.ends_with(".pdf") { FileType::Pdf } else { FileType::Image },
            file_url: format!("file:///docs/{}", name),
        }
    }

    /// `n` records: report-01.pdf .. report-NN.pdf, one day apart, two uploaders
    pub(crate) fn sample(n: usize) -> Vec<FileRecord> {
        (1..=n)
            .map(|i| {
                record(
                    i,
                    &format!("report-{:02}.pdf", i),
                    if i % 2 == 0 { "Alice" } else { "Bob" },
                    &format!("2024-01-{:02}T09:00:00.000Z", i),
                )
            })
            .collect()
    }

    fn ids(items: &[&FileRecord]) -> Vec<String> {
        items.iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn test_empty_search_is_identity() {
        let records = sample(6);
        let all = filter_records(&records, "");
        assert_eq!(all.len(), 6);
        assert!(all.iter().zip(&records).all(|(a, b)| a.id == b.id));
    }

    #[test]
    fn test_search_matches_name_or_uploader_case_insensitively() {
        let records = vec![
            record(1, "Invoice-March.pdf", "Bob", "2024-03-01T00:00:00Z"),
            record(2, "photo.png", "Marcy", "2024-03-02T00:00:00Z"),
            record(3, "notes.gif", "Al", "2024-03-03T00:00:00Z"),
        ];

        let hits = filter_records(&records, "MAR");
        assert_eq!(ids(&hits), vec!["1", "2"]);

        for r in &records {
            let included = hits.iter().any(|h| h.id == r.id);
            let contains = r.file_name.to_lowercase().contains("mar")
                || r.uploaded_by.to_lowercase().contains("mar");
            assert_eq!(included, contains);
        }
    }

    #[test]
    fn test_sort_by_name_and_uploader() {
        let records = vec![
            record(1, "b.pdf", "Zed", "2024-01-01T00:00:00Z"),
            record(2, "a.pdf", "Amy", "2024-01-02T00:00:00Z"),
            record(3, "c.pdf", "Moe", "2024-01-03T00:00:00Z"),
        ];
        let mut items = filter_records(&records, "");

        sort_records(&mut items, SortConfig::new(SortKey::FileName, SortDirection::Asc));
        assert_eq!(ids(&items), vec!["2", "1", "3"]);

        sort_records(&mut items, SortConfig::new(SortKey::UploadedBy, SortDirection::Desc));
        assert_eq!(ids(&items), vec!["1", "3", "2"]);
    }

    #[test]
    fn test_sort_by_date_uses_instants_not_strings() {
        // Same instant written with different offsets, plus a malformed date
        let records = vec![
            record(1, "x", "a", "2024-01-01T12:00:00+02:00"),
            record(2, "y", "a", "2024-01-01T11:00:00Z"),
            record(3, "z", "a", "not a date"),
        ];
        let mut items = filter_records(&records, "");
        sort_records(&mut items, SortConfig::new(SortKey::UploadedDate, SortDirection::Asc));
        assert_eq!(ids(&items), vec!["3", "1", "2"]);
    }

    #[test]
    fn test_sort_is_stable_in_both_directions() {
        let records = vec![
            record(1, "same.pdf", "a", "2024-01-01T00:00:00Z"),
            record(2, "other.pdf", "a", "2024-01-01T00:00:00Z"),
            record(3, "same.pdf", "a", "2024-01-01T00:00:00Z"),
            record(4, "zzz.pdf", "a", "2024-01-01T00:00:00Z"),
            record(5, "same.pdf", "a", "2024-01-01T00:00:00Z"),
        ];

        let mut asc = filter_records(&records, "");
        sort_records(&mut asc, SortConfig::new(SortKey::FileName, SortDirection::Asc));
        assert_eq!(ids(&asc), vec!["2", "1", "3", "5", "4"]);

        let mut desc = filter_records(&records, "");
        sort_records(&mut desc, SortConfig::new(SortKey::FileName, SortDirection::Desc));
        // Groups reversed, ties still in original order
        assert_eq!(ids(&desc), vec!["4", "1", "3", "5", "2"]);
    }

    #[test]
    fn test_toggle_law() {
        let start = SortConfig::new(SortKey::UploadedDate, SortDirection::Desc);

        let first = start.toggled(SortKey::FileName);
        assert_eq!(first, SortConfig::new(SortKey::FileName, SortDirection::Asc));

        let second = first.toggled(SortKey::FileName);
        assert_eq!(second.direction, SortDirection::Desc);

        let third = second.toggled(SortKey::FileName);
        assert_eq!(third.direction, SortDirection::Asc);

        // A different key always resets to ascending
        assert_eq!(second.toggled(SortKey::UploadedBy).direction, SortDirection::Asc);

        // The default descending date column goes ascending on first click
        assert_eq!(start.toggled(SortKey::UploadedDate).direction, SortDirection::Asc);
    }

    #[test]
    fn test_indicators() {
        let sort = SortConfig::new(SortKey::FileName, SortDirection::Asc);
        assert_eq!(sort.indicator(SortKey::FileName), " ↑");
        assert_eq!(sort.indicator(SortKey::UploadedBy), " ↕");
        assert_eq!(sort.toggled(SortKey::FileName).indicator(SortKey::FileName), " ↓");
    }

    #[test]
    fn test_pages_reconstruct_sequence() {
        for count in [0usize, 1, 4, 5, 6, 23, 50, 51] {
            let records = sample(count);
            for size in PageSize::ALL {
                let pages = total_pages(count, size);
                assert_eq!(pages, (count + size.get() - 1) / size.get());

                let rebuilt: Vec<&FileRecord> = (1..=pages as u32)
                    .flat_map(|p| paginate(&records, p, size).iter())
                    .collect();
                assert_eq!(rebuilt.len(), count);
                assert!(rebuilt.iter().zip(&records).all(|(a, b)| a.id == b.id));

                assert!(paginate(&records, pages as u32 + 1, size).is_empty());
            }
        }
    }

    #[test]
    fn test_zero_records() {
        let query = ListQuery::new(
            SortConfig::new(SortKey::UploadedDate, SortDirection::Desc),
            PaginationPreference::default(),
        );
        let page = query.run(&[]);
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.range_label(), "0-0 of 0");
        assert!(!page.has_next());
        assert!(!page.has_previous());
    }

    #[test]
    fn test_page_beyond_end_is_empty_not_clamped() {
        let records = sample(7);
        let mut query = ListQuery::new(
            SortConfig::new(SortKey::FileName, SortDirection::Asc),
            PaginationPreference { page: 1, page_size: PageSize::Five },
        );
        query.set_page(9);
        let page = query.run(&records);
        assert!(page.items.is_empty());
        assert_eq!(page.page, 9);
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn test_search_and_page_size_reset_page() {
        let mut query = ListQuery::new(
            SortConfig::new(SortKey::FileName, SortDirection::Asc),
            PaginationPreference { page: 3, page_size: PageSize::Ten },
        );
        assert_eq!(query.page(), 3);

        query.set_search("bob");
        assert_eq!(query.page(), 1);

        query.set_page(2);
        query.set_page_size(PageSize::Twenty);
        assert_eq!(query.page(), 1);
        assert_eq!(query.pagination(), PaginationPreference { page: 1, page_size: PageSize::Twenty });
    }

    #[test]
    fn test_twelve_records_scenario() {
        let mut records = sample(12);
        records[2].file_name = "quarterly-summary.pdf".into();
        records[8].file_name = "Summary-Q3.pdf".into();

        let mut query = ListQuery::new(
            SortConfig::new(SortKey::FileName, SortDirection::Asc),
            PaginationPreference { page: 1, page_size: PageSize::Five },
        );

        let page = query.run(&records);
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.range_label(), "1-5 of 12");

        query.set_page(3);
        assert_eq!(query.run(&records).range_label(), "11-12 of 12");

        query.set_search("summary");
        assert_eq!(query.page(), 1);
        let page = query.run(&records);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.total_count, 2);
        assert_eq!(ids(&page.items), vec!["3", "9"]);
    }
}

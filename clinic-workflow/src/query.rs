use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::status::PrescriptionStatus;

/// Sentinel status value that disables the status filter entirely.
pub const STATUS_ALL: &str = "all";

/// Status that sorts to the front of the lab-report queue.
pub const LAB_QUEUE_FIRST: PrescriptionStatus = PrescriptionStatus::LabTestRequested;

/// Relevance ranks for patient search, highest first.
pub const RANK_EXACT_ID_NUMBER: i32 = 3;
pub const RANK_NAME_PREFIX: i32 = 2;
pub const RANK_NAME_CONTAINS: i32 = 1;
pub const RANK_NONE: i32 = 0;

/// Case-insensitive substring match.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Rank a patient against a search term.
///
/// Exact registration-number match beats a name prefix, which beats any
/// other name substring hit. The SQL `CASE` the server builds must agree
/// with this function; both use the `RANK_*` constants.
pub fn relevance_rank(search: &str, id_number: Option<&str>, name: Option<&str>) -> i32 {
    let term = search.trim().to_lowercase();
    if term.is_empty() {
        return RANK_NONE;
    }
    if id_number.is_some_and(|id| id.to_lowercase() == term) {
        return RANK_EXACT_ID_NUMBER;
    }
    if let Some(name) = name {
        let name = name.to_lowercase();
        if name.starts_with(&term) {
            return RANK_NAME_PREFIX;
        }
        if name.contains(&term) {
            return RANK_NAME_CONTAINS;
        }
    }
    RANK_NONE
}

/// Raw listing filters as received from the caller.
///
/// Empty or sentinel values mean "no filter"; a malformed date is dropped
/// rather than rejected.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListFilter {
    pub search: Option<String>,
    pub status: Option<String>,
    pub date: Option<String>,
}

impl ListFilter {
    /// The effective search term: trimmed, `None` when empty/whitespace.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// The effective status filter; `"all"` (any case) disables it.
    pub fn status_term(&self) -> Option<&str> {
        self.status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case(STATUS_ALL))
    }

    /// The calendar-day window for the date filter, if the date parses.
    pub fn date_window(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        self.date.as_deref().and_then(day_bounds)
    }
}

/// Parse `YYYY-MM-DD` into an inclusive full-day window.
///
/// The window runs `[00:00:00, 23:59:59.999999]`; anything that does not
/// parse yields `None`.
pub fn day_bounds(date: &str) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let day = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()?;
    let start = day.and_hms_opt(0, 0, 0)?;
    let end = day.and_hms_micro_opt(23, 59, 59, 999_999)?;
    Some((start, end))
}

/// Clamp a 1-indexed page number.
pub fn clamp_page(page: i64) -> i64 {
    page.max(1)
}

/// Offset into the filtered-and-ordered set for a page.
pub fn page_offset(page: i64, limit: i64) -> i64 {
    (clamp_page(page) - 1) * limit
}

/// Whether pages remain past the current one.
pub fn has_more(page: i64, limit: i64, total: i64) -> bool {
    clamp_page(page) * limit < total
}

/// One page of listing results plus the count ignoring pagination.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub has_more: bool,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, page: i64, limit: i64, total: i64) -> Self {
        let page = clamp_page(page);
        Self {
            has_more: has_more(page, limit, total),
            data,
            page,
            limit,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_term_trims_and_drops_empty() {
        let f = ListFilter {
            search: Some("  anita ".into()),
            ..Default::default()
        };
        assert_eq!(f.search_term(), Some("anita"));

        let blank = ListFilter {
            search: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(blank.search_term(), None);
        assert_eq!(ListFilter::default().search_term(), None);
    }

    #[test]
    fn status_all_sentinel_disables_filter() {
        for raw in ["all", "ALL", "All"] {
            let f = ListFilter {
                status: Some(raw.into()),
                ..Default::default()
            };
            assert_eq!(f.status_term(), None, "{raw} should disable the filter");
        }
        let f = ListFilter {
            status: Some("Lab Test Requested".into()),
            ..Default::default()
        };
        assert_eq!(f.status_term(), Some("Lab Test Requested"));
    }

    #[test]
    fn day_bounds_covers_full_day() {
        let (start, end) = day_bounds("2024-03-05").unwrap();
        assert_eq!(start.to_string(), "2024-03-05 00:00:00");
        assert_eq!(end.to_string(), "2024-03-05 23:59:59.999999");
    }

    #[test]
    fn malformed_date_is_silently_dropped() {
        assert!(day_bounds("not-a-date").is_none());
        assert!(day_bounds("2024-13-40").is_none());
        assert!(day_bounds("05/03/2024").is_none());
        let f = ListFilter {
            date: Some("yesterday".into()),
            ..Default::default()
        };
        assert!(f.date_window().is_none());
    }

    #[test]
    fn relevance_ranks_in_priority_order() {
        assert_eq!(
            relevance_rank("CS21B042", Some("cs21b042"), Some("Anita Rao")),
            RANK_EXACT_ID_NUMBER
        );
        assert_eq!(
            relevance_rank("ani", Some("CS21B042"), Some("Anita Rao")),
            RANK_NAME_PREFIX
        );
        assert_eq!(
            relevance_rank("rao", Some("CS21B042"), Some("Anita Rao")),
            RANK_NAME_CONTAINS
        );
        assert_eq!(relevance_rank("zzz", Some("CS21B042"), Some("Anita Rao")), RANK_NONE);
        assert_eq!(relevance_rank("  ", Some("CS21B042"), Some("Anita Rao")), RANK_NONE);
        assert_eq!(relevance_rank("x", None, None), RANK_NONE);
    }

    #[test]
    fn contains_ci_ignores_case() {
        assert!(contains_ci("Medication Issued by Pharmacist", "issued"));
        assert!(!contains_ci("Initiated by Nurse", "lab"));
    }

    #[test]
    fn has_more_counts_remaining_pages() {
        // page=1, limit=10, total=15 -> more pages exist
        assert!(has_more(1, 10, 15));
        // page=2, limit=10, total=15 -> 20 >= 15, nothing further
        assert!(!has_more(2, 10, 15));
        // exact boundary
        assert!(!has_more(2, 10, 20));
        assert!(has_more(2, 10, 21));
    }

    #[test]
    fn page_clamps_below_one() {
        assert_eq!(clamp_page(0), 1);
        assert_eq!(clamp_page(-4), 1);
        assert_eq!(page_offset(0, 10), 0);
        assert_eq!(page_offset(3, 10), 20);
    }

    #[test]
    fn page_envelope_carries_counts() {
        let page = Page::new(vec![1, 2, 3], 1, 3, 7);
        assert_eq!(page.data.len(), 3);
        assert_eq!(page.total, 7);
        assert!(page.has_more);

        let last = Page::new(vec![7], 3, 3, 7);
        assert!(!last.has_more);
    }
}

//! Pagination types shared by all list endpoints

use clinic_workflow::Page;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Standard pagination parameters for list endpoints
#[derive(Debug, Deserialize, IntoParams, ToSchema, Clone, Default)]
pub struct PaginationParams {
    #[param(example = 1, minimum = 1)]
    pub page: Option<i64>,

    #[param(example = 10, minimum = 1, maximum = 100)]
    pub limit: Option<i64>,
}

impl PaginationParams {
    /// Get the page number (defaults to 1, minimum 1)
    pub fn page(&self) -> i64 {
        clinic_workflow::clamp_page(self.page.unwrap_or(1))
    }

    /// Get the page size (defaults to 10, clamped between 1 and 100)
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(10).clamp(1, 100)
    }

    /// Calculate the offset for SQL queries
    pub fn offset(&self) -> i64 {
        clinic_workflow::page_offset(self.page(), self.limit())
    }
}

/// Wire envelope for a page of results
#[derive(Debug, Serialize, ToSchema)]
pub struct PageResponse<T> {
    pub data: Vec<T>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub has_more: bool,
}

impl<T> From<Page<T>> for PageResponse<T> {
    fn from(page: Page<T>) -> Self {
        Self {
            data: page.data,
            page: page.page,
            limit: page.limit,
            total: page.total,
            has_more: page.has_more,
        }
    }
}

impl<T> PageResponse<T> {
    /// Build the envelope for the current page from data and total count.
    pub fn new(data: Vec<T>, params: &PaginationParams, total: i64) -> Self {
        Page::new(data, params.page(), params.limit(), total).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_listing_contract() {
        let params = PaginationParams { page: None, limit: None };
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), 10);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn offset_is_zero_indexed_window() {
        let params = PaginationParams { page: Some(3), limit: Some(10) };
        assert_eq!(params.offset(), 20);
    }

    #[test]
    fn page_below_one_clamps() {
        let params = PaginationParams { page: Some(0), limit: Some(10) };
        assert_eq!(params.page(), 1);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn limit_clamps_to_bounds() {
        let params = PaginationParams { page: Some(1), limit: Some(500) };
        assert_eq!(params.limit(), 100);
        let params = PaginationParams { page: Some(1), limit: Some(0) };
        assert_eq!(params.limit(), 1);
    }

    #[test]
    fn envelope_reports_has_more() {
        let params = PaginationParams { page: Some(1), limit: Some(10) };
        let page = PageResponse::new(vec![1, 2, 3], &params, 15);
        assert!(page.has_more);
        assert_eq!(page.total, 15);

        let params = PaginationParams { page: Some(2), limit: Some(10) };
        let page = PageResponse::new(vec![4], &params, 15);
        assert!(!page.has_more);
    }
}

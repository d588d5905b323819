//! Query builder utilities for consistent SQL query construction
//!
//! Wraps `sqlx::QueryBuilder` so listing endpoints compose their filters,
//! ordering and pagination the same way: optional filters AND together,
//! a search term fans out to an OR group over several columns, and LIMIT /
//! OFFSET are always bound from validated pagination parameters.
//!
//! Base queries must end in a WHERE clause (`WHERE 1=1` is fine) so every
//! filter can append with ` AND `.

use chrono::NaiveDateTime;
use clinic_workflow::{RANK_EXACT_ID_NUMBER, RANK_NAME_CONTAINS, RANK_NAME_PREFIX, RANK_NONE};
use sqlx::query::{QueryAs, QueryScalar};
use sqlx::{Postgres, QueryBuilder};

/// Paginated query builder for listing endpoints
pub struct PaginatedQuery<'a> {
    query: QueryBuilder<'a, Postgres>,
    page: i64,
    limit: i64,
}

impl<'a> PaginatedQuery<'a> {
    /// Create a new paginated query builder
    pub fn new(base_query: &'static str) -> Self {
        Self {
            query: QueryBuilder::new(base_query),
            page: 1,
            limit: 10,
        }
    }

    /// Add an equality filter (only if value is Some)
    pub fn filter_eq<T>(&mut self, column: &str, value: Option<T>) -> &mut Self
    where
        T: for<'q> sqlx::Encode<'q, Postgres> + sqlx::Type<Postgres> + Send + Sync + 'static,
    {
        if let Some(val) = value {
            self.query.push(format!(" AND {} = ", column));
            self.query.push_bind(val);
        }
        self
    }

    /// Case-insensitive contains filter on one column (only if term is Some)
    pub fn filter_contains(&mut self, column: &str, term: Option<&str>) -> &mut Self {
        if let Some(term) = term {
            self.query.push(format!(" AND {} ILIKE ", column));
            self.query.push_bind(format!("%{}%", term));
        }
        self
    }

    /// Search filter: case-insensitive contains, OR-ed across the given
    /// column expressions. Columns may be expressions such as
    /// `CAST(p.id AS TEXT)`.
    pub fn filter_search(&mut self, columns: &[&str], term: Option<&str>) -> &mut Self {
        let Some(term) = term else { return self };
        if columns.is_empty() {
            return self;
        }
        let pattern = format!("%{}%", term);
        self.query.push(" AND (");
        for (i, column) in columns.iter().enumerate() {
            if i > 0 {
                self.query.push(" OR ");
            }
            self.query.push(format!("{} ILIKE ", column));
            self.query.push_bind(pattern.clone());
        }
        self.query.push(")");
        self
    }

    /// Restrict a timestamp column to an inclusive window, typically one
    /// calendar day. A `None` window leaves the query untouched.
    pub fn filter_within(
        &mut self,
        column: &str,
        window: Option<(NaiveDateTime, NaiveDateTime)>,
    ) -> &mut Self {
        if let Some((start, end)) = window {
            self.query.push(format!(" AND {} >= ", column));
            self.query.push_bind(start);
            self.query.push(format!(" AND {} <= ", column));
            self.query.push_bind(end);
        }
        self
    }

    /// Add ORDER BY clause
    pub fn order_by(&mut self, column: &str, direction: &str) -> &mut Self {
        self.query.push(format!(" ORDER BY {} {}", column, direction));
        self
    }

    /// Add ORDER BY created_at DESC (default listing order)
    pub fn order_by_created_desc(&mut self) -> &mut Self {
        self.order_by("created_at", "DESC")
    }

    /// Priority ordering for work queues: rows whose status column equals
    /// the sentinel sort first, newest first within each bucket.
    pub fn order_awaiting_first(
        &mut self,
        status_column: &str,
        sentinel: &str,
        created_column: &str,
    ) -> &mut Self {
        self.query
            .push(format!(" ORDER BY CASE WHEN {} = ", status_column));
        self.query.push_bind(sentinel.to_string());
        self.query
            .push(format!(" THEN 1 ELSE 2 END, {} DESC", created_column));
        self
    }

    /// Relevance ordering for patient search: exact registration-number
    /// match, then name prefix, then name substring, then everything else;
    /// newest first as tie-break. Mirrors `clinic_workflow::relevance_rank`.
    pub fn order_by_relevance(
        &mut self,
        id_number_column: &str,
        name_column: &str,
        created_column: &str,
        term: &str,
    ) -> &mut Self {
        self.query
            .push(format!(" ORDER BY CASE WHEN LOWER({}) = LOWER(", id_number_column));
        self.query.push_bind(term.to_string());
        self.query
            .push(format!(") THEN {} WHEN LOWER({}) LIKE LOWER(", RANK_EXACT_ID_NUMBER, name_column));
        self.query.push_bind(format!("{}%", term));
        self.query
            .push(format!(") THEN {} WHEN {} ILIKE ", RANK_NAME_PREFIX, name_column));
        self.query.push_bind(format!("%{}%", term));
        self.query.push(format!(
            " THEN {} ELSE {} END DESC, {} DESC",
            RANK_NAME_CONTAINS, RANK_NONE, created_column
        ));
        self
    }

    /// Apply pagination with validated 1-indexed page and limit
    pub fn paginate(&mut self, page: i64, limit: i64) -> &mut Self {
        self.page = clinic_workflow::clamp_page(page);
        self.limit = limit.max(1);
        self.query.push(" LIMIT ");
        self.query.push_bind(self.limit);
        self.query.push(" OFFSET ");
        self.query
            .push_bind(clinic_workflow::page_offset(self.page, self.limit));
        self
    }

    /// Build the final query as a typed query for fetching rows
    pub fn build_query_as<T>(&mut self) -> QueryAs<'_, Postgres, T, sqlx::postgres::PgArguments>
    where
        T: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow>,
    {
        self.query.build_query_as()
    }

    /// Build the final query as a scalar query (COUNT bases)
    pub fn build_query_scalar<T>(
        &mut self,
    ) -> QueryScalar<'_, Postgres, T, sqlx::postgres::PgArguments>
    where
        (T,): for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow>,
    {
        self.query.build_query_scalar()
    }

    /// The SQL accumulated so far
    pub fn sql(&self) -> &str {
        self.query.sql()
    }

    /// Get current page
    pub fn page(&self) -> i64 {
        self.page
    }

    /// Get current page size
    pub fn limit(&self) -> i64 {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinic_workflow::day_bounds;

    #[test]
    fn filters_compose_with_and() {
        let mut query = PaginatedQuery::new("SELECT * FROM lab_reports WHERE 1=1");
        query
            .filter_contains("status", Some("Requested"))
            .filter_within("created_at", day_bounds("2024-03-05"))
            .order_by_created_desc()
            .paginate(2, 10);

        let sql = query.sql().to_string();
        assert!(sql.contains("status ILIKE"));
        assert!(sql.contains("created_at >="));
        assert!(sql.contains("created_at <="));
        assert!(sql.contains("ORDER BY created_at DESC"));
        assert_eq!(query.page(), 2);
        assert_eq!(query.limit(), 10);
    }

    #[test]
    fn none_filters_leave_query_untouched() {
        let mut query = PaginatedQuery::new("SELECT * FROM prescriptions WHERE 1=1");
        query
            .filter_contains("status", None)
            .filter_search(&["s.name"], None)
            .filter_within("created_at", None);
        assert_eq!(query.sql(), "SELECT * FROM prescriptions WHERE 1=1");
    }

    #[test]
    fn search_fans_out_to_or_group() {
        let mut query = PaginatedQuery::new("SELECT * FROM prescriptions p WHERE 1=1");
        query.filter_search(
            &["CAST(p.id AS TEXT)", "s.name", "s.id_number", "p.other_name"],
            Some("anita"),
        );
        let sql = query.sql().to_string();
        assert!(sql.contains(" AND (CAST(p.id AS TEXT) ILIKE "));
        assert_eq!(sql.matches(" OR ").count(), 3);
        assert!(sql.ends_with(")"));
    }

    #[test]
    fn relevance_order_uses_rank_constants() {
        let mut query = PaginatedQuery::new("SELECT * FROM prescriptions p WHERE 1=1");
        query.order_by_relevance("s.id_number", "s.name", "p.created_at", "anita");
        let sql = query.sql().to_string();
        assert!(sql.contains("THEN 3"));
        assert!(sql.contains("THEN 2"));
        assert!(sql.contains("THEN 1"));
        assert!(sql.contains("ELSE 0 END DESC, p.created_at DESC"));
    }

    #[test]
    fn awaiting_first_orders_by_case() {
        let mut query = PaginatedQuery::new("SELECT * FROM lab_reports WHERE 1=1");
        query.order_awaiting_first("status", "Lab Test Requested", "created_at");
        let sql = query.sql().to_string();
        assert!(sql.contains("ORDER BY CASE WHEN status ="));
        assert!(sql.contains("THEN 1 ELSE 2 END, created_at DESC"));
    }

    #[test]
    fn pagination_clamps_page_and_limit() {
        let mut query = PaginatedQuery::new("SELECT * FROM medicines WHERE 1=1");
        query.paginate(0, 0);
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), 1);
    }
}

//! Lab report endpoints
//!
//! The listing doubles as the lab technician's work queue: reports still
//! awaiting a test sort first, newest first within each bucket. Result
//! writes recompute the owning prescription's status in the same
//! transaction.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDateTime;
use clinic_workflow::{ListFilter, LAB_QUEUE_FIRST};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use crate::error::{api_success, ApiError, ApiResponse};
use crate::server::CampusCareServer;
use crate::services::prescription_status;
use crate::types::pagination::{PageResponse, PaginationParams};
use crate::utils::query_builder::PaginatedQuery;
use crate::validation::RequestValidation;
use crate::{validate_field, validate_required};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Lab report joined with its patient context
#[derive(Debug, Serialize, Deserialize, ToSchema, FromRow, Clone)]
pub struct LabReport {
    pub id: i64,
    pub prescription_id: i64,
    pub test_name: String,
    pub status: String,
    pub result: Option<String>,
    /// Opaque pointer to an externally stored result document
    pub result_url: Option<String>,
    /// Registered student's name, when the prescription references one
    pub student_name: Option<String>,
    pub student_id_number: Option<String>,
    /// Walk-in patient name otherwise
    pub other_name: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

/// Create Lab Report Request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLabReportRequest {
    pub prescription_id: i64,
    pub test_name: String,
}

impl RequestValidation for CreateLabReportRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.test_name, "Lab test name is required");
        Ok(())
    }
}

/// Update Lab Report Request
///
/// Writing `result` is how the technician completes the test; the owning
/// prescription's status follows from it.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateLabReportRequest {
    pub test_name: Option<String>,
    pub result: Option<String>,
    pub result_url: Option<String>,
}

impl RequestValidation for UpdateLabReportRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if let Some(ref test_name) = self.test_name {
            validate_required!(test_name, "Lab test name cannot be empty");
        }
        if let Some(ref url) = self.result_url {
            validate_field!(url, url.trim().len() <= 2048, "Result URL is too long");
        }
        Ok(())
    }
}

/// List Lab Reports Query Parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListLabReportsParams {
    /// Matches report id, test name, student name, registration number or
    /// walk-in name
    pub search: Option<String>,
    /// Case-insensitive contains; `all` disables
    pub status: Option<String>,
    /// `YYYY-MM-DD`; malformed values are ignored
    pub date: Option<String>,
}

impl ListLabReportsParams {
    fn filter(&self) -> ListFilter {
        ListFilter {
            search: self.search.clone(),
            status: self.status.clone(),
            date: self.date.clone(),
        }
    }
}

const SEARCH_COLUMNS: [&str; 5] = [
    "CAST(lr.id AS TEXT)",
    "lr.test_name",
    "s.name",
    "s.id_number",
    "p.other_name",
];

const SELECT_BASE: &str = r#"
SELECT lr.id, lr.prescription_id, lr.test_name, lr.status, lr.result,
       lr.result_url, s.name AS student_name, s.id_number AS student_id_number,
       p.other_name, lr.created_at, lr.updated_at
FROM lab_reports lr
JOIN prescriptions p ON p.id = lr.prescription_id
LEFT JOIN students s ON s.id = p.student_id
WHERE 1=1"#;

const COUNT_BASE: &str = r#"
SELECT COUNT(*)
FROM lab_reports lr
JOIN prescriptions p ON p.id = lr.prescription_id
LEFT JOIN students s ON s.id = p.student_id
WHERE 1=1"#;

// ============================================================================
// API HANDLERS
// ============================================================================

/// List lab reports, awaiting tests first
#[utoipa::path(
    get,
    path = "/api/v1/lab-reports",
    responses(
        (status = 200, description = "Lab reports retrieved successfully", body = PageResponse<LabReport>),
        (status = 500, description = "Internal server error")
    ),
    params(ListLabReportsParams, PaginationParams),
    tag = "lab-reports"
)]
pub async fn list_lab_reports(
    State(server): State<CampusCareServer>,
    Query(params): Query<ListLabReportsParams>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PageResponse<LabReport>>, ApiError> {
    let filter = params.filter();
    let term = filter.search_term();
    let status = filter.status_term();
    let window = filter.date_window();

    let mut query = PaginatedQuery::new(SELECT_BASE);
    query
        .filter_search(&SEARCH_COLUMNS, term)
        .filter_contains("lr.status", status)
        .filter_within("lr.created_at", window)
        .order_awaiting_first("lr.status", LAB_QUEUE_FIRST.as_str(), "lr.created_at")
        .paginate(pagination.page(), pagination.limit());
    let reports: Vec<LabReport> = query.build_query_as().fetch_all(&server.db_pool).await?;

    let mut count = PaginatedQuery::new(COUNT_BASE);
    count
        .filter_search(&SEARCH_COLUMNS, term)
        .filter_contains("lr.status", status)
        .filter_within("lr.created_at", window);
    let total: i64 = count.build_query_scalar().fetch_one(&server.db_pool).await?;

    Ok(Json(PageResponse::new(reports, &pagination, total)))
}

/// Get a lab report with its patient context
#[utoipa::path(
    get,
    path = "/api/v1/lab-reports/{id}",
    responses(
        (status = 200, description = "Lab report retrieved successfully", body = ApiResponse<LabReport>),
        (status = 404, description = "Lab report not found")
    ),
    params(("id" = i64, Path, description = "Lab report ID")),
    tag = "lab-reports"
)]
pub async fn get_lab_report(
    State(server): State<CampusCareServer>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<LabReport>>, ApiError> {
    let report = lab_report_by_id(&server, id).await?;
    Ok(Json(api_success(report)))
}

/// Request a lab test for a prescription
#[utoipa::path(
    post,
    path = "/api/v1/lab-reports",
    request_body = CreateLabReportRequest,
    responses(
        (status = 200, description = "Lab report created successfully", body = ApiResponse<LabReport>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Prescription not found")
    ),
    tag = "lab-reports"
)]
pub async fn create_lab_report(
    State(server): State<CampusCareServer>,
    Json(req): Json<CreateLabReportRequest>,
) -> Result<Json<ApiResponse<LabReport>>, ApiError> {
    req.validate()?;

    let mut tx = server.db_pool.begin().await?;
    prescription_status::ensure_exists(&mut tx, req.prescription_id).await?;

    let report_id: i64 = sqlx::query_scalar(
        "INSERT INTO lab_reports (prescription_id, test_name) VALUES ($1, $2) RETURNING id",
    )
    .bind(req.prescription_id)
    .bind(req.test_name.trim())
    .fetch_one(&mut *tx)
    .await?;

    prescription_status::recompute(&mut tx, req.prescription_id).await?;
    tx.commit().await?;

    let report = lab_report_by_id(&server, report_id).await?;
    Ok(Json(api_success(report)))
}

/// Update a lab report; writing a result completes the test
#[utoipa::path(
    put,
    path = "/api/v1/lab-reports/{id}",
    request_body = UpdateLabReportRequest,
    responses(
        (status = 200, description = "Lab report updated successfully", body = ApiResponse<LabReport>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Lab report not found")
    ),
    params(("id" = i64, Path, description = "Lab report ID")),
    tag = "lab-reports"
)]
pub async fn update_lab_report(
    State(server): State<CampusCareServer>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateLabReportRequest>,
) -> Result<Json<ApiResponse<LabReport>>, ApiError> {
    req.validate()?;

    let mut tx = server.db_pool.begin().await?;

    // The report's own status column tracks its result, mirroring the
    // prescription-level vocabulary.
    let report_status = req
        .result
        .as_deref()
        .map(|r| {
            if r.trim().is_empty() {
                clinic_workflow::PrescriptionStatus::LabTestRequested.as_str()
            } else {
                clinic_workflow::PrescriptionStatus::LabTestCompleted.as_str()
            }
        });

    let prescription_id: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE lab_reports SET
            test_name = COALESCE($2, test_name),
            result = COALESCE($3, result),
            result_url = COALESCE($4, result_url),
            status = COALESCE($5, status),
            updated_at = NOW()
        WHERE id = $1
        RETURNING prescription_id
        "#,
    )
    .bind(id)
    .bind(req.test_name.as_deref().map(str::trim))
    .bind(req.result)
    .bind(req.result_url)
    .bind(report_status)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(prescription_id) = prescription_id else {
        return Err(ApiError::not_found("lab report"));
    };

    prescription_status::recompute(&mut tx, prescription_id).await?;
    tx.commit().await?;

    let report = lab_report_by_id(&server, id).await?;
    Ok(Json(api_success(report)))
}

/// Delete a lab report
#[utoipa::path(
    delete,
    path = "/api/v1/lab-reports/{id}",
    responses(
        (status = 204, description = "Lab report deleted"),
        (status = 404, description = "Lab report not found")
    ),
    params(("id" = i64, Path, description = "Lab report ID")),
    tag = "lab-reports"
)]
pub async fn delete_lab_report(
    State(server): State<CampusCareServer>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let mut tx = server.db_pool.begin().await?;

    let prescription_id: Option<i64> =
        sqlx::query_scalar("DELETE FROM lab_reports WHERE id = $1 RETURNING prescription_id")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

    let Some(prescription_id) = prescription_id else {
        return Err(ApiError::not_found("lab report"));
    };

    prescription_status::recompute(&mut tx, prescription_id).await?;
    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn lab_report_by_id(server: &CampusCareServer, id: i64) -> Result<LabReport, ApiError> {
    let report: Option<LabReport> = sqlx::query_as(
        r#"
        SELECT lr.id, lr.prescription_id, lr.test_name, lr.status, lr.result,
               lr.result_url, s.name AS student_name,
               s.id_number AS student_id_number, p.other_name,
               lr.created_at, lr.updated_at
        FROM lab_reports lr
        JOIN prescriptions p ON p.id = lr.prescription_id
        LEFT JOIN students s ON s.id = p.student_id
        WHERE lr.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&server.db_pool)
    .await?;
    report.ok_or_else(|| ApiError::not_found("lab report"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_rejects_blank_test_name() {
        let req = CreateLabReportRequest {
            prescription_id: 1,
            test_name: "   ".into(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn update_request_allows_result_only() {
        let req = UpdateLabReportRequest {
            test_name: None,
            result: Some("WBC within range".into()),
            result_url: None,
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn update_request_rejects_blank_test_name() {
        let req = UpdateLabReportRequest {
            test_name: Some("".into()),
            result: None,
            result_url: None,
        };
        assert!(req.validate().is_err());
    }
}

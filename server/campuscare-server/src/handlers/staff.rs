use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use crate::error::{api_success, ApiError, ApiResponse};
use crate::server::CampusCareServer;
use crate::types::pagination::{PageResponse, PaginationParams};
use crate::utils::query_builder::PaginatedQuery;
use crate::validation::RequestValidation;
use crate::{validate_email, validate_field, validate_required};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Staff member profile
#[derive(Debug, Serialize, Deserialize, ToSchema, FromRow, Clone)]
pub struct StaffProfile {
    pub id: i64,
    /// Badge number, unique when present
    pub employee_id: Option<String>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub qualification: Option<String>,
    pub experience: Option<String>,
    pub join_date: Option<NaiveDate>,
    pub address: Option<String>,
    pub license_number: Option<String>,
}

/// Create Staff Profile Request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateStaffProfileRequest {
    pub employee_id: Option<String>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub qualification: Option<String>,
    pub experience: Option<String>,
    pub join_date: Option<NaiveDate>,
    pub address: Option<String>,
    pub license_number: Option<String>,
}

impl RequestValidation for CreateStaffProfileRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.name, "Staff name is required");
        validate_email!(self.email, "Invalid email format");
        if let Some(ref employee_id) = self.employee_id {
            validate_required!(employee_id, "Employee ID cannot be empty");
        }
        Ok(())
    }
}

/// Update Staff Profile Request
///
/// `employee_id` is deliberately immutable after creation; the badge number
/// is the stable external key.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStaffProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub qualification: Option<String>,
    pub experience: Option<String>,
    pub join_date: Option<NaiveDate>,
    pub address: Option<String>,
    pub license_number: Option<String>,
}

impl RequestValidation for UpdateStaffProfileRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if let Some(ref name) = self.name {
            validate_required!(name, "Staff name cannot be empty");
        }
        if let Some(ref email) = self.email {
            validate_email!(email, "Invalid email format");
        }
        Ok(())
    }
}

/// List Staff Profiles Query Parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListStaffParams {
    /// Matches employee ID, name, email or department, case-insensitively
    pub search: Option<String>,
    pub department: Option<String>,
}

// ============================================================================
// API HANDLERS
// ============================================================================

/// List staff profiles
#[utoipa::path(
    get,
    path = "/api/v1/staff-profiles",
    responses(
        (status = 200, description = "Staff profiles retrieved successfully", body = PageResponse<StaffProfile>),
        (status = 500, description = "Internal server error")
    ),
    params(ListStaffParams, PaginationParams),
    tag = "staff"
)]
pub async fn list_staff_profiles(
    State(server): State<CampusCareServer>,
    Query(params): Query<ListStaffParams>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PageResponse<StaffProfile>>, ApiError> {
    let term = params
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let department = params
        .department
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let search_columns = ["employee_id", "name", "email", "department"];

    let mut query = PaginatedQuery::new("SELECT * FROM staff_profiles WHERE 1=1");
    query
        .filter_search(&search_columns, term)
        .filter_contains("department", department)
        .order_by("name", "ASC")
        .paginate(pagination.page(), pagination.limit());
    let profiles: Vec<StaffProfile> = query.build_query_as().fetch_all(&server.db_pool).await?;

    let mut count = PaginatedQuery::new("SELECT COUNT(*) FROM staff_profiles WHERE 1=1");
    count
        .filter_search(&search_columns, term)
        .filter_contains("department", department);
    let total: i64 = count.build_query_scalar().fetch_one(&server.db_pool).await?;

    Ok(Json(PageResponse::new(profiles, &pagination, total)))
}

/// Get a single staff profile
#[utoipa::path(
    get,
    path = "/api/v1/staff-profiles/{id}",
    responses(
        (status = 200, description = "Staff profile retrieved successfully", body = ApiResponse<StaffProfile>),
        (status = 404, description = "Staff profile not found")
    ),
    params(("id" = i64, Path, description = "Staff profile ID")),
    tag = "staff"
)]
pub async fn get_staff_profile(
    State(server): State<CampusCareServer>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<StaffProfile>>, ApiError> {
    let profile: Option<StaffProfile> = sqlx::query_as("SELECT * FROM staff_profiles WHERE id = $1")
        .bind(id)
        .fetch_optional(&server.db_pool)
        .await?;

    match profile {
        Some(profile) => Ok(Json(api_success(profile))),
        None => Err(ApiError::not_found("staff profile")),
    }
}

/// Get a staff profile by badge number
#[utoipa::path(
    get,
    path = "/api/v1/staff-profiles/by-employee/{employee_id}",
    responses(
        (status = 200, description = "Staff profile retrieved successfully", body = ApiResponse<StaffProfile>),
        (status = 404, description = "Staff profile not found")
    ),
    params(("employee_id" = String, Path, description = "Employee ID")),
    tag = "staff"
)]
pub async fn get_staff_profile_by_employee(
    State(server): State<CampusCareServer>,
    Path(employee_id): Path<String>,
) -> Result<Json<ApiResponse<StaffProfile>>, ApiError> {
    let profile: Option<StaffProfile> =
        sqlx::query_as("SELECT * FROM staff_profiles WHERE employee_id = $1")
            .bind(employee_id.trim())
            .fetch_optional(&server.db_pool)
            .await?;

    match profile {
        Some(profile) => Ok(Json(api_success(profile))),
        None => Err(ApiError::not_found("staff profile")),
    }
}

/// Register a staff profile
#[utoipa::path(
    post,
    path = "/api/v1/staff-profiles",
    request_body = CreateStaffProfileRequest,
    responses(
        (status = 200, description = "Staff profile created successfully", body = ApiResponse<StaffProfile>),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Profile already exists")
    ),
    tag = "staff"
)]
pub async fn create_staff_profile(
    State(server): State<CampusCareServer>,
    Json(req): Json<CreateStaffProfileRequest>,
) -> Result<Json<ApiResponse<StaffProfile>>, ApiError> {
    req.validate()?;

    // Surface the duplicate as a conflict rather than a raw unique-violation
    let existing: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM staff_profiles WHERE email = $1 OR ($2::TEXT IS NOT NULL AND employee_id = $2)",
    )
    .bind(req.email.trim())
    .bind(req.employee_id.as_deref().map(str::trim))
    .fetch_optional(&server.db_pool)
    .await?;
    if existing.is_some() {
        return Err(ApiError::conflict("Profile already exists"));
    }

    let profile: StaffProfile = sqlx::query_as(
        r#"
        INSERT INTO staff_profiles
            (employee_id, name, email, phone, department, position,
             qualification, experience, join_date, address, license_number)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING *
        "#,
    )
    .bind(req.employee_id.as_deref().map(str::trim))
    .bind(req.name.trim())
    .bind(req.email.trim())
    .bind(req.phone)
    .bind(req.department)
    .bind(req.position)
    .bind(req.qualification)
    .bind(req.experience)
    .bind(req.join_date)
    .bind(req.address)
    .bind(req.license_number)
    .fetch_one(&server.db_pool)
    .await?;

    Ok(Json(api_success(profile)))
}

/// Update a staff profile
#[utoipa::path(
    put,
    path = "/api/v1/staff-profiles/{id}",
    request_body = UpdateStaffProfileRequest,
    responses(
        (status = 200, description = "Staff profile updated successfully", body = ApiResponse<StaffProfile>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Staff profile not found")
    ),
    params(("id" = i64, Path, description = "Staff profile ID")),
    tag = "staff"
)]
pub async fn update_staff_profile(
    State(server): State<CampusCareServer>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateStaffProfileRequest>,
) -> Result<Json<ApiResponse<StaffProfile>>, ApiError> {
    req.validate()?;

    let profile: Option<StaffProfile> = sqlx::query_as(
        r#"
        UPDATE staff_profiles SET
            name = COALESCE($2, name),
            email = COALESCE($3, email),
            phone = COALESCE($4, phone),
            department = COALESCE($5, department),
            position = COALESCE($6, position),
            qualification = COALESCE($7, qualification),
            experience = COALESCE($8, experience),
            join_date = COALESCE($9, join_date),
            address = COALESCE($10, address),
            license_number = COALESCE($11, license_number)
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(req.name.as_deref().map(str::trim))
    .bind(req.email.as_deref().map(str::trim))
    .bind(req.phone)
    .bind(req.department)
    .bind(req.position)
    .bind(req.qualification)
    .bind(req.experience)
    .bind(req.join_date)
    .bind(req.address)
    .bind(req.license_number)
    .fetch_optional(&server.db_pool)
    .await?;

    match profile {
        Some(profile) => Ok(Json(api_success(profile))),
        None => Err(ApiError::not_found("staff profile")),
    }
}

/// Delete a staff profile
#[utoipa::path(
    delete,
    path = "/api/v1/staff-profiles/{id}",
    responses(
        (status = 204, description = "Staff profile deleted"),
        (status = 404, description = "Staff profile not found")
    ),
    params(("id" = i64, Path, description = "Staff profile ID")),
    tag = "staff"
)]
pub async fn delete_staff_profile(
    State(server): State<CampusCareServer>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let rows_affected = sqlx::query("DELETE FROM staff_profiles WHERE id = $1")
        .bind(id)
        .execute(&server.db_pool)
        .await?
        .rows_affected();

    if rows_affected == 0 {
        Err(ApiError::not_found("staff profile"))
    } else {
        Ok(StatusCode::NO_CONTENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_create() -> CreateStaffProfileRequest {
        CreateStaffProfileRequest {
            employee_id: Some("EMP-0042".into()),
            name: "Dr. Meera Nair".into(),
            email: "meera.nair@campus.edu".into(),
            phone: None,
            department: Some("General Medicine".into()),
            position: Some("Doctor".into()),
            qualification: None,
            experience: None,
            join_date: None,
            address: None,
            license_number: None,
        }
    }

    #[test]
    fn valid_profile_passes() {
        assert!(base_create().validate().is_ok());
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut req = base_create();
        req.name = "   ".into();
        assert!(req.validate().is_err());
    }

    #[test]
    fn malformed_email_is_rejected() {
        let mut req = base_create();
        req.email = "not-an-email".into();
        assert!(req.validate().is_err());
    }

    #[test]
    fn blank_employee_id_is_rejected() {
        let mut req = base_create();
        req.employee_id = Some("".into());
        assert!(req.validate().is_err());
    }

    #[test]
    fn update_allows_partial_fields() {
        let req = UpdateStaffProfileRequest {
            name: None,
            email: None,
            phone: Some("9876543210".into()),
            department: None,
            position: None,
            qualification: None,
            experience: None,
            join_date: None,
            address: None,
            license_number: None,
        };
        assert!(req.validate().is_ok());
    }
}

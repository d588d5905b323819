use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
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

/// Registered student
#[derive(Debug, Serialize, Deserialize, ToSchema, FromRow, Clone)]
pub struct Student {
    pub id: i64,
    /// Campus registration number, unique
    pub id_number: String,
    pub name: String,
    pub email: String,
    pub branch: Option<String>,
    pub section: Option<String>,
}

/// Create Student Request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateStudentRequest {
    pub id_number: String,
    pub name: String,
    pub email: String,
    pub branch: Option<String>,
    pub section: Option<String>,
}

impl RequestValidation for CreateStudentRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.id_number, "Registration number is required");
        validate_required!(self.name, "Student name is required");
        validate_email!(self.email, "Invalid email format");
        Ok(())
    }
}

/// Update Student Request
///
/// Every mutable field enumerated explicitly; absent fields stay untouched.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStudentRequest {
    pub id_number: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub branch: Option<String>,
    pub section: Option<String>,
}

impl RequestValidation for UpdateStudentRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if let Some(ref name) = self.name {
            validate_required!(name, "Student name cannot be empty");
        }
        if let Some(ref email) = self.email {
            validate_email!(email, "Invalid email format");
        }
        Ok(())
    }
}

/// List Students Query Parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListStudentsParams {
    /// Matches registration number, name or email, case-insensitively
    pub search: Option<String>,
}

// ============================================================================
// API HANDLERS
// ============================================================================

/// List students
#[utoipa::path(
    get,
    path = "/api/v1/students",
    responses(
        (status = 200, description = "Students retrieved successfully", body = PageResponse<Student>),
        (status = 500, description = "Internal server error")
    ),
    params(ListStudentsParams, PaginationParams),
    tag = "students"
)]
pub async fn list_students(
    State(server): State<CampusCareServer>,
    Query(params): Query<ListStudentsParams>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PageResponse<Student>>, ApiError> {
    let term = params
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let search_columns = ["CAST(id AS TEXT)", "id_number", "name", "email"];

    let mut query = PaginatedQuery::new("SELECT * FROM students WHERE 1=1");
    query
        .filter_search(&search_columns, term)
        .order_by("name", "ASC")
        .paginate(pagination.page(), pagination.limit());
    let students: Vec<Student> = query.build_query_as().fetch_all(&server.db_pool).await?;

    let mut count = PaginatedQuery::new("SELECT COUNT(*) FROM students WHERE 1=1");
    count.filter_search(&search_columns, term);
    let total: i64 = count.build_query_scalar().fetch_one(&server.db_pool).await?;

    Ok(Json(PageResponse::new(students, &pagination, total)))
}

/// Get a single student
#[utoipa::path(
    get,
    path = "/api/v1/students/{id}",
    responses(
        (status = 200, description = "Student retrieved successfully", body = ApiResponse<Student>),
        (status = 404, description = "Student not found")
    ),
    params(("id" = i64, Path, description = "Student ID")),
    tag = "students"
)]
pub async fn get_student(
    State(server): State<CampusCareServer>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Student>>, ApiError> {
    let student: Option<Student> = sqlx::query_as("SELECT * FROM students WHERE id = $1")
        .bind(id)
        .fetch_optional(&server.db_pool)
        .await?;

    match student {
        Some(student) => Ok(Json(api_success(student))),
        None => Err(ApiError::not_found("student")),
    }
}

/// Register a student
#[utoipa::path(
    post,
    path = "/api/v1/students",
    request_body = CreateStudentRequest,
    responses(
        (status = 200, description = "Student created successfully", body = ApiResponse<Student>),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Registration number already exists")
    ),
    tag = "students"
)]
pub async fn create_student(
    State(server): State<CampusCareServer>,
    Json(req): Json<CreateStudentRequest>,
) -> Result<Json<ApiResponse<Student>>, ApiError> {
    req.validate()?;

    let student: Student = sqlx::query_as(
        r#"
        INSERT INTO students (id_number, name, email, branch, section)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(req.id_number.trim())
    .bind(req.name.trim())
    .bind(req.email.trim())
    .bind(req.branch.as_deref().map(str::trim))
    .bind(req.section.as_deref().map(str::trim))
    .fetch_one(&server.db_pool)
    .await?;

    Ok(Json(api_success(student)))
}

/// Update a student
#[utoipa::path(
    put,
    path = "/api/v1/students/{id}",
    request_body = UpdateStudentRequest,
    responses(
        (status = 200, description = "Student updated successfully", body = ApiResponse<Student>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Student not found")
    ),
    params(("id" = i64, Path, description = "Student ID")),
    tag = "students"
)]
pub async fn update_student(
    State(server): State<CampusCareServer>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateStudentRequest>,
) -> Result<Json<ApiResponse<Student>>, ApiError> {
    req.validate()?;

    let student: Option<Student> = sqlx::query_as(
        r#"
        UPDATE students SET
            id_number = COALESCE($2, id_number),
            name = COALESCE($3, name),
            email = COALESCE($4, email),
            branch = COALESCE($5, branch),
            section = COALESCE($6, section)
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(req.id_number)
    .bind(req.name)
    .bind(req.email)
    .bind(req.branch)
    .bind(req.section)
    .fetch_optional(&server.db_pool)
    .await?;

    match student {
        Some(student) => Ok(Json(api_success(student))),
        None => Err(ApiError::not_found("student")),
    }
}

/// Delete a student
#[utoipa::path(
    delete,
    path = "/api/v1/students/{id}",
    responses(
        (status = 204, description = "Student deleted"),
        (status = 404, description = "Student not found")
    ),
    params(("id" = i64, Path, description = "Student ID")),
    tag = "students"
)]
pub async fn delete_student(
    State(server): State<CampusCareServer>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let rows_affected = sqlx::query("DELETE FROM students WHERE id = $1")
        .bind(id)
        .execute(&server.db_pool)
        .await?
        .rows_affected();

    if rows_affected == 0 {
        Err(ApiError::not_found("student"))
    } else {
        Ok(StatusCode::NO_CONTENT)
    }
}

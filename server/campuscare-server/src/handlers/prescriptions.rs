//! Prescription workflow endpoints
//!
//! A prescription moves nurse -> doctor -> pharmacist -> lab. Its status
//! column is never written directly by a client; every mutation of its
//! medicine or lab lines recomputes it through
//! `services::prescription_status` inside the same transaction.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDateTime;
use clinic_workflow::{ListFilter, PatientRef, PrescriptionStatus};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Pool, Postgres};
use utoipa::{IntoParams, ToSchema};

use crate::error::{api_success, ApiError, ApiResponse};
use crate::handlers::students::Student;
use crate::server::CampusCareServer;
use crate::services::prescription_status;
use crate::types::pagination::{PageResponse, PaginationParams};
use crate::utils::query_builder::PaginatedQuery;
use crate::validation::RequestValidation;
use crate::{validate_field, validate_range, validate_required};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Prescription row as stored
#[derive(Debug, Serialize, Deserialize, ToSchema, FromRow, Clone)]
pub struct Prescription {
    pub id: i64,
    pub student_id: Option<i64>,
    /// Walk-in patient name when no student is referenced
    pub other_name: Option<String>,
    pub nurse_id: i64,
    pub doctor_id: Option<i64>,
    pub nurse_notes: Option<String>,
    pub doctor_notes: Option<String>,
    pub weight: Option<String>,
    pub blood_pressure: Option<String>,
    pub temperature: Option<String>,
    pub age: Option<i32>,
    /// Derived, never client-supplied
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

/// Medicine line joined with the medicine name
#[derive(Debug, Serialize, ToSchema, FromRow, Clone)]
pub struct MedicineLineView {
    pub id: i64,
    pub prescription_id: i64,
    pub medicine_id: i64,
    pub medicine_name: String,
    pub quantity_prescribed: i32,
    pub quantity_issued: Option<i32>,
}

/// Lab request line
#[derive(Debug, Serialize, ToSchema, FromRow, Clone)]
pub struct LabLineView {
    pub id: i64,
    pub prescription_id: i64,
    pub test_name: String,
    pub status: String,
    pub result: Option<String>,
    pub result_url: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

/// Prescription with its patient and association lines resolved
#[derive(Debug, Serialize, ToSchema)]
pub struct PrescriptionView {
    pub id: i64,
    pub student: Option<Student>,
    pub other_name: Option<String>,
    pub nurse_id: i64,
    pub doctor_id: Option<i64>,
    pub nurse_notes: Option<String>,
    pub doctor_notes: Option<String>,
    pub weight: Option<String>,
    pub blood_pressure: Option<String>,
    pub temperature: Option<String>,
    pub age: Option<i32>,
    pub status: String,
    pub medicines: Vec<MedicineLineView>,
    pub lab_reports: Vec<LabLineView>,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

/// Initial medicine line on a new prescription
#[derive(Debug, Deserialize, ToSchema)]
pub struct MedicineLineRequest {
    pub medicine_id: i64,
    pub quantity_prescribed: i32,
}

/// Create Prescription Request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePrescriptionRequest {
    pub student_id: Option<i64>,
    pub other_name: Option<String>,
    pub nurse_id: i64,
    pub doctor_id: Option<i64>,
    pub nurse_notes: Option<String>,
    pub doctor_notes: Option<String>,
    pub weight: Option<String>,
    pub blood_pressure: Option<String>,
    pub temperature: Option<String>,
    pub age: Option<i32>,
    #[serde(default)]
    pub medicines: Vec<MedicineLineRequest>,
    #[serde(default)]
    pub lab_tests: Vec<String>,
}

impl RequestValidation for CreatePrescriptionRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if let Some(age) = self.age {
            validate_range!(age, 0, 130, "Age must be between 0 and 130");
        }
        for line in &self.medicines {
            validate_field!(
                line.quantity_prescribed,
                line.quantity_prescribed > 0,
                "Prescribed quantity must be positive"
            );
        }
        for test_name in &self.lab_tests {
            validate_required!(test_name, "Lab test name cannot be empty");
        }
        Ok(())
    }
}

/// Update Prescription Request
///
/// The mutable fields, enumerated; status is absent on purpose since it is
/// always derived from the association lines.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePrescriptionRequest {
    pub doctor_id: Option<i64>,
    pub nurse_notes: Option<String>,
    pub doctor_notes: Option<String>,
    pub weight: Option<String>,
    pub blood_pressure: Option<String>,
    pub temperature: Option<String>,
    pub age: Option<i32>,
}

impl RequestValidation for UpdatePrescriptionRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if let Some(age) = self.age {
            validate_range!(age, 0, 130, "Age must be between 0 and 130");
        }
        Ok(())
    }
}

/// Update Medicine Line Request (doctor adjusts, pharmacist issues)
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateMedicineLineRequest {
    pub quantity_prescribed: Option<i32>,
    pub quantity_issued: Option<i32>,
}

impl RequestValidation for UpdateMedicineLineRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if let Some(quantity) = self.quantity_prescribed {
            validate_field!(quantity, quantity > 0, "Prescribed quantity must be positive");
        }
        if let Some(quantity) = self.quantity_issued {
            validate_field!(quantity, quantity >= 0, "Issued quantity cannot be negative");
        }
        Ok(())
    }
}

/// List Prescriptions Query Parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListPrescriptionsParams {
    /// Matches prescription id, student name, registration number or
    /// walk-in name; switches ordering to relevance rank
    pub search: Option<String>,
    /// Case-insensitive contains; `all` disables
    pub status: Option<String>,
    /// `YYYY-MM-DD`; malformed values are ignored
    pub date: Option<String>,
}

impl ListPrescriptionsParams {
    fn filter(&self) -> ListFilter {
        ListFilter {
            search: self.search.clone(),
            status: self.status.clone(),
            date: self.date.clone(),
        }
    }
}

const SEARCH_COLUMNS: [&str; 4] = [
    "CAST(p.id AS TEXT)",
    "s.name",
    "s.id_number",
    "p.other_name",
];

// ============================================================================
// HYDRATION
// ============================================================================

/// Resolve students and association lines for a page of prescriptions with
/// three batch queries, preserving the incoming order.
async fn hydrate_views(
    pool: &Pool<Postgres>,
    prescriptions: Vec<Prescription>,
) -> Result<Vec<PrescriptionView>, ApiError> {
    if prescriptions.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i64> = prescriptions.iter().map(|p| p.id).collect();
    let student_ids: Vec<i64> = prescriptions.iter().filter_map(|p| p.student_id).collect();

    let students: Vec<Student> = sqlx::query_as("SELECT * FROM students WHERE id = ANY($1)")
        .bind(&student_ids)
        .fetch_all(pool)
        .await?;
    let students: HashMap<i64, Student> =
        students.into_iter().map(|s| (s.id, s)).collect();

    let medicine_lines: Vec<MedicineLineView> = sqlx::query_as(
        r#"
        SELECT pm.id, pm.prescription_id, pm.medicine_id, m.name AS medicine_name,
               pm.quantity_prescribed, pm.quantity_issued
        FROM prescription_medicines pm
        JOIN medicines m ON m.id = pm.medicine_id
        WHERE pm.prescription_id = ANY($1)
        ORDER BY pm.id
        "#,
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let lab_lines: Vec<LabLineView> = sqlx::query_as(
        r#"
        SELECT id, prescription_id, test_name, status, result, result_url,
               created_at, updated_at
        FROM lab_reports
        WHERE prescription_id = ANY($1)
        ORDER BY id
        "#,
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let mut medicines_by_id: HashMap<i64, Vec<MedicineLineView>> = HashMap::new();
    for line in medicine_lines {
        medicines_by_id.entry(line.prescription_id).or_default().push(line);
    }
    let mut labs_by_id: HashMap<i64, Vec<LabLineView>> = HashMap::new();
    for line in lab_lines {
        labs_by_id.entry(line.prescription_id).or_default().push(line);
    }

    Ok(prescriptions
        .into_iter()
        .map(|p| PrescriptionView {
            student: p.student_id.and_then(|id| students.get(&id).cloned()),
            medicines: medicines_by_id.remove(&p.id).unwrap_or_default(),
            lab_reports: labs_by_id.remove(&p.id).unwrap_or_default(),
            id: p.id,
            other_name: p.other_name,
            nurse_id: p.nurse_id,
            doctor_id: p.doctor_id,
            nurse_notes: p.nurse_notes,
            doctor_notes: p.doctor_notes,
            weight: p.weight,
            blood_pressure: p.blood_pressure,
            temperature: p.temperature,
            age: p.age,
            status: p.status,
            created_at: p.created_at,
            updated_at: p.updated_at,
        })
        .collect())
}

async fn view_by_id(
    pool: &Pool<Postgres>,
    id: i64,
) -> Result<PrescriptionView, ApiError> {
    let prescription: Option<Prescription> =
        sqlx::query_as("SELECT * FROM prescriptions WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
    let Some(prescription) = prescription else {
        return Err(ApiError::not_found("prescription"));
    };
    let mut views = hydrate_views(pool, vec![prescription]).await?;
    views.pop().ok_or_else(|| ApiError::not_found("prescription"))
}

// ============================================================================
// API HANDLERS
// ============================================================================

/// List prescriptions through the full filter pipeline
#[utoipa::path(
    get,
    path = "/api/v1/prescriptions",
    responses(
        (status = 200, description = "Prescriptions retrieved successfully", body = PageResponse<PrescriptionView>),
        (status = 500, description = "Internal server error")
    ),
    params(ListPrescriptionsParams, PaginationParams),
    tag = "prescriptions"
)]
pub async fn list_prescriptions(
    State(server): State<CampusCareServer>,
    Query(params): Query<ListPrescriptionsParams>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PageResponse<PrescriptionView>>, ApiError> {
    let filter = params.filter();
    let term = filter.search_term();
    let status = filter.status_term();
    let window = filter.date_window();

    let mut query = PaginatedQuery::new(
        "SELECT p.* FROM prescriptions p LEFT JOIN students s ON s.id = p.student_id WHERE 1=1",
    );
    query
        .filter_search(&SEARCH_COLUMNS, term)
        .filter_contains("p.status", status)
        .filter_within("p.created_at", window);
    match term {
        Some(term) => query.order_by_relevance("s.id_number", "s.name", "p.created_at", term),
        None => query.order_by("p.created_at", "DESC"),
    };
    query.paginate(pagination.page(), pagination.limit());
    let prescriptions: Vec<Prescription> =
        query.build_query_as().fetch_all(&server.db_pool).await?;

    let mut count = PaginatedQuery::new(
        "SELECT COUNT(*) FROM prescriptions p LEFT JOIN students s ON s.id = p.student_id WHERE 1=1",
    );
    count
        .filter_search(&SEARCH_COLUMNS, term)
        .filter_contains("p.status", status)
        .filter_within("p.created_at", window);
    let total: i64 = count.build_query_scalar().fetch_one(&server.db_pool).await?;

    let views = hydrate_views(&server.db_pool, prescriptions).await?;
    Ok(Json(PageResponse::new(views, &pagination, total)))
}

/// Get a prescription with patient and lines resolved
#[utoipa::path(
    get,
    path = "/api/v1/prescriptions/{id}",
    responses(
        (status = 200, description = "Prescription retrieved successfully", body = ApiResponse<PrescriptionView>),
        (status = 404, description = "Prescription not found")
    ),
    params(("id" = i64, Path, description = "Prescription ID")),
    tag = "prescriptions"
)]
pub async fn get_prescription(
    State(server): State<CampusCareServer>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<PrescriptionView>>, ApiError> {
    let view = view_by_id(&server.db_pool, id).await?;
    Ok(Json(api_success(view)))
}

/// Doctor work queue: prescriptions still awaiting review, oldest first
#[utoipa::path(
    get,
    path = "/api/v1/prescriptions/pending",
    responses(
        (status = 200, description = "Pending prescriptions retrieved successfully", body = PageResponse<PrescriptionView>)
    ),
    params(PaginationParams),
    tag = "prescriptions"
)]
pub async fn list_pending_prescriptions(
    State(server): State<CampusCareServer>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PageResponse<PrescriptionView>>, ApiError> {
    let awaiting = PrescriptionStatus::InitiatedByNurse.as_str();

    let mut query = PaginatedQuery::new("SELECT p.* FROM prescriptions p WHERE 1=1");
    query
        .filter_eq("p.status", Some(awaiting))
        .order_by("p.created_at", "ASC")
        .paginate(pagination.page(), pagination.limit());
    let prescriptions: Vec<Prescription> =
        query.build_query_as().fetch_all(&server.db_pool).await?;

    let mut count = PaginatedQuery::new("SELECT COUNT(*) FROM prescriptions p WHERE 1=1");
    count.filter_eq("p.status", Some(awaiting));
    let total: i64 = count.build_query_scalar().fetch_one(&server.db_pool).await?;

    let views = hydrate_views(&server.db_pool, prescriptions).await?;
    Ok(Json(PageResponse::new(views, &pagination, total)))
}

/// List a student's prescriptions, newest first
#[utoipa::path(
    get,
    path = "/api/v1/prescriptions/student/{student_id}",
    responses(
        (status = 200, description = "Prescriptions retrieved successfully", body = PageResponse<PrescriptionView>),
        (status = 404, description = "Student not found")
    ),
    params(
        ("student_id" = i64, Path, description = "Student ID"),
        PaginationParams
    ),
    tag = "prescriptions"
)]
pub async fn list_prescriptions_by_student(
    State(server): State<CampusCareServer>,
    Path(student_id): Path<i64>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PageResponse<PrescriptionView>>, ApiError> {
    let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM students WHERE id = $1")
        .bind(student_id)
        .fetch_optional(&server.db_pool)
        .await?;
    if exists.is_none() {
        return Err(ApiError::not_found("student"));
    }

    let mut query = PaginatedQuery::new("SELECT p.* FROM prescriptions p WHERE 1=1");
    query
        .filter_eq("p.student_id", Some(student_id))
        .order_by("p.created_at", "DESC")
        .paginate(pagination.page(), pagination.limit());
    let prescriptions: Vec<Prescription> =
        query.build_query_as().fetch_all(&server.db_pool).await?;

    let mut count = PaginatedQuery::new("SELECT COUNT(*) FROM prescriptions p WHERE 1=1");
    count.filter_eq("p.student_id", Some(student_id));
    let total: i64 = count.build_query_scalar().fetch_one(&server.db_pool).await?;

    let views = hydrate_views(&server.db_pool, prescriptions).await?;
    Ok(Json(PageResponse::new(views, &pagination, total)))
}

/// Open a prescription, optionally with initial medicine lines and lab
/// requests
#[utoipa::path(
    post,
    path = "/api/v1/prescriptions",
    request_body = CreatePrescriptionRequest,
    responses(
        (status = 200, description = "Prescription created successfully", body = ApiResponse<PrescriptionView>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Referenced student not found")
    ),
    tag = "prescriptions"
)]
pub async fn create_prescription(
    State(server): State<CampusCareServer>,
    Json(req): Json<CreatePrescriptionRequest>,
) -> Result<Json<ApiResponse<PrescriptionView>>, ApiError> {
    req.validate()?;
    let patient = PatientRef::resolve(req.student_id, req.other_name.as_deref())?;
    let (student_id, other_name) = match patient {
        PatientRef::Student(id) => (Some(id), None),
        PatientRef::Other(name) => (None, Some(name)),
    };

    if let Some(student_id) = student_id {
        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM students WHERE id = $1")
            .bind(student_id)
            .fetch_optional(&server.db_pool)
            .await?;
        if exists.is_none() {
            return Err(ApiError::not_found("student"));
        }
    }

    let mut tx = server.db_pool.begin().await?;

    let prescription_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO prescriptions
            (student_id, other_name, nurse_id, doctor_id, nurse_notes,
             doctor_notes, weight, blood_pressure, temperature, age)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING id
        "#,
    )
    .bind(student_id)
    .bind(other_name)
    .bind(req.nurse_id)
    .bind(req.doctor_id)
    .bind(req.nurse_notes)
    .bind(req.doctor_notes)
    .bind(req.weight)
    .bind(req.blood_pressure)
    .bind(req.temperature)
    .bind(req.age)
    .fetch_one(&mut *tx)
    .await?;

    for line in &req.medicines {
        sqlx::query(
            r#"
            INSERT INTO prescription_medicines
                (prescription_id, medicine_id, quantity_prescribed)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(prescription_id)
        .bind(line.medicine_id)
        .bind(line.quantity_prescribed)
        .execute(&mut *tx)
        .await?;
    }

    for test_name in &req.lab_tests {
        sqlx::query(
            "INSERT INTO lab_reports (prescription_id, test_name) VALUES ($1, $2)",
        )
        .bind(prescription_id)
        .bind(test_name.trim())
        .execute(&mut *tx)
        .await?;
    }

    prescription_status::recompute(&mut tx, prescription_id).await?;
    tx.commit().await?;

    let view = view_by_id(&server.db_pool, prescription_id).await?;
    Ok(Json(api_success(view)))
}

/// Update a prescription's clinical fields
#[utoipa::path(
    put,
    path = "/api/v1/prescriptions/{id}",
    request_body = UpdatePrescriptionRequest,
    responses(
        (status = 200, description = "Prescription updated successfully", body = ApiResponse<PrescriptionView>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Prescription not found")
    ),
    params(("id" = i64, Path, description = "Prescription ID")),
    tag = "prescriptions"
)]
pub async fn update_prescription(
    State(server): State<CampusCareServer>,
    Path(id): Path<i64>,
    Json(req): Json<UpdatePrescriptionRequest>,
) -> Result<Json<ApiResponse<PrescriptionView>>, ApiError> {
    req.validate()?;

    let updated: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE prescriptions SET
            doctor_id = COALESCE($2, doctor_id),
            nurse_notes = COALESCE($3, nurse_notes),
            doctor_notes = COALESCE($4, doctor_notes),
            weight = COALESCE($5, weight),
            blood_pressure = COALESCE($6, blood_pressure),
            temperature = COALESCE($7, temperature),
            age = COALESCE($8, age),
            updated_at = NOW()
        WHERE id = $1
        RETURNING id
        "#,
    )
    .bind(id)
    .bind(req.doctor_id)
    .bind(req.nurse_notes)
    .bind(req.doctor_notes)
    .bind(req.weight)
    .bind(req.blood_pressure)
    .bind(req.temperature)
    .bind(req.age)
    .fetch_optional(&server.db_pool)
    .await?;

    if updated.is_none() {
        return Err(ApiError::not_found("prescription"));
    }
    let view = view_by_id(&server.db_pool, id).await?;
    Ok(Json(api_success(view)))
}

/// Delete a prescription and its association lines
#[utoipa::path(
    delete,
    path = "/api/v1/prescriptions/{id}",
    responses(
        (status = 204, description = "Prescription deleted"),
        (status = 404, description = "Prescription not found")
    ),
    params(("id" = i64, Path, description = "Prescription ID")),
    tag = "prescriptions"
)]
pub async fn delete_prescription(
    State(server): State<CampusCareServer>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let rows_affected = sqlx::query("DELETE FROM prescriptions WHERE id = $1")
        .bind(id)
        .execute(&server.db_pool)
        .await?
        .rows_affected();

    if rows_affected == 0 {
        Err(ApiError::not_found("prescription"))
    } else {
        Ok(StatusCode::NO_CONTENT)
    }
}

// ============================================================================
// MEDICINE LINE HANDLERS
// ============================================================================

/// List the medicine lines on a prescription
#[utoipa::path(
    get,
    path = "/api/v1/prescriptions/{id}/medicines",
    responses(
        (status = 200, description = "Medicine lines retrieved successfully", body = ApiResponse<Vec<MedicineLineView>>),
        (status = 404, description = "Prescription not found")
    ),
    params(("id" = i64, Path, description = "Prescription ID")),
    tag = "prescriptions"
)]
pub async fn list_medicine_lines(
    State(server): State<CampusCareServer>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<MedicineLineView>>>, ApiError> {
    let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM prescriptions WHERE id = $1")
        .bind(id)
        .fetch_optional(&server.db_pool)
        .await?;
    if exists.is_none() {
        return Err(ApiError::not_found("prescription"));
    }

    let lines: Vec<MedicineLineView> = sqlx::query_as(
        r#"
        SELECT pm.id, pm.prescription_id, pm.medicine_id, m.name AS medicine_name,
               pm.quantity_prescribed, pm.quantity_issued
        FROM prescription_medicines pm
        JOIN medicines m ON m.id = pm.medicine_id
        WHERE pm.prescription_id = $1
        ORDER BY pm.id
        "#,
    )
    .bind(id)
    .fetch_all(&server.db_pool)
    .await?;

    Ok(Json(api_success(lines)))
}

/// Add a medicine line to a prescription
#[utoipa::path(
    post,
    path = "/api/v1/prescriptions/{id}/medicines",
    request_body = MedicineLineRequest,
    responses(
        (status = 200, description = "Medicine line added", body = ApiResponse<MedicineLineView>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Prescription not found")
    ),
    params(("id" = i64, Path, description = "Prescription ID")),
    tag = "prescriptions"
)]
pub async fn add_medicine_line(
    State(server): State<CampusCareServer>,
    Path(id): Path<i64>,
    Json(req): Json<MedicineLineRequest>,
) -> Result<Json<ApiResponse<MedicineLineView>>, ApiError> {
    if req.quantity_prescribed <= 0 {
        return Err(ApiError::validation("Prescribed quantity must be positive"));
    }

    let mut tx = server.db_pool.begin().await?;
    prescription_status::ensure_exists(&mut tx, id).await?;

    let line_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO prescription_medicines
            (prescription_id, medicine_id, quantity_prescribed)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(id)
    .bind(req.medicine_id)
    .bind(req.quantity_prescribed)
    .fetch_one(&mut *tx)
    .await?;

    prescription_status::recompute(&mut tx, id).await?;
    tx.commit().await?;

    let line = medicine_line_view(&server.db_pool, line_id).await?;
    Ok(Json(api_success(line)))
}

/// Update a medicine line; setting `quantity_issued` is how the pharmacist
/// marks the line issued
#[utoipa::path(
    put,
    path = "/api/v1/prescriptions/medicines/{line_id}",
    request_body = UpdateMedicineLineRequest,
    responses(
        (status = 200, description = "Medicine line updated", body = ApiResponse<MedicineLineView>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Medicine line not found")
    ),
    params(("line_id" = i64, Path, description = "Medicine line ID")),
    tag = "prescriptions"
)]
pub async fn update_medicine_line(
    State(server): State<CampusCareServer>,
    Path(line_id): Path<i64>,
    Json(req): Json<UpdateMedicineLineRequest>,
) -> Result<Json<ApiResponse<MedicineLineView>>, ApiError> {
    req.validate()?;

    let mut tx = server.db_pool.begin().await?;

    let prescription_id: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE prescription_medicines SET
            quantity_prescribed = COALESCE($2, quantity_prescribed),
            quantity_issued = COALESCE($3, quantity_issued)
        WHERE id = $1
        RETURNING prescription_id
        "#,
    )
    .bind(line_id)
    .bind(req.quantity_prescribed)
    .bind(req.quantity_issued)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(prescription_id) = prescription_id else {
        return Err(ApiError::not_found("medicine line"));
    };

    prescription_status::recompute(&mut tx, prescription_id).await?;
    tx.commit().await?;

    let line = medicine_line_view(&server.db_pool, line_id).await?;
    Ok(Json(api_success(line)))
}

/// Remove a medicine line
#[utoipa::path(
    delete,
    path = "/api/v1/prescriptions/medicines/{line_id}",
    responses(
        (status = 204, description = "Medicine line deleted"),
        (status = 404, description = "Medicine line not found")
    ),
    params(("line_id" = i64, Path, description = "Medicine line ID")),
    tag = "prescriptions"
)]
pub async fn delete_medicine_line(
    State(server): State<CampusCareServer>,
    Path(line_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let mut tx = server.db_pool.begin().await?;

    let prescription_id: Option<i64> =
        sqlx::query_scalar("DELETE FROM prescription_medicines WHERE id = $1 RETURNING prescription_id")
            .bind(line_id)
            .fetch_optional(&mut *tx)
            .await?;

    let Some(prescription_id) = prescription_id else {
        return Err(ApiError::not_found("medicine line"));
    };

    prescription_status::recompute(&mut tx, prescription_id).await?;
    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn medicine_line_view(
    pool: &Pool<Postgres>,
    line_id: i64,
) -> Result<MedicineLineView, ApiError> {
    let line: Option<MedicineLineView> = sqlx::query_as(
        r#"
        SELECT pm.id, pm.prescription_id, pm.medicine_id, m.name AS medicine_name,
               pm.quantity_prescribed, pm.quantity_issued
        FROM prescription_medicines pm
        JOIN medicines m ON m.id = pm.medicine_id
        WHERE pm.id = $1
        "#,
    )
    .bind(line_id)
    .fetch_optional(pool)
    .await?;
    line.ok_or_else(|| ApiError::not_found("medicine line"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_create() -> CreatePrescriptionRequest {
        CreatePrescriptionRequest {
            student_id: Some(1),
            other_name: None,
            nurse_id: 10,
            doctor_id: None,
            nurse_notes: Some("fever since morning".into()),
            doctor_notes: None,
            weight: Some("62kg".into()),
            blood_pressure: Some("118/76".into()),
            temperature: Some("101.2F".into()),
            age: Some(20),
            medicines: vec![],
            lab_tests: vec![],
        }
    }

    #[test]
    fn create_request_accepts_plain_visit() {
        assert!(base_create().validate().is_ok());
    }

    #[test]
    fn zero_quantity_line_is_rejected() {
        let mut req = base_create();
        req.medicines.push(MedicineLineRequest {
            medicine_id: 3,
            quantity_prescribed: 0,
        });
        assert!(req.validate().is_err());
    }

    #[test]
    fn blank_lab_test_name_is_rejected() {
        let mut req = base_create();
        req.lab_tests.push("  ".into());
        assert!(req.validate().is_err());
    }

    #[test]
    fn age_out_of_range_is_rejected() {
        let mut req = base_create();
        req.age = Some(200);
        assert!(req.validate().is_err());
    }

    #[test]
    fn line_update_rejects_negative_issue() {
        let req = UpdateMedicineLineRequest {
            quantity_prescribed: None,
            quantity_issued: Some(-1),
        };
        assert!(req.validate().is_err());
    }
}

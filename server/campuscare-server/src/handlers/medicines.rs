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
use crate::{validate_field, validate_required};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Medicine inventory row
#[derive(Debug, Serialize, Deserialize, ToSchema, FromRow, Clone)]
pub struct Medicine {
    pub id: i64,
    /// Upper-cased, whitespace-trimmed, unique
    pub name: String,
    pub brand: Option<String>,
    pub quantity: i32,
    pub cost: Option<f64>,
    pub tax: Option<f64>,
    pub total_cost: Option<f64>,
    pub category: Option<String>,
    pub expiry_date: Option<NaiveDate>,
}

/// Create Medicine Request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateMedicineRequest {
    pub name: String,
    pub brand: Option<String>,
    pub quantity: Option<i32>,
    pub cost: Option<f64>,
    pub tax: Option<f64>,
    pub total_cost: Option<f64>,
    pub category: Option<String>,
    pub expiry_date: Option<NaiveDate>,
}

impl RequestValidation for CreateMedicineRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.name, "Medicine name is required");
        if let Some(quantity) = self.quantity {
            validate_field!(quantity, quantity >= 0, "Quantity cannot be negative");
        }
        Ok(())
    }
}

/// Update Medicine Request
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateMedicineRequest {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub quantity: Option<i32>,
    pub cost: Option<f64>,
    pub tax: Option<f64>,
    pub total_cost: Option<f64>,
    pub category: Option<String>,
    pub expiry_date: Option<NaiveDate>,
}

impl RequestValidation for UpdateMedicineRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if let Some(ref name) = self.name {
            validate_required!(name, "Medicine name cannot be empty");
        }
        if let Some(quantity) = self.quantity {
            validate_field!(quantity, quantity >= 0, "Quantity cannot be negative");
        }
        Ok(())
    }
}

/// List Medicines Query Parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListMedicinesParams {
    /// Matches name, brand or category, case-insensitively
    pub search: Option<String>,
    pub category: Option<String>,
}

/// Inventory rows are keyed by normalized name: trimmed and upper-cased,
/// matching the bulk-import convention.
fn normalize_name(name: &str) -> String {
    name.trim().to_uppercase()
}

// ============================================================================
// API HANDLERS
// ============================================================================

/// List medicines
#[utoipa::path(
    get,
    path = "/api/v1/medicines",
    responses(
        (status = 200, description = "Medicines retrieved successfully", body = PageResponse<Medicine>),
        (status = 500, description = "Internal server error")
    ),
    params(ListMedicinesParams, PaginationParams),
    tag = "medicines"
)]
pub async fn list_medicines(
    State(server): State<CampusCareServer>,
    Query(params): Query<ListMedicinesParams>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PageResponse<Medicine>>, ApiError> {
    let term = params
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let category = params
        .category
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let search_columns = ["name", "brand", "category"];

    let mut query = PaginatedQuery::new("SELECT * FROM medicines WHERE 1=1");
    query
        .filter_search(&search_columns, term)
        .filter_contains("category", category)
        .order_by("name", "ASC")
        .paginate(pagination.page(), pagination.limit());
    let medicines: Vec<Medicine> = query.build_query_as().fetch_all(&server.db_pool).await?;

    let mut count = PaginatedQuery::new("SELECT COUNT(*) FROM medicines WHERE 1=1");
    count
        .filter_search(&search_columns, term)
        .filter_contains("category", category);
    let total: i64 = count.build_query_scalar().fetch_one(&server.db_pool).await?;

    Ok(Json(PageResponse::new(medicines, &pagination, total)))
}

/// Get a single medicine
#[utoipa::path(
    get,
    path = "/api/v1/medicines/{id}",
    responses(
        (status = 200, description = "Medicine retrieved successfully", body = ApiResponse<Medicine>),
        (status = 404, description = "Medicine not found")
    ),
    params(("id" = i64, Path, description = "Medicine ID")),
    tag = "medicines"
)]
pub async fn get_medicine(
    State(server): State<CampusCareServer>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Medicine>>, ApiError> {
    let medicine: Option<Medicine> = sqlx::query_as("SELECT * FROM medicines WHERE id = $1")
        .bind(id)
        .fetch_optional(&server.db_pool)
        .await?;

    match medicine {
        Some(medicine) => Ok(Json(api_success(medicine))),
        None => Err(ApiError::not_found("medicine")),
    }
}

/// Add a medicine to the inventory
#[utoipa::path(
    post,
    path = "/api/v1/medicines",
    request_body = CreateMedicineRequest,
    responses(
        (status = 200, description = "Medicine created successfully", body = ApiResponse<Medicine>),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Medicine name already exists")
    ),
    tag = "medicines"
)]
pub async fn create_medicine(
    State(server): State<CampusCareServer>,
    Json(req): Json<CreateMedicineRequest>,
) -> Result<Json<ApiResponse<Medicine>>, ApiError> {
    req.validate()?;

    // Total defaults to cost + tax when not supplied.
    let total_cost = req
        .total_cost
        .or_else(|| match (req.cost, req.tax) {
            (None, None) => None,
            (cost, tax) => Some(cost.unwrap_or(0.0) + tax.unwrap_or(0.0)),
        });

    let medicine: Medicine = sqlx::query_as(
        r#"
        INSERT INTO medicines (name, brand, quantity, cost, tax, total_cost, category, expiry_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(normalize_name(&req.name))
    .bind(req.brand.as_deref().map(str::trim))
    .bind(req.quantity.unwrap_or(0))
    .bind(req.cost)
    .bind(req.tax)
    .bind(total_cost)
    .bind(req.category.as_deref().map(str::trim))
    .bind(req.expiry_date)
    .fetch_one(&server.db_pool)
    .await?;

    Ok(Json(api_success(medicine)))
}

/// Update a medicine
#[utoipa::path(
    put,
    path = "/api/v1/medicines/{id}",
    request_body = UpdateMedicineRequest,
    responses(
        (status = 200, description = "Medicine updated successfully", body = ApiResponse<Medicine>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Medicine not found")
    ),
    params(("id" = i64, Path, description = "Medicine ID")),
    tag = "medicines"
)]
pub async fn update_medicine(
    State(server): State<CampusCareServer>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateMedicineRequest>,
) -> Result<Json<ApiResponse<Medicine>>, ApiError> {
    req.validate()?;

    let medicine: Option<Medicine> = sqlx::query_as(
        r#"
        UPDATE medicines SET
            name = COALESCE($2, name),
            brand = COALESCE($3, brand),
            quantity = COALESCE($4, quantity),
            cost = COALESCE($5, cost),
            tax = COALESCE($6, tax),
            total_cost = COALESCE($7, total_cost),
            category = COALESCE($8, category),
            expiry_date = COALESCE($9, expiry_date)
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(req.name.as_deref().map(normalize_name))
    .bind(req.brand)
    .bind(req.quantity)
    .bind(req.cost)
    .bind(req.tax)
    .bind(req.total_cost)
    .bind(req.category)
    .bind(req.expiry_date)
    .fetch_optional(&server.db_pool)
    .await?;

    match medicine {
        Some(medicine) => Ok(Json(api_success(medicine))),
        None => Err(ApiError::not_found("medicine")),
    }
}

/// Delete a medicine
#[utoipa::path(
    delete,
    path = "/api/v1/medicines/{id}",
    responses(
        (status = 204, description = "Medicine deleted"),
        (status = 404, description = "Medicine not found")
    ),
    params(("id" = i64, Path, description = "Medicine ID")),
    tag = "medicines"
)]
pub async fn delete_medicine(
    State(server): State<CampusCareServer>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let rows_affected = sqlx::query("DELETE FROM medicines WHERE id = $1")
        .bind(id)
        .execute(&server.db_pool)
        .await?
        .rows_affected();

    if rows_affected == 0 {
        Err(ApiError::not_found("medicine"))
    } else {
        Ok(StatusCode::NO_CONTENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_normalize_to_upper_case() {
        assert_eq!(normalize_name("  paracetamol "), "PARACETAMOL");
    }

    #[test]
    fn create_request_rejects_blank_name() {
        let req = CreateMedicineRequest {
            name: "   ".into(),
            brand: None,
            quantity: None,
            cost: None,
            tax: None,
            total_cost: None,
            category: None,
            expiry_date: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn negative_quantity_is_rejected() {
        let req = UpdateMedicineRequest {
            name: None,
            brand: None,
            quantity: Some(-5),
            cost: None,
            tax: None,
            total_cost: None,
            category: None,
            expiry_date: None,
        };
        assert!(req.validate().is_err());
    }
}

//! Analytics and dashboard stats
//!
//! Aggregate reads only; inventory thresholds come from `ServerConfig` so
//! a deployment can tune them without a rebuild.

use axum::{extract::State, Json};
use chrono::{Duration, NaiveDateTime, Utc};
use clinic_workflow::PrescriptionStatus;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::error::{api_success, ApiError, ApiResponse};
use crate::server::CampusCareServer;

/// A pending lab request older than this counts as urgent.
const URGENT_AFTER_HOURS: i64 = 24;

/// Inventory summary
#[derive(Debug, Serialize, ToSchema)]
pub struct InventorySummary {
    pub total_medicines: i64,
    /// Medicines at or below the configured low-stock threshold
    pub low_stock_count: i64,
    /// Medicines expiring within the configured window
    pub expiring_soon_count: i64,
    /// `sum(quantity * cost)` over rows with a cost
    pub total_stock_value: f64,
    pub most_prescribed: Vec<MostPrescribed>,
}

/// A medicine ranked by prescribed volume over the trailing window
#[derive(Debug, Serialize, ToSchema, FromRow)]
pub struct MostPrescribed {
    pub medicine_id: i64,
    pub medicine_name: String,
    pub total_prescribed: i64,
}

/// Front-desk dashboard counters
#[derive(Debug, Serialize, ToSchema, FromRow)]
pub struct HospitalStats {
    /// Prescriptions opened today, a proxy for patients seen
    pub total_patients_today: i64,
    pub total_prescriptions: i64,
    /// Still awaiting doctor review
    pub pending_prescriptions: i64,
    pub pending_lab_tests: i64,
}

/// Lab technician dashboard counters
#[derive(Debug, Serialize, ToSchema, FromRow)]
pub struct LabStats {
    pub pending_tests: i64,
    /// Completed with a result written since midnight
    pub completed_today: i64,
    pub total_tests: i64,
    /// Requested more than 24 hours ago and still pending
    pub urgent_tests: i64,
}

/// Midnight at the start of the given instant's day.
fn start_of_day(now: NaiveDateTime) -> NaiveDateTime {
    now.date().and_time(chrono::NaiveTime::MIN)
}

/// The instant before which a still-pending request counts as urgent.
fn urgent_cutoff(now: NaiveDateTime) -> NaiveDateTime {
    now - Duration::hours(URGENT_AFTER_HOURS)
}

#[derive(FromRow)]
struct StockTotals {
    total_medicines: i64,
    low_stock_count: i64,
    expiring_soon_count: i64,
    total_stock_value: f64,
}

/// Inventory summary endpoint
#[utoipa::path(
    get,
    path = "/api/v1/analytics/inventory",
    responses(
        (status = 200, description = "Inventory summary", body = ApiResponse<InventorySummary>),
        (status = 500, description = "Internal server error")
    ),
    tag = "analytics"
)]
pub async fn inventory_summary(
    State(server): State<CampusCareServer>,
) -> Result<Json<ApiResponse<InventorySummary>>, ApiError> {
    let today = Utc::now().date_naive();
    let expiry_horizon = today + Duration::days(server.config.expiring_soon_days);
    let window_start =
        Utc::now().naive_utc() - Duration::days(server.config.prescribing_window_days);

    let totals: StockTotals = sqlx::query_as(
        r#"
        SELECT COUNT(*) AS total_medicines,
               COUNT(*) FILTER (WHERE quantity <= $1) AS low_stock_count,
               COUNT(*) FILTER (WHERE expiry_date IS NOT NULL AND expiry_date <= $2)
                   AS expiring_soon_count,
               COALESCE(SUM(quantity * cost), 0)::FLOAT8 AS total_stock_value
        FROM medicines
        "#,
    )
    .bind(server.config.low_stock_threshold)
    .bind(expiry_horizon)
    .fetch_one(&server.db_pool)
    .await?;

    let most_prescribed: Vec<MostPrescribed> = sqlx::query_as(
        r#"
        SELECT m.id AS medicine_id, m.name AS medicine_name,
               SUM(pm.quantity_prescribed)::BIGINT AS total_prescribed
        FROM prescription_medicines pm
        JOIN medicines m ON m.id = pm.medicine_id
        JOIN prescriptions p ON p.id = pm.prescription_id
        WHERE p.created_at >= $1
        GROUP BY m.id, m.name
        ORDER BY total_prescribed DESC
        LIMIT 5
        "#,
    )
    .bind(window_start)
    .fetch_all(&server.db_pool)
    .await?;

    Ok(Json(api_success(InventorySummary {
        total_medicines: totals.total_medicines,
        low_stock_count: totals.low_stock_count,
        expiring_soon_count: totals.expiring_soon_count,
        total_stock_value: totals.total_stock_value,
        most_prescribed,
    })))
}

/// Hospital dashboard stats
#[utoipa::path(
    get,
    path = "/api/v1/analytics/hospital",
    responses(
        (status = 200, description = "Hospital stats", body = ApiResponse<HospitalStats>),
        (status = 500, description = "Internal server error")
    ),
    tag = "analytics"
)]
pub async fn hospital_stats(
    State(server): State<CampusCareServer>,
) -> Result<Json<ApiResponse<HospitalStats>>, ApiError> {
    let day_start = start_of_day(Utc::now().naive_utc());

    let stats: HospitalStats = sqlx::query_as(
        r#"
        SELECT (SELECT COUNT(*) FROM prescriptions WHERE created_at >= $1)
                   AS total_patients_today,
               (SELECT COUNT(*) FROM prescriptions) AS total_prescriptions,
               (SELECT COUNT(*) FROM prescriptions WHERE status = $2)
                   AS pending_prescriptions,
               (SELECT COUNT(*) FROM lab_reports WHERE status = $3)
                   AS pending_lab_tests
        "#,
    )
    .bind(day_start)
    .bind(PrescriptionStatus::InitiatedByNurse.as_str())
    .bind(PrescriptionStatus::LabTestRequested.as_str())
    .fetch_one(&server.db_pool)
    .await?;

    Ok(Json(api_success(stats)))
}

/// Lab technician dashboard stats
#[utoipa::path(
    get,
    path = "/api/v1/analytics/lab",
    responses(
        (status = 200, description = "Lab stats", body = ApiResponse<LabStats>),
        (status = 500, description = "Internal server error")
    ),
    tag = "analytics"
)]
pub async fn lab_stats(
    State(server): State<CampusCareServer>,
) -> Result<Json<ApiResponse<LabStats>>, ApiError> {
    let now = Utc::now().naive_utc();
    let day_start = start_of_day(now);
    let cutoff = urgent_cutoff(now);

    let stats: LabStats = sqlx::query_as(
        r#"
        SELECT COUNT(*) FILTER (WHERE status = $1) AS pending_tests,
               COUNT(*) FILTER (WHERE status = $2 AND updated_at >= $3)
                   AS completed_today,
               COUNT(*) AS total_tests,
               COUNT(*) FILTER (WHERE status = $1 AND created_at <= $4)
                   AS urgent_tests
        FROM lab_reports
        "#,
    )
    .bind(PrescriptionStatus::LabTestRequested.as_str())
    .bind(PrescriptionStatus::LabTestCompleted.as_str())
    .bind(day_start)
    .bind(cutoff)
    .fetch_one(&server.db_pool)
    .await?;

    Ok(Json(api_success(stats)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .and_then(|d| d.and_hms_opt(h, m, 0))
            .unwrap()
    }

    #[test]
    fn day_starts_at_midnight() {
        assert_eq!(start_of_day(at(14, 30)).to_string(), "2024-03-05 00:00:00");
        assert_eq!(start_of_day(at(0, 0)), at(0, 0));
    }

    #[test]
    fn urgent_cutoff_is_a_full_day_back() {
        let cutoff = urgent_cutoff(at(10, 0));
        assert_eq!(cutoff.to_string(), "2024-03-04 10:00:00");
        // A request from two days ago is past the cutoff; one from this
        // morning is not.
        assert!(at(10, 0) - Duration::days(2) <= cutoff);
        assert!(at(8, 0) > cutoff);
    }
}

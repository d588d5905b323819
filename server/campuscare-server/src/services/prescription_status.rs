//! Prescription status recomputation
//!
//! Every mutation to a prescription's medicine lines or lab-report lines
//! goes through here before its transaction commits: re-read the
//! association rows, derive the canonical status, persist it. Running
//! inside the caller's transaction keeps a status read immediately after
//! a mutation consistent with that mutation.

use clinic_workflow::{derive_status, LabOutcome, MedicineIssuance, PrescriptionStatus};
use sqlx::{FromRow, Postgres, Transaction};
use tracing::debug;

use crate::error::ApiError;

#[derive(FromRow)]
struct MedicineFact {
    quantity_issued: Option<i32>,
}

impl MedicineIssuance for MedicineFact {
    fn quantity_issued(&self) -> Option<i32> {
        self.quantity_issued
    }
}

#[derive(FromRow)]
struct LabFact {
    result: Option<String>,
}

impl LabOutcome for LabFact {
    fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }
}

/// Assert the prescription exists inside the current transaction.
///
/// Mutating endpoints call this before touching any rows so a missing
/// prescription surfaces as NotFound with no partial state change.
pub async fn ensure_exists(
    tx: &mut Transaction<'_, Postgres>,
    prescription_id: i64,
) -> Result<(), ApiError> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM prescriptions WHERE id = $1")
        .bind(prescription_id)
        .fetch_optional(&mut **tx)
        .await?;
    if found.is_none() {
        return Err(ApiError::not_found("prescription"));
    }
    Ok(())
}

/// Recompute and persist the prescription's status from its current
/// association rows. Returns the derived status.
pub async fn recompute(
    tx: &mut Transaction<'_, Postgres>,
    prescription_id: i64,
) -> Result<PrescriptionStatus, ApiError> {
    ensure_exists(tx, prescription_id).await?;

    let medicine_lines: Vec<MedicineFact> = sqlx::query_as(
        "SELECT quantity_issued FROM prescription_medicines WHERE prescription_id = $1",
    )
    .bind(prescription_id)
    .fetch_all(&mut **tx)
    .await?;

    let lab_lines: Vec<LabFact> =
        sqlx::query_as("SELECT result FROM lab_reports WHERE prescription_id = $1")
            .bind(prescription_id)
            .fetch_all(&mut **tx)
            .await?;

    let status = derive_status(&medicine_lines, &lab_lines);

    sqlx::query("UPDATE prescriptions SET status = $1, updated_at = NOW() WHERE id = $2")
        .bind(status.as_str())
        .bind(prescription_id)
        .execute(&mut **tx)
        .await?;

    debug!(prescription_id, status = %status, "prescription status recomputed");
    Ok(status)
}

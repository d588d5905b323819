//! Centralized API route path constants
//!
//! Runtime route definitions use these constants; utoipa `#[path(...)]`
//! attributes require string literals, so the literals in handlers must
//! match these values exactly.

/// API base path
pub const API_V1: &str = "/api/v1";

/// Health check endpoints (mounted at the root, not under `/api/v1`)
pub mod health {
    pub const HEALTH: &str = "/health";
    pub const VERSION: &str = "/version";
}

/// Student registry endpoints
pub mod students {
    pub const STUDENTS: &str = "/students";
    pub const STUDENT_BY_ID: &str = "/students/:id";
}

/// Staff registry endpoints
pub mod staff {
    pub const STAFF_PROFILES: &str = "/staff-profiles";
    pub const BY_EMPLOYEE: &str = "/staff-profiles/by-employee/:employee_id";
    pub const STAFF_PROFILE_BY_ID: &str = "/staff-profiles/:id";
}

/// Medicine inventory endpoints
pub mod medicines {
    pub const MEDICINES: &str = "/medicines";
    pub const MEDICINE_BY_ID: &str = "/medicines/:id";
}

/// Prescription workflow endpoints
pub mod prescriptions {
    pub const PRESCRIPTIONS: &str = "/prescriptions";
    pub const PENDING: &str = "/prescriptions/pending";
    pub const BY_STUDENT: &str = "/prescriptions/student/:student_id";
    pub const PRESCRIPTION_BY_ID: &str = "/prescriptions/:id";
    pub const MEDICINE_LINES: &str = "/prescriptions/:id/medicines";
    pub const MEDICINE_LINE_BY_ID: &str = "/prescriptions/medicines/:line_id";
}

/// Lab report endpoints
pub mod lab_reports {
    pub const LAB_REPORTS: &str = "/lab-reports";
    pub const LAB_REPORT_BY_ID: &str = "/lab-reports/:id";
}

/// Analytics endpoints
pub mod analytics {
    pub const INVENTORY: &str = "/analytics/inventory";
    pub const HOSPITAL: &str = "/analytics/hospital";
    pub const LAB: &str = "/analytics/lab";
}

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::server::CampusCareServer;

/// Main OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health endpoints
        crate::handlers::health::health_check,
        crate::handlers::health::version_info,

        // Student endpoints
        crate::handlers::students::list_students,
        crate::handlers::students::get_student,
        crate::handlers::students::create_student,
        crate::handlers::students::update_student,
        crate::handlers::students::delete_student,

        // Staff endpoints
        crate::handlers::staff::list_staff_profiles,
        crate::handlers::staff::get_staff_profile,
        crate::handlers::staff::get_staff_profile_by_employee,
        crate::handlers::staff::create_staff_profile,
        crate::handlers::staff::update_staff_profile,
        crate::handlers::staff::delete_staff_profile,

        // Medicine endpoints
        crate::handlers::medicines::list_medicines,
        crate::handlers::medicines::get_medicine,
        crate::handlers::medicines::create_medicine,
        crate::handlers::medicines::update_medicine,
        crate::handlers::medicines::delete_medicine,

        // Prescription endpoints
        crate::handlers::prescriptions::list_prescriptions,
        crate::handlers::prescriptions::get_prescription,
        crate::handlers::prescriptions::list_pending_prescriptions,
        crate::handlers::prescriptions::list_prescriptions_by_student,
        crate::handlers::prescriptions::create_prescription,
        crate::handlers::prescriptions::update_prescription,
        crate::handlers::prescriptions::delete_prescription,
        crate::handlers::prescriptions::list_medicine_lines,
        crate::handlers::prescriptions::add_medicine_line,
        crate::handlers::prescriptions::update_medicine_line,
        crate::handlers::prescriptions::delete_medicine_line,

        // Lab report endpoints
        crate::handlers::lab_reports::list_lab_reports,
        crate::handlers::lab_reports::get_lab_report,
        crate::handlers::lab_reports::create_lab_report,
        crate::handlers::lab_reports::update_lab_report,
        crate::handlers::lab_reports::delete_lab_report,

        // Analytics endpoints
        crate::handlers::analytics::inventory_summary,
        crate::handlers::analytics::hospital_stats,
        crate::handlers::analytics::lab_stats,
    ),
    components(
        schemas(
            crate::handlers::health::HealthResponse,
            crate::handlers::health::VersionResponse,

            crate::handlers::students::Student,
            crate::handlers::students::CreateStudentRequest,
            crate::handlers::students::UpdateStudentRequest,

            crate::handlers::staff::StaffProfile,
            crate::handlers::staff::CreateStaffProfileRequest,
            crate::handlers::staff::UpdateStaffProfileRequest,

            crate::handlers::medicines::Medicine,
            crate::handlers::medicines::CreateMedicineRequest,
            crate::handlers::medicines::UpdateMedicineRequest,

            crate::handlers::prescriptions::Prescription,
            crate::handlers::prescriptions::PrescriptionView,
            crate::handlers::prescriptions::MedicineLineView,
            crate::handlers::prescriptions::LabLineView,
            crate::handlers::prescriptions::MedicineLineRequest,
            crate::handlers::prescriptions::CreatePrescriptionRequest,
            crate::handlers::prescriptions::UpdatePrescriptionRequest,
            crate::handlers::prescriptions::UpdateMedicineLineRequest,

            crate::handlers::lab_reports::LabReport,
            crate::handlers::lab_reports::CreateLabReportRequest,
            crate::handlers::lab_reports::UpdateLabReportRequest,

            crate::handlers::analytics::InventorySummary,
            crate::handlers::analytics::MostPrescribed,
            crate::handlers::analytics::HospitalStats,
            crate::handlers::analytics::LabStats,
        )
    ),
    tags(
        (name = "health", description = "System health and status endpoints"),
        (name = "students", description = "Student registry"),
        (name = "staff", description = "Staff profile registry"),
        (name = "medicines", description = "Medicine inventory"),
        (name = "prescriptions", description = "Prescription workflow: nurse, doctor, pharmacist"),
        (name = "lab-reports", description = "Lab test requests and results"),
        (name = "analytics", description = "Inventory analytics"),
    ),
    info(
        title = "CampusCare Engine API",
        version = "0.1.0",
        description = "Campus health-centre management API: student registry, medicine inventory, prescription workflow and lab reporting.",
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    ),
)]
pub struct ApiDoc;

/// Create OpenAPI documentation routes
pub fn create_docs_routes() -> Router<CampusCareServer> {
    Router::new().merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

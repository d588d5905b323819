use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::{
    handlers::{analytics, health, lab_reports, medicines, prescriptions, staff, students},
    openapi,
    server::CampusCareServer,
};

pub mod paths;

/// Create health check routes
pub fn health_routes() -> Router<CampusCareServer> {
    Router::new()
        .route(paths::health::HEALTH, get(health::health_check))
        .route(paths::health::VERSION, get(health::version_info))
}

/// Create student registry routes
pub fn student_routes() -> Router<CampusCareServer> {
    Router::new()
        .route(paths::students::STUDENTS, get(students::list_students))
        .route(paths::students::STUDENTS, post(students::create_student))
        .route(paths::students::STUDENT_BY_ID, get(students::get_student))
        .route(paths::students::STUDENT_BY_ID, put(students::update_student))
        .route(paths::students::STUDENT_BY_ID, delete(students::delete_student))
}

/// Create staff registry routes
pub fn staff_routes() -> Router<CampusCareServer> {
    Router::new()
        .route(paths::staff::STAFF_PROFILES, get(staff::list_staff_profiles))
        .route(paths::staff::STAFF_PROFILES, post(staff::create_staff_profile))
        .route(paths::staff::BY_EMPLOYEE, get(staff::get_staff_profile_by_employee))
        .route(paths::staff::STAFF_PROFILE_BY_ID, get(staff::get_staff_profile))
        .route(paths::staff::STAFF_PROFILE_BY_ID, put(staff::update_staff_profile))
        .route(paths::staff::STAFF_PROFILE_BY_ID, delete(staff::delete_staff_profile))
}

/// Create medicine inventory routes
pub fn medicine_routes() -> Router<CampusCareServer> {
    Router::new()
        .route(paths::medicines::MEDICINES, get(medicines::list_medicines))
        .route(paths::medicines::MEDICINES, post(medicines::create_medicine))
        .route(paths::medicines::MEDICINE_BY_ID, get(medicines::get_medicine))
        .route(paths::medicines::MEDICINE_BY_ID, put(medicines::update_medicine))
        .route(paths::medicines::MEDICINE_BY_ID, delete(medicines::delete_medicine))
}

/// Create prescription workflow routes
pub fn prescription_routes() -> Router<CampusCareServer> {
    Router::new()
        .route(paths::prescriptions::PRESCRIPTIONS, get(prescriptions::list_prescriptions))
        .route(paths::prescriptions::PRESCRIPTIONS, post(prescriptions::create_prescription))
        .route(paths::prescriptions::PENDING, get(prescriptions::list_pending_prescriptions))
        .route(paths::prescriptions::BY_STUDENT, get(prescriptions::list_prescriptions_by_student))
        .route(paths::prescriptions::PRESCRIPTION_BY_ID, get(prescriptions::get_prescription))
        .route(paths::prescriptions::PRESCRIPTION_BY_ID, put(prescriptions::update_prescription))
        .route(paths::prescriptions::PRESCRIPTION_BY_ID, delete(prescriptions::delete_prescription))
        // Medicine lines on a prescription
        .route(paths::prescriptions::MEDICINE_LINES, get(prescriptions::list_medicine_lines))
        .route(paths::prescriptions::MEDICINE_LINES, post(prescriptions::add_medicine_line))
        .route(paths::prescriptions::MEDICINE_LINE_BY_ID, put(prescriptions::update_medicine_line))
        .route(paths::prescriptions::MEDICINE_LINE_BY_ID, delete(prescriptions::delete_medicine_line))
}

/// Create lab report routes
pub fn lab_report_routes() -> Router<CampusCareServer> {
    Router::new()
        .route(paths::lab_reports::LAB_REPORTS, get(lab_reports::list_lab_reports))
        .route(paths::lab_reports::LAB_REPORTS, post(lab_reports::create_lab_report))
        .route(paths::lab_reports::LAB_REPORT_BY_ID, get(lab_reports::get_lab_report))
        .route(paths::lab_reports::LAB_REPORT_BY_ID, put(lab_reports::update_lab_report))
        .route(paths::lab_reports::LAB_REPORT_BY_ID, delete(lab_reports::delete_lab_report))
}

/// Create analytics routes
pub fn analytics_routes() -> Router<CampusCareServer> {
    Router::new()
        .route(paths::analytics::INVENTORY, get(analytics::inventory_summary))
        .route(paths::analytics::HOSPITAL, get(analytics::hospital_stats))
        .route(paths::analytics::LAB, get(analytics::lab_stats))
}

/// Create API v1 routes
fn api_v1_routes() -> Router<CampusCareServer> {
    Router::new()
        .merge(student_routes())
        .merge(staff_routes())
        .merge(medicine_routes())
        .merge(prescription_routes())
        .merge(lab_report_routes())
        .merge(analytics_routes())
}

/// Create all application routes
pub fn create_routes() -> Router<CampusCareServer> {
    Router::new()
        // Health check routes at the root
        .merge(health_routes())
        // API documentation routes
        .merge(openapi::create_docs_routes())
        // Versioned API
        .nest(paths::API_V1, api_v1_routes())
}

pub mod analytics;
pub mod health;
pub mod lab_reports;
pub mod medicines;
pub mod prescriptions;
pub mod staff;
pub mod students;

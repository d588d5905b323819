pub mod prescription_status;

//! Request validation utilities for consistent validation across handlers
//!
//! Provides a `RequestValidation` trait and helper macros so create/update
//! payloads are checked the same way everywhere.

use crate::error::ApiError;

/// Trait for validating request payloads
///
/// Implement this for all create/update request types and call
/// `req.validate()?` at the top of the handler.
pub trait RequestValidation {
    /// Validates the request and returns an error if validation fails
    fn validate(&self) -> Result<(), ApiError>;
}

/// Macro for validating fields with custom predicates
#[macro_export]
macro_rules! validate_field {
    ($field:expr, $predicate:expr, $message:expr) => {
        if !$predicate {
            return Err($crate::error::ApiError::validation($message));
        }
    };
}

/// Macro for validating required fields (non-empty strings)
#[macro_export]
macro_rules! validate_required {
    ($field:expr, $message:expr) => {
        validate_field!($field, !$field.trim().is_empty(), $message);
    };
}

/// Macro for validating string length
#[macro_export]
macro_rules! validate_length {
    ($field:expr, $min:expr, $max:expr, $message:expr) => {
        let len = $field.len();
        validate_field!($field, len >= $min && len <= $max, $message);
    };
}

/// Macro for validating email format (basic check)
#[macro_export]
macro_rules! validate_email {
    ($field:expr, $message:expr) => {
        validate_field!($field, $field.contains('@') && $field.contains('.'), $message);
    };
}

/// Macro for validating numeric ranges
#[macro_export]
macro_rules! validate_range {
    ($field:expr, $min:expr, $max:expr, $message:expr) => {
        validate_field!($field, $field >= $min && $field <= $max, $message);
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;

    struct TestRequest {
        name: String,
        email: String,
        quantity: i32,
    }

    impl RequestValidation for TestRequest {
        fn validate(&self) -> Result<(), ApiError> {
            validate_required!(self.name, "Name is required");
            validate_length!(self.name, 2, 100, "Name must be between 2 and 100 characters");
            validate_email!(self.email, "Invalid email format");
            validate_range!(self.quantity, 1, 1000, "Quantity must be between 1 and 1000");
            Ok(())
        }
    }

    #[test]
    fn valid_request_passes() {
        let request = TestRequest {
            name: "Paracetamol".to_string(),
            email: "nurse@campus.edu".to_string(),
            quantity: 10,
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn empty_name_fails() {
        let request = TestRequest {
            name: "  ".to_string(),
            email: "nurse@campus.edu".to_string(),
            quantity: 10,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn zero_quantity_fails() {
        let request = TestRequest {
            name: "Paracetamol".to_string(),
            email: "nurse@campus.edu".to_string(),
            quantity: 0,
        };
        assert!(request.validate().is_err());
    }
}

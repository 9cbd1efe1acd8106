//! Unit tests for domain error types

use crate::errors::{DomainError, ValidationError};

#[test]
fn test_validation_error_messages() {
    let error = ValidationError::required("consumer_id");
    assert_eq!(error.to_string(), "Field required: consumer_id");

    let error = ValidationError::malformed_token("missing delimiter");
    assert!(error.to_string().contains("missing delimiter"));
}

#[test]
fn test_validation_error_bridges_into_domain_error() {
    let error: DomainError = ValidationError::required("auth_type").into();
    assert!(error.is_validation());
    assert_eq!(error.error_code(), "VALIDATION_ERROR");
    // Transparent bridge keeps the inner message
    assert_eq!(error.to_string(), "Field required: auth_type");
}

#[test]
fn test_error_codes() {
    let storage = DomainError::Storage { message: "connection refused".to_string() };
    assert!(storage.is_storage());
    assert_eq!(storage.error_code(), "STORAGE_ERROR");

    let decode = DomainError::Decode { message: "tag mismatch".to_string() };
    assert!(decode.is_decode());
    assert!(!decode.is_validation());
    assert_eq!(decode.error_code(), "DECODE_ERROR");

    let encode = DomainError::Encode { message: "no key".to_string() };
    assert_eq!(encode.error_code(), "ENCODE_ERROR");
    assert_eq!(encode.to_string(), "Encode error: no key");
}

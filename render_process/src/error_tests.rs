//! Unit tests for error.rs
//!
//! Tests all Error variants and their implementations (Display, Debug, Clone, std::error::Error).

use crate::error::{Error, Result, UnsatisfiableDependencyError};
use crate::ids::StepId;

// ============================================================================
// ERROR DISPLAY TESTS
// ============================================================================

#[test]
fn test_backend_error_display() {
    let err = Error::BackendError("vkCreateImage failed".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Backend error"));
    assert!(display.contains("vkCreateImage failed"));
}

#[test]
fn test_out_of_memory_display() {
    let err = Error::OutOfMemory;
    assert_eq!(format!("{}", err), "Out of GPU memory");
}

#[test]
fn test_invalid_resource_display() {
    let err = Error::InvalidResource("external image count".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Invalid resource"));
    assert!(display.contains("external image count"));
}

#[test]
fn test_initialization_failed_display() {
    let err = Error::InitializationFailed("already set up".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Initialization failed"));
    assert!(display.contains("already set up"));
}

// ============================================================================
// UNSATISFIABLE DEPENDENCY TESTS
// ============================================================================

#[test]
fn test_unsatisfiable_dependency_chain_accessor() {
    let chain = vec![StepId::from_index(0), StepId::from_index(2)];
    let err = UnsatisfiableDependencyError::new(chain.clone());
    assert_eq!(err.dependency_chain(), chain.as_slice());
}

#[test]
fn test_unsatisfiable_dependency_display_closes_loop() {
    let err = UnsatisfiableDependencyError::new(vec![
        StepId::from_index(0),
        StepId::from_index(1),
        StepId::from_index(2),
    ]);
    let display = format!("{}", err);
    assert!(display.contains("Unsatisfiable dependency chain"));
    assert!(display.ends_with("step#1 -> step#2 -> step#3 -> step#1"));
}

#[test]
fn test_unsatisfiable_dependency_into_error() {
    let err: Error = UnsatisfiableDependencyError::new(vec![StepId::from_index(4)]).into();
    match &err {
        Error::UnsatisfiableDependency(inner) => {
            assert_eq!(inner.dependency_chain(), &[StepId::from_index(4)]);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(std::error::Error::source(&err).is_some());
}

// ============================================================================
// TRAIT TESTS
// ============================================================================

#[test]
fn test_error_clone() {
    let err1 = Error::BackendError("test".to_string());
    let err2 = err1.clone();
    assert_eq!(format!("{}", err1), format!("{}", err2));
}

#[test]
fn test_error_is_std_error() {
    fn takes_std_error(_: &dyn std::error::Error) {}
    takes_std_error(&Error::OutOfMemory);
}

#[test]
fn test_result_alias() {
    fn failing() -> Result<u32> {
        Err(Error::OutOfMemory)
    }
    assert!(failing().is_err());
}

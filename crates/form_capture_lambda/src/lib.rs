//! AWS-oriented adapters and handlers for form submission capture.
//!
//! This crate owns runtime integration details (the Lambda handler, process
//! configuration, and storage adapters). Field extraction and record
//! assembly live in `form_capture_core`.

pub mod adapters;
pub mod config;
pub mod handlers;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_support;

//! Domain primitives for capturing form submissions.
//!
//! This crate owns request/response contracts, form decoding, and output
//! record assembly. It intentionally excludes AWS SDK and Lambda runtime
//! concerns, which live in `form_capture_lambda`.

pub mod contract;
pub mod fields;
pub mod form;
pub mod media_type;

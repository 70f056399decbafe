//! Input validation for request payloads.
//!
//! Reusable rules live in [`rules`]; payload structs opt in through the
//! `validator` derive.

pub mod rules;

pub use validator::Validate;

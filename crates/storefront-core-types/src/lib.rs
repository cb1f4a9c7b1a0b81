//! Core types shared across storefront facilities
//!
//! This crate provides foundational types used by both the error handling
//! and logging facilities:
//!
//! - **Correlation types**: SessionId for tagging every statement a session issues
//! - **Sensitive data**: Sensitive<T> marker for card data redaction
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;
pub mod sensitive;

pub use correlation::SessionId;
pub use sensitive::Sensitive;

//! Storefront Core - domain model and shared facilities
//!
//! This crate provides the pieces of the storefront that do not touch the
//! database:
//! - Entity models (Customer, Order, Product, ...) and their shared handles
//! - The error facility (`ExError`) and domain error enum (`StorefrontError`)
//! - The structured logging facility and its macros
//! - Validation rules (quantity range guard, address type-set replacement)
//! - The `Describe` capability used to render entities for display
//!
//! Persistence, hydration and the identity cache live in `storefront-store`.

pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod render;
pub mod rules;

// Macros expand to `$crate::types::schema::...`
pub use storefront_core_types as types;

// Re-export commonly used types
pub use errors::{ExError, ExErrorKind, Result, StorefrontError};
pub use model::{Entity, EntityKind, Handle};
pub use render::{Describe, Detail, Summary};

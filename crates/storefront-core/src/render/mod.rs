//! Display capability for entities
//!
//! Presentation layers render entities through [`Describe`] instead of
//! reaching into fields, so the core stays independent of any console or
//! report format.

pub mod describe;

pub use describe::{Describe, Detail, Summary};

//! Storefront Store - SQLite persistence, hydration and identity caches
//!
//! Provides:
//! - SQLite schema with migrations framework
//! - Buffered result cursors and parent/child row hydration
//! - Per-kind identity caches so each stored entity has one live instance
//! - Sessions with savepoint regions that roll back store and caches together
//! - One repository per entity kind, plus catalogue-wide inventory queries

pub mod cache;
pub mod cursor;
pub mod db;
pub mod errors;
pub mod hydration;
pub mod migrations;
pub mod repo;
pub mod session;

// Re-export key types
pub use cache::{Cached, IdentityCache, IdentityMap};
pub use cursor::{ResultCursor, Row};
pub use db::{Database, DbConfig, DbLocation};
pub use errors::Result;
pub use repo::Repository;
pub use session::{Session, Storefront};

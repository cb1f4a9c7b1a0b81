//! Shared entity handle
//!
//! A `Handle<T>` is the single live instance of an entity. Cloning a handle
//! clones the pointer, never the entity, so every holder observes every
//! write-through update.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::Entity;

/// Reference-counted, lock-guarded entity instance
pub struct Handle<T>(Arc<RwLock<T>>);

impl<T> Handle<T> {
    /// Wrap a freshly hydrated entity
    pub fn new(value: T) -> Self {
        Self(Arc::new(RwLock::new(value)))
    }

    /// Read the current state
    ///
    /// A poisoned lock is recovered: a panic while holding the write guard
    /// can only have happened after the store write already succeeded.
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mutate the in-memory state
    ///
    /// The store crate calls this only after the matching row write has
    /// succeeded. Mutating through it directly skips the backing store.
    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// True if both handles point at the same instance
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Number of live holders of this instance (cache included)
    pub fn holders(&self) -> usize {
        Arc::strong_count(&self.0)
    }
}

impl<T: Entity> Handle<T> {
    /// Primary key of the referenced entity
    pub fn id(&self) -> T::Id {
        self.read().id()
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

/// Handles are equal when they reference the same entity id
impl<T: Entity> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.id() == other.id()
    }
}

impl<T: Entity> Eq for Handle<T> {}

impl<T: fmt::Debug> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_read() {
            Ok(guard) => guard.fmt(f),
            Err(_) => f.write_str("Handle(<locked>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ProductType, ProductTypeId};

    fn tag(id: i64, name: &str) -> ProductType {
        ProductType {
            id: ProductTypeId::new(id),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_clone_shares_instance() {
        let a = Handle::new(tag(1, "toys"));
        let b = a.clone();
        assert!(a.ptr_eq(&b));

        b.write().name = "games".to_string();
        assert_eq!(a.read().name, "games");
        assert_eq!(a.holders(), 2);
    }

    #[test]
    fn test_equality_is_by_id() {
        let a = Handle::new(tag(1, "toys"));
        let b = Handle::new(tag(1, "toys"));
        let c = Handle::new(tag(2, "toys"));
        assert_eq!(a, b);
        assert!(!a.ptr_eq(&b));
        assert_ne!(a, c);
    }

    #[test]
    fn test_debug_while_write_locked() {
        let a = Handle::new(tag(1, "toys"));
        let guard = a.write();
        assert_eq!(format!("{:?}", a), "Handle(<locked>)");
        drop(guard);
        assert!(format!("{:?}", a).contains("toys"));
    }
}

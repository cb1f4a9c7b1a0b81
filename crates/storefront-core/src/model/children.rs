//! Owned child collections
//!
//! Order-preserving list of child handles that never holds two entries with
//! the same id.

use super::{Entity, Handle};

/// De-duplicated, insertion-ordered collection of child handles
#[derive(Debug)]
pub struct Children<T: Entity> {
    items: Vec<Handle<T>>,
}

impl<T: Entity> Children<T> {
    /// Empty collection
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build from handles, keeping the first occurrence of each id
    pub fn from_handles(handles: impl IntoIterator<Item = Handle<T>>) -> Self {
        let mut children = Self::new();
        for handle in handles {
            children.push_unique(handle);
        }
        children
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Handle<T>> {
        self.items.iter()
    }

    /// Ids in collection order
    pub fn ids(&self) -> Vec<T::Id> {
        self.items.iter().map(Handle::id).collect()
    }

    pub fn contains(&self, id: T::Id) -> bool {
        self.items.iter().any(|h| h.id() == id)
    }

    pub fn get(&self, id: T::Id) -> Option<&Handle<T>> {
        self.items.iter().find(|h| h.id() == id)
    }

    pub fn first(&self) -> Option<&Handle<T>> {
        self.items.first()
    }

    pub fn last(&self) -> Option<&Handle<T>> {
        self.items.last()
    }

    /// First child matching a predicate on its state
    pub fn find(&self, mut predicate: impl FnMut(&T) -> bool) -> Option<&Handle<T>> {
        self.items.iter().find(|h| predicate(&h.read()))
    }

    /// Append unless a child with the same id is already held
    ///
    /// Returns whether the handle was added.
    pub fn push_unique(&mut self, handle: Handle<T>) -> bool {
        if self.contains(handle.id()) {
            return false;
        }
        self.items.push(handle);
        true
    }

    /// Remove the child with the given id, returning it
    pub fn remove(&mut self, id: T::Id) -> Option<Handle<T>> {
        let index = self.items.iter().position(|h| h.id() == id)?;
        Some(self.items.remove(index))
    }

    /// Drop every child, returning them in collection order
    pub fn take_all(&mut self) -> Vec<Handle<T>> {
        std::mem::take(&mut self.items)
    }

    /// Copy of the handle list (shares instances)
    pub fn to_vec(&self) -> Vec<Handle<T>> {
        self.items.clone()
    }
}

impl<T: Entity> Default for Children<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> Clone for Children<T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ProductType, ProductTypeId};

    fn tag(id: i64) -> Handle<ProductType> {
        Handle::new(ProductType {
            id: ProductTypeId::new(id),
            name: format!("tag-{}", id),
        })
    }

    #[test]
    fn test_push_unique_rejects_duplicate_ids() {
        let mut children = Children::new();
        assert!(children.push_unique(tag(1)));
        assert!(children.push_unique(tag(2)));
        assert!(!children.push_unique(tag(1)));
        assert_eq!(children.ids(), vec![ProductTypeId::new(1), ProductTypeId::new(2)]);
    }

    #[test]
    fn test_from_handles_keeps_first_seen_order() {
        let children = Children::from_handles([tag(3), tag(1), tag(3), tag(2), tag(1)]);
        assert_eq!(
            children.ids(),
            vec![
                ProductTypeId::new(3),
                ProductTypeId::new(1),
                ProductTypeId::new(2)
            ]
        );
    }

    #[test]
    fn test_remove_and_take_all() {
        let mut children = Children::from_handles([tag(1), tag(2), tag(3)]);
        let removed = children.remove(ProductTypeId::new(2));
        assert_eq!(removed.map(|h| h.id()), Some(ProductTypeId::new(2)));
        assert!(children.remove(ProductTypeId::new(9)).is_none());

        let all = children.take_all();
        assert_eq!(all.len(), 2);
        assert!(children.is_empty());
    }

    #[test]
    fn test_find_by_state() {
        let children = Children::from_handles([tag(1), tag(2)]);
        let found = children.find(|t| t.name == "tag-2");
        assert_eq!(found.map(|h| h.id()), Some(ProductTypeId::new(2)));
    }
}

//! Identity cache
//!
//! At most one live [`Handle`] per (entity kind, id). Entries are never
//! evicted; a delete removes its entry explicitly.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use storefront_core::model::{
    Address, Customer, Distributor, Entity, Handle, Order, OrderItem, PaymentInfo, Product,
    ProductType, Wishlist, WishlistItem,
};

/// Map from id to the canonical instance of one entity kind
#[derive(Debug)]
pub struct IdentityCache<T: Entity> {
    entries: RwLock<HashMap<T::Id, Handle<T>>>,
}

impl<T: Entity> IdentityCache<T> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, id: T::Id) -> Option<Handle<T>> {
        self.read().get(&id).cloned()
    }

    /// Insert if absent and return the canonical instance
    ///
    /// When an entry for the id already exists, it wins and `handle` is
    /// dropped, so two racing hydrations still converge on one instance.
    pub fn put(&self, handle: Handle<T>) -> Handle<T> {
        let id = handle.id();
        self.write().entry(id).or_insert(handle).clone()
    }

    pub fn remove(&self, id: T::Id) -> Option<Handle<T>> {
        self.write().remove(&id)
    }

    /// Remove the entry only when the cache holds the sole reference
    pub fn remove_unshared(&self, id: T::Id) -> bool {
        let mut entries = self.write();
        let unshared = entries.get(&id).is_some_and(|h| h.holders() == 1);
        if unshared {
            entries.remove(&id);
        }
        unshared
    }

    pub fn contains(&self, id: T::Id) -> bool {
        self.read().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn clear(&self) {
        self.write().clear();
    }

    /// Snapshot of every cached instance, ordered by id
    pub fn handles(&self) -> Vec<Handle<T>> {
        let guard = self.read();
        let mut ids: Vec<&T::Id> = guard.keys().collect();
        ids.sort();
        ids.into_iter().filter_map(|id| guard.get(id).cloned()).collect()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<T::Id, Handle<T>>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<T::Id, Handle<T>>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Entity> Default for IdentityCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// One identity cache per entity kind
#[derive(Debug, Default)]
pub struct IdentityMap {
    pub addresses: IdentityCache<Address>,
    pub customers: IdentityCache<Customer>,
    pub distributors: IdentityCache<Distributor>,
    pub orders: IdentityCache<Order>,
    pub order_items: IdentityCache<OrderItem>,
    pub payments: IdentityCache<PaymentInfo>,
    pub products: IdentityCache<Product>,
    pub product_types: IdentityCache<ProductType>,
    pub wishlists: IdentityCache<Wishlist>,
    pub wishlist_items: IdentityCache<WishlistItem>,
}

impl IdentityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache for entity type `T`
    pub fn of<T: Cached>(&self) -> &IdentityCache<T> {
        T::cache(self)
    }

    /// Total number of cached instances across all kinds
    pub fn total_len(&self) -> usize {
        self.addresses.len()
            + self.customers.len()
            + self.distributors.len()
            + self.orders.len()
            + self.order_items.len()
            + self.payments.len()
            + self.products.len()
            + self.product_types.len()
            + self.wishlists.len()
            + self.wishlist_items.len()
    }

    pub fn clear_all(&self) {
        self.addresses.clear();
        self.customers.clear();
        self.distributors.clear();
        self.orders.clear();
        self.order_items.clear();
        self.payments.clear();
        self.products.clear();
        self.product_types.clear();
        self.wishlists.clear();
        self.wishlist_items.clear();
    }
}

/// Entities with a slot in the [`IdentityMap`]
pub trait Cached: Entity + Clone {
    fn cache(map: &IdentityMap) -> &IdentityCache<Self>;
}

macro_rules! cached {
    ($($ty:ty => $field:ident),* $(,)?) => {
        $(
            impl Cached for $ty {
                fn cache(map: &IdentityMap) -> &IdentityCache<Self> {
                    &map.$field
                }
            }
        )*
    };
}

cached! {
    Address => addresses,
    Customer => customers,
    Distributor => distributors,
    Order => orders,
    OrderItem => order_items,
    PaymentInfo => payments,
    Product => products,
    ProductType => product_types,
    Wishlist => wishlists,
    WishlistItem => wishlist_items,
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::model::ProductTypeId;

    fn tag(id: i64, name: &str) -> Handle<ProductType> {
        Handle::new(ProductType {
            id: ProductTypeId::new(id),
            name: name.to_string(),
        })
    }

    #[test]
    fn test_put_keeps_first_instance() {
        let cache = IdentityCache::new();
        let first = cache.put(tag(1, "toys"));
        let second = cache.put(tag(1, "games"));
        assert!(first.ptr_eq(&second));
        assert_eq!(second.read().name, "toys");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_get_and_remove() {
        let cache = IdentityCache::new();
        assert!(cache.get(ProductTypeId::new(1)).is_none());
        let h = cache.put(tag(1, "toys"));
        assert!(cache.get(ProductTypeId::new(1)).unwrap().ptr_eq(&h));
        assert!(cache.remove(ProductTypeId::new(1)).is_some());
        assert!(!cache.contains(ProductTypeId::new(1)));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_remove_unshared_keeps_held_entries() {
        let cache = IdentityCache::new();
        let held = cache.put(tag(1, "toys"));
        assert!(!cache.remove_unshared(ProductTypeId::new(1)));
        assert!(cache.get(ProductTypeId::new(1)).unwrap().ptr_eq(&held));

        drop(held);
        assert!(cache.remove_unshared(ProductTypeId::new(1)));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_handles_sorted_by_id() {
        let cache = IdentityCache::new();
        cache.put(tag(3, "c"));
        cache.put(tag(1, "a"));
        cache.put(tag(2, "b"));
        let ids: Vec<i64> = cache.handles().iter().map(|h| h.id().as_i64()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_map_routes_by_type() {
        let map = IdentityMap::new();
        map.of::<ProductType>().put(tag(1, "toys"));
        assert_eq!(map.product_types.len(), 1);
        assert_eq!(map.total_len(), 1);
        map.clear_all();
        assert_eq!(map.total_len(), 0);
    }
}

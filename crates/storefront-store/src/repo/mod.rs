//! Per-kind repositories
//!
//! Each repository borrows a [`Session`] and exposes the operations of one
//! entity kind: `from_id`, `create`, `list_all`, setters and `delete`, plus
//! the owner/owned collection operations. Writes go to the store first and
//! are mirrored into the cached instance only after they succeed.

pub mod address;
pub mod customer;
pub mod distributor;
pub mod inventory;
pub mod order;
pub mod order_item;
pub mod payment;
pub mod product;
pub mod product_type;
pub mod wishlist;
pub mod wishlist_item;

pub use address::Addresses;
pub use customer::Customers;
pub use distributor::Distributors;
pub use inventory::{DemandCount, Inventory};
pub use order::Orders;
pub use order_item::OrderItems;
pub use payment::Payments;
pub use product::Products;
pub use product_type::ProductTypes;
pub use wishlist::Wishlists;
pub use wishlist_item::WishlistItems;

use storefront_core::errors::Result;
use storefront_core::model::{Entity, Handle};
use storefront_core::render::Describe;

use crate::cache::Cached;
use crate::session::Session;

/// Operations every entity kind supports
pub trait Repository {
    type Entity: Cached + Describe;

    /// Cached instance, or hydrate it from the store
    ///
    /// # Errors
    /// * `NotFound` - no row with this id
    /// * `DataAccess` - the store failed
    fn from_id(&self, id: <Self::Entity as Entity>::Id) -> Result<Handle<Self::Entity>>;

    /// Every entity of this kind, ordered by id
    ///
    /// # Errors
    /// * `DataAccess` - the store failed
    fn list_all(&self) -> Result<Vec<Handle<Self::Entity>>>;

    /// Delete with cascade into owned children, then evict from the cache
    ///
    /// # Errors
    /// * `NotFound` - no row with this id
    /// * `ConstraintViolation` - the row is still referenced
    fn delete(&self, id: <Self::Entity as Entity>::Id) -> Result<()>;
}

impl<'s> Session<'s> {
    pub fn addresses(&self) -> Addresses<'_, 's> {
        Addresses::new(self)
    }

    pub fn customers(&self) -> Customers<'_, 's> {
        Customers::new(self)
    }

    pub fn distributors(&self) -> Distributors<'_, 's> {
        Distributors::new(self)
    }

    pub fn orders(&self) -> Orders<'_, 's> {
        Orders::new(self)
    }

    pub fn order_items(&self) -> OrderItems<'_, 's> {
        OrderItems::new(self)
    }

    pub fn payments(&self) -> Payments<'_, 's> {
        Payments::new(self)
    }

    pub fn products(&self) -> Products<'_, 's> {
        Products::new(self)
    }

    pub fn product_types(&self) -> ProductTypes<'_, 's> {
        ProductTypes::new(self)
    }

    pub fn wishlists(&self) -> Wishlists<'_, 's> {
        Wishlists::new(self)
    }

    pub fn wishlist_items(&self) -> WishlistItems<'_, 's> {
        WishlistItems::new(self)
    }

    pub fn inventory(&self) -> Inventory<'_, 's> {
        Inventory::new(self)
    }
}

/// Resolve a list of raw ids through `from_id`
fn resolve_all<T, F>(ids: Vec<i64>, from_id: F) -> Result<Vec<Handle<T>>>
where
    T: Entity,
    T::Id: From<i64>,
    F: Fn(T::Id) -> Result<Handle<T>>,
{
    ids.into_iter().map(|id| from_id(T::Id::from(id))).collect()
}

/// Generates a column setter that writes through and then updates the
/// cached instance
macro_rules! setter {
    ($(#[$doc:meta])* $name:ident, $op:literal, $id:ty, $value:ty, $sql:literal, |$entity:ident, $v:ident| $apply:expr) => {
        $(#[$doc])*
        ///
        /// # Errors
        /// * `ConstraintViolation` - the row does not exist or the value
        ///   breaks a store constraint
        pub fn $name(&self, id: $id, value: $value) -> Result<()> {
            self.s.instrumented($op, || {
                self.s.execute_one(
                    Self::TABLE,
                    $sql,
                    rusqlite::params![value, id.as_i64()],
                )?;
                self.s.modify_cached::<<Self as Repository>::Entity>(id, |$entity| {
                    let $v = value;
                    $apply;
                });
                Ok(())
            })
        }
    };
}

pub(crate) use setter;

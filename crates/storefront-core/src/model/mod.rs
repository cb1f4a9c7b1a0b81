//! Domain model
//!
//! Entities are plain structs. The store hands them out wrapped in a
//! [`Handle`], the one shared instance per (kind, id) that every holder
//! observes. Owned child collections are [`Children`] lists of handles.

pub mod address;
pub mod children;
pub mod customer;
pub mod distributor;
pub mod handle;
pub mod ids;
pub mod order;
pub mod payment;
pub mod product;
pub mod wishlist;

pub use address::{Address, AddressType, NewAddress};
pub use children::Children;
pub use customer::{Customer, NewCustomer};
pub use distributor::Distributor;
pub use handle::Handle;
pub use ids::{
    AddressId, CustomerId, DistributorId, OrderId, OrderItemId, PaymentId, ProductId,
    ProductTypeId, WishlistId, WishlistItemId,
};
pub use order::{NewOrder, Order, OrderItem, OrderStatus};
pub use payment::{NewPayment, PaymentInfo};
pub use product::{NewProduct, PriceChange, Product, ProductType};
pub use wishlist::{Wishlist, WishlistItem};

use std::fmt;
use std::hash::Hash;

/// Named category of business object with its own identity space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Address,
    Customer,
    Distributor,
    Order,
    OrderItem,
    PaymentInfo,
    Product,
    ProductType,
    Wishlist,
    WishlistItem,
}

impl EntityKind {
    /// Stable snake_case name used in errors and log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Address => "address",
            EntityKind::Customer => "customer",
            EntityKind::Distributor => "distributor",
            EntityKind::Order => "order",
            EntityKind::OrderItem => "order_item",
            EntityKind::PaymentInfo => "payment_info",
            EntityKind::Product => "product",
            EntityKind::ProductType => "product_type",
            EntityKind::Wishlist => "wishlist",
            EntityKind::WishlistItem => "wishlist_item",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An identifiable entity kept unique per id by the identity cache
pub trait Entity: fmt::Debug + Send + Sync + 'static {
    /// Typed primary key
    type Id: Copy + Eq + Hash + Ord + fmt::Debug + fmt::Display + Send + Sync + 'static;

    /// Kind tag for errors and logging
    const KIND: EntityKind;

    /// Primary key of this instance
    fn id(&self) -> Self::Id;
}

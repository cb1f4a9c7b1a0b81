use super::{Children, CustomerId, Entity, EntityKind, ProductId, WishlistId, WishlistItemId};

/// Named list of wished-for products; owns its items
#[derive(Debug, Clone)]
pub struct Wishlist {
    pub id: WishlistId,
    pub customer_id: CustomerId,
    pub name: String,
    pub items: Children<WishlistItem>,
}

impl Entity for Wishlist {
    type Id = WishlistId;
    const KIND: EntityKind = EntityKind::Wishlist;

    fn id(&self) -> WishlistId {
        self.id
    }
}

/// A wished-for quantity of one product
#[derive(Debug, Clone, PartialEq)]
pub struct WishlistItem {
    pub id: WishlistItemId,
    pub wishlist_id: WishlistId,
    pub product_id: ProductId,
    pub quantity: i64,
}

impl Entity for WishlistItem {
    type Id = WishlistItemId;
    const KIND: EntityKind = EntityKind::WishlistItem;

    fn id(&self) -> WishlistItemId {
        self.id
    }
}

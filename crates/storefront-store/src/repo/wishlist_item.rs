//! Wishlist item repository

use rusqlite::params;
use storefront_core::errors::Result;
use storefront_core::model::{
    Entity, Handle, ProductId, Wishlist, WishlistId, WishlistItem, WishlistItemId,
};
use storefront_core::rules::check_quantity;

use super::{resolve_all, Repository};
use crate::session::Session;

pub struct WishlistItems<'a, 's> {
    s: &'a Session<'s>,
}

impl<'a, 's> WishlistItems<'a, 's> {
    const TABLE: &'static str = "wishlist_items";

    pub(crate) fn new(s: &'a Session<'s>) -> Self {
        Self { s }
    }

    /// # Errors
    /// * `NotFound` - no item with this id
    pub fn from_id(&self, id: WishlistItemId) -> Result<Handle<WishlistItem>> {
        self.s.fetch(id, || {
            let cursor = self.s.query(
                "SELECT wishlist_item_id, wishlist_id, product_id, quantity
                 FROM wishlist_items WHERE wishlist_item_id = ?1",
                [id.as_i64()],
            )?;
            let row = cursor.require_first(WishlistItem::KIND, id.as_i64())?;
            Ok(WishlistItem {
                id: WishlistItemId::new(row.int("wishlist_item_id")?),
                wishlist_id: WishlistId::new(row.int("wishlist_id")?),
                product_id: ProductId::new(row.int("product_id")?),
                quantity: row.int("quantity")?,
            })
        })
    }

    /// Wish for `quantity` of a product; a cached wishlist gains the item
    ///
    /// # Errors
    /// * `InvalidArgument` - out of stock or outside `[0, available]`
    /// * `NotFound` - unknown product
    /// * `ConstraintViolation` - unknown wishlist
    pub fn create(
        &self,
        wishlist_id: WishlistId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<Handle<WishlistItem>> {
        let available = self.s.products().from_id(product_id)?.read().quantity;
        check_quantity(product_id.as_i64(), quantity, available)?;

        self.s.instrumented("create_wishlist_item", || {
            let id = self.s.insert(
                "INSERT INTO wishlist_items (wishlist_id, product_id, quantity) VALUES (?1, ?2, ?3)",
                params![wishlist_id.as_i64(), product_id.as_i64(), quantity],
            )?;
            let item = self.s.created(self.from_id(WishlistItemId::new(id))?);
            self.attach(wishlist_id, &item);
            Ok(item)
        })
    }

    /// # Errors
    /// * `DataAccess` - the store failed
    pub fn list_all(&self) -> Result<Vec<Handle<WishlistItem>>> {
        let ids = self
            .s
            .query("SELECT wishlist_item_id FROM wishlist_items ORDER BY wishlist_item_id", [])?
            .ids()?;
        resolve_all(ids, |id| self.from_id(id))
    }

    /// # Errors
    /// * `InvalidArgument` - out of stock or outside `[0, available]`
    /// * `NotFound` - unknown item
    pub fn set_quantity(&self, id: WishlistItemId, quantity: i64) -> Result<()> {
        let handle = self.from_id(id)?;
        let product_id = handle.read().product_id;
        let available = self.s.products().from_id(product_id)?.read().quantity;
        check_quantity(product_id.as_i64(), quantity, available)?;

        self.s.instrumented("set_wishlist_item_quantity", || {
            self.s.execute_one(
                Self::TABLE,
                "UPDATE wishlist_items SET quantity = ?1 WHERE wishlist_item_id = ?2",
                params![quantity, id.as_i64()],
            )?;
            self.s.modify(&handle, |i| i.quantity = quantity);
            Ok(())
        })
    }

    /// # Errors
    /// * `InvalidArgument` - the current quantity exceeds the new stock
    /// * `NotFound` - unknown item or product
    pub fn set_product(&self, id: WishlistItemId, product_id: ProductId) -> Result<()> {
        let handle = self.from_id(id)?;
        let quantity = handle.read().quantity;
        let available = self.s.products().from_id(product_id)?.read().quantity;
        check_quantity(product_id.as_i64(), quantity, available)?;

        self.s.instrumented("set_wishlist_item_product", || {
            self.s.execute_one(
                Self::TABLE,
                "UPDATE wishlist_items SET product_id = ?1 WHERE wishlist_item_id = ?2",
                params![product_id.as_i64(), id.as_i64()],
            )?;
            self.s.modify(&handle, |i| i.product_id = product_id);
            Ok(())
        })
    }

    /// Move the item to another wishlist, updating both cached wishlists
    ///
    /// # Errors
    /// * `NotFound` - unknown item
    /// * `ConstraintViolation` - unknown wishlist
    pub fn set_wishlist(&self, id: WishlistItemId, wishlist_id: WishlistId) -> Result<()> {
        let handle = self.from_id(id)?;
        let previous = handle.read().wishlist_id;
        if previous == wishlist_id {
            return Ok(());
        }

        self.s.instrumented("set_wishlist_item_wishlist", || {
            self.s.execute_one(
                Self::TABLE,
                "UPDATE wishlist_items SET wishlist_id = ?1 WHERE wishlist_item_id = ?2",
                params![wishlist_id.as_i64(), id.as_i64()],
            )?;
            self.s.modify(&handle, |i| i.wishlist_id = wishlist_id);
            self.detach(previous, id);
            self.attach(wishlist_id, &handle);
            Ok(())
        })
    }

    /// # Errors
    /// * `NotFound` - unknown item
    pub fn delete(&self, id: WishlistItemId) -> Result<()> {
        let wishlist_id = self.from_id(id)?.read().wishlist_id;
        self.s.instrumented("delete_wishlist_item", || {
            self.s.execute_one(
                Self::TABLE,
                "DELETE FROM wishlist_items WHERE wishlist_item_id = ?1",
                [id.as_i64()],
            )?;
            self.detach(wishlist_id, id);
            self.s.forget::<WishlistItem>(id);
            Ok(())
        })
    }

    fn attach(&self, wishlist_id: WishlistId, item: &Handle<WishlistItem>) {
        if let Some(wishlist) = self.s.cached::<Wishlist>(wishlist_id) {
            self.s.modify(&wishlist, |w| {
                w.items.push_unique(item.clone());
            });
        }
    }

    fn detach(&self, wishlist_id: WishlistId, item: WishlistItemId) {
        if let Some(wishlist) = self.s.cached::<Wishlist>(wishlist_id) {
            self.s.modify(&wishlist, |w| {
                w.items.remove(item);
            });
        }
    }
}

impl Repository for WishlistItems<'_, '_> {
    type Entity = WishlistItem;

    fn from_id(&self, id: WishlistItemId) -> Result<Handle<WishlistItem>> {
        WishlistItems::from_id(self, id)
    }

    fn list_all(&self) -> Result<Vec<Handle<WishlistItem>>> {
        WishlistItems::list_all(self)
    }

    fn delete(&self, id: WishlistItemId) -> Result<()> {
        WishlistItems::delete(self, id)
    }
}

//! Wishlist repository

use rusqlite::params;
use storefront_core::errors::{Result, StorefrontError};
use storefront_core::model::{
    Children, Customer, CustomerId, Entity, Handle, ProductId, Wishlist, WishlistId,
    WishlistItem, WishlistItemId,
};
use storefront_core::rules::require_non_blank;

use super::{resolve_all, setter, Repository};
use crate::hydration::ParentRows;
use crate::session::Session;

const HYDRATE_SQL: &str = "SELECT w.wishlist_id, wishlist_name, customer_id, wi.wishlist_item_id
     FROM wishlist w
     LEFT JOIN wishlist_items wi ON w.wishlist_id = wi.wishlist_id
     WHERE w.wishlist_id = ?1
     ORDER BY wi.wishlist_item_id";

pub struct Wishlists<'a, 's> {
    s: &'a Session<'s>,
}

impl<'a, 's> Wishlists<'a, 's> {
    const TABLE: &'static str = "wishlist";

    pub(crate) fn new(s: &'a Session<'s>) -> Self {
        Self { s }
    }

    /// # Errors
    /// * `NotFound` - no wishlist with this id
    pub fn from_id(&self, id: WishlistId) -> Result<Handle<Wishlist>> {
        self.s.fetch(id, || {
            let cursor = self.s.query(HYDRATE_SQL, [id.as_i64()])?;
            let rows = ParentRows::collect(&cursor, Wishlist::KIND, "wishlist_id", id.as_i64())?;
            let row = rows.scalars();

            let wishlist_items = self.s.wishlist_items();
            let items = rows
                .child_ids("wishlist_item_id")?
                .into_iter()
                .map(|i| wishlist_items.from_id(WishlistItemId::new(i)))
                .collect::<Result<Vec<_>>>()?;

            Ok(Wishlist {
                id: WishlistId::new(rows.parent_id()),
                customer_id: CustomerId::new(row.int("customer_id")?),
                name: row.string("wishlist_name")?,
                items: Children::from_handles(items),
            })
        })
    }

    /// Create an empty wishlist; a cached customer gains it
    ///
    /// # Errors
    /// * `InvalidArgument` - blank name
    /// * `ConstraintViolation` - unknown customer
    pub fn create(&self, customer_id: CustomerId, name: &str) -> Result<Handle<Wishlist>> {
        require_non_blank("wishlist_name", name)?;
        self.s.instrumented("create_wishlist", || {
            let id = self.s.insert(
                "INSERT INTO wishlist (customer_id, wishlist_name) VALUES (?1, ?2)",
                params![customer_id.as_i64(), name],
            )?;
            let wishlist = self.s.created(self.from_id(WishlistId::new(id))?);
            self.attach(customer_id, &wishlist);
            Ok(wishlist)
        })
    }

    /// # Errors
    /// * `DataAccess` - the store failed
    pub fn list_all(&self) -> Result<Vec<Handle<Wishlist>>> {
        let ids = self
            .s
            .query("SELECT wishlist_id FROM wishlist ORDER BY wishlist_id", [])?
            .ids()?;
        resolve_all(ids, |id| self.from_id(id))
    }

    setter!(
        set_name, "set_wishlist_name", WishlistId, String,
        "UPDATE wishlist SET wishlist_name = ?1 WHERE wishlist_id = ?2",
        |w, v| w.name = v
    );

    /// Move the wishlist to another customer, updating both cached customers
    ///
    /// # Errors
    /// * `NotFound` - unknown wishlist
    /// * `ConstraintViolation` - unknown customer
    pub fn set_customer(&self, id: WishlistId, customer_id: CustomerId) -> Result<()> {
        let handle = self.from_id(id)?;
        let previous = handle.read().customer_id;
        if previous == customer_id {
            return Ok(());
        }

        self.s.instrumented("set_wishlist_customer", || {
            self.s.execute_one(
                Self::TABLE,
                "UPDATE wishlist SET customer_id = ?1 WHERE wishlist_id = ?2",
                params![customer_id.as_i64(), id.as_i64()],
            )?;
            self.s.modify(&handle, |w| w.customer_id = customer_id);
            self.detach(previous, id);
            self.attach(customer_id, &handle);
            Ok(())
        })
    }

    /// # Errors
    /// * `InvalidArgument` - out of stock or outside `[0, available]`
    /// * `NotFound` - unknown wishlist or product
    pub fn add_item(
        &self,
        id: WishlistId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<Handle<WishlistItem>> {
        self.from_id(id)?;
        self.s.wishlist_items().create(id, product_id, quantity)
    }

    /// Delete the most recently added item; `false` when there is none
    ///
    /// # Errors
    /// * `NotFound` - unknown wishlist
    pub fn remove_last_item(&self, id: WishlistId) -> Result<bool> {
        let last = self.from_id(id)?.read().items.last().map(|h| h.id());
        match last {
            Some(item) => {
                self.s.wishlist_items().delete(item)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// # Errors
    /// * `NotFound` - the item is not on this wishlist
    pub fn remove_item(&self, id: WishlistId, item: WishlistItemId) -> Result<()> {
        if !self.from_id(id)?.read().items.contains(item) {
            return Err(StorefrontError::NotInCollection {
                owner_kind: Wishlist::KIND,
                owner_id: id.as_i64(),
                child_kind: WishlistItem::KIND,
                child_id: item.as_i64(),
            }
            .into());
        }
        self.s.wishlist_items().delete(item)
    }

    /// # Errors
    /// * `NotFound` - unknown wishlist
    pub fn clear_items(&self, id: WishlistId) -> Result<()> {
        let handle = self.from_id(id)?;
        self.s.instrumented("clear_wishlist_items", || {
            let items = handle.read().items.ids();
            for item in items {
                self.s.wishlist_items().delete(item)?;
            }
            Ok(())
        })
    }

    /// Value of the wishlist at the products' current prices
    ///
    /// # Errors
    /// * `NotFound` - unknown wishlist or a product vanished
    pub fn total_price(&self, id: WishlistId) -> Result<f64> {
        let lines: Vec<(ProductId, i64)> = self
            .from_id(id)?
            .read()
            .items
            .iter()
            .map(|h| {
                let item = h.read();
                (item.product_id, item.quantity)
            })
            .collect();

        let products = self.s.products();
        let mut total = 0.0;
        for (product_id, quantity) in lines {
            total += products.from_id(product_id)?.read().unit_price * quantity as f64;
        }
        Ok(total)
    }

    /// Delete the items, then the wishlist
    ///
    /// # Errors
    /// * `NotFound` - unknown wishlist
    pub fn delete(&self, id: WishlistId) -> Result<()> {
        let handle = self.from_id(id)?;
        self.s.instrumented("delete_wishlist", || {
            let (items, customer_id) = {
                let w = handle.read();
                (w.items.ids(), w.customer_id)
            };
            for item in items {
                self.s.wishlist_items().delete(item)?;
            }
            self.s.execute_one(
                Self::TABLE,
                "DELETE FROM wishlist WHERE wishlist_id = ?1",
                [id.as_i64()],
            )?;
            self.detach(customer_id, id);
            self.s.forget::<Wishlist>(id);
            Ok(())
        })
    }

    fn attach(&self, customer_id: CustomerId, wishlist: &Handle<Wishlist>) {
        if let Some(customer) = self.s.cached::<Customer>(customer_id) {
            self.s.modify(&customer, |c| {
                c.wishlists.push_unique(wishlist.clone());
            });
        }
    }

    fn detach(&self, customer_id: CustomerId, wishlist: WishlistId) {
        if let Some(customer) = self.s.cached::<Customer>(customer_id) {
            self.s.modify(&customer, |c| {
                c.wishlists.remove(wishlist);
            });
        }
    }
}

impl Repository for Wishlists<'_, '_> {
    type Entity = Wishlist;

    fn from_id(&self, id: WishlistId) -> Result<Handle<Wishlist>> {
        Wishlists::from_id(self, id)
    }

    fn list_all(&self) -> Result<Vec<Handle<Wishlist>>> {
        Wishlists::list_all(self)
    }

    fn delete(&self, id: WishlistId) -> Result<()> {
        Wishlists::delete(self, id)
    }
}

//! Order item repository
//!
//! An item snapshots the product's unit price when created. Its quantity is
//! guarded against the product's available stock before anything is
//! written.

use rusqlite::params;
use storefront_core::errors::Result;
use storefront_core::model::{Entity, Handle, Order, OrderId, OrderItem, OrderItemId, ProductId};
use storefront_core::rules::{check_quantity, require_non_negative_price};

use super::{resolve_all, Repository};
use crate::session::Session;

pub struct OrderItems<'a, 's> {
    s: &'a Session<'s>,
}

impl<'a, 's> OrderItems<'a, 's> {
    const TABLE: &'static str = "order_item";

    pub(crate) fn new(s: &'a Session<'s>) -> Self {
        Self { s }
    }

    /// # Errors
    /// * `NotFound` - no item with this id
    pub fn from_id(&self, id: OrderItemId) -> Result<Handle<OrderItem>> {
        self.s.fetch(id, || {
            let cursor = self.s.query(
                "SELECT order_item_id, order_id, product_id, unit_price, quantity
                 FROM order_item WHERE order_item_id = ?1",
                [id.as_i64()],
            )?;
            let row = cursor.require_first(OrderItem::KIND, id.as_i64())?;
            Ok(OrderItem {
                id: OrderItemId::new(row.int("order_item_id")?),
                order_id: OrderId::new(row.int("order_id")?),
                product_id: ProductId::new(row.int("product_id")?),
                unit_price: row.double("unit_price")?,
                quantity: row.int("quantity")?,
            })
        })
    }

    /// Add `quantity` of a product to an order at the product's current price
    ///
    /// A cached order gains the item in its collection.
    ///
    /// # Errors
    /// * `InvalidArgument` - the product is out of stock or `quantity` is
    ///   outside `[0, available]`
    /// * `NotFound` - unknown product
    /// * `ConstraintViolation` - unknown order
    pub fn create(
        &self,
        order_id: OrderId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<Handle<OrderItem>> {
        let product = self.s.products().from_id(product_id)?;
        let (available, unit_price) = {
            let p = product.read();
            (p.quantity, p.unit_price)
        };
        check_quantity(product_id.as_i64(), quantity, available)?;

        self.s.instrumented("create_order_item", || {
            let id = self.s.insert(
                "INSERT INTO order_item (order_id, product_id, unit_price, quantity)
                 VALUES (?1, ?2, ?3, ?4)",
                params![order_id.as_i64(), product_id.as_i64(), unit_price, quantity],
            )?;
            let item = self.s.created(self.from_id(OrderItemId::new(id))?);
            self.attach(order_id, &item);
            Ok(item)
        })
    }

    /// # Errors
    /// * `DataAccess` - the store failed
    pub fn list_all(&self) -> Result<Vec<Handle<OrderItem>>> {
        let ids = self
            .s
            .query("SELECT order_item_id FROM order_item ORDER BY order_item_id", [])?
            .ids()?;
        resolve_all(ids, |id| self.from_id(id))
    }

    /// Change the quantity, guarded against the product's stock
    ///
    /// # Errors
    /// * `InvalidArgument` - out of stock or outside `[0, available]`
    /// * `NotFound` - unknown item
    pub fn set_quantity(&self, id: OrderItemId, quantity: i64) -> Result<()> {
        let handle = self.from_id(id)?;
        let product_id = handle.read().product_id;
        let available = self.s.products().from_id(product_id)?.read().quantity;
        check_quantity(product_id.as_i64(), quantity, available)?;

        self.s.instrumented("set_item_quantity", || {
            self.s.execute_one(
                Self::TABLE,
                "UPDATE order_item SET quantity = ?1 WHERE order_item_id = ?2",
                params![quantity, id.as_i64()],
            )?;
            self.s.modify(&handle, |i| i.quantity = quantity);
            Ok(())
        })
    }

    /// # Errors
    /// * `InvalidArgument` - negative price
    /// * `ConstraintViolation` - unknown item
    pub fn set_unit_price(&self, id: OrderItemId, price: f64) -> Result<()> {
        require_non_negative_price("unit_price", price)?;
        self.s.instrumented("set_item_unit_price", || {
            self.s.execute_one(
                Self::TABLE,
                "UPDATE order_item SET unit_price = ?1 WHERE order_item_id = ?2",
                params![price, id.as_i64()],
            )?;
            self.s.modify_cached::<OrderItem>(id, |i| i.unit_price = price);
            Ok(())
        })
    }

    /// Point the item at another product; the quantity is re-checked
    /// against the new product's stock
    ///
    /// # Errors
    /// * `InvalidArgument` - the current quantity exceeds the new stock
    /// * `NotFound` - unknown item or product
    pub fn set_product(&self, id: OrderItemId, product_id: ProductId) -> Result<()> {
        let handle = self.from_id(id)?;
        let quantity = handle.read().quantity;
        let available = self.s.products().from_id(product_id)?.read().quantity;
        check_quantity(product_id.as_i64(), quantity, available)?;

        self.s.instrumented("set_item_product", || {
            self.s.execute_one(
                Self::TABLE,
                "UPDATE order_item SET product_id = ?1 WHERE order_item_id = ?2",
                params![product_id.as_i64(), id.as_i64()],
            )?;
            self.s.modify(&handle, |i| i.product_id = product_id);
            Ok(())
        })
    }

    /// Move the item to another order, updating both cached orders
    ///
    /// # Errors
    /// * `NotFound` - unknown item
    /// * `ConstraintViolation` - unknown order
    pub fn set_order(&self, id: OrderItemId, order_id: OrderId) -> Result<()> {
        let handle = self.from_id(id)?;
        let previous = handle.read().order_id;
        if previous == order_id {
            return Ok(());
        }

        self.s.instrumented("set_item_order", || {
            self.s.execute_one(
                Self::TABLE,
                "UPDATE order_item SET order_id = ?1 WHERE order_item_id = ?2",
                params![order_id.as_i64(), id.as_i64()],
            )?;
            self.s.modify(&handle, |i| i.order_id = order_id);
            self.detach(previous, id);
            self.attach(order_id, &handle);
            Ok(())
        })
    }

    /// Delete the item and drop it from its cached order
    ///
    /// # Errors
    /// * `NotFound` - unknown item
    pub fn delete(&self, id: OrderItemId) -> Result<()> {
        let order_id = self.from_id(id)?.read().order_id;
        self.s.instrumented("delete_order_item", || {
            self.s.execute_one(
                Self::TABLE,
                "DELETE FROM order_item WHERE order_item_id = ?1",
                [id.as_i64()],
            )?;
            self.detach(order_id, id);
            self.s.forget::<OrderItem>(id);
            Ok(())
        })
    }

    fn attach(&self, order_id: OrderId, item: &Handle<OrderItem>) {
        if let Some(order) = self.s.cached::<Order>(order_id) {
            self.s.modify(&order, |o| {
                o.items.push_unique(item.clone());
            });
        }
    }

    fn detach(&self, order_id: OrderId, item: OrderItemId) {
        if let Some(order) = self.s.cached::<Order>(order_id) {
            self.s.modify(&order, |o| {
                o.items.remove(item);
            });
        }
    }
}

impl Repository for OrderItems<'_, '_> {
    type Entity = OrderItem;

    fn from_id(&self, id: OrderItemId) -> Result<Handle<OrderItem>> {
        OrderItems::from_id(self, id)
    }

    fn list_all(&self) -> Result<Vec<Handle<OrderItem>>> {
        OrderItems::list_all(self)
    }

    fn delete(&self, id: OrderItemId) -> Result<()> {
        OrderItems::delete(self, id)
    }
}

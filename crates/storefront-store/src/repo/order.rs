//! Order repository
//!
//! An order owns its items and its payment. Deleting an order deletes the
//! items, then the order row, then the payment (the order row references
//! the payment, so it has to go first).

use rusqlite::params;
use rusqlite::types::Value;
use storefront_core::errors::{Result, StorefrontError};
use storefront_core::model::{
    AddressId, Children, Customer, CustomerId, Entity, Handle, NewOrder, Order, OrderId,
    OrderItem, OrderItemId, OrderStatus, PaymentId, ProductId,
};

use super::{resolve_all, Repository};
use crate::cursor::DATE_FORMAT;
use crate::hydration::ParentRows;
use crate::session::Session;

const HYDRATE_SQL: &str = "SELECT co.order_id, customer_id, payment_id, order_date, shipping_id,
            order_status, oi.order_item_id
     FROM customer_order co
     LEFT JOIN order_item oi ON co.order_id = oi.order_id
     WHERE co.order_id = ?1
     ORDER BY oi.order_item_id";

pub struct Orders<'a, 's> {
    s: &'a Session<'s>,
}

impl<'a, 's> Orders<'a, 's> {
    const TABLE: &'static str = "customer_order";

    pub(crate) fn new(s: &'a Session<'s>) -> Self {
        Self { s }
    }

    /// # Errors
    /// * `NotFound` - no order with this id
    pub fn from_id(&self, id: OrderId) -> Result<Handle<Order>> {
        self.s.fetch(id, || {
            let cursor = self.s.query(HYDRATE_SQL, [id.as_i64()])?;
            let rows = ParentRows::collect(&cursor, Order::KIND, "order_id", id.as_i64())?;
            let row = rows.scalars();

            let order_items = self.s.order_items();
            let items = rows
                .child_ids("order_item_id")?
                .into_iter()
                .map(|i| order_items.from_id(OrderItemId::new(i)))
                .collect::<Result<Vec<_>>>()?;

            Ok(Order {
                id: OrderId::new(rows.parent_id()),
                customer_id: CustomerId::new(row.int("customer_id")?),
                payment_id: PaymentId::new(row.int("payment_id")?),
                shipping_id: AddressId::new(row.int("shipping_id")?),
                order_date: row.date("order_date")?,
                status: row.parse::<OrderStatus>("order_status")?,
                items: Children::from_handles(items),
            })
        })
    }

    /// Insert an order; status and date fall back to the store defaults
    /// (`pending`, today) when not given
    ///
    /// A cached customer gains the order in its collection.
    ///
    /// # Errors
    /// * `ConstraintViolation` - unknown customer, payment or address
    pub fn create(&self, new: NewOrder) -> Result<Handle<Order>> {
        let mut columns = vec!["customer_id", "payment_id", "shipping_id"];
        let mut values = vec![
            Value::Integer(new.customer_id.as_i64()),
            Value::Integer(new.payment_id.as_i64()),
            Value::Integer(new.shipping_id.as_i64()),
        ];
        if let Some(status) = new.status {
            columns.push("order_status");
            values.push(Value::Text(status.as_str().to_string()));
        }
        if let Some(date) = new.order_date {
            columns.push("order_date");
            values.push(Value::Text(date.format(DATE_FORMAT).to_string()));
        }
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO customer_order ({}) VALUES ({})",
            columns.join(", "),
            placeholders.join(", ")
        );

        self.s.instrumented("create_order", || {
            let id = self.s.insert(&sql, rusqlite::params_from_iter(values))?;
            let order = self.s.created(self.from_id(OrderId::new(id))?);
            self.attach(new.customer_id, &order);
            Ok(order)
        })
    }

    /// # Errors
    /// * `DataAccess` - the store failed
    pub fn list_all(&self) -> Result<Vec<Handle<Order>>> {
        let ids = self
            .s
            .query("SELECT order_id FROM customer_order ORDER BY order_id", [])?
            .ids()?;
        resolve_all(ids, |id| self.from_id(id))
    }

    /// # Errors
    /// * `ConstraintViolation` - unknown order
    pub fn set_order_date(&self, id: OrderId, date: chrono::NaiveDate) -> Result<()> {
        self.s.instrumented("set_order_date", || {
            self.s.execute_one(
                Self::TABLE,
                "UPDATE customer_order SET order_date = ?1 WHERE order_id = ?2",
                params![date.format(DATE_FORMAT).to_string(), id.as_i64()],
            )?;
            self.s.modify_cached::<Order>(id, |o| o.order_date = date);
            Ok(())
        })
    }

    /// # Errors
    /// * `ConstraintViolation` - unknown order
    pub fn set_status(&self, id: OrderId, status: OrderStatus) -> Result<()> {
        self.s.instrumented("set_order_status", || {
            self.s.execute_one(
                Self::TABLE,
                "UPDATE customer_order SET order_status = ?1 WHERE order_id = ?2",
                params![status.as_str(), id.as_i64()],
            )?;
            self.s.modify_cached::<Order>(id, |o| o.status = status);
            Ok(())
        })
    }

    /// # Errors
    /// * `ConstraintViolation` - unknown order or address
    pub fn set_shipping(&self, id: OrderId, address_id: AddressId) -> Result<()> {
        self.s.instrumented("set_shipping", || {
            self.s.execute_one(
                Self::TABLE,
                "UPDATE customer_order SET shipping_id = ?1 WHERE order_id = ?2",
                params![address_id.as_i64(), id.as_i64()],
            )?;
            self.s.modify_cached::<Order>(id, |o| o.shipping_id = address_id);
            Ok(())
        })
    }

    /// # Errors
    /// * `ConstraintViolation` - unknown order or payment
    pub fn set_payment(&self, id: OrderId, payment_id: PaymentId) -> Result<()> {
        self.s.instrumented("set_payment", || {
            self.s.execute_one(
                Self::TABLE,
                "UPDATE customer_order SET payment_id = ?1 WHERE order_id = ?2",
                params![payment_id.as_i64(), id.as_i64()],
            )?;
            self.s.modify_cached::<Order>(id, |o| o.payment_id = payment_id);
            Ok(())
        })
    }

    /// Move the order to another customer, updating both cached customers
    ///
    /// # Errors
    /// * `NotFound` - unknown order
    /// * `ConstraintViolation` - unknown customer
    pub fn set_customer(&self, id: OrderId, customer_id: CustomerId) -> Result<()> {
        let handle = self.from_id(id)?;
        let previous = handle.read().customer_id;
        if previous == customer_id {
            return Ok(());
        }

        self.s.instrumented("set_order_customer", || {
            self.s.execute_one(
                Self::TABLE,
                "UPDATE customer_order SET customer_id = ?1 WHERE order_id = ?2",
                params![customer_id.as_i64(), id.as_i64()],
            )?;
            self.s.modify(&handle, |o| o.customer_id = customer_id);
            self.detach(previous, id);
            self.attach(customer_id, &handle);
            Ok(())
        })
    }

    /// Add `quantity` of a product as a new item
    ///
    /// # Errors
    /// * `InvalidArgument` - out of stock or outside `[0, available]`
    /// * `NotFound` - unknown order or product
    pub fn add_item(
        &self,
        id: OrderId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<Handle<OrderItem>> {
        self.from_id(id)?;
        self.s.order_items().create(id, product_id, quantity)
    }

    /// Delete the most recently added item; `false` when there is none
    ///
    /// # Errors
    /// * `NotFound` - unknown order
    pub fn remove_last_item(&self, id: OrderId) -> Result<bool> {
        let last = self.from_id(id)?.read().items.last().map(|h| h.id());
        match last {
            Some(item) => {
                self.s.order_items().delete(item)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// # Errors
    /// * `NotFound` - the item does not belong to this order
    pub fn remove_item(&self, id: OrderId, item: OrderItemId) -> Result<()> {
        if !self.from_id(id)?.read().items.contains(item) {
            return Err(StorefrontError::NotInCollection {
                owner_kind: Order::KIND,
                owner_id: id.as_i64(),
                child_kind: OrderItem::KIND,
                child_id: item.as_i64(),
            }
            .into());
        }
        self.s.order_items().delete(item)
    }

    /// Delete the first item for `product_id`; `false` when there is none
    ///
    /// # Errors
    /// * `NotFound` - unknown order
    pub fn remove_item_for_product(&self, id: OrderId, product_id: ProductId) -> Result<bool> {
        let found = self
            .from_id(id)?
            .read()
            .items
            .find(|i| i.product_id == product_id)
            .map(|h| h.id());
        match found {
            Some(item) => {
                self.s.order_items().delete(item)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Delete every item of the order
    ///
    /// # Errors
    /// * `NotFound` - unknown order
    pub fn clear_items(&self, id: OrderId) -> Result<()> {
        let handle = self.from_id(id)?;
        self.s.instrumented("clear_order_items", || {
            let items = handle.read().items.ids();
            for item in items {
                self.s.order_items().delete(item)?;
            }
            Ok(())
        })
    }

    /// Sum of `unit_price * quantity` over the current items
    ///
    /// # Errors
    /// * `NotFound` - unknown order
    pub fn total_price(&self, id: OrderId) -> Result<f64> {
        Ok(self.from_id(id)?.read().total_price())
    }

    /// Delete items, the order row, then its payment
    ///
    /// The payment is kept when another order still uses it.
    ///
    /// # Errors
    /// * `NotFound` - unknown order
    pub fn delete(&self, id: OrderId) -> Result<()> {
        let handle = self.from_id(id)?;
        self.s.instrumented("delete_order", || {
            let (items, customer_id, payment_id) = {
                let o = handle.read();
                (o.items.ids(), o.customer_id, o.payment_id)
            };
            for item in items {
                self.s.order_items().delete(item)?;
            }
            self.s.execute_one(
                Self::TABLE,
                "DELETE FROM customer_order WHERE order_id = ?1",
                [id.as_i64()],
            )?;

            let still_used = self
                .s
                .query(
                    "SELECT order_id FROM customer_order WHERE payment_id = ?1 LIMIT 1",
                    [payment_id.as_i64()],
                )?
                .len();
            if still_used == 0 {
                self.s.payments().delete(payment_id)?;
            }

            self.detach(customer_id, id);
            self.s.forget::<Order>(id);
            Ok(())
        })
    }

    fn attach(&self, customer_id: CustomerId, order: &Handle<Order>) {
        if let Some(customer) = self.s.cached::<Customer>(customer_id) {
            self.s.modify(&customer, |c| {
                c.orders.push_unique(order.clone());
            });
        }
    }

    fn detach(&self, customer_id: CustomerId, order: OrderId) {
        if let Some(customer) = self.s.cached::<Customer>(customer_id) {
            self.s.modify(&customer, |c| {
                c.orders.remove(order);
            });
        }
    }
}

impl Repository for Orders<'_, '_> {
    type Entity = Order;

    fn from_id(&self, id: OrderId) -> Result<Handle<Order>> {
        Orders::from_id(self, id)
    }

    fn list_all(&self) -> Result<Vec<Handle<Order>>> {
        Orders::list_all(self)
    }

    fn delete(&self, id: OrderId) -> Result<()> {
        Orders::delete(self, id)
    }
}

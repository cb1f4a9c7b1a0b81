//! Customer repository
//!
//! A customer owns its orders and wishlists; deleting the customer deletes
//! both collections first.

use rusqlite::params;
use storefront_core::errors::{Result, StorefrontError};
use storefront_core::model::{
    Children, Customer, CustomerId, Entity, Handle, NewCustomer, Order, OrderId, Wishlist,
    WishlistId,
};
use storefront_core::rules::require_non_blank;

use super::{resolve_all, setter, Repository};
use crate::hydration::ParentRows;
use crate::session::Session;

const HYDRATE_SQL: &str = "SELECT c.customer_id, firstname, lastname, email_address, phone_number,
            co.order_id, w.wishlist_id
     FROM customer c
     LEFT JOIN customer_order co ON c.customer_id = co.customer_id
     LEFT JOIN wishlist w ON c.customer_id = w.customer_id
     WHERE c.customer_id = ?1
     ORDER BY co.order_id, w.wishlist_id";

pub struct Customers<'a, 's> {
    s: &'a Session<'s>,
}

impl<'a, 's> Customers<'a, 's> {
    const TABLE: &'static str = "customer";

    pub(crate) fn new(s: &'a Session<'s>) -> Self {
        Self { s }
    }

    /// Hydrate a customer with its orders and wishlists
    ///
    /// # Errors
    /// * `NotFound` - no customer with this id
    pub fn from_id(&self, id: CustomerId) -> Result<Handle<Customer>> {
        self.s.fetch(id, || {
            let cursor = self.s.query(HYDRATE_SQL, [id.as_i64()])?;
            let rows = ParentRows::collect(&cursor, Customer::KIND, "customer_id", id.as_i64())?;
            let row = rows.scalars();

            let orders = self.s.orders();
            let orders = rows
                .child_ids("order_id")?
                .into_iter()
                .map(|o| orders.from_id(OrderId::new(o)))
                .collect::<Result<Vec<_>>>()?;

            let wishlists = self.s.wishlists();
            let wishlists = rows
                .child_ids("wishlist_id")?
                .into_iter()
                .map(|w| wishlists.from_id(WishlistId::new(w)))
                .collect::<Result<Vec<_>>>()?;

            Ok(Customer {
                id: CustomerId::new(rows.parent_id()),
                first_name: row.string("firstname")?,
                last_name: row.string("lastname")?,
                email: row.string("email_address")?,
                phone: row.string("phone_number")?,
                orders: Children::from_handles(orders),
                wishlists: Children::from_handles(wishlists),
            })
        })
    }

    /// # Errors
    /// * `InvalidArgument` - blank name or email
    pub fn create(&self, new: NewCustomer) -> Result<Handle<Customer>> {
        require_non_blank("firstname", &new.first_name)?;
        require_non_blank("lastname", &new.last_name)?;
        require_non_blank("email_address", &new.email)?;

        self.s.instrumented("create_customer", || {
            let id = self.s.insert(
                "INSERT INTO customer (firstname, lastname, email_address, phone_number)
                 VALUES (?1, ?2, ?3, ?4)",
                params![new.first_name, new.last_name, new.email, new.phone],
            )?;
            self.from_id(CustomerId::new(id)).map(|h| self.s.created(h))
        })
    }

    /// # Errors
    /// * `DataAccess` - the store failed
    pub fn list_all(&self) -> Result<Vec<Handle<Customer>>> {
        let ids = self
            .s
            .query("SELECT customer_id FROM customer ORDER BY customer_id", [])?
            .ids()?;
        resolve_all(ids, |id| self.from_id(id))
    }

    setter!(
        set_first_name, "set_customer_first_name", CustomerId, String,
        "UPDATE customer SET firstname = ?1 WHERE customer_id = ?2",
        |c, v| c.first_name = v
    );

    setter!(
        set_last_name, "set_customer_last_name", CustomerId, String,
        "UPDATE customer SET lastname = ?1 WHERE customer_id = ?2",
        |c, v| c.last_name = v
    );

    setter!(
        /// Change the contact email
        set_email, "set_customer_email", CustomerId, String,
        "UPDATE customer SET email_address = ?1 WHERE customer_id = ?2",
        |c, v| c.email = v
    );

    setter!(
        set_phone, "set_customer_phone", CustomerId, String,
        "UPDATE customer SET phone_number = ?1 WHERE customer_id = ?2",
        |c, v| c.phone = v
    );

    /// Delete one of the customer's orders
    ///
    /// # Errors
    /// * `NotFound` - the order does not belong to this customer
    pub fn remove_order(&self, id: CustomerId, order: OrderId) -> Result<()> {
        if !self.from_id(id)?.read().orders.contains(order) {
            return Err(StorefrontError::NotInCollection {
                owner_kind: Customer::KIND,
                owner_id: id.as_i64(),
                child_kind: Order::KIND,
                child_id: order.as_i64(),
            }
            .into());
        }
        self.s.orders().delete(order)
    }

    /// Delete one of the customer's wishlists
    ///
    /// # Errors
    /// * `NotFound` - the wishlist does not belong to this customer
    pub fn remove_wishlist(&self, id: CustomerId, wishlist: WishlistId) -> Result<()> {
        if !self.from_id(id)?.read().wishlists.contains(wishlist) {
            return Err(StorefrontError::NotInCollection {
                owner_kind: Customer::KIND,
                owner_id: id.as_i64(),
                child_kind: Wishlist::KIND,
                child_id: wishlist.as_i64(),
            }
            .into());
        }
        self.s.wishlists().delete(wishlist)
    }

    /// Delete orders, then wishlists, then the customer
    ///
    /// # Errors
    /// * `NotFound` - unknown customer
    /// * `ConstraintViolation` - something else still references the customer
    pub fn delete(&self, id: CustomerId) -> Result<()> {
        let handle = self.from_id(id)?;
        self.s.instrumented("delete_customer", || {
            let (orders, wishlists) = {
                let c = handle.read();
                (c.orders.ids(), c.wishlists.ids())
            };
            for order in orders {
                self.s.orders().delete(order)?;
            }
            for wishlist in wishlists {
                self.s.wishlists().delete(wishlist)?;
            }
            self.s.execute_one(
                Self::TABLE,
                "DELETE FROM customer WHERE customer_id = ?1",
                [id.as_i64()],
            )?;
            self.s.forget::<Customer>(id);
            Ok(())
        })
    }
}

impl Repository for Customers<'_, '_> {
    type Entity = Customer;

    fn from_id(&self, id: CustomerId) -> Result<Handle<Customer>> {
        Customers::from_id(self, id)
    }

    fn list_all(&self) -> Result<Vec<Handle<Customer>>> {
        Customers::list_all(self)
    }

    fn delete(&self, id: CustomerId) -> Result<()> {
        Customers::delete(self, id)
    }
}

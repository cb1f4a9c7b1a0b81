//! Catalogue-wide queries
//!
//! Queries select ids only; every product comes back through
//! `products().from_id`, so results share identity with the cache.

use chrono::NaiveDate;
use rusqlite::params;
use storefront_core::errors::Result;
use storefront_core::model::{Handle, PriceChange, Product, ProductId, ProductTypeId};

use super::product::read_price_change;
use crate::cursor::DATE_FORMAT;
use crate::session::Session;

/// How many units of a product are wanted across all orders or wishlists
#[derive(Debug, Clone, PartialEq)]
pub struct DemandCount {
    pub product_id: ProductId,
    pub name: String,
    pub count: i64,
}

pub struct Inventory<'a, 's> {
    s: &'a Session<'s>,
}

impl<'a, 's> Inventory<'a, 's> {
    pub(crate) fn new(s: &'a Session<'s>) -> Self {
        Self { s }
    }

    /// Products priced within `[min, max]`, cheapest first
    ///
    /// # Errors
    /// * `DataAccess` - the store failed
    pub fn products_in_price_range(&self, min: f64, max: f64) -> Result<Vec<Handle<Product>>> {
        self.products_where(
            "SELECT product_id FROM product
             WHERE current_unit_price BETWEEN ?1 AND ?2
             ORDER BY current_unit_price, product_id",
            params![min, max],
        )
    }

    /// # Errors
    /// * `DataAccess` - the store failed
    pub fn products_in_category(&self, category: ProductTypeId) -> Result<Vec<Handle<Product>>> {
        self.products_where(
            "SELECT product_id FROM product_category WHERE category_id = ?1 ORDER BY product_id",
            [category.as_i64()],
        )
    }

    /// # Errors
    /// * `DataAccess` - the store failed
    pub fn most_expensive(&self) -> Result<Option<Handle<Product>>> {
        self.first_product(
            "SELECT product_id FROM product
             ORDER BY current_unit_price DESC, product_id LIMIT 1",
        )
    }

    /// Product with the most units in stock
    ///
    /// # Errors
    /// * `DataAccess` - the store failed
    pub fn best_stocked(&self) -> Result<Option<Handle<Product>>> {
        self.first_product(
            "SELECT product_id FROM product ORDER BY product_quantity DESC, product_id LIMIT 1",
        )
    }

    /// Product with the most units across all order items
    ///
    /// # Errors
    /// * `DataAccess` - the store failed
    pub fn most_purchased(&self) -> Result<Option<Handle<Product>>> {
        self.first_product(
            "SELECT product_id FROM order_item
             GROUP BY product_id
             ORDER BY SUM(quantity) DESC, product_id LIMIT 1",
        )
    }

    /// # Errors
    /// * `DataAccess` - the store failed
    pub fn wishlist_demand(&self) -> Result<Vec<DemandCount>> {
        self.demand("wishlist_items")
    }

    /// # Errors
    /// * `DataAccess` - the store failed
    pub fn order_demand(&self) -> Result<Vec<DemandCount>> {
        self.demand("order_item")
    }

    /// The price change with the largest absolute delta
    ///
    /// # Errors
    /// * `DataAccess` - the store failed
    pub fn largest_price_change(&self) -> Result<Option<PriceChange>> {
        let cursor = self.s.query(
            "SELECT product_id, old_product_price, new_product_price, price_change_date
             FROM product_price_change
             ORDER BY ABS(new_product_price - old_product_price) DESC, price_change_id
             LIMIT 1",
            [],
        )?;
        cursor.first().map(|row| read_price_change(&row)).transpose()
    }

    /// # Errors
    /// * `DataAccess` - the store failed
    pub fn price_changes_on(&self, date: NaiveDate) -> Result<Vec<PriceChange>> {
        let cursor = self.s.query(
            "SELECT product_id, old_product_price, new_product_price, price_change_date
             FROM product_price_change
             WHERE price_change_date = ?1
             ORDER BY price_change_id",
            [date.format(DATE_FORMAT).to_string()],
        )?;
        cursor.rows().map(|row| read_price_change(&row)).collect()
    }

    fn products_where<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<Handle<Product>>> {
        let products = self.s.products();
        self.s
            .query(sql, params)?
            .ids()?
            .into_iter()
            .map(|id| products.from_id(ProductId::new(id)))
            .collect()
    }

    fn first_product(&self, sql: &str) -> Result<Option<Handle<Product>>> {
        Ok(self.products_where(sql, [])?.into_iter().next())
    }

    fn demand(&self, table: &str) -> Result<Vec<DemandCount>> {
        let sql = format!(
            "SELECT p.product_id, p.product_name, SUM(t.quantity) AS demand
             FROM {table} t
             JOIN product p ON p.product_id = t.product_id
             GROUP BY p.product_id
             ORDER BY demand DESC, p.product_id"
        );
        let cursor = self.s.query(&sql, [])?;
        cursor
            .rows()
            .map(|row| {
                Ok(DemandCount {
                    product_id: ProductId::new(row.int("product_id")?),
                    name: row.string("product_name")?,
                    count: row.int("demand")?,
                })
            })
            .collect()
    }
}

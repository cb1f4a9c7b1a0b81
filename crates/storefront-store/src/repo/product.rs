//! Product repository
//!
//! A product owns its category links (`product_category`) and its price
//! history (`product_price_change`). Its distributor is a nullable weak
//! reference; cached distributors list the products that point at them.

use rusqlite::params;
use storefront_core::errors::{Result, StorefrontError};
use storefront_core::model::{
    Children, Distributor, DistributorId, Entity, Handle, NewProduct, PriceChange, Product, ProductId,
    ProductType, ProductTypeId,
};
use storefront_core::rules::{require_non_blank, require_non_negative_price};

use super::{resolve_all, setter, Repository};
use crate::hydration::ParentRows;
use crate::session::Session;

const HYDRATE_SQL: &str = "SELECT p.product_id, product_name, product_description, product_quantity,
            current_unit_price, distributor_id, pc.category_id
     FROM product p
     LEFT JOIN product_category pc ON p.product_id = pc.product_id
     WHERE p.product_id = ?1
     ORDER BY pc.rowid";

pub struct Products<'a, 's> {
    s: &'a Session<'s>,
}

impl<'a, 's> Products<'a, 's> {
    const TABLE: &'static str = "product";

    pub(crate) fn new(s: &'a Session<'s>) -> Self {
        Self { s }
    }

    /// # Errors
    /// * `NotFound` - no product with this id
    pub fn from_id(&self, id: ProductId) -> Result<Handle<Product>> {
        self.s.fetch(id, || self.hydrate(id))
    }

    fn hydrate(&self, id: ProductId) -> Result<Product> {
        let cursor = self.s.query(HYDRATE_SQL, [id.as_i64()])?;
        let rows = ParentRows::collect(&cursor, Product::KIND, "product_id", id.as_i64())?;
        let row = rows.scalars();

        let types = self.s.product_types();
        let categories = rows
            .child_ids("category_id")?
            .into_iter()
            .map(|c| types.from_id(ProductTypeId::new(c)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Product {
            id: ProductId::new(rows.parent_id()),
            name: row.string("product_name")?,
            description: row.opt_string("product_description")?.unwrap_or_default(),
            quantity: row.int("product_quantity")?,
            unit_price: row.double("current_unit_price")?,
            distributor_id: row.opt_int("distributor_id")?.map(DistributorId::new),
            categories: Children::from_handles(categories),
        })
    }

    /// Insert a product; a cached distributor gains it in its collection
    ///
    /// # Errors
    /// * `InvalidArgument` - blank name, negative price or quantity
    /// * `ConstraintViolation` - the distributor does not exist
    pub fn create(&self, new: NewProduct) -> Result<Handle<Product>> {
        require_non_blank("product_name", &new.name)?;
        require_non_negative_price("unit_price", new.unit_price)?;
        require_non_negative_quantity(new.quantity)?;

        self.s.instrumented("create_product", || {
            let id = self.s.insert(
                "INSERT INTO product (product_name, product_description, product_quantity,
                                      current_unit_price, distributor_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    new.name,
                    new.description,
                    new.quantity,
                    new.unit_price,
                    new.distributor_id.map(|d| d.as_i64())
                ],
            )?;
            let product = self.s.created(self.from_id(ProductId::new(id))?);
            if let Some(distributor_id) = new.distributor_id {
                self.attach_to_distributor(distributor_id, &product);
            }
            Ok(product)
        })
    }

    /// # Errors
    /// * `DataAccess` - the store failed
    pub fn list_all(&self) -> Result<Vec<Handle<Product>>> {
        let ids = self
            .s
            .query("SELECT product_id FROM product ORDER BY product_id", [])?
            .ids()?;
        resolve_all(ids, |id| self.from_id(id))
    }

    setter!(
        set_name, "set_product_name", ProductId, String,
        "UPDATE product SET product_name = ?1 WHERE product_id = ?2",
        |p, v| p.name = v
    );

    setter!(
        set_description, "set_product_description", ProductId, String,
        "UPDATE product SET product_description = ?1 WHERE product_id = ?2",
        |p, v| p.description = v
    );

    /// Set the available stock
    ///
    /// # Errors
    /// * `InvalidArgument` - negative quantity
    /// * `ConstraintViolation` - no product with this id
    pub fn set_quantity(&self, id: ProductId, quantity: i64) -> Result<()> {
        require_non_negative_quantity(quantity)?;
        self.s.instrumented("set_product_quantity", || {
            self.s.execute_one(
                Self::TABLE,
                "UPDATE product SET product_quantity = ?1 WHERE product_id = ?2",
                params![quantity, id.as_i64()],
            )?;
            self.s.modify_cached::<Product>(id, |p| p.quantity = quantity);
            Ok(())
        })
    }

    /// Change the current unit price and record the change in the history
    ///
    /// Setting the price it already has records nothing.
    ///
    /// # Errors
    /// * `InvalidArgument` - negative or non-finite price
    /// * `NotFound` - no product with this id
    pub fn set_unit_price(&self, id: ProductId, price: f64) -> Result<()> {
        require_non_negative_price("unit_price", price)?;
        let handle = self.from_id(id)?;
        let old = handle.read().unit_price;
        if old == price {
            return Ok(());
        }

        self.s.instrumented("set_unit_price", || {
            self.s.execute_one(
                Self::TABLE,
                "UPDATE product SET current_unit_price = ?1 WHERE product_id = ?2",
                params![price, id.as_i64()],
            )?;
            self.s.insert(
                "INSERT INTO product_price_change (product_id, old_product_price, new_product_price)
                 VALUES (?1, ?2, ?3)",
                params![id.as_i64(), old, price],
            )?;
            self.s.modify(&handle, |p| p.unit_price = price);
            Ok(())
        })
    }

    /// Point the product at another distributor, or at none
    ///
    /// The product moves between the cached distributors' collections.
    ///
    /// # Errors
    /// * `NotFound` - no product with this id
    /// * `ConstraintViolation` - the distributor does not exist
    pub fn set_distributor(&self, id: ProductId, distributor: Option<DistributorId>) -> Result<()> {
        let handle = self.from_id(id)?;
        let previous = handle.read().distributor_id;
        if previous == distributor {
            return Ok(());
        }

        self.s.instrumented("set_distributor", || {
            self.s.execute_one(
                Self::TABLE,
                "UPDATE product SET distributor_id = ?1 WHERE product_id = ?2",
                params![distributor.map(|d| d.as_i64()), id.as_i64()],
            )?;
            self.s.modify(&handle, |p| p.distributor_id = distributor);
            if let Some(old) = previous {
                self.detach_from_distributor(old, id);
            }
            if let Some(new) = distributor {
                self.attach_to_distributor(new, &handle);
            }
            Ok(())
        })
    }

    /// Tag the product with a category
    ///
    /// # Errors
    /// * `AlreadyExists` - the product already has the category
    /// * `NotFound` - unknown product or category
    pub fn add_category(&self, id: ProductId, category: ProductTypeId) -> Result<()> {
        let handle = self.from_id(id)?;
        let tag = self.s.product_types().from_id(category)?;
        self.link_category(&handle, tag)
    }

    /// Tag the product with the category of this name, creating it if needed
    ///
    /// # Errors
    /// * `AlreadyExists` - the product already has the category
    /// * `InvalidArgument` - the name is blank
    pub fn add_category_named(&self, id: ProductId, name: &str) -> Result<()> {
        let handle = self.from_id(id)?;
        self.s.instrumented("add_category_named", || {
            let tag = self.s.product_types().find_or_create(name)?;
            self.link_category(&handle, tag)
        })
    }

    /// # Errors
    /// * `NotFound` - the product does not have the category
    pub fn remove_category(&self, id: ProductId, category: ProductTypeId) -> Result<()> {
        let handle = self.from_id(id)?;
        if !handle.read().has_category(category) {
            return Err(StorefrontError::NotInCollection {
                owner_kind: Product::KIND,
                owner_id: id.as_i64(),
                child_kind: ProductType::KIND,
                child_id: category.as_i64(),
            }
            .into());
        }

        self.s.instrumented("remove_category", || {
            self.s.execute_one(
                "product_category",
                "DELETE FROM product_category WHERE product_id = ?1 AND category_id = ?2",
                params![id.as_i64(), category.as_i64()],
            )?;
            self.s.modify(&handle, |p| {
                p.categories.remove(category);
            });
            Ok(())
        })
    }

    /// # Errors
    /// * `NotFound` - no such category, or the product does not have it
    pub fn remove_category_named(&self, id: ProductId, name: &str) -> Result<()> {
        let category = self.s.product_types().from_name(name)?.id();
        self.remove_category(id, category)
    }

    /// Remove every category link of the product
    ///
    /// # Errors
    /// * `NotFound` - no product with this id
    pub fn clear_categories(&self, id: ProductId) -> Result<()> {
        let handle = self.from_id(id)?;
        self.s.instrumented("clear_categories", || {
            self.s.execute(
                "DELETE FROM product_category WHERE product_id = ?1",
                [id.as_i64()],
            )?;
            self.s.modify(&handle, |p| {
                p.categories.take_all();
            });
            Ok(())
        })
    }

    /// Recorded price changes, oldest first
    ///
    /// # Errors
    /// * `DataAccess` - the store failed
    pub fn price_history(&self, id: ProductId) -> Result<Vec<PriceChange>> {
        let cursor = self.s.query(
            "SELECT product_id, old_product_price, new_product_price, price_change_date
             FROM product_price_change
             WHERE product_id = ?1
             ORDER BY price_change_id",
            [id.as_i64()],
        )?;
        cursor.rows().map(|row| read_price_change(&row)).collect()
    }

    /// Delete category links and price history, then the product
    ///
    /// # Errors
    /// * `NotFound` - no product with this id
    /// * `ConstraintViolation` - an order or wishlist item still refers to it
    pub fn delete(&self, id: ProductId) -> Result<()> {
        let distributor = self.from_id(id)?.read().distributor_id;
        self.s.instrumented("delete_product", || {
            self.s.execute(
                "DELETE FROM product_category WHERE product_id = ?1",
                [id.as_i64()],
            )?;
            self.s.execute(
                "DELETE FROM product_price_change WHERE product_id = ?1",
                [id.as_i64()],
            )?;
            self.s.execute_one(
                Self::TABLE,
                "DELETE FROM product WHERE product_id = ?1",
                [id.as_i64()],
            )?;
            if let Some(distributor) = distributor {
                self.detach_from_distributor(distributor, id);
            }
            self.s.forget::<Product>(id);
            Ok(())
        })
    }

    fn link_category(&self, handle: &Handle<Product>, tag: Handle<ProductType>) -> Result<()> {
        let id = handle.id();
        let category = tag.id();
        if handle.read().has_category(category) {
            return Err(StorefrontError::AlreadyExists {
                kind: Product::KIND,
                owner_id: id.as_i64(),
                what: format!("category {}", category),
            }
            .into());
        }

        self.s.instrumented("add_category", || {
            self.s.insert(
                "INSERT INTO product_category (product_id, category_id) VALUES (?1, ?2)",
                params![id.as_i64(), category.as_i64()],
            )?;
            self.s.modify(handle, |p| p.categories.push_unique(tag));
            Ok(())
        })
    }

    fn attach_to_distributor(&self, distributor: DistributorId, product: &Handle<Product>) {
        if let Some(owner) = self.s.cached::<Distributor>(distributor) {
            self.s.modify(&owner, |d| {
                d.products.push_unique(product.clone());
            });
        }
    }

    fn detach_from_distributor(&self, distributor: DistributorId, product: ProductId) {
        if let Some(owner) = self.s.cached::<Distributor>(distributor) {
            self.s.modify(&owner, |d| {
                d.products.remove(product);
            });
        }
    }
}

fn require_non_negative_quantity(quantity: i64) -> Result<()> {
    if quantity < 0 {
        return Err(StorefrontError::InvalidValue {
            field: "quantity",
            reason: format!("{} is negative", quantity),
        }
        .into());
    }
    Ok(())
}

pub(crate) fn read_price_change(row: &crate::cursor::Row<'_>) -> Result<PriceChange> {
    Ok(PriceChange {
        product_id: ProductId::new(row.int("product_id")?),
        old_price: row.double("old_product_price")?,
        new_price: row.double("new_product_price")?,
        changed_on: row.date("price_change_date")?,
    })
}

impl Repository for Products<'_, '_> {
    type Entity = Product;

    fn from_id(&self, id: ProductId) -> Result<Handle<Product>> {
        Products::from_id(self, id)
    }

    fn list_all(&self) -> Result<Vec<Handle<Product>>> {
        Products::list_all(self)
    }

    fn delete(&self, id: ProductId) -> Result<()> {
        Products::delete(self, id)
    }
}

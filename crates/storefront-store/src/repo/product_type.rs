//! Product category repository

use storefront_core::errors::{Result, StorefrontError};
use storefront_core::model::{Entity, Handle, Product, ProductType, ProductTypeId};
use storefront_core::rules::require_non_blank;

use super::{resolve_all, Repository};
use crate::session::Session;

pub struct ProductTypes<'a, 's> {
    s: &'a Session<'s>,
}

impl<'a, 's> ProductTypes<'a, 's> {
    const TABLE: &'static str = "product_type";

    pub(crate) fn new(s: &'a Session<'s>) -> Self {
        Self { s }
    }

    /// # Errors
    /// * `NotFound` - no category with this id
    pub fn from_id(&self, id: ProductTypeId) -> Result<Handle<ProductType>> {
        self.s.fetch(id, || {
            let cursor = self.s.query(
                "SELECT category_id, category_name FROM product_type WHERE category_id = ?1",
                [id.as_i64()],
            )?;
            let row = cursor.require_first(ProductType::KIND, id.as_i64())?;
            Ok(ProductType {
                id: ProductTypeId::new(row.int("category_id")?),
                name: row.string("category_name")?,
            })
        })
    }

    /// Look a category up by its unique name
    ///
    /// # Errors
    /// * `NotFound` - no category has this name
    pub fn from_name(&self, name: &str) -> Result<Handle<ProductType>> {
        match self.id_for_name(name)? {
            Some(id) => self.from_id(id),
            None => Err(StorefrontError::NameNotFound {
                kind: ProductType::KIND,
                name: name.to_string(),
            }
            .into()),
        }
    }

    /// # Errors
    /// * `AlreadyExists` - a category with this name exists
    /// * `InvalidArgument` - the name is blank
    pub fn create(&self, name: &str) -> Result<Handle<ProductType>> {
        require_non_blank("category_name", name)?;
        self.s.instrumented("create_product_type", || {
            if self.id_for_name(name)?.is_some() {
                return Err(StorefrontError::NameTaken {
                    kind: ProductType::KIND,
                    name: name.to_string(),
                }
                .into());
            }
            let id = self.s.insert(
                "INSERT INTO product_type (category_name) VALUES (?1)",
                [name],
            )?;
            self.from_id(ProductTypeId::new(id)).map(|h| self.s.created(h))
        })
    }

    /// Existing category with this name, or a new one
    ///
    /// # Errors
    /// * `InvalidArgument` - the name is blank
    pub fn find_or_create(&self, name: &str) -> Result<Handle<ProductType>> {
        match self.id_for_name(name)? {
            Some(id) => self.from_id(id),
            None => self.create(name),
        }
    }

    /// # Errors
    /// * `DataAccess` - the store failed
    pub fn list_all(&self) -> Result<Vec<Handle<ProductType>>> {
        let ids = self
            .s
            .query("SELECT category_id FROM product_type ORDER BY category_id", [])?
            .ids()?;
        resolve_all(ids, |id| self.from_id(id))
    }

    /// Rename a category
    ///
    /// # Errors
    /// * `AlreadyExists` - another category already has this name
    /// * `ConstraintViolation` - no category with this id
    pub fn set_name(&self, id: ProductTypeId, name: &str) -> Result<()> {
        require_non_blank("category_name", name)?;
        self.s.instrumented("set_category_name", || {
            if let Some(other) = self.id_for_name(name)? {
                if other != id {
                    return Err(StorefrontError::NameTaken {
                        kind: ProductType::KIND,
                        name: name.to_string(),
                    }
                    .into());
                }
            }
            self.s.execute_one(
                Self::TABLE,
                "UPDATE product_type SET category_name = ?1 WHERE category_id = ?2",
                rusqlite::params![name, id.as_i64()],
            )?;
            self.s
                .modify_cached::<ProductType>(id, |t| t.name = name.to_string());
            Ok(())
        })
    }

    /// Detach the category from every product, then delete it
    ///
    /// Cached products lose the category from their collections.
    ///
    /// # Errors
    /// * `NotFound` - no category with this id
    pub fn delete(&self, id: ProductTypeId) -> Result<()> {
        self.from_id(id)?;
        self.s.instrumented("delete_product_type", || {
            let detached = self.s.execute(
                "DELETE FROM product_category WHERE category_id = ?1",
                [id.as_i64()],
            )?;
            for product in self.s.caches().of::<Product>().handles() {
                if product.read().has_category(id) {
                    self.s.modify(&product, |p| {
                        p.categories.remove(id);
                    });
                }
            }
            self.s.execute_one(
                Self::TABLE,
                "DELETE FROM product_type WHERE category_id = ?1",
                [id.as_i64()],
            )?;
            self.s.forget::<ProductType>(id);
            tracing::debug!(
                component = module_path!(),
                entity.id = %id,
                row_count = detached,
                "category detached from products"
            );
            Ok(())
        })
    }

    fn id_for_name(&self, name: &str) -> Result<Option<ProductTypeId>> {
        let cursor = self.s.query(
            "SELECT category_id FROM product_type WHERE category_name = ?1",
            [name],
        )?;
        Ok(cursor.ids()?.first().copied().map(ProductTypeId::new))
    }
}

impl Repository for ProductTypes<'_, '_> {
    type Entity = ProductType;

    fn from_id(&self, id: ProductTypeId) -> Result<Handle<ProductType>> {
        ProductTypes::from_id(self, id)
    }

    fn list_all(&self) -> Result<Vec<Handle<ProductType>>> {
        ProductTypes::list_all(self)
    }

    fn delete(&self, id: ProductTypeId) -> Result<()> {
        ProductTypes::delete(self, id)
    }
}

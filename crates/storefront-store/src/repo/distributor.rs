//! Distributor repository
//!
//! A distributor owns the products that reference it: removing a product
//! from a distributor deletes the product.

use rusqlite::params;
use storefront_core::errors::{Result, StorefrontError};
use storefront_core::model::{
    AddressId, Children, Distributor, DistributorId, Entity, Handle, NewProduct, Product,
    ProductId,
};
use storefront_core::rules::require_non_blank;

use super::{resolve_all, setter, Repository};
use crate::hydration::ParentRows;
use crate::session::Session;

const HYDRATE_SQL: &str = "SELECT d.distributor_id, distributor_phone, address_id, p.product_id
     FROM distributor d
     LEFT JOIN product p ON d.distributor_id = p.distributor_id
     WHERE d.distributor_id = ?1
     ORDER BY p.product_id";

pub struct Distributors<'a, 's> {
    s: &'a Session<'s>,
}

impl<'a, 's> Distributors<'a, 's> {
    const TABLE: &'static str = "distributor";

    pub(crate) fn new(s: &'a Session<'s>) -> Self {
        Self { s }
    }

    /// # Errors
    /// * `NotFound` - no distributor with this id
    pub fn from_id(&self, id: DistributorId) -> Result<Handle<Distributor>> {
        self.s.fetch(id, || {
            let cursor = self.s.query(HYDRATE_SQL, [id.as_i64()])?;
            let rows =
                ParentRows::collect(&cursor, Distributor::KIND, "distributor_id", id.as_i64())?;
            let row = rows.scalars();

            let products = self.s.products();
            let owned = rows
                .child_ids("product_id")?
                .into_iter()
                .map(|p| products.from_id(ProductId::new(p)))
                .collect::<Result<Vec<_>>>()?;

            Ok(Distributor {
                id: DistributorId::new(rows.parent_id()),
                phone: row.string("distributor_phone")?,
                address_id: AddressId::new(row.int("address_id")?),
                products: Children::from_handles(owned),
            })
        })
    }

    /// # Errors
    /// * `InvalidArgument` - blank phone
    /// * `ConstraintViolation` - the address does not exist
    pub fn create(&self, phone: &str, address_id: AddressId) -> Result<Handle<Distributor>> {
        require_non_blank("distributor_phone", phone)?;
        self.s.instrumented("create_distributor", || {
            let id = self.s.insert(
                "INSERT INTO distributor (distributor_phone, address_id) VALUES (?1, ?2)",
                params![phone, address_id.as_i64()],
            )?;
            self.from_id(DistributorId::new(id)).map(|h| self.s.created(h))
        })
    }

    /// # Errors
    /// * `DataAccess` - the store failed
    pub fn list_all(&self) -> Result<Vec<Handle<Distributor>>> {
        let ids = self
            .s
            .query("SELECT distributor_id FROM distributor ORDER BY distributor_id", [])?
            .ids()?;
        resolve_all(ids, |id| self.from_id(id))
    }

    setter!(
        set_phone, "set_distributor_phone", DistributorId, String,
        "UPDATE distributor SET distributor_phone = ?1 WHERE distributor_id = ?2",
        |d, v| d.phone = v
    );

    /// # Errors
    /// * `ConstraintViolation` - unknown distributor or address
    pub fn set_address(&self, id: DistributorId, address_id: AddressId) -> Result<()> {
        self.s.instrumented("set_distributor_address", || {
            self.s.execute_one(
                Self::TABLE,
                "UPDATE distributor SET address_id = ?1 WHERE distributor_id = ?2",
                params![address_id.as_i64(), id.as_i64()],
            )?;
            self.s
                .modify_cached::<Distributor>(id, |d| d.address_id = address_id);
            Ok(())
        })
    }

    /// Create a product supplied by this distributor
    ///
    /// # Errors
    /// * `NotFound` - no distributor with this id
    /// * `InvalidArgument` - the product fields are invalid
    pub fn add_product(&self, id: DistributorId, mut new: NewProduct) -> Result<Handle<Product>> {
        // Hydrate first so the new product lands in the cached collection
        self.from_id(id)?;
        new.distributor_id = Some(id);
        self.s.products().create(new)
    }

    /// Delete one of the distributor's products
    ///
    /// # Errors
    /// * `NotFound` - the product is not supplied by this distributor
    /// * `ConstraintViolation` - the product is still ordered or wished for
    pub fn remove_product(&self, id: DistributorId, product: ProductId) -> Result<()> {
        let handle = self.from_id(id)?;
        if !handle.read().products.contains(product) {
            return Err(StorefrontError::NotInCollection {
                owner_kind: Distributor::KIND,
                owner_id: id.as_i64(),
                child_kind: Product::KIND,
                child_id: product.as_i64(),
            }
            .into());
        }
        self.s.products().delete(product)
    }

    /// Delete every product of the distributor
    ///
    /// # Errors
    /// * `ConstraintViolation` - a product is still referenced; nothing is
    ///   deleted
    pub fn clear_products(&self, id: DistributorId) -> Result<()> {
        let handle = self.from_id(id)?;
        self.s.instrumented("clear_products", || {
            let owned = handle.read().products.ids();
            for product in owned {
                self.s.products().delete(product)?;
            }
            Ok(())
        })
    }

    /// Delete the distributor's products, then the distributor
    ///
    /// # Errors
    /// * `NotFound` - no distributor with this id
    /// * `ConstraintViolation` - a product is still referenced
    pub fn delete(&self, id: DistributorId) -> Result<()> {
        let handle = self.from_id(id)?;
        self.s.instrumented("delete_distributor", || {
            let owned = handle.read().products.ids();
            for product in owned {
                self.s.products().delete(product)?;
            }
            self.s.execute_one(
                Self::TABLE,
                "DELETE FROM distributor WHERE distributor_id = ?1",
                [id.as_i64()],
            )?;
            self.s.forget::<Distributor>(id);
            Ok(())
        })
    }
}

impl Repository for Distributors<'_, '_> {
    type Entity = Distributor;

    fn from_id(&self, id: DistributorId) -> Result<Handle<Distributor>> {
        Distributors::from_id(self, id)
    }

    fn list_all(&self) -> Result<Vec<Handle<Distributor>>> {
        Distributors::list_all(self)
    }

    fn delete(&self, id: DistributorId) -> Result<()> {
        Distributors::delete(self, id)
    }
}

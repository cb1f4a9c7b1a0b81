//! Address repository
//!
//! An address's type set lives in `address_relation`, one row per type.

use storefront_core::errors::{ExError, ExErrorKind, Result, StorefrontError};
use storefront_core::model::{Address, AddressId, AddressType, Entity, Handle, NewAddress};
use storefront_core::rules::{diff_type_set, require_non_blank};

use super::{resolve_all, setter, Repository};
use crate::cursor::ResultCursor;
use crate::hydration::ParentRows;
use crate::session::Session;

const HYDRATE_SQL: &str = "SELECT a.address_id, street, city, state, zip_code, apt_number, country, ar.type
     FROM address a
     LEFT JOIN address_relation ar ON a.address_id = ar.address_id
     WHERE a.address_id = ?1
     ORDER BY ar.rowid";

pub struct Addresses<'a, 's> {
    s: &'a Session<'s>,
}

impl<'a, 's> Addresses<'a, 's> {
    const TABLE: &'static str = "address";

    pub(crate) fn new(s: &'a Session<'s>) -> Self {
        Self { s }
    }

    /// # Errors
    /// * `NotFound` - no address with this id
    pub fn from_id(&self, id: AddressId) -> Result<Handle<Address>> {
        self.s.fetch(id, || self.hydrate(id))
    }

    fn hydrate(&self, id: AddressId) -> Result<Address> {
        let cursor: ResultCursor = self.s.query(HYDRATE_SQL, [id.as_i64()])?;
        let rows = ParentRows::collect(&cursor, Address::KIND, "address_id", id.as_i64())?;
        let row = rows.scalars();
        let types = rows.distinct(|r| {
            r.opt_string("type")?
                .map(|t| t.parse::<AddressType>().map_err(ExError::from))
                .transpose()
        })?;

        Ok(Address {
            id: AddressId::new(rows.parent_id()),
            street: row.string("street")?,
            city: row.string("city")?,
            state: row.string("state")?,
            zip: row.string("zip_code")?,
            country: row.string("country")?,
            apartment: row.opt_string("apt_number")?,
            types,
        })
    }

    /// Insert an address with its type set
    ///
    /// # Errors
    /// * `InvalidArgument` - blank street/city or empty type set
    pub fn create(&self, new: NewAddress) -> Result<Handle<Address>> {
        require_non_blank("street", &new.street)?;
        require_non_blank("city", &new.city)?;
        let delta = diff_type_set(&[], &new.types)?;

        self.s.instrumented("create_address", || {
            let id = self.s.insert(
                "INSERT INTO address (street, city, state, zip_code, country, apt_number)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    new.street,
                    new.city,
                    new.state,
                    new.zip,
                    new.country,
                    new.apartment
                ],
            )?;
            for t in &delta.to_add {
                self.insert_type(id, *t)?;
            }
            self.from_id(AddressId::new(id)).map(|h| self.s.created(h))
        })
    }

    /// # Errors
    /// * `DataAccess` - the store failed
    pub fn list_all(&self) -> Result<Vec<Handle<Address>>> {
        let ids = self
            .s
            .query("SELECT address_id FROM address ORDER BY address_id", [])?
            .ids()?;
        resolve_all(ids, |id| self.from_id(id))
    }

    setter!(
        /// Replace the street line
        set_street, "set_street", AddressId, String,
        "UPDATE address SET street = ?1 WHERE address_id = ?2",
        |a, v| a.street = v
    );

    setter!(
        set_city, "set_city", AddressId, String,
        "UPDATE address SET city = ?1 WHERE address_id = ?2",
        |a, v| a.city = v
    );

    setter!(
        set_state, "set_state", AddressId, String,
        "UPDATE address SET state = ?1 WHERE address_id = ?2",
        |a, v| a.state = v
    );

    setter!(
        set_zip, "set_zip", AddressId, String,
        "UPDATE address SET zip_code = ?1 WHERE address_id = ?2",
        |a, v| a.zip = v
    );

    setter!(
        set_country, "set_country", AddressId, String,
        "UPDATE address SET country = ?1 WHERE address_id = ?2",
        |a, v| a.country = v
    );

    setter!(
        /// Set or clear the apartment number
        set_apartment, "set_apartment", AddressId, Option<String>,
        "UPDATE address SET apt_number = ?1 WHERE address_id = ?2",
        |a, v| a.apartment = v
    );

    /// Replace the type set
    ///
    /// Types no longer wanted are removed before new ones are added. The
    /// resulting cached order matches what a fresh hydration would read.
    ///
    /// # Errors
    /// * `InvalidArgument` - `types` is empty (nothing is changed)
    /// * `NotFound` - no address with this id
    pub fn set_types(&self, id: AddressId, types: &[AddressType]) -> Result<()> {
        let handle = self.from_id(id)?;
        let current = handle.read().types.clone();
        let delta = diff_type_set(&current, types)?;
        if delta.is_noop() {
            return Ok(());
        }

        self.s.instrumented("set_types", || {
            for t in &delta.to_remove {
                self.delete_type(id, *t)?;
            }
            for t in &delta.to_add {
                self.insert_type(id.as_i64(), *t)?;
            }
            self.s.modify(&handle, |a| {
                a.types.retain(|t| !delta.to_remove.contains(t));
                a.types.extend(delta.to_add.iter().copied());
            });
            Ok(())
        })
    }

    /// # Errors
    /// * `AlreadyExists` - the address already has this type
    pub fn add_type(&self, id: AddressId, address_type: AddressType) -> Result<()> {
        let handle = self.from_id(id)?;
        if handle.read().is_type(address_type) {
            return Err(StorefrontError::AlreadyExists {
                kind: Address::KIND,
                owner_id: id.as_i64(),
                what: format!("type {}", address_type),
            }
            .into());
        }

        self.s.instrumented("add_type", || {
            self.insert_type(id.as_i64(), address_type)?;
            self.s.modify(&handle, |a| a.types.push(address_type));
            Ok(())
        })
    }

    /// # Errors
    /// * `NotFound` - the address does not have this type
    /// * `InvalidArgument` - it is the only type left
    pub fn remove_type(&self, id: AddressId, address_type: AddressType) -> Result<()> {
        let handle = self.from_id(id)?;
        let current = handle.read().types.clone();
        if !current.contains(&address_type) {
            return Err(ExError::new(ExErrorKind::NotFound)
                .with_op("remove_type")
                .with_entity(Address::KIND.as_str(), id)
                .with_message(format!("address {} has no type {}", id, address_type)));
        }
        if current.len() == 1 {
            return Err(StorefrontError::EmptyTypeSet.into());
        }

        self.s.instrumented("remove_type", || {
            self.delete_type(id, address_type)?;
            self.s.modify(&handle, |a| a.types.retain(|t| *t != address_type));
            Ok(())
        })
    }

    /// # Errors
    /// * `NotFound` - no address with this id
    pub fn is_type(&self, id: AddressId, address_type: AddressType) -> Result<bool> {
        Ok(self.from_id(id)?.read().is_type(address_type))
    }

    /// Delete the type rows, then the address
    ///
    /// # Errors
    /// * `NotFound` - unknown address
    /// * `ConstraintViolation` - an order, payment or distributor still
    ///   references the address
    pub fn delete(&self, id: AddressId) -> Result<()> {
        self.from_id(id)?;
        self.s.instrumented("delete_address", || {
            self.s.execute(
                "DELETE FROM address_relation WHERE address_id = ?1",
                [id.as_i64()],
            )?;
            self.s.execute_one(
                Self::TABLE,
                "DELETE FROM address WHERE address_id = ?1",
                [id.as_i64()],
            )?;
            self.s.forget::<Address>(id);
            Ok(())
        })
    }

    fn insert_type(&self, id: i64, address_type: AddressType) -> Result<()> {
        self.s.insert(
            "INSERT INTO address_relation (address_id, type) VALUES (?1, ?2)",
            rusqlite::params![id, address_type.as_str()],
        )?;
        Ok(())
    }

    fn delete_type(&self, id: AddressId, address_type: AddressType) -> Result<()> {
        self.s.execute_one(
            "address_relation",
            "DELETE FROM address_relation WHERE address_id = ?1 AND type = ?2",
            rusqlite::params![id.as_i64(), address_type.as_str()],
        )
    }
}

impl Repository for Addresses<'_, '_> {
    type Entity = Address;

    fn from_id(&self, id: AddressId) -> Result<Handle<Address>> {
        Addresses::from_id(self, id)
    }

    fn list_all(&self) -> Result<Vec<Handle<Address>>> {
        Addresses::list_all(self)
    }

    fn delete(&self, id: AddressId) -> Result<()> {
        Addresses::delete(self, id)
    }
}

//! Payment repository
//!
//! Card number and CVV are only exposed when binding statement parameters.

use chrono::NaiveDate;
use rusqlite::params;
use storefront_core::errors::Result;
use storefront_core::model::{AddressId, Entity, Handle, NewPayment, PaymentId, PaymentInfo};
use storefront_core::rules::require_non_blank;
use storefront_core::types::Sensitive;

use super::{resolve_all, setter, Repository};
use crate::cursor::DATE_FORMAT;
use crate::session::Session;

pub struct Payments<'a, 's> {
    s: &'a Session<'s>,
}

impl<'a, 's> Payments<'a, 's> {
    const TABLE: &'static str = "payment_info";

    pub(crate) fn new(s: &'a Session<'s>) -> Self {
        Self { s }
    }

    /// # Errors
    /// * `NotFound` - no payment with this id
    pub fn from_id(&self, id: PaymentId) -> Result<Handle<PaymentInfo>> {
        self.s.fetch(id, || {
            let cursor = self.s.query(
                "SELECT payment_id, billing_address_id, firstname, lastname, card_number, exp_date, cvv
                 FROM payment_info WHERE payment_id = ?1",
                [id.as_i64()],
            )?;
            let row = cursor.require_first(PaymentInfo::KIND, id.as_i64())?;
            Ok(PaymentInfo {
                id: PaymentId::new(row.int("payment_id")?),
                billing_address_id: AddressId::new(row.int("billing_address_id")?),
                first_name: row.string("firstname")?,
                last_name: row.string("lastname")?,
                card_number: Sensitive::new(row.string("card_number")?),
                exp_date: row.date("exp_date")?,
                cvv: Sensitive::new(row.string("cvv")?),
            })
        })
    }

    /// # Errors
    /// * `InvalidArgument` - blank card number or CVV
    /// * `ConstraintViolation` - the billing address does not exist
    pub fn create(&self, new: NewPayment) -> Result<Handle<PaymentInfo>> {
        require_non_blank("card_number", new.card_number.expose())?;
        require_non_blank("cvv", new.cvv.expose())?;
        self.s.instrumented("create_payment", || {
            let id = self.s.insert(
                "INSERT INTO payment_info (billing_address_id, firstname, lastname, card_number, exp_date, cvv)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    new.billing_address_id.as_i64(),
                    new.first_name,
                    new.last_name,
                    new.card_number.expose(),
                    new.exp_date.format(DATE_FORMAT).to_string(),
                    new.cvv.expose()
                ],
            )?;
            self.from_id(PaymentId::new(id)).map(|h| self.s.created(h))
        })
    }

    /// # Errors
    /// * `DataAccess` - the store failed
    pub fn list_all(&self) -> Result<Vec<Handle<PaymentInfo>>> {
        let ids = self
            .s
            .query("SELECT payment_id FROM payment_info ORDER BY payment_id", [])?
            .ids()?;
        resolve_all(ids, |id| self.from_id(id))
    }

    /// # Errors
    /// * `ConstraintViolation` - unknown payment or address
    pub fn set_billing_address(&self, id: PaymentId, address_id: AddressId) -> Result<()> {
        self.s.instrumented("set_billing_address", || {
            self.s.execute_one(
                Self::TABLE,
                "UPDATE payment_info SET billing_address_id = ?1 WHERE payment_id = ?2",
                params![address_id.as_i64(), id.as_i64()],
            )?;
            self.s
                .modify_cached::<PaymentInfo>(id, |p| p.billing_address_id = address_id);
            Ok(())
        })
    }

    setter!(
        set_first_name, "set_payment_first_name", PaymentId, String,
        "UPDATE payment_info SET firstname = ?1 WHERE payment_id = ?2",
        |p, v| p.first_name = v
    );

    setter!(
        set_last_name, "set_payment_last_name", PaymentId, String,
        "UPDATE payment_info SET lastname = ?1 WHERE payment_id = ?2",
        |p, v| p.last_name = v
    );

    /// # Errors
    /// * `InvalidArgument` - blank card number
    /// * `ConstraintViolation` - no payment with this id
    pub fn set_card_number(&self, id: PaymentId, number: Sensitive<String>) -> Result<()> {
        require_non_blank("card_number", number.expose())?;
        self.s.instrumented("set_card_number", || {
            self.s.execute_one(
                Self::TABLE,
                "UPDATE payment_info SET card_number = ?1 WHERE payment_id = ?2",
                params![number.expose(), id.as_i64()],
            )?;
            self.s.modify_cached::<PaymentInfo>(id, |p| p.card_number = number);
            Ok(())
        })
    }

    /// # Errors
    /// * `ConstraintViolation` - no payment with this id
    pub fn set_exp_date(&self, id: PaymentId, exp_date: NaiveDate) -> Result<()> {
        self.s.instrumented("set_exp_date", || {
            self.s.execute_one(
                Self::TABLE,
                "UPDATE payment_info SET exp_date = ?1 WHERE payment_id = ?2",
                params![exp_date.format(DATE_FORMAT).to_string(), id.as_i64()],
            )?;
            self.s.modify_cached::<PaymentInfo>(id, |p| p.exp_date = exp_date);
            Ok(())
        })
    }

    /// # Errors
    /// * `InvalidArgument` - blank CVV
    /// * `ConstraintViolation` - no payment with this id
    pub fn set_cvv(&self, id: PaymentId, cvv: Sensitive<String>) -> Result<()> {
        require_non_blank("cvv", cvv.expose())?;
        self.s.instrumented("set_cvv", || {
            self.s.execute_one(
                Self::TABLE,
                "UPDATE payment_info SET cvv = ?1 WHERE payment_id = ?2",
                params![cvv.expose(), id.as_i64()],
            )?;
            self.s.modify_cached::<PaymentInfo>(id, |p| p.cvv = cvv);
            Ok(())
        })
    }

    /// # Errors
    /// * `NotFound` - unknown payment
    /// * `ConstraintViolation` - an order still uses it
    pub fn delete(&self, id: PaymentId) -> Result<()> {
        self.from_id(id)?;
        self.s.instrumented("delete_payment", || {
            self.s.execute_one(
                Self::TABLE,
                "DELETE FROM payment_info WHERE payment_id = ?1",
                [id.as_i64()],
            )?;
            self.s.forget::<PaymentInfo>(id);
            Ok(())
        })
    }
}

impl Repository for Payments<'_, '_> {
    type Entity = PaymentInfo;

    fn from_id(&self, id: PaymentId) -> Result<Handle<PaymentInfo>> {
        Payments::from_id(self, id)
    }

    fn list_all(&self) -> Result<Vec<Handle<PaymentInfo>>> {
        Payments::list_all(self)
    }

    fn delete(&self, id: PaymentId) -> Result<()> {
        Payments::delete(self, id)
    }
}

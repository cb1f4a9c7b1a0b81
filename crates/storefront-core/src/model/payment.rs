use chrono::NaiveDate;
use storefront_core_types::Sensitive;

use super::{AddressId, Entity, EntityKind, PaymentId};

/// Card payment details with a billing address
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentInfo {
    pub id: PaymentId,
    pub billing_address_id: AddressId,
    pub first_name: String,
    pub last_name: String,
    pub card_number: Sensitive<String>,
    pub exp_date: NaiveDate,
    pub cvv: Sensitive<String>,
}

impl PaymentInfo {
    /// Last four card digits, for display
    pub fn card_suffix(&self) -> String {
        let digits: Vec<char> = self.card_number.expose().chars().collect();
        let start = digits.len().saturating_sub(4);
        digits[start..].iter().collect()
    }
}

impl Entity for PaymentInfo {
    type Id = PaymentId;
    const KIND: EntityKind = EntityKind::PaymentInfo;

    fn id(&self) -> PaymentId {
        self.id
    }
}

/// Input for `payments().create`
#[derive(Debug, Clone, PartialEq)]
pub struct NewPayment {
    pub billing_address_id: AddressId,
    pub first_name: String,
    pub last_name: String,
    pub card_number: Sensitive<String>,
    pub exp_date: NaiveDate,
    pub cvv: Sensitive<String>,
}

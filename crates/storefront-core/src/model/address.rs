use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{AddressId, Entity, EntityKind};
use crate::errors::StorefrontError;

/// How an address is used; an address carries one or more of these
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressType {
    Shipping,
    Billing,
    Warehouse,
}

impl AddressType {
    pub const ALL: [AddressType; 3] = [
        AddressType::Shipping,
        AddressType::Billing,
        AddressType::Warehouse,
    ];

    /// Stored (lowercase) representation
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressType::Shipping => "shipping",
            AddressType::Billing => "billing",
            AddressType::Warehouse => "warehouse",
        }
    }
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AddressType {
    type Err = StorefrontError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shipping" => Ok(AddressType::Shipping),
            "billing" => Ok(AddressType::Billing),
            "warehouse" => Ok(AddressType::Warehouse),
            other => Err(StorefrontError::InvalidValue {
                field: "address_type",
                reason: format!("unknown address type '{}'", other),
            }),
        }
    }
}

/// Postal address with its set of usage types
#[derive(Debug, Clone, PartialEq)]
pub struct Address {
    pub id: AddressId,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub apartment: Option<String>,
    pub types: Vec<AddressType>,
}

impl Address {
    /// Whether the address is used as the given type
    pub fn is_type(&self, address_type: AddressType) -> bool {
        self.types.contains(&address_type)
    }
}

impl Entity for Address {
    type Id = AddressId;
    const KIND: EntityKind = EntityKind::Address;

    fn id(&self) -> AddressId {
        self.id
    }
}

/// Input for `addresses().create`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub apartment: Option<String>,
    pub types: Vec<AddressType>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_type_parse_is_case_insensitive() {
        assert_eq!("BILLING".parse::<AddressType>(), Ok(AddressType::Billing));
        assert_eq!(" shipping ".parse::<AddressType>(), Ok(AddressType::Shipping));
        assert!("home".parse::<AddressType>().is_err());
    }

    #[test]
    fn test_address_type_roundtrip_through_str() {
        for t in AddressType::ALL {
            assert_eq!(t.as_str().parse::<AddressType>(), Ok(t));
        }
    }

    #[test]
    fn test_is_type() {
        let address = Address {
            id: AddressId::new(1),
            street: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            zip: "62701".to_string(),
            country: "US".to_string(),
            apartment: None,
            types: vec![AddressType::Billing],
        };
        assert!(address.is_type(AddressType::Billing));
        assert!(!address.is_type(AddressType::Shipping));
    }
}

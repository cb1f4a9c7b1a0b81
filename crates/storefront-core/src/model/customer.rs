use serde::{Deserialize, Serialize};

use super::{Children, CustomerId, Entity, EntityKind, Order, Wishlist};

/// Customer, owner of orders and wishlists
#[derive(Debug, Clone)]
pub struct Customer {
    pub id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub orders: Children<Order>,
    pub wishlists: Children<Wishlist>,
}

impl Customer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Entity for Customer {
    type Id = CustomerId;
    const KIND: EntityKind = EntityKind::Customer;

    fn id(&self) -> CustomerId {
        self.id
    }
}

/// Input for `customers().create`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Children, DistributorId, Entity, EntityKind, ProductId, ProductTypeId};

/// Sellable product with stock level and category tags
#[derive(Debug, Clone)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub distributor_id: Option<DistributorId>,
    pub categories: Children<ProductType>,
}

impl Product {
    pub fn is_in_stock(&self) -> bool {
        self.quantity > 0
    }

    pub fn has_category(&self, id: ProductTypeId) -> bool {
        self.categories.contains(id)
    }
}

impl Entity for Product {
    type Id = ProductId;
    const KIND: EntityKind = EntityKind::Product;

    fn id(&self) -> ProductId {
        self.id
    }
}

/// Category tag; names are unique
#[derive(Debug, Clone, PartialEq)]
pub struct ProductType {
    pub id: ProductTypeId,
    pub name: String,
}

impl Entity for ProductType {
    type Id = ProductTypeId;
    const KIND: EntityKind = EntityKind::ProductType;

    fn id(&self) -> ProductTypeId {
        self.id
    }
}

/// One recorded change of a product's unit price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceChange {
    pub product_id: ProductId,
    pub old_price: f64,
    pub new_price: f64,
    pub changed_on: NaiveDate,
}

impl PriceChange {
    pub fn delta(&self) -> f64 {
        self.new_price - self.old_price
    }
}

/// Input for `products().create` and `distributors().add_product`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub distributor_id: Option<DistributorId>,
}

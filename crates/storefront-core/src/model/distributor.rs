use super::{AddressId, Children, DistributorId, Entity, EntityKind, Product};

/// Supplier of products, located at an address
#[derive(Debug, Clone)]
pub struct Distributor {
    pub id: DistributorId,
    pub phone: String,
    pub address_id: AddressId,
    pub products: Children<Product>,
}

impl Entity for Distributor {
    type Id = DistributorId;
    const KIND: EntityKind = EntityKind::Distributor;

    fn id(&self) -> DistributorId {
        self.id
    }
}

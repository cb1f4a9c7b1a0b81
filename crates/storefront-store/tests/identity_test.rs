// Integration tests for the identity cache: one live instance per stored row

mod common;

use storefront_core::model::{AddressId, AddressType, OrderId, PaymentId, ProductId, ProductTypeId};
use storefront_core::ExErrorKind;

#[test]
fn test_repeated_lookup_returns_same_instance() {
    let store = common::storefront();
    let s = store.session().unwrap();
    let product = common::product(&s, "Kite", 3, 12.5);
    let id = product.read().id;

    let a = s.products().from_id(id).unwrap();
    let b = s.products().from_id(id).unwrap();

    assert!(a.ptr_eq(&b));
    assert!(a.ptr_eq(&product));
}

#[test]
fn test_sessions_share_caches() {
    let store = common::storefront();
    let id = {
        let s = store.session().unwrap();
        common::customer(&s).read().id
    };

    let first = store.session().unwrap().customers().from_id(id).unwrap();
    let second = store.session().unwrap().customers().from_id(id).unwrap();
    assert!(first.ptr_eq(&second));
}

#[test]
fn test_list_all_shares_identity_with_point_lookups() {
    let store = common::storefront();
    let s = store.session().unwrap();
    let a = common::address(&s, &[AddressType::Shipping]);
    let b = common::address(&s, &[AddressType::Billing]);

    let all = s.addresses().list_all().unwrap();
    assert_eq!(all.len(), 2);
    assert!(all[0].ptr_eq(&a));
    assert!(all[1].ptr_eq(&b));
}

#[test]
fn test_setter_is_visible_through_every_holder() {
    let store = common::storefront();
    let s = store.session().unwrap();
    let product = common::product(&s, "Kite", 3, 12.5);
    let id = product.read().id;
    let other_holder = s.products().from_id(id).unwrap();

    s.products().set_name(id, "Box Kite".to_string()).unwrap();

    assert_eq!(product.read().name, "Box Kite");
    assert_eq!(other_holder.read().name, "Box Kite");
}

#[test]
fn test_deleted_entity_leaves_cache_and_store() {
    let store = common::storefront();
    let s = store.session().unwrap();
    let product = common::product(&s, "Kite", 3, 12.5);
    let id = product.read().id;

    s.products().delete(id).unwrap();

    assert!(!s.caches().products.contains(id));
    let err = s.products().from_id(id).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);
}

#[test]
fn test_unknown_id_is_not_found() {
    let store = common::storefront();
    let s = store.session().unwrap();

    let err = s.products().from_id(ProductId::new(404)).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);
    assert_eq!(err.entity_id(), Some("404"));
    assert_eq!(s.caches().total_len(), 0);
}

#[test]
fn test_deleting_unknown_id_is_not_found_for_every_kind() {
    let store = common::storefront();
    let s = store.session().unwrap();

    let errors = [
        s.addresses().delete(AddressId::new(404)).unwrap_err(),
        s.product_types().delete(ProductTypeId::new(404)).unwrap_err(),
        s.payments().delete(PaymentId::new(404)).unwrap_err(),
        s.orders().delete(OrderId::new(404)).unwrap_err(),
        s.products().delete(ProductId::new(404)).unwrap_err(),
    ];

    for err in errors {
        assert_eq!(err.kind(), ExErrorKind::NotFound, "{}", err);
    }
}

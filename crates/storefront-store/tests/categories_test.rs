// Integration tests for product categories

mod common;

use storefront_core::ExErrorKind;

#[test]
fn test_add_category_named_reuses_existing_category() {
    let store = common::storefront();
    let s = store.session().unwrap();
    let kite = common::product(&s, "Kite", 3, 2.5).id();
    let yoyo = common::product(&s, "Yo-yo", 3, 2.5).id();

    s.products().add_category_named(kite, "Toys").unwrap();
    s.products().add_category_named(yoyo, "Toys").unwrap();

    assert_eq!(common::count_rows(&s, "product_type"), 1);
    let toys = s.product_types().from_name("Toys").unwrap();
    let kite_categories = s.products().from_id(kite).unwrap().read().categories.ids();
    assert_eq!(kite_categories, vec![toys.id()]);
}

#[test]
fn test_duplicate_and_missing_categories() {
    let store = common::storefront();
    let s = store.session().unwrap();
    let kite = common::product(&s, "Kite", 3, 2.5).id();
    let toys = s.product_types().create("Toys").unwrap().id();
    let garden = s.product_types().create("Garden").unwrap().id();

    s.products().add_category(kite, toys).unwrap();
    let err = s.products().add_category(kite, toys).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::AlreadyExists);

    let err = s.products().remove_category(kite, garden).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);

    let err = s.product_types().create("Toys").unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::AlreadyExists);

    let err = s.product_types().from_name("Kitchen").unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);
}

#[test]
fn test_deleting_category_detaches_cached_products() {
    let store = common::storefront();
    let s = store.session().unwrap();
    let kite = common::product(&s, "Kite", 3, 2.5);
    let toys = s.product_types().create("Toys").unwrap().id();
    s.products().add_category(kite.id(), toys).unwrap();
    assert!(kite.read().has_category(toys));

    s.product_types().delete(toys).unwrap();

    assert!(!kite.read().has_category(toys));
    assert_eq!(common::count_rows(&s, "product_category"), 0);
    assert_eq!(
        s.inventory().products_in_category(toys).unwrap().len(),
        0
    );
}

#[test]
fn test_renamed_category_visible_on_products() {
    let store = common::storefront();
    let s = store.session().unwrap();
    let kite = common::product(&s, "Kite", 3, 2.5);
    s.products().add_category_named(kite.id(), "Toys").unwrap();
    let toys = s.product_types().from_name("Toys").unwrap();

    s.product_types().set_name(toys.id(), "Outdoor").unwrap();

    let first = kite.read().categories.first().cloned().unwrap();
    assert!(first.ptr_eq(&toys));
    assert_eq!(first.read().name, "Outdoor");
}

#[test]
fn test_clear_categories() {
    let store = common::storefront();
    let s = store.session().unwrap();
    let kite = common::product(&s, "Kite", 3, 2.5);
    for name in ["Toys", "Outdoor", "Summer"] {
        s.products().add_category_named(kite.id(), name).unwrap();
    }
    assert_eq!(kite.read().categories.len(), 3);

    s.products().clear_categories(kite.id()).unwrap();

    assert!(kite.read().categories.is_empty());
    assert_eq!(common::count_rows(&s, "product_type"), 3);
}

// Integration tests for catalogue-wide inventory queries

mod common;

use chrono::Utc;

#[test]
fn test_price_range_and_extremes() {
    let store = common::storefront();
    let s = store.session().unwrap();
    let cheap = common::product(&s, "Marble", 100, 0.5);
    let mid = common::product(&s, "Kite", 3, 12.5);
    let dear = common::product(&s, "Telescope", 1, 250.0);

    let in_range = s.inventory().products_in_price_range(0.5, 20.0).unwrap();
    assert_eq!(in_range.len(), 2);
    assert!(in_range[0].ptr_eq(&cheap));
    assert!(in_range[1].ptr_eq(&mid));

    let top = s.inventory().most_expensive().unwrap().unwrap();
    assert!(top.ptr_eq(&dear));
    let stocked = s.inventory().best_stocked().unwrap().unwrap();
    assert!(stocked.ptr_eq(&cheap));
}

#[test]
fn test_empty_catalogue_has_no_extremes() {
    let store = common::storefront();
    let s = store.session().unwrap();

    assert!(s.inventory().most_expensive().unwrap().is_none());
    assert!(s.inventory().best_stocked().unwrap().is_none());
    assert!(s.inventory().most_purchased().unwrap().is_none());
    assert!(s.inventory().largest_price_change().unwrap().is_none());
}

#[test]
fn test_demand_and_most_purchased() {
    let store = common::storefront();
    let s = store.session().unwrap();
    let (customer, order) = common::order(&s);
    let kite = common::product(&s, "Kite", 10, 1.0).id();
    let yoyo = common::product(&s, "Yo-yo", 10, 1.0).id();
    s.orders().add_item(order.id(), kite, 2).unwrap();
    s.orders().add_item(order.id(), yoyo, 5).unwrap();
    let wishlist = s.wishlists().create(customer.id(), "Later").unwrap();
    s.wishlists().add_item(wishlist.id(), kite, 7).unwrap();

    let top = s.inventory().most_purchased().unwrap().unwrap();
    assert_eq!(top.id(), yoyo);

    let orders = s.inventory().order_demand().unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!((orders[0].product_id, orders[0].count), (yoyo, 5));
    assert_eq!(orders[0].name, "Yo-yo");

    let wishes = s.inventory().wishlist_demand().unwrap();
    assert_eq!(wishes.len(), 1);
    assert_eq!((wishes[0].product_id, wishes[0].count), (kite, 7));
}

#[test]
fn test_price_change_queries() {
    let store = common::storefront();
    let s = store.session().unwrap();
    let kite = common::product(&s, "Kite", 10, 10.0).id();
    let yoyo = common::product(&s, "Yo-yo", 10, 2.0).id();
    s.products().set_unit_price(kite, 11.0).unwrap();
    s.products().set_unit_price(yoyo, 8.0).unwrap();
    s.products().set_unit_price(yoyo, 8.0).unwrap();

    let largest = s.inventory().largest_price_change().unwrap().unwrap();
    assert_eq!(largest.product_id, yoyo);
    assert_eq!(largest.delta(), 6.0);

    let today = s.inventory().price_changes_on(Utc::now().date_naive()).unwrap();
    assert_eq!(today.len(), 2);
}

// End-to-end flow: place an order, price it, trim it, delete it

mod common;

use chrono::NaiveDate;
use storefront_core::model::{NewOrder, OrderStatus};
use storefront_core::ExErrorKind;

#[test]
fn test_order_lifecycle() {
    let store = common::storefront();
    let s = store.session().unwrap();
    let (customer, order) = common::order(&s);
    let order_id = order.id();
    let payment_id = order.read().payment_id;
    let kite = common::product(&s, "Kite", 10, 2.5).id();
    let yoyo = common::product(&s, "Yo-yo", 10, 4.0).id();

    let kites = s.orders().add_item(order_id, kite, 2).unwrap();
    s.orders().add_item(order_id, yoyo, 3).unwrap();
    assert_eq!(s.orders().total_price(order_id).unwrap(), 17.0);
    assert_eq!(order.read().total_price(), 17.0);

    s.orders().remove_item(order_id, kites.id()).unwrap();
    assert_eq!(s.orders().total_price(order_id).unwrap(), 12.0);
    assert_eq!(common::count_rows(&s, "order_item"), 1);

    s.orders().delete(order_id).unwrap();

    let err = s.orders().from_id(order_id).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);
    let err = s.payments().from_id(payment_id).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);
    assert!(customer.read().orders.is_empty());
    assert_eq!(common::count_rows(&s, "order_item"), 0);
}

#[test]
fn test_item_price_is_snapshotted() {
    let store = common::storefront();
    let s = store.session().unwrap();
    let (_, order) = common::order(&s);
    let kite = common::product(&s, "Kite", 10, 2.5).id();
    let item = s.orders().add_item(order.id(), kite, 2).unwrap();

    s.products().set_unit_price(kite, 3.0).unwrap();

    assert_eq!(item.read().unit_price, 2.5);
    assert_eq!(s.orders().total_price(order.id()).unwrap(), 5.0);
    let history = s.products().price_history(kite).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].old_price, 2.5);
    assert_eq!(history[0].new_price, 3.0);
}

#[test]
fn test_new_order_uses_store_defaults() {
    let store = common::storefront();
    let s = store.session().unwrap();
    let (_, order) = common::order(&s);

    let o = order.read();
    assert_eq!(o.status, OrderStatus::Pending);
    assert_eq!(o.order_date, chrono::Utc::now().date_naive());
}

#[test]
fn test_explicit_status_and_date() {
    let store = common::storefront();
    let s = store.session().unwrap();
    let (customer, first) = common::order(&s);
    let (payment_id, shipping_id) = {
        let o = first.read();
        (o.payment_id, o.shipping_id)
    };
    let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();

    let order = s
        .orders()
        .create(
            NewOrder::new(customer.id(), payment_id, shipping_id)
                .with_status(OrderStatus::Shipped)
                .with_date(date),
        )
        .unwrap();

    assert_eq!(order.read().status, OrderStatus::Shipped);
    assert_eq!(order.read().order_date, date);
    assert_eq!(customer.read().orders.len(), 2);
}

#[test]
fn test_remove_last_and_remove_for_product() {
    let store = common::storefront();
    let s = store.session().unwrap();
    let (_, order) = common::order(&s);
    let order_id = order.id();
    let kite = common::product(&s, "Kite", 10, 1.0).id();
    let yoyo = common::product(&s, "Yo-yo", 10, 1.0).id();
    s.orders().add_item(order_id, kite, 1).unwrap();
    s.orders().add_item(order_id, yoyo, 1).unwrap();

    assert!(s.orders().remove_item_for_product(order_id, kite).unwrap());
    assert!(!s.orders().remove_item_for_product(order_id, kite).unwrap());
    assert!(s.orders().remove_last_item(order_id).unwrap());
    assert!(!s.orders().remove_last_item(order_id).unwrap());
    assert!(order.read().items.is_empty());
}

#[test]
fn test_wishlist_totals_follow_current_prices() {
    let store = common::storefront();
    let s = store.session().unwrap();
    let customer = common::customer(&s);
    let wishlist = s.wishlists().create(customer.id(), "Summer").unwrap();
    let kite = common::product(&s, "Kite", 10, 2.0).id();
    s.wishlists().add_item(wishlist.id(), kite, 3).unwrap();
    assert_eq!(s.wishlists().total_price(wishlist.id()).unwrap(), 6.0);

    s.products().set_unit_price(kite, 5.0).unwrap();

    assert_eq!(s.wishlists().total_price(wishlist.id()).unwrap(), 15.0);
    assert_eq!(customer.read().wishlists.len(), 1);
}

// Integration tests for structured operation logging
//
// Tests in this binary share one global capture, so every assertion filters
// on the session id.

mod common;

use storefront_core::logging_facility::init_test_capture;
use tracing::Level;

#[test]
fn test_successful_write_logs_start_and_end() {
    let capture = init_test_capture();
    let store = common::storefront();
    let s = store.session().unwrap();
    let session = s.id().to_string();

    common::customer(&s);

    assert_eq!(
        capture.op_sequence(&session, "create_customer"),
        vec!["start", "end"]
    );
    let end = capture.find(&session, "create_customer", "end").unwrap();
    assert!(end.field("duration_ms").is_some());
    assert!(end.component().unwrap().starts_with("storefront_store"));
}

#[test]
fn test_failed_write_logs_end_error_and_rollback() {
    let capture = init_test_capture();
    let store = common::storefront();
    let s = store.session().unwrap();
    let session = s.id().to_string();
    let customer = common::customer(&s);
    s.connection()
        .execute_batch(
            "CREATE TRIGGER keep_customers BEFORE DELETE ON customer
             BEGIN SELECT RAISE(ABORT, 'no'); END;",
        )
        .unwrap();

    s.customers().delete(customer.id()).unwrap_err();

    assert_eq!(
        capture.op_sequence(&session, "delete_customer"),
        vec!["start", "rollback", "end_error"]
    );
    let error = capture.find(&session, "delete_customer", "end_error").unwrap();
    assert_eq!(error.level, Level::ERROR);
    assert_eq!(error.field("err.code"), Some("ERR_CONSTRAINT_VIOLATION"));
    let rollback = capture.find(&session, "delete_customer", "rollback").unwrap();
    assert_eq!(rollback.level, Level::WARN);
}

#[test]
fn test_nested_operations_share_the_session_id() {
    let capture = init_test_capture();
    let store = common::storefront();
    let s = store.session().unwrap();
    let session = s.id().to_string();
    let (customer, order) = common::order(&s);
    let kite = common::product(&s, "Kite", 5, 1.0).id();
    s.orders().add_item(order.id(), kite, 1).unwrap();

    s.customers().delete(customer.id()).unwrap();

    for op in ["delete_customer", "delete_order", "delete_order_item", "delete_payment"] {
        assert_eq!(capture.op_sequence(&session, op), vec!["start", "end"], "op {}", op);
    }
}

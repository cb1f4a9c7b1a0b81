// Shared fixtures for storefront-store integration tests
#![allow(dead_code)]

use chrono::NaiveDate;
use storefront_core::model::{
    Address, AddressType, Customer, Handle, NewAddress, NewCustomer, NewOrder, NewPayment,
    NewProduct, Order, PaymentInfo, Product,
};
use storefront_core::types::Sensitive;
use storefront_store::{Session, Storefront};

pub fn storefront() -> Storefront {
    Storefront::in_memory()
}

pub fn address(s: &Session<'_>, types: &[AddressType]) -> Handle<Address> {
    s.addresses()
        .create(NewAddress {
            street: "12 Harbour Road".to_string(),
            city: "Portsmouth".to_string(),
            state: "Hampshire".to_string(),
            zip: "PO1 2AB".to_string(),
            country: "UK".to_string(),
            apartment: None,
            types: types.to_vec(),
        })
        .unwrap()
}

pub fn customer(s: &Session<'_>) -> Handle<Customer> {
    s.customers()
        .create(NewCustomer {
            first_name: "Ada".to_string(),
            last_name: "Byron".to_string(),
            email: "ada@example.com".to_string(),
            phone: "555-0100".to_string(),
        })
        .unwrap()
}

pub fn payment(s: &Session<'_>) -> Handle<PaymentInfo> {
    let billing = address(s, &[AddressType::Billing]);
    let billing_id = billing.read().id;
    s.payments()
        .create(NewPayment {
            billing_address_id: billing_id,
            first_name: "Ada".to_string(),
            last_name: "Byron".to_string(),
            card_number: Sensitive::new("4111111111111111".to_string()),
            exp_date: NaiveDate::from_ymd_opt(2030, 1, 31).unwrap(),
            cvv: Sensitive::new("123".to_string()),
        })
        .unwrap()
}

pub fn product(s: &Session<'_>, name: &str, quantity: i64, unit_price: f64) -> Handle<Product> {
    s.products()
        .create(NewProduct {
            name: name.to_string(),
            description: format!("{} for testing", name),
            quantity,
            unit_price,
            distributor_id: None,
        })
        .unwrap()
}

/// Customer with one empty order, shipped to a fresh address
pub fn order(s: &Session<'_>) -> (Handle<Customer>, Handle<Order>) {
    let customer = customer(s);
    let shipping = address(s, &[AddressType::Shipping]);
    let payment = payment(s);
    let new = NewOrder::new(customer.read().id, payment.read().id, shipping.read().id);
    let order = s.orders().create(new).unwrap();
    (customer, order)
}

/// Count rows in `table`, bypassing the repositories
pub fn count_rows(s: &Session<'_>, table: &str) -> i64 {
    s.connection()
        .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))
        .unwrap()
}

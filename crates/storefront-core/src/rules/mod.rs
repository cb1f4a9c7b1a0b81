//! Validation rules applied before any statement reaches the store

pub mod validation;

pub use validation::{
    check_quantity, diff_type_set, require_non_blank, require_non_negative_price, TypeSetDelta,
};

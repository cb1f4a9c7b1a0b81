use crate::errors::StorefrontError;
use crate::model::AddressType;

/// Guard for quantity-tracked join rows (order items, wishlist items)
///
/// The product must have stock (`available > 0`) and the requested
/// quantity must lie in `[0, available]`.
///
/// # Errors
/// * `OutOfStock` - `available` is zero or negative, whatever was requested
/// * `QuantityOutOfRange` - `requested` is negative or above `available`
pub fn check_quantity(product_id: i64, requested: i64, available: i64) -> Result<(), StorefrontError> {
    if available <= 0 {
        return Err(StorefrontError::OutOfStock { product_id });
    }
    if !(0..=available).contains(&requested) {
        return Err(StorefrontError::QuantityOutOfRange {
            requested,
            available,
        });
    }
    Ok(())
}

/// Changes needed to turn one address type set into another
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSetDelta {
    /// Types held now but absent from the target (applied first)
    pub to_remove: Vec<AddressType>,
    /// Types in the target not held now (applied second)
    pub to_add: Vec<AddressType>,
    /// De-duplicated target, in first-seen order
    pub target: Vec<AddressType>,
}

impl TypeSetDelta {
    pub fn is_noop(&self) -> bool {
        self.to_remove.is_empty() && self.to_add.is_empty()
    }
}

/// Symmetric difference between the current and the requested type set
///
/// # Errors
/// * `EmptyTypeSet` - the requested set is empty
pub fn diff_type_set(
    current: &[AddressType],
    requested: &[AddressType],
) -> Result<TypeSetDelta, StorefrontError> {
    if requested.is_empty() {
        return Err(StorefrontError::EmptyTypeSet);
    }

    let mut target: Vec<AddressType> = Vec::with_capacity(requested.len());
    for t in requested {
        if !target.contains(t) {
            target.push(*t);
        }
    }

    let mut to_remove: Vec<AddressType> = Vec::new();
    for t in current {
        if !target.contains(t) && !to_remove.contains(t) {
            to_remove.push(*t);
        }
    }

    let to_add = target
        .iter()
        .filter(|t| !current.contains(t))
        .copied()
        .collect();

    Ok(TypeSetDelta {
        to_remove,
        to_add,
        target,
    })
}

/// Reject empty or whitespace-only text for a required field
///
/// # Errors
/// * `InvalidValue` - the value is blank
pub fn require_non_blank(field: &'static str, value: &str) -> Result<(), StorefrontError> {
    if value.trim().is_empty() {
        return Err(StorefrontError::InvalidValue {
            field,
            reason: "must not be blank".to_string(),
        });
    }
    Ok(())
}

/// Reject negative or non-finite prices
///
/// # Errors
/// * `InvalidValue` - the price is negative, NaN or infinite
pub fn require_non_negative_price(field: &'static str, price: f64) -> Result<(), StorefrontError> {
    if !price.is_finite() || price < 0.0 {
        return Err(StorefrontError::InvalidValue {
            field,
            reason: format!("{} is not a valid price", price),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use AddressType::*;

    #[test]
    fn test_quantity_within_range() {
        assert!(check_quantity(1, 0, 5).is_ok());
        assert!(check_quantity(1, 5, 5).is_ok());
    }

    #[test]
    fn test_quantity_outside_range() {
        assert_eq!(
            check_quantity(1, 6, 5),
            Err(StorefrontError::QuantityOutOfRange {
                requested: 6,
                available: 5
            })
        );
        assert!(check_quantity(1, -1, 5).is_err());
    }

    #[test]
    fn test_zero_stock_rejects_even_zero_quantity() {
        assert_eq!(
            check_quantity(9, 0, 0),
            Err(StorefrontError::OutOfStock { product_id: 9 })
        );
    }

    #[test]
    fn test_adding_shipping_to_billing() {
        let delta = diff_type_set(&[Billing], &[Shipping, Billing]).unwrap();
        assert_eq!(delta.to_add, vec![Shipping]);
        assert!(delta.to_remove.is_empty());
        assert_eq!(delta.target, vec![Shipping, Billing]);
    }

    #[test]
    fn test_replacing_types() {
        let delta = diff_type_set(&[Billing, Warehouse], &[Shipping]).unwrap();
        assert_eq!(delta.to_remove, vec![Billing, Warehouse]);
        assert_eq!(delta.to_add, vec![Shipping]);
    }

    #[test]
    fn test_empty_target_rejected() {
        assert_eq!(diff_type_set(&[Billing], &[]), Err(StorefrontError::EmptyTypeSet));
    }

    #[test]
    fn test_duplicate_targets_collapse() {
        let delta = diff_type_set(&[], &[Billing, Billing, Shipping, Billing]).unwrap();
        assert_eq!(delta.target, vec![Billing, Shipping]);
        assert_eq!(delta.to_add, vec![Billing, Shipping]);
    }

    #[test]
    fn test_same_set_is_noop() {
        let delta = diff_type_set(&[Billing, Shipping], &[Shipping, Billing]).unwrap();
        assert!(delta.is_noop());
    }

    #[test]
    fn test_blank_and_price_checks() {
        assert!(require_non_blank("name", "  ").is_err());
        assert!(require_non_blank("name", "toys").is_ok());
        assert!(require_non_negative_price("unit_price", -0.5).is_err());
        assert!(require_non_negative_price("unit_price", f64::NAN).is_err());
        assert!(require_non_negative_price("unit_price", 0.0).is_ok());
    }

    fn type_strategy() -> impl Strategy<Value = AddressType> {
        prop_oneof![Just(Shipping), Just(Billing), Just(Warehouse)]
    }

    proptest! {
        #[test]
        fn prop_applying_delta_yields_target(
            current in proptest::collection::vec(type_strategy(), 0..4),
            requested in proptest::collection::vec(type_strategy(), 1..6),
        ) {
            let delta = diff_type_set(&current, &requested).unwrap();

            let mut applied: Vec<AddressType> = current.clone();
            applied.retain(|t| !delta.to_remove.contains(t));
            applied.extend(delta.to_add.iter().copied());
            applied.sort();
            applied.dedup();

            let mut expected = delta.target.clone();
            expected.sort();
            prop_assert_eq!(applied, expected);

            // removals and additions never overlap
            for t in &delta.to_add {
                prop_assert!(!delta.to_remove.contains(t));
            }
        }
    }
}

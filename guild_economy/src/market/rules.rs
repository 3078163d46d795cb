//! Land pricing rules.

use super::models::{Property, TransferKind};
use crate::economy::{EconomyError, EconomyResult, UserId};

/// Each change of hands multiplies the price by 6/5 (1.2x).
pub const ESCALATION_NUMERATOR: i64 = 6;
pub const ESCALATION_DENOMINATOR: i64 = 5;

/// Price after one escalation step, truncated toward zero.
pub fn escalated_price(price: i64) -> EconomyResult<i64> {
    let next = i128::from(price) * i128::from(ESCALATION_NUMERATOR)
        / i128::from(ESCALATION_DENOMINATOR);
    i64::try_from(next).map_err(|_| EconomyError::InvalidAmount(price))
}

/// Seller and price a buyer would face for a location.
///
/// An absent row, or a row without an owner, sells at its listed price (the
/// base price for a location nobody bought). An owned location sells at the
/// escalated price.
pub fn asking_price(
    property: Option<&Property>,
    base_price: i64,
) -> EconomyResult<(Option<UserId>, i64)> {
    match property {
        Some(Property {
            owner_id: Some(owner_id),
            price,
            ..
        }) => Ok((Some(*owner_id), escalated_price(*price)?)),
        Some(Property { price, .. }) => Ok((None, *price)),
        None => Ok((None, base_price)),
    }
}

/// Validated plan for one acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquisitionPlan {
    pub seller_id: Option<UserId>,
    pub price: i64,
    pub kind: TransferKind,
}

/// Check an acquisition against the buyer's locked balance.
pub fn plan_acquisition(
    property: Option<&Property>,
    buyer_id: UserId,
    buyer_balance: i64,
    base_price: i64,
) -> EconomyResult<AcquisitionPlan> {
    let (seller_id, price) = asking_price(property, base_price)?;

    if seller_id == Some(buyer_id) {
        return Err(EconomyError::SelfPurchase);
    }

    if buyer_balance < price {
        return Err(EconomyError::InsufficientFunds {
            available: buyer_balance,
            required: price,
        });
    }

    Ok(AcquisitionPlan {
        seller_id,
        price,
        kind: if seller_id.is_some() {
            TransferKind::Transfer
        } else {
            TransferKind::Purchase
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn owned(owner: UserId, price: i64) -> Property {
        Property {
            guild_id: 1,
            location_id: 10,
            owner_id: Some(owner),
            price,
            purchased_at: Utc::now(),
            last_transaction_at: None,
        }
    }

    #[test]
    fn test_escalation_truncates() {
        assert_eq!(escalated_price(1_000_000).unwrap(), 1_200_000);
        assert_eq!(escalated_price(1_200_000).unwrap(), 1_440_000);
        assert_eq!(escalated_price(7).unwrap(), 8);
        assert_eq!(escalated_price(4).unwrap(), 4);
        assert!(escalated_price(i64::MAX).is_err());
    }

    #[test]
    fn test_unowned_sells_at_base() {
        let plan = plan_acquisition(None, 5, 1_000_000, 1_000_000).unwrap();
        assert_eq!(plan.price, 1_000_000);
        assert_eq!(plan.seller_id, None);
        assert_eq!(plan.kind, TransferKind::Purchase);
    }

    #[test]
    fn test_owned_sells_escalated() {
        let property = owned(3, 1_000_000);
        let plan = plan_acquisition(Some(&property), 5, 2_000_000, 1_000_000).unwrap();
        assert_eq!(plan.price, 1_200_000);
        assert_eq!(plan.seller_id, Some(3));
        assert_eq!(plan.kind, TransferKind::Transfer);
    }

    #[test]
    fn test_self_purchase_rejected_before_funds() {
        let property = owned(5, 1_000_000);
        let err = plan_acquisition(Some(&property), 5, 0, 1_000_000).unwrap_err();
        assert!(matches!(err, EconomyError::SelfPurchase));
    }

    #[test]
    fn test_insufficient_funds() {
        let property = owned(3, 1_000_000);
        let err = plan_acquisition(Some(&property), 5, 1_199_999, 1_000_000).unwrap_err();
        assert!(matches!(
            err,
            EconomyError::InsufficientFunds {
                available: 1_199_999,
                required: 1_200_000
            }
        ));
    }
}

use crate::duty::outcome::{FeeLine, Fees};
use rust_decimal::Decimal;

/// Merchandise Processing Fee rate (0.3464%).
pub const MPF_RATE: Decimal = Decimal::from_parts(3464, 0, 0, false, 6);
/// MPF floor per entry.
pub const MPF_MIN: Decimal = Decimal::from_parts(2775, 0, 0, false, 2);
/// MPF ceiling per entry.
pub const MPF_MAX: Decimal = Decimal::from_parts(53840, 0, 0, false, 2);
/// Harbor Maintenance Fee rate (0.125%), uncapped.
pub const HMF_RATE: Decimal = Decimal::from_parts(125, 0, 0, false, 5);

/// `None` if the product does not fit a `Decimal`.
pub fn merchandise_processing_fee(declared_value: Decimal) -> Option<Decimal> {
    declared_value
        .checked_mul(MPF_RATE)
        .map(|fee| fee.clamp(MPF_MIN, MPF_MAX))
}

pub fn harbor_maintenance_fee(declared_value: Decimal) -> Option<Decimal> {
    declared_value.checked_mul(HMF_RATE)
}

/// Both statutory fees, unrounded, with rates in percentage points.
pub fn statutory_fees(declared_value: Decimal) -> Option<Fees> {
    Some(Fees {
        mpf: FeeLine {
            rate: (MPF_RATE * Decimal::ONE_HUNDRED).normalize(),
            amount: merchandise_processing_fee(declared_value)?,
        },
        hmf: FeeLine {
            rate: (HMF_RATE * Decimal::ONE_HUNDRED).normalize(),
            amount: harbor_maintenance_fee(declared_value)?,
        },
    })
}

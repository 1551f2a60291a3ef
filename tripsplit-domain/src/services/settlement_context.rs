//! Atomic-unit configuration for apportioning expenses.
//!
//! Amounts are split in integer multiples of the atomic unit (one cent at
//! scale 2), so every split is exact and balances stay zero-sum.

use crate::model::Money;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use thiserror::Error;

const MAX_SETTLEMENT_SCALE: u32 = 22;

/// Context for expense apportionment.
///
/// # Example
/// ```
/// use tripsplit_domain::{Money, SettlementContext};
///
/// let ctx = SettlementContext::cents();
/// assert_eq!(ctx.to_atomic_units_i64(Money::new(39222, 2)), Ok(39222));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SettlementContext {
    /// Number of decimal places of the atomic unit (e.g. 2 for USD, 0 for JPY).
    pub scale: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum AtomicUnitConversionError {
    #[error("amount has more decimal places than the atomic unit")]
    NonIntegral,
    #[error("amount does not fit into 64-bit atomic units")]
    OutOfRange,
    #[error("scale {scale} is not supported (max {max_supported})")]
    UnsupportedScale { scale: u32, max_supported: u32 },
}

impl SettlementContext {
    pub fn new(scale: u32) -> Result<Self, AtomicUnitConversionError> {
        validate_scale(scale)?;
        Ok(Self { scale })
    }

    /// Two decimal places.
    pub fn cents() -> Self {
        Self { scale: 2 }
    }

    pub fn atomic_unit(self) -> Money {
        Money::new(1, self.scale)
    }

    /// Converts a money amount to integer atomic units under this context scale.
    pub fn to_atomic_units_i64(self, amount: Money) -> Result<i64, AtomicUnitConversionError> {
        validate_scale(self.scale)?;
        let factor = Decimal::from_i128_with_scale(10_i128.pow(self.scale), 0);
        let units = amount
            .as_decimal()
            .checked_mul(factor)
            .ok_or(AtomicUnitConversionError::OutOfRange)?;
        if !units.fract().is_zero() {
            return Err(AtomicUnitConversionError::NonIntegral);
        }
        units.to_i64().ok_or(AtomicUnitConversionError::OutOfRange)
    }

    pub fn from_atomic_units(self, units: i64) -> Money {
        Money::new(units, self.scale)
    }
}

impl Default for SettlementContext {
    fn default() -> Self {
        Self::cents()
    }
}

fn validate_scale(scale: u32) -> Result<(), AtomicUnitConversionError> {
    if scale > MAX_SETTLEMENT_SCALE {
        return Err(AtomicUnitConversionError::UnsupportedScale {
            scale,
            max_supported: MAX_SETTLEMENT_SCALE,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::usd_integer(Money::from_i64(42), 2, Ok(4200))]
    #[case::usd_two_dp(Money::new(39222, 2), 2, Ok(39222))]
    #[case::jpy(Money::from_i64(3000), 0, Ok(3000))]
    #[case::usd_non_integral_units(
        Money::new(1234, 3),
        2,
        Err(AtomicUnitConversionError::NonIntegral)
    )]
    #[case::unsupported_scale(
        Money::from_i64(42),
        30,
        Err(AtomicUnitConversionError::UnsupportedScale {
            scale: 30,
            max_supported: 22,
        })
    )]
    #[case::out_of_range(
        Money::from_decimal("10000000000000000000".parse().expect("decimal")),
        0,
        Err(AtomicUnitConversionError::OutOfRange)
    )]
    fn to_atomic_units_i64_converts_by_scale(
        #[case] amount: Money,
        #[case] scale: u32,
        #[case] expected: Result<i64, AtomicUnitConversionError>,
    ) {
        let context = SettlementContext { scale };
        assert_eq!(context.to_atomic_units_i64(amount), expected);
    }

    #[test]
    fn new_rejects_unsupported_scale() {
        assert_eq!(
            SettlementContext::new(23),
            Err(AtomicUnitConversionError::UnsupportedScale {
                scale: 23,
                max_supported: 22,
            })
        );
        assert_eq!(SettlementContext::new(0), Ok(SettlementContext { scale: 0 }));
    }

    #[test]
    fn atomic_unit_round_trips() {
        let context = SettlementContext::cents();
        assert_eq!(context.atomic_unit(), Money::new(1, 2));
        assert_eq!(context.from_atomic_units(5022), Money::new(5022, 2));
    }
}

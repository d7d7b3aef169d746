//! Unit amounts for native currency and fungible tokens
//!
//! Uses rust_decimal for deterministic arithmetic. Escrowed quantities are
//! counted in indivisible base units (wei-style), so a valid amount is a
//! whole, strictly positive number. The Decimal mantissa (96 bits) is the
//! numeric domain of the asset adapter.

use rust_decimal::Decimal;

/// Largest quantity representable in the adapter's numeric domain.
pub const MAX_UNITS: Decimal = Decimal::MAX;

/// Check that `amount` is a whole, strictly positive number of base units.
pub fn is_whole_units(amount: Decimal) -> bool {
    amount > Decimal::ZERO && amount.normalize().scale() == 0
}

/// Convenience constructor for an amount of base units.
pub fn units(n: u64) -> Decimal {
    Decimal::from(n)
}

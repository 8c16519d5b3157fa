//! Limits and checked arithmetic for money amounts.

use rust_decimal::Decimal;

use crate::Error;

/// The largest amount accepted for an expense, a budget allocation or the
/// monthly income: one billion.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Check that `amount` is no larger than [MAX_AMOUNT].
///
/// # Errors
///
/// Returns [Error::AmountTooLarge] if `amount` is above the limit.
pub fn check_max_amount(amount: Decimal) -> Result<Decimal, Error> {
    if amount > MAX_AMOUNT {
        Err(Error::AmountTooLarge)
    } else {
        Ok(amount)
    }
}

/// Add up `amounts`, failing instead of panicking if the total does not fit in
/// a [Decimal].
///
/// # Errors
///
/// Returns [Error::AmountOverflow] if the sum overflows.
pub fn checked_sum<I>(amounts: I) -> Result<Decimal, Error>
where
    I: IntoIterator<Item = Decimal>,
{
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |total, amount| total.checked_add(amount))
        .ok_or(Error::AmountOverflow)
}

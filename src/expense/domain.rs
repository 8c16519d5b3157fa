//! Domain types for expenses.

use rust_decimal::Decimal;
use serde::Deserialize;
use time::{Date, Month, OffsetDateTime};

use crate::{
    Error, analytics::CategoryMetadata, auth::UserID, category::CategoryId, money::check_max_amount,
};

/// The database ID of an expense.
pub type ExpenseId = i64;

/// The amount of money spent. Always greater than zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpenseAmount(Decimal);

impl ExpenseAmount {
    /// Create an expense amount.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidAmount] if `amount` is zero or negative, or
    /// [Error::AmountTooLarge] if it is above [crate::MAX_AMOUNT].
    pub fn new(amount: Decimal) -> Result<Self, Error> {
        if amount <= Decimal::ZERO {
            Err(Error::InvalidAmount)
        } else {
            check_max_amount(amount).map(Self)
        }
    }

    /// Create an expense amount without checking that it is positive.
    ///
    /// Only use this for amounts read back from the database.
    pub fn new_unchecked(amount: Decimal) -> Self {
        Self(amount)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

/// A single purchase logged against one of the user's categories.
#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    pub id: ExpenseId,
    pub user_id: UserID,
    pub category_id: CategoryId,
    pub amount: ExpenseAmount,
    pub description: Option<String>,
    /// When the expense happened, in UTC.
    pub created_at: OffsetDateTime,
}

/// The data needed to insert an expense.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub user_id: UserID,
    pub category_id: CategoryId,
    pub amount: ExpenseAmount,
    pub description: Option<String>,
    pub created_at: OffsetDateTime,
}

/// An expense together with the name and color of its category.
///
/// `category` is `None` when the expense points at a category row that no
/// longer exists.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorisedExpense {
    pub expense: Expense,
    pub category: Option<CategoryMetadata>,
}

/// An inclusive range of UTC calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    start: Date,
    end: Date,
}

impl DateWindow {
    /// Create a window covering `start` through `end`, both inclusive.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidDateWindow] if `start` is after `end`.
    pub fn new(start: Date, end: Date) -> Result<Self, Error> {
        if start > end {
            return Err(Error::InvalidDateWindow(start, end));
        }

        Ok(Self { start, end })
    }

    /// The window covering every day of `month` in `year`.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidDate] if `year` is outside the supported range.
    pub fn for_month(year: i32, month: Month) -> Result<Self, Error> {
        let start = Date::from_calendar_date(year, month, 1)
            .map_err(|error| Error::InvalidDate(error.to_string()))?;
        let end = first_of_next_month(start)
            .and_then(|date| date.previous_day())
            .ok_or_else(|| Error::InvalidDate(format!("{year}-{month} has no end")))?;

        Ok(Self { start, end })
    }

    pub fn start(&self) -> Date {
        self.start
    }

    pub fn end(&self) -> Date {
        self.end
    }

    /// Whether `date` falls inside the window.
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}

/// The first day of the month after the month of `date`.
pub(crate) fn first_of_next_month(date: Date) -> Option<Date> {
    let (year, month) = match date.month() {
        Month::December => (date.year() + 1, Month::January),
        month => (date.year(), month.next()),
    };

    Date::from_calendar_date(year, month, 1).ok()
}

/// The form data for creating or editing an expense.
#[derive(Debug, Clone, Deserialize)]
pub struct ExpenseFormData {
    pub category_id: CategoryId,
    pub amount: Decimal,
    #[serde(default)]
    pub description: Option<String>,
    pub date: Date,
}

impl ExpenseFormData {
    /// Check the amount and date, returning the validated amount and the
    /// trimmed description (`None` when blank).
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidAmount] for a non-positive amount or
    /// [Error::FutureDate] if the date is after `today`.
    pub fn validate(&self, today: Date) -> Result<(ExpenseAmount, Option<String>), Error> {
        let amount = ExpenseAmount::new(self.amount)?;

        if self.date > today {
            return Err(Error::FutureDate(self.date));
        }

        let description = self
            .description
            .as_deref()
            .map(str::trim)
            .filter(|description| !description.is_empty())
            .map(str::to_owned);

        Ok((amount, description))
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use time::{Month, macros::date};

    use crate::{Error, MAX_AMOUNT};

    use super::{DateWindow, ExpenseAmount, ExpenseFormData};

    #[test]
    fn amount_must_be_positive() {
        assert_eq!(ExpenseAmount::new(Decimal::ZERO), Err(Error::InvalidAmount));
        assert_eq!(
            ExpenseAmount::new(Decimal::new(-100, 2)),
            Err(Error::InvalidAmount)
        );
        assert!(ExpenseAmount::new(Decimal::new(1, 2)).is_ok());
    }

    #[test]
    fn amount_is_capped() {
        assert!(ExpenseAmount::new(MAX_AMOUNT).is_ok());
        assert_eq!(
            ExpenseAmount::new(MAX_AMOUNT + Decimal::ONE),
            Err(Error::AmountTooLarge)
        );
        assert_eq!(ExpenseAmount::new(Decimal::MAX), Err(Error::AmountTooLarge));
    }

    #[test]
    fn window_rejects_start_after_end() {
        let result = DateWindow::new(date!(2024 - 02 - 01), date!(2024 - 01 - 31));

        assert_eq!(
            result,
            Err(Error::InvalidDateWindow(
                date!(2024 - 02 - 01),
                date!(2024 - 01 - 31)
            ))
        );
    }

    #[test]
    fn single_day_window_is_valid() {
        let window = DateWindow::new(date!(2024 - 01 - 31), date!(2024 - 01 - 31)).unwrap();

        assert!(window.contains(date!(2024 - 01 - 31)));
        assert!(!window.contains(date!(2024 - 02 - 01)));
    }

    #[test]
    fn month_window_covers_leap_february() {
        let window = DateWindow::for_month(2024, Month::February).unwrap();

        assert_eq!(window.start(), date!(2024 - 02 - 01));
        assert_eq!(window.end(), date!(2024 - 02 - 29));
    }

    #[test]
    fn month_window_handles_december() {
        let window = DateWindow::for_month(2023, Month::December).unwrap();

        assert_eq!(window.end(), date!(2023 - 12 - 31));
    }

    #[test]
    fn form_validation_trims_description() {
        let form = ExpenseFormData {
            category_id: 1,
            amount: Decimal::new(1250, 2),
            description: Some("  ".to_owned()),
            date: date!(2024 - 01 - 05),
        };

        let (amount, description) = form.validate(date!(2024 - 01 - 05)).unwrap();

        assert_eq!(amount.as_decimal(), Decimal::new(1250, 2));
        assert_eq!(description, None);
    }

    #[test]
    fn form_validation_rejects_future_date() {
        let form = ExpenseFormData {
            category_id: 1,
            amount: Decimal::ONE,
            description: None,
            date: date!(2024 - 01 - 06),
        };

        assert_eq!(
            form.validate(date!(2024 - 01 - 05)),
            Err(Error::FutureDate(date!(2024 - 01 - 06)))
        );
    }
}

//! Storage for per-user settings.

use rusqlite::{Connection, OptionalExtension};
use rust_decimal::Decimal;

use crate::{Error, auth::UserID, db::get_decimal, money::check_max_amount};

/// A user's monthly income. Never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlyIncome(Decimal);

impl MonthlyIncome {
    /// Create a monthly income.
    ///
    /// # Errors
    ///
    /// Returns [Error::NegativeIncome] if `amount` is less than zero, or
    /// [Error::AmountTooLarge] if it is above [crate::MAX_AMOUNT].
    pub fn new(amount: Decimal) -> Result<Self, Error> {
        if amount < Decimal::ZERO {
            Err(Error::NegativeIncome)
        } else {
            check_max_amount(amount).map(Self)
        }
    }

    /// The income as a decimal amount.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

/// Create the user_settings table, which holds at most one row per user.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_settings_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user_settings (
            user_id INTEGER PRIMARY KEY,
            monthly_income TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

/// Get the monthly income for `user_id`, or zero if it was never set.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails or the stored amount is not a number.
pub fn get_monthly_income(user_id: UserID, connection: &Connection) -> Result<Decimal, Error> {
    let income = connection
        .prepare("SELECT monthly_income FROM user_settings WHERE user_id = :user_id")?
        .query_row(&[(":user_id", &user_id.as_i64())], |row| get_decimal(row, 0))
        .optional()?;

    Ok(income.unwrap_or(Decimal::ZERO))
}

/// Insert or replace the monthly income for `user_id`.
///
/// # Errors
/// Returns [Error::SqlError] if the upsert fails.
pub fn set_monthly_income(
    user_id: UserID,
    income: MonthlyIncome,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO user_settings (user_id, monthly_income) VALUES (?1, ?2)
        ON CONFLICT(user_id) DO UPDATE SET monthly_income = excluded.monthly_income",
        (user_id.as_i64(), income.as_decimal().to_string()),
    )?;

    Ok(())
}

//! Creates the application's SQLite schema and holds helpers shared by the
//! per-feature database code.

use std::str::FromStr;

use rusqlite::{Connection, Row, types::Type};
use rust_decimal::Decimal;

use crate::{
    auth::create_user_table, category::create_category_table, expense::create_expense_table,
    settings::create_settings_table,
};

/// Create every table the app needs.
///
/// All tables are created inside one transaction, so a failure leaves the
/// database untouched. Existing tables are left as is.
///
/// # Errors
///
/// Returns an error if any of the tables could not be created.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    let transaction = connection.unchecked_transaction()?;

    create_user_table(&transaction)?;
    create_category_table(&transaction)?;
    create_expense_table(&transaction)?;
    create_settings_table(&transaction)?;

    transaction.commit()
}

/// Read a monetary amount that was stored as TEXT.
///
/// Amounts are stored as their decimal string so that no precision is lost
/// to SQLite's floating point REAL type.
pub fn get_decimal(row: &Row, index: usize) -> Result<Decimal, rusqlite::Error> {
    let raw: String = row.get(index)?;

    Decimal::from_str(&raw)
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(error)))
}

//! Read access to a user's expenses joined with their category metadata.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row};

use crate::{
    Error,
    analytics::CategoryMetadata,
    auth::UserID,
    expense::{CategorisedExpense, DateWindow, db::map_expense_row},
};

/// Fetches expenses for the monthly spending summaries.
///
/// Handlers get an implementation through the app state, so tests can swap in
/// their own.
pub trait ExpenseStore {
    /// The expenses of `user` whose creation date falls inside `window`
    /// (every expense when `window` is `None`), newest first.
    ///
    /// # Errors
    ///
    /// Returns [Error::Unauthenticated] if `user` is `None`, or a storage
    /// error ([Error::SqlError], [Error::DatabaseLockError]) unchanged.
    fn get_expenses(
        &self,
        user: Option<UserID>,
        window: Option<DateWindow>,
    ) -> Result<Vec<CategorisedExpense>, Error>;
}

/// An [ExpenseStore] backed by the app's SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteExpenseStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteExpenseStore {
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

const SELECT_CATEGORISED_EXPENSES: &str = "SELECT
        expense.id, expense.user_id, expense.category_id, expense.amount,
        expense.description, expense.created_at, category.name, category.color
    FROM expense
    LEFT JOIN category
        ON category.id = expense.category_id AND category.user_id = expense.user_id
    WHERE expense.user_id = :user_id";

impl ExpenseStore for SQLiteExpenseStore {
    fn get_expenses(
        &self,
        user: Option<UserID>,
        window: Option<DateWindow>,
    ) -> Result<Vec<CategorisedExpense>, Error> {
        let user_id = user.ok_or(Error::Unauthenticated)?;

        let connection = self
            .connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let result: Result<Vec<CategorisedExpense>, rusqlite::Error> = match window {
            Some(window) => connection
                .prepare(&format!(
                    "{SELECT_CATEGORISED_EXPENSES}
                    AND date(expense.created_at) BETWEEN :start AND :end
                    ORDER BY expense.created_at DESC, expense.id DESC"
                ))?
                .query_map(
                    rusqlite::named_params! {
                        ":user_id": user_id.as_i64(),
                        ":start": window.start(),
                        ":end": window.end(),
                    },
                    map_categorised_row,
                )?
                .collect(),
            None => connection
                .prepare(&format!(
                    "{SELECT_CATEGORISED_EXPENSES}
                    ORDER BY expense.created_at DESC, expense.id DESC"
                ))?
                .query_map(
                    rusqlite::named_params! { ":user_id": user_id.as_i64() },
                    map_categorised_row,
                )?
                .collect(),
        };

        result.map_err(Error::from)
    }
}

fn map_categorised_row(row: &Row) -> Result<CategorisedExpense, rusqlite::Error> {
    let expense = map_expense_row(row)?;
    let name: Option<String> = row.get(6)?;
    let color: Option<String> = row.get(7)?;

    let category = match (name, color) {
        (Some(name), Some(color)) => Some(CategoryMetadata { name, color }),
        _ => None,
    };

    Ok(CategorisedExpense { expense, category })
}

//! Database operations for expenses.

use rusqlite::{Connection, Row};
use time::{Month, OffsetDateTime, UtcOffset};

use crate::{
    Error,
    auth::UserID,
    category::{CategoryId, get_category},
    db::get_decimal,
    expense::{DateWindow, Expense, ExpenseAmount, ExpenseId, NewExpense},
};

const EXPENSE_COLUMNS: &str = "id, user_id, category_id, amount, description, created_at";

/// Create the expense table.
///
/// There is no foreign key on `category_id`. Deleting a category removes its
/// expenses explicitly, see [crate::category::delete_category].
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            category_id INTEGER NOT NULL,
            amount TEXT NOT NULL,
            description TEXT,
            created_at TEXT NOT NULL
        )",
        (),
    )?;

    // Every read filters by user and most sort by time.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_expense_user_created_at
        ON expense(user_id, created_at)",
        (),
    )?;

    Ok(())
}

/// Insert an expense after checking that its category belongs to the same user.
///
/// # Errors
/// Returns [Error::InvalidCategory] if the category does not exist or is
/// owned by another user, or [Error::SqlError] for any other SQL error.
pub fn create_expense(expense: NewExpense, connection: &Connection) -> Result<Expense, Error> {
    ensure_category_belongs_to_user(expense.category_id, expense.user_id, connection)?;

    let created_at = expense.created_at.to_offset(UtcOffset::UTC);

    connection.execute(
        "INSERT INTO expense (user_id, category_id, amount, description, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            expense.user_id.as_i64(),
            expense.category_id,
            expense.amount.as_decimal().to_string(),
            expense.description.as_deref(),
            created_at,
        ),
    )?;

    Ok(Expense {
        id: connection.last_insert_rowid(),
        user_id: expense.user_id,
        category_id: expense.category_id,
        amount: expense.amount,
        description: expense.description,
        created_at,
    })
}

/// Retrieve one of `user_id`'s expenses by ID.
pub fn get_expense(
    expense_id: ExpenseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Expense, Error> {
    connection
        .prepare(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expense WHERE id = :id AND user_id = :user_id"
        ))?
        .query_row(
            &[(":id", &expense_id), (":user_id", &user_id.as_i64())],
            map_expense_row,
        )
        .map_err(Error::from)
}

/// Overwrite an expense's category, amount, description and timestamp.
///
/// # Errors
/// Returns [Error::InvalidCategory] if `category_id` is not one of the
/// user's categories, or [Error::UpdateMissingExpense] if the expense does not
/// exist or belongs to another user.
pub fn update_expense(
    expense_id: ExpenseId,
    expense: NewExpense,
    connection: &Connection,
) -> Result<Expense, Error> {
    ensure_category_belongs_to_user(expense.category_id, expense.user_id, connection)?;

    let created_at = expense.created_at.to_offset(UtcOffset::UTC);

    let rows_affected = connection.execute(
        "UPDATE expense
        SET category_id = ?1, amount = ?2, description = ?3, created_at = ?4
        WHERE id = ?5 AND user_id = ?6",
        (
            expense.category_id,
            expense.amount.as_decimal().to_string(),
            expense.description.as_deref(),
            created_at,
            expense_id,
            expense.user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingExpense);
    }

    Ok(Expense {
        id: expense_id,
        user_id: expense.user_id,
        category_id: expense.category_id,
        amount: expense.amount,
        description: expense.description,
        created_at,
    })
}

/// Delete one of `user_id`'s expenses.
///
/// # Errors
/// Returns [Error::DeleteMissingExpense] if no such expense exists for the user.
pub fn delete_expense(
    expense_id: ExpenseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM expense WHERE id = ?1 AND user_id = ?2",
        (expense_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        Err(Error::DeleteMissingExpense)
    } else {
        Ok(())
    }
}

/// All of `user_id`'s expenses in one category, newest first.
pub fn get_expenses_by_category(
    category_id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    connection
        .prepare(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expense
            WHERE category_id = :category_id AND user_id = :user_id
            ORDER BY created_at DESC, id DESC"
        ))?
        .query_map(
            &[(":category_id", &category_id), (":user_id", &user_id.as_i64())],
            map_expense_row,
        )?
        .map(|maybe_expense| maybe_expense.map_err(Error::from))
        .collect()
}

/// All of `user_id`'s expenses in the given calendar month (UTC), newest first.
pub fn get_expenses_by_month(
    year: i32,
    month: Month,
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    let window = DateWindow::for_month(year, month)?;

    connection
        .prepare(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expense
            WHERE user_id = :user_id AND date(created_at) BETWEEN :start AND :end
            ORDER BY created_at DESC, id DESC"
        ))?
        .query_map(
            rusqlite::named_params! {
                ":user_id": user_id.as_i64(),
                ":start": window.start(),
                ":end": window.end(),
            },
            map_expense_row,
        )?
        .map(|maybe_expense| maybe_expense.map_err(Error::from))
        .collect()
}

fn ensure_category_belongs_to_user(
    category_id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    match get_category(category_id, user_id, connection) {
        Ok(_) => Ok(()),
        Err(Error::NotFound) => Err(Error::InvalidCategory(category_id)),
        Err(error) => Err(error),
    }
}

/// Map a row selected with the expense columns, in order, to an [Expense].
pub(super) fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    let created_at: OffsetDateTime = row.get(5)?;

    Ok(Expense {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        category_id: row.get(2)?,
        amount: ExpenseAmount::new_unchecked(get_decimal(row, 3)?),
        description: row.get(4)?,
        created_at: created_at.to_offset(UtcOffset::UTC),
    })
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use time::{Month, macros::datetime};

    use crate::{
        Error,
        auth::{User, UserID},
        category::test_category,
        expense::{ExpenseAmount, NewExpense},
        test_utils::{create_other_user, test_db_with_user},
    };

    use super::{
        create_expense, delete_expense, get_expense, get_expenses_by_category,
        get_expenses_by_month, update_expense,
    };

    fn new_expense(
        user_id: UserID,
        category_id: i64,
        cents: i64,
        created_at: time::OffsetDateTime,
    ) -> NewExpense {
        NewExpense {
            user_id,
            category_id,
            amount: ExpenseAmount::new(Decimal::new(cents, 2)).unwrap(),
            description: Some("Test".to_owned()),
            created_at,
        }
    }

    fn setup() -> (Connection, User) {
        let (connection, user) = test_db_with_user();
        let connection = std::sync::Arc::into_inner(connection)
            .unwrap()
            .into_inner()
            .unwrap();

        (connection, user)
    }

    #[test]
    fn create_and_get_expense() {
        let (connection, user) = setup();
        let category = test_category(user.id, "Groceries", &connection);

        let created = create_expense(
            new_expense(user.id, category.id, 1999, datetime!(2024-01-05 10:30 UTC)),
            &connection,
        )
        .unwrap();

        let got = get_expense(created.id, user.id, &connection).unwrap();
        assert_eq!(got, created);
        assert_eq!(got.amount.as_decimal(), Decimal::new(1999, 2));
    }

    #[test]
    fn create_normalizes_to_utc() {
        let (connection, user) = setup();
        let category = test_category(user.id, "Groceries", &connection);

        let created = create_expense(
            new_expense(user.id, category.id, 100, datetime!(2024-01-05 10:30 +13)),
            &connection,
        )
        .unwrap();

        assert_eq!(created.created_at, datetime!(2024-01-04 21:30 UTC));
        assert_eq!(
            get_expense(created.id, user.id, &connection)
                .unwrap()
                .created_at,
            datetime!(2024-01-04 21:30 UTC)
        );
    }

    #[test]
    fn create_rejects_other_users_category() {
        let (connection, user) = setup();
        let other_user = create_other_user(&connection).id;
        let category = test_category(other_user, "Groceries", &connection);

        let result = create_expense(
            new_expense(user.id, category.id, 100, datetime!(2024-01-05 10:30 UTC)),
            &connection,
        );

        assert_eq!(result, Err(Error::InvalidCategory(category.id)));
    }

    #[test]
    fn get_expense_of_other_user_is_not_found() {
        let (connection, user) = setup();
        let category = test_category(user.id, "Groceries", &connection);
        let created = create_expense(
            new_expense(user.id, category.id, 100, datetime!(2024-01-05 10:30 UTC)),
            &connection,
        )
        .unwrap();

        let result = get_expense(created.id, UserID::new(user.id.as_i64() + 1), &connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn update_expense_changes_fields() {
        let (connection, user) = setup();
        let groceries = test_category(user.id, "Groceries", &connection);
        let transport = test_category(user.id, "Transport", &connection);
        let created = create_expense(
            new_expense(user.id, groceries.id, 100, datetime!(2024-01-05 10:30 UTC)),
            &connection,
        )
        .unwrap();

        let updated = update_expense(
            created.id,
            NewExpense {
                description: None,
                ..new_expense(user.id, transport.id, 250, datetime!(2024-01-06 08:00 UTC))
            },
            &connection,
        )
        .unwrap();

        assert_eq!(get_expense(created.id, user.id, &connection), Ok(updated.clone()));
        assert_eq!(updated.category_id, transport.id);
        assert_eq!(updated.description, None);
    }

    #[test]
    fn update_missing_expense_fails() {
        let (connection, user) = setup();
        let category = test_category(user.id, "Groceries", &connection);

        let result = update_expense(
            42,
            new_expense(user.id, category.id, 100, datetime!(2024-01-05 10:30 UTC)),
            &connection,
        );

        assert_eq!(result, Err(Error::UpdateMissingExpense));
    }

    #[test]
    fn delete_expense_removes_row() {
        let (connection, user) = setup();
        let category = test_category(user.id, "Groceries", &connection);
        let created = create_expense(
            new_expense(user.id, category.id, 100, datetime!(2024-01-05 10:30 UTC)),
            &connection,
        )
        .unwrap();

        assert_eq!(delete_expense(created.id, user.id, &connection), Ok(()));
        assert_eq!(
            delete_expense(created.id, user.id, &connection),
            Err(Error::DeleteMissingExpense)
        );
    }

    #[test]
    fn get_by_category_is_newest_first() {
        let (connection, user) = setup();
        let groceries = test_category(user.id, "Groceries", &connection);
        let transport = test_category(user.id, "Transport", &connection);
        let older = create_expense(
            new_expense(user.id, groceries.id, 100, datetime!(2024-01-05 10:30 UTC)),
            &connection,
        )
        .unwrap();
        let newer = create_expense(
            new_expense(user.id, groceries.id, 200, datetime!(2024-01-07 10:30 UTC)),
            &connection,
        )
        .unwrap();
        create_expense(
            new_expense(user.id, transport.id, 300, datetime!(2024-01-06 10:30 UTC)),
            &connection,
        )
        .unwrap();

        let got = get_expenses_by_category(groceries.id, user.id, &connection).unwrap();

        assert_eq!(got, vec![newer, older]);
    }

    #[test]
    fn get_by_month_includes_month_edges_only() {
        let (connection, user) = setup();
        let category = test_category(user.id, "Groceries", &connection);
        for created_at in [
            datetime!(2023-12-31 23:59:59 UTC),
            datetime!(2024-01-01 00:00 UTC),
            datetime!(2024-01-31 23:59:59 UTC),
            datetime!(2024-02-01 00:00 UTC),
        ] {
            create_expense(new_expense(user.id, category.id, 100, created_at), &connection)
                .unwrap();
        }

        let got = get_expenses_by_month(2024, Month::January, user.id, &connection).unwrap();

        let timestamps = got
            .iter()
            .map(|expense| expense.created_at)
            .collect::<Vec<_>>();
        assert_eq!(
            timestamps,
            vec![
                datetime!(2024-01-31 23:59:59 UTC),
                datetime!(2024-01-01 00:00 UTC)
            ]
        );
    }
}

//! Database operations for categories.

use rusqlite::{Connection, Row};
use rust_decimal::Decimal;
use time::{OffsetDateTime, UtcOffset};

use crate::{
    Error,
    auth::UserID,
    category::{
        BudgetAmount, Category, CategoryColor, CategoryId, CategoryName, NewCategory,
        PRESET_CATEGORIES,
    },
    db::get_decimal,
    money::checked_sum,
};

const CATEGORY_COLUMNS: &str = "id, user_id, name, color, budget_amount, created_at";

/// Create a category and return it with its generated ID.
pub fn create_category(category: NewCategory, connection: &Connection) -> Result<Category, Error> {
    let created_at = OffsetDateTime::now_utc().to_offset(UtcOffset::UTC);

    connection.execute(
        "INSERT INTO category (user_id, name, color, budget_amount, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5);",
        (
            category.user_id.as_i64(),
            category.name.as_ref(),
            category.color.as_ref(),
            category.budget_amount.as_decimal().to_string(),
            created_at,
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Category {
        id,
        user_id: category.user_id,
        name: category.name,
        color: category.color,
        budget_amount: category.budget_amount,
        created_at,
    })
}

/// Retrieve one of `user_id`'s categories by ID.
pub fn get_category(
    category_id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM category WHERE id = :id AND user_id = :user_id;"
        ))?
        .query_row(
            &[(":id", &category_id), (":user_id", &user_id.as_i64())],
            map_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve all of `user_id`'s categories, newest first.
pub fn get_categories(user_id: UserID, connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM category WHERE user_id = :user_id
            ORDER BY created_at DESC, id DESC;"
        ))?
        .query_map(&[(":user_id", &user_id.as_i64())], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Update a category's name, color and budget. Returns an error if the
/// category doesn't exist or belongs to another user.
pub fn update_category(
    category_id: CategoryId,
    user_id: UserID,
    name: CategoryName,
    color: CategoryColor,
    budget_amount: BudgetAmount,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE category SET name = ?1, color = ?2, budget_amount = ?3
        WHERE id = ?4 AND user_id = ?5",
        (
            name.as_ref(),
            color.as_ref(),
            budget_amount.as_decimal().to_string(),
            category_id,
            user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingCategory);
    }

    Ok(())
}

/// Delete a category and every expense logged against it, returning the
/// number of expenses removed.
///
/// Both deletes run in one transaction, so either the category and its
/// expenses are all removed or nothing is.
pub fn delete_category(
    category_id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<usize, Error> {
    let transaction = connection.unchecked_transaction()?;

    let expenses_deleted = transaction.execute(
        "DELETE FROM expense WHERE category_id = ?1 AND user_id = ?2",
        (category_id, user_id.as_i64()),
    )?;

    let rows_affected = transaction.execute(
        "DELETE FROM category WHERE id = ?1 AND user_id = ?2",
        (category_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        // Dropping the transaction rolls back the expense delete.
        return Err(Error::DeleteMissingCategory);
    }

    transaction.commit()?;
    tracing::debug!(
        "Deleted category {category_id} and {expenses_deleted} expenses for user {user_id}"
    );

    Ok(expenses_deleted)
}

/// The sum of the budget allocations of all of `user_id`'s categories.
pub fn get_total_budget(user_id: UserID, connection: &Connection) -> Result<Decimal, Error> {
    let categories = get_categories(user_id, connection)?;

    checked_sum(
        categories
            .iter()
            .map(|category| category.budget_amount.as_decimal()),
    )
}

/// Add each preset category that `user_id` does not have yet, matching on
/// name regardless of case.
///
/// Presets are added with a zero budget. Returns the number of categories added.
pub fn add_preset_categories(user_id: UserID, connection: &Connection) -> Result<usize, Error> {
    let existing_names: Vec<String> = get_categories(user_id, connection)?
        .into_iter()
        .map(|category| category.name.as_ref().to_lowercase())
        .collect();

    let transaction = connection.unchecked_transaction()?;
    let mut added = 0;

    for preset in PRESET_CATEGORIES {
        if existing_names.contains(&preset.name.to_lowercase()) {
            continue;
        }

        create_category(
            NewCategory {
                user_id,
                name: CategoryName::new_unchecked(preset.name),
                color: CategoryColor::new_unchecked(preset.color),
                budget_amount: BudgetAmount::default(),
            },
            &transaction,
        )?;
        added += 1;
    }

    transaction.commit()?;

    Ok(added)
}

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            color TEXT NOT NULL,
            budget_amount TEXT NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_category_user_id ON category(user_id);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let user_id = UserID::new(row.get(1)?);
    let raw_name: String = row.get(2)?;
    let raw_color: String = row.get(3)?;
    let budget_amount = BudgetAmount::new_unchecked(get_decimal(row, 4)?);
    let created_at = row.get(5)?;

    Ok(Category {
        id,
        user_id,
        name: CategoryName::new_unchecked(&raw_name),
        color: CategoryColor::new_unchecked(&raw_color),
        budget_amount,
        created_at,
    })
}

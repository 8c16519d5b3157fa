//! Spending categories and their monthly budget allocations.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod form;
mod list;
mod presets;

pub use create::{create_category_endpoint, get_new_category_page};
pub use db::{
    add_preset_categories, create_category, create_category_table, get_categories, get_category,
    get_total_budget, update_category,
};
pub use delete::delete_category_endpoint;
pub use domain::{
    BudgetAmount, CATEGORY_PALETTE, Category, CategoryColor, CategoryId, CategoryName,
    NewCategory, PRESET_CATEGORIES,
};
pub use edit::{get_edit_category_page, update_category_endpoint};
pub use list::get_budget_page;
pub use presets::add_preset_categories_endpoint;

#[cfg(test)]
use rusqlite::Connection;

#[cfg(test)]
use crate::auth::UserID;

/// Create a category with a budget of 100 and the default color.
#[cfg(test)]
pub fn test_category(user_id: UserID, name: &str, connection: &Connection) -> Category {
    create_category(
        NewCategory {
            user_id,
            name: CategoryName::new_unchecked(name),
            color: CategoryColor::default(),
            budget_amount: BudgetAmount::new_unchecked(rust_decimal::Decimal::new(100, 0)),
        },
        connection,
    )
    .expect("Could not create test category")
}

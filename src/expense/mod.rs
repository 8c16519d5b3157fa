//! Expenses logged against the user's categories.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod form;
mod list;
mod store;

pub use create::{create_expense_endpoint, get_new_expense_page};
pub use db::{
    create_expense, create_expense_table, delete_expense, get_expense, get_expenses_by_category,
    get_expenses_by_month, update_expense,
};
pub use delete::delete_expense_endpoint;
pub use domain::{
    CategorisedExpense, DateWindow, Expense, ExpenseAmount, ExpenseId, NewExpense,
};
pub use edit::{get_edit_expense_page, update_expense_endpoint};
pub use list::get_expenses_page;
pub use store::{ExpenseStore, SQLiteExpenseStore};

pub(crate) use domain::first_of_next_month;

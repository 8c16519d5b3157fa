//! Per-user settings. For now this is just the monthly income.

mod db;
mod page;

pub use db::{MonthlyIncome, create_settings_table, get_monthly_income, set_monthly_income};
pub use page::{get_settings_page, update_monthly_income_endpoint};

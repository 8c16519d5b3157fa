//! Dashboard module
//!
//! Shows how this month's spending compares to the budget, overall and per
//! category.

mod handlers;
mod progress;

pub use handlers::get_dashboard_page;

//! CashCompass is a web app for planning a monthly budget and tracking where
//! the money actually goes.
//!
//! Users set a monthly income, split it into spending categories with budget
//! allocations, log expenses against those categories, and review monthly
//! spending analytics.
//!
//! This library provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod alert;
mod analytics;
mod app_state;
mod auth;
mod category;
mod dashboard;
mod db;
mod endpoints;
mod error;
mod expense;
mod html;
mod internal_server_error;
mod logging;
mod money;
mod navigation;
mod not_found;
mod routing;
mod settings;
mod timezone;

#[cfg(test)]
mod test_utils;

pub use analytics::{
    CategoryMetadata, MonthlySummaryRow, aggregate_monthly_spending, monthly_spending_summary,
};
pub use app_state::AppState;
pub use auth::{
    PasswordHash, User, UserID, ValidatedPassword, count_users, create_user, get_user_by_email,
    get_user_by_id, parse_email,
};
pub use category::{
    BudgetAmount, Category, CategoryColor, CategoryId, CategoryName, NewCategory,
    PRESET_CATEGORIES, add_preset_categories, create_category, get_categories, update_category,
};
pub use db::initialize as initialize_db;
pub use error::Error;
pub use expense::{
    CategorisedExpense, DateWindow, Expense, ExpenseAmount, ExpenseId, ExpenseStore, NewExpense,
    SQLiteExpenseStore, create_expense, delete_expense, get_expense, get_expenses_by_category,
    get_expenses_by_month, update_expense,
};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use money::MAX_AMOUNT;
pub use routing::build_router;
pub use settings::{MonthlyIncome, get_monthly_income, set_monthly_income};
pub use timezone::get_local_offset;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

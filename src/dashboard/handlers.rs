//! Dashboard HTTP handler and view rendering.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    analytics::monthly_spending_summary,
    auth::UserID,
    category::{Category, get_categories, get_total_budget},
    dashboard::progress::{CategoryProgress, category_progress, progress_card},
    endpoints,
    expense::{DateWindow, ExpenseStore},
    html::{
        BUTTON_SECONDARY_STYLE, CARD_STYLE, PAGE_CONTAINER_STYLE, base,
        currency_rounded_with_tooltip, link,
    },
    money::checked_sum,
    navigation::NavBar,
    settings::get_monthly_income,
};

/// The state needed for displaying the dashboard page.
#[derive(Clone)]
pub struct DashboardState {
    /// The database connection for reading categories and settings.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The source of the month's expenses.
    pub expense_store: Arc<dyn ExpenseStore + Send + Sync>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            expense_store: state.expense_store.clone(),
        }
    }
}

/// The totals shown at the top of the dashboard.
struct MonthOverview {
    label: String,
    income: Decimal,
    total_budget: Decimal,
    spent: Decimal,
}

impl MonthOverview {
    fn remaining(&self) -> Decimal {
        self.income - self.spent
    }
}

/// Display this month's budget and spending for the user.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let (categories, income, total_budget) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let categories = get_categories(user_id, &connection)
            .inspect_err(|error| tracing::error!("could not get categories: {error}"))?;
        let income = get_monthly_income(user_id, &connection)?;
        let total_budget = get_total_budget(user_id, &connection)?;

        (categories, income, total_budget)
    };

    let today = OffsetDateTime::now_utc().date();
    let window = DateWindow::for_month(today.year(), today.month())?;

    let rows = monthly_spending_summary(state.expense_store.as_ref(), Some(user_id), Some(window))
        .inspect_err(|error| tracing::error!("could not summarize this month's spending: {error}"))?;

    let overview = MonthOverview {
        label: format!("{} {}", today.month(), today.year()),
        income,
        total_budget,
        spent: checked_sum(rows.iter().map(|row| row.total_spent))?,
    };
    let progress = category_progress(&categories, &rows)?;

    Ok(dashboard_view(&overview, &categories, &progress).into_response())
}

fn overview_card(title: &str, amount: Decimal, data_attribute: &str, is_negative: bool) -> Markup {
    let amount_style = if is_negative {
        "text-2xl font-bold text-red-600 dark:text-red-400"
    } else {
        "text-2xl font-bold"
    };

    html!(
        div class=(CARD_STYLE)
        {
            p class="text-sm text-gray-500 dark:text-gray-400" { (title) }
            p class=(amount_style) data-overview=(data_attribute)
            { (currency_rounded_with_tooltip(amount)) }
        }
    )
}

fn no_categories_view() -> Markup {
    html!(
        div class="flex flex-col items-center py-8 space-y-4" data-no-categories
        {
            h2 class="text-xl font-bold" { "Your budget is empty" }

            p
            {
                "Head over to your " (link(endpoints::BUDGET_VIEW, "budget"))
                " to add spending categories, or start with a few common ones."
            }

            button
                type="button"
                hx-post=(endpoints::POST_CATEGORY_PRESETS)
                hx-target="#alert-container"
                hx-target-error="#alert-container"
                class=(BUTTON_SECONDARY_STYLE)
            {
                "Add preset categories"
            }
        }
    )
}

fn dashboard_view(
    overview: &MonthOverview,
    categories: &[Category],
    progress: &[CategoryProgress],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();
    let remaining = overview.remaining();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full max-w-screen-xl"
            {
                h1 class="text-xl font-bold" data-dashboard-month { (overview.label) }

                section class="grid grid-cols-2 lg:grid-cols-4 gap-4 w-full"
                {
                    (overview_card("Monthly income", overview.income, "income", false))
                    (overview_card("Total budget", overview.total_budget, "budget", false))
                    (overview_card("Spent", overview.spent, "spent", false))
                    (overview_card("Remaining", remaining, "remaining", remaining.is_sign_negative()))
                }

                @if categories.is_empty() {
                    (no_categories_view())
                } @else {
                    h2 class="text-lg font-semibold" { "Spending by category" }

                    section class="grid grid-cols-1 md:grid-cols-2 xl:grid-cols-3 gap-4 w-full"
                    {
                        @for category_progress in progress {
                            (progress_card(category_progress))
                        }
                    }
                }
            }
        }
    );

    base("Dashboard", &[], &content)
}

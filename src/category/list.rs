//! The budget page: monthly income, budget allocations and the category list.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::{
    AppState, Error,
    auth::UserID,
    category::{Category, CategoryId, get_categories},
    endpoints,
    html::{
        BUTTON_SECONDARY_STYLE, CARD_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, category_badge, edit_delete_action_links,
        format_currency,
    },
    money::checked_sum,
    navigation::NavBar,
    settings::get_monthly_income,
};

/// The state needed for the budget page.
#[derive(Debug, Clone)]
pub struct BudgetPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BudgetPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A category with the URLs and counts needed to render a row.
#[derive(Debug, Clone)]
struct CategoryRow {
    category: Category,
    edit_url: String,
    delete_url: String,
    expense_count: u32,
}

impl CategoryRow {
    fn confirm_message(&self) -> String {
        format!(
            "Are you sure you want to delete '{}'? This will also delete {} expense(s).",
            self.category.name, self.expense_count
        )
    }
}

/// The figures shown at the top of the budget page.
#[derive(Debug, Clone, Copy, PartialEq)]
struct BudgetOverview {
    monthly_income: Decimal,
    total_budget: Decimal,
}

impl BudgetOverview {
    fn remaining(&self) -> Decimal {
        self.monthly_income - self.total_budget
    }
}

/// Render the budget page for the logged in user.
pub async fn get_budget_page(
    State(state): State<BudgetPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_categories(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;
    let monthly_income = get_monthly_income(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve monthly income: {error}"))?;
    let expenses_per_category = count_expenses_per_category(user_id, &connection)
        .inspect_err(|error| tracing::error!("Could not count expenses per category: {error}"))?;

    let total_budget = checked_sum(
        categories
            .iter()
            .map(|category| category.budget_amount.as_decimal()),
    )?;

    let rows = categories
        .into_iter()
        .map(|category| CategoryRow {
            edit_url: endpoints::format_endpoint(endpoints::EDIT_CATEGORY_VIEW, category.id),
            delete_url: endpoints::format_endpoint(endpoints::DELETE_CATEGORY, category.id),
            expense_count: *expenses_per_category.get(&category.id).unwrap_or(&0),
            category,
        })
        .collect::<Vec<_>>();

    let overview = BudgetOverview {
        monthly_income,
        total_budget,
    };

    Ok(budget_view(overview, &rows).into_response())
}

fn count_expenses_per_category(
    user_id: UserID,
    connection: &Connection,
) -> Result<HashMap<CategoryId, u32>, Error> {
    let result: Result<HashMap<CategoryId, u32>, rusqlite::Error> = connection
        .prepare(
            "SELECT category_id, COUNT(1) FROM expense WHERE user_id = :user_id
            GROUP BY category_id",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], |row| {
            let category_id = row.get(0)?;
            let count = row.get(1)?;

            Ok((category_id, count))
        })?
        .collect();

    result.map_err(Error::from)
}

fn overview_view(overview: BudgetOverview) -> Markup {
    let remaining = overview.remaining();
    let remaining_style = if remaining < Decimal::ZERO {
        "text-2xl font-bold text-red-600 dark:text-red-400"
    } else {
        "text-2xl font-bold text-green-600 dark:text-green-400"
    };

    html!(
        section class="grid grid-cols-1 sm:grid-cols-3 gap-4"
        {
            div class=(CARD_STYLE)
            {
                p class="text-sm text-gray-500 dark:text-gray-400" { "Monthly income" }
                p class="text-2xl font-bold" data-budget-income
                { (format_currency(overview.monthly_income)) }
                a href=(endpoints::SETTINGS_VIEW) class=(LINK_STYLE) { "Change" }
            }

            div class=(CARD_STYLE)
            {
                p class="text-sm text-gray-500 dark:text-gray-400" { "Total budgeted" }
                p class="text-2xl font-bold" data-budget-total
                { (format_currency(overview.total_budget)) }
            }

            div class=(CARD_STYLE)
            {
                p class="text-sm text-gray-500 dark:text-gray-400" { "Left to budget" }
                p class=(remaining_style) data-budget-remaining
                { (format_currency(remaining)) }
            }
        }
    )
}

fn budget_view(overview: BudgetOverview, rows: &[CategoryRow]) -> Markup {
    let new_category_route = endpoints::NEW_CATEGORY_VIEW;
    let nav_bar = NavBar::new(endpoints::BUDGET_VIEW).into_html();

    let table_row = |row: &CategoryRow| {
        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE)
                {
                    (category_badge(row.category.name.as_ref(), row.category.color.as_ref()))
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (format_currency(row.category.budget_amount.as_decimal()))
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (row.expense_count)
                }

                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        (edit_delete_action_links(
                            &row.edit_url,
                            &row.delete_url,
                            &row.confirm_message(),
                            "closest tr",
                            "delete",
                        ))
                    }
                }
            }
        )
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Budget" }

                    a href=(new_category_route) class=(LINK_STYLE)
                    {
                        "Create Category"
                    }
                }

                (overview_view(overview))

                (category_cards_view(rows, new_category_route))

                section class="hidden lg:block dark:bg-gray-800 lg:max-w-5xl lg:w-full lg:mx-auto"
                {
                    table class="w-full text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Budget" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Expenses" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for row in rows {
                                (table_row(row))
                            }

                            @if rows.is_empty() {
                                tr
                                {
                                    td
                                        colspan="4"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No categories created yet. "
                                        a href=(new_category_route) class=(LINK_STYLE)
                                        {
                                            "Create your first category"
                                        }
                                    }
                                }
                            }
                        }
                    }
                }

                div class="max-w-sm"
                {
                    button
                        type="button"
                        hx-post=(endpoints::POST_CATEGORY_PRESETS)
                        hx-target="#alert-container"
                        hx-target-error="#alert-container"
                        hx-swap="innerHTML"
                        class=(BUTTON_SECONDARY_STYLE)
                    {
                        "Add preset categories"
                    }
                }
            }
        }
    );

    base("Budget", &[], &content)
}

fn category_cards_view(rows: &[CategoryRow], new_category_route: &str) -> Markup {
    html!(
        ul class="lg:hidden space-y-4"
        {
            @for row in rows {
                li class="rounded border border-gray-200 bg-white px-4 py-3 shadow-sm dark:border-gray-700 dark:bg-gray-800"
                    data-category-card="true"
                {
                    div class="flex items-start justify-between gap-3"
                    {
                        (category_badge(row.category.name.as_ref(), row.category.color.as_ref()))
                        span class="text-sm tabular-nums text-gray-900 dark:text-white"
                        { (format_currency(row.category.budget_amount.as_decimal())) }
                    }

                    div class="mt-2 flex items-center gap-4 text-sm"
                    {
                        (edit_delete_action_links(
                            &row.edit_url,
                            &row.delete_url,
                            &row.confirm_message(),
                            "closest [data-category-card='true']",
                            "outerHTML",
                        ))
                    }
                }
            }

            @if rows.is_empty() {
                li class="rounded border border-dashed border-gray-300 bg-white px-4 py-6 text-center text-sm text-gray-500 dark:border-gray-700 dark:bg-gray-800 dark:text-gray-400"
                {
                    "No categories created yet. "
                    a href=(new_category_route) class=(LINK_STYLE)
                    {
                        "Create your first category"
                    }
                }
            }
        }
    )
}

#[cfg(test)]
mod tests {
    use axum::{Extension, extract::State, http::StatusCode};
    use rust_decimal::Decimal;
    use scraper::{Html, Selector};

    use crate::{
        category::test_category,
        settings::{MonthlyIncome, set_monthly_income},
        test_utils::{assert_valid_html, parse_html_document, test_db_with_user},
    };

    use super::{BudgetPageState, count_expenses_per_category, get_budget_page};

    fn select_text(html: &Html, selector: &str) -> String {
        html.select(&Selector::parse(selector).unwrap())
            .next()
            .unwrap_or_else(|| panic!("No element matching {selector}"))
            .text()
            .collect::<String>()
            .trim()
            .to_owned()
    }

    #[tokio::test]
    async fn shows_income_budget_and_remaining() {
        let (connection, user) = test_db_with_user();
        {
            let connection = connection.lock().unwrap();
            test_category(user.id, "Groceries", &connection);
            test_category(user.id, "Rent", &connection);
            set_monthly_income(
                user.id,
                MonthlyIncome::new(Decimal::new(150, 0)).unwrap(),
                &connection,
            )
            .unwrap();
        }
        let state = BudgetPageState {
            db_connection: connection,
        };

        let response = get_budget_page(State(state), Extension(user.id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_eq!(select_text(&html, "[data-budget-income]"), "$150.00");
        assert_eq!(select_text(&html, "[data-budget-total]"), "$200.00");
        assert_eq!(select_text(&html, "[data-budget-remaining]"), "-$50.00");
        let remaining_class = html
            .select(&Selector::parse("[data-budget-remaining]").unwrap())
            .next()
            .and_then(|element| element.value().attr("class"))
            .unwrap_or_default();
        assert!(remaining_class.contains("text-red-600"));
        assert_eq!(
            html.select(&Selector::parse("tbody tr").unwrap()).count(),
            2
        );
    }

    #[tokio::test]
    async fn shows_empty_state_without_categories() {
        let (connection, user) = test_db_with_user();
        let state = BudgetPageState {
            db_connection: connection,
        };

        let response = get_budget_page(State(state), Extension(user.id))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_eq!(select_text(&html, "[data-budget-income]"), "$0.00");
        assert!(select_text(&html, "tbody").contains("No categories created yet."));
    }

    #[test]
    fn counts_only_the_users_expenses() {
        let (connection, user) = test_db_with_user();
        let connection = connection.lock().unwrap();
        let category = test_category(user.id, "Groceries", &connection);
        for user_id in [user.id.as_i64(), user.id.as_i64(), user.id.as_i64() + 1] {
            connection
                .execute(
                    "INSERT INTO expense (user_id, category_id, amount, description, created_at)
                    VALUES (?1, ?2, '5', NULL, '2024-01-01 00:00:00Z')",
                    (user_id, category.id),
                )
                .unwrap();
        }

        let counts = count_expenses_per_category(user.id, &connection).unwrap();

        assert_eq!(counts[&category.id], 2);
    }
}

//! The expenses page, which lists one month of expenses at a time.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Deserialize;
use time::{Month, OffsetDateTime};

use crate::{
    AppState, Error,
    auth::UserID,
    category::{Category, CategoryId, get_categories},
    endpoints,
    expense::{Expense, get_expenses_by_month},
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, category_badge, edit_delete_action_links, format_currency,
    },
    money::checked_sum,
    navigation::NavBar,
};

/// The state needed for the expenses page.
#[derive(Debug, Clone)]
pub struct ExpensesPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ExpensesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The query parameters for the expenses page.
#[derive(Debug, Default, Deserialize)]
pub struct ExpensesQuery {
    /// The month to show as `YYYY-MM`. Defaults to the current UTC month.
    pub month: Option<String>,
}

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct YearMonth {
    year: i32,
    month: Month,
}

impl YearMonth {
    fn parse(text: &str) -> Result<Self, Error> {
        let invalid = || Error::InvalidDate(text.to_owned());

        let (year, month) = text.trim().split_once('-').ok_or_else(invalid)?;
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month
            .parse::<u8>()
            .ok()
            .and_then(|month| Month::try_from(month).ok())
            .ok_or_else(invalid)?;

        Ok(Self { year, month })
    }

    fn previous(self) -> Self {
        match self.month {
            Month::January => Self {
                year: self.year - 1,
                month: Month::December,
            },
            month => Self {
                year: self.year,
                month: month.previous(),
            },
        }
    }

    fn next(self) -> Self {
        match self.month {
            Month::December => Self {
                year: self.year + 1,
                month: Month::January,
            },
            month => Self {
                year: self.year,
                month: month.next(),
            },
        }
    }

    fn query_value(self) -> String {
        format!("{:04}-{:02}", self.year, self.month as u8)
    }

    fn label(self) -> String {
        format!("{} {}", self.month, self.year)
    }
}

struct ExpenseRow<'a> {
    expense: Expense,
    category: Option<&'a Category>,
    edit_url: String,
    delete_url: String,
}

/// Render the expenses for one month, newest first.
pub async fn get_expenses_page(
    State(state): State<ExpensesPageState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<ExpensesQuery>,
) -> Result<Response, Error> {
    let today = OffsetDateTime::now_utc().date();
    let current_month = YearMonth {
        year: today.year(),
        month: today.month(),
    };
    let selected_month = match query.month.as_deref() {
        Some(text) if !text.trim().is_empty() => YearMonth::parse(text)?,
        _ => current_month,
    };

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let expenses = get_expenses_by_month(
        selected_month.year,
        selected_month.month,
        user_id,
        &connection,
    )
    .inspect_err(|error| tracing::error!("Failed to retrieve expenses: {error}"))?;
    let categories = get_categories(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;
    let categories_by_id = categories
        .iter()
        .map(|category| (category.id, category))
        .collect::<HashMap<CategoryId, &Category>>();

    let total = checked_sum(expenses.iter().map(|expense| expense.amount.as_decimal()))?;

    let rows = expenses
        .into_iter()
        .map(|expense| ExpenseRow {
            category: categories_by_id.get(&expense.category_id).copied(),
            edit_url: endpoints::format_endpoint(endpoints::EDIT_EXPENSE_VIEW, expense.id),
            delete_url: endpoints::format_endpoint(endpoints::DELETE_EXPENSE, expense.id),
            expense,
        })
        .collect::<Vec<_>>();

    let next_month = selected_month.next();
    let next_month = (next_month <= current_month).then_some(next_month);

    Ok(expenses_view(selected_month, next_month, total, &rows).into_response())
}

fn month_url(month: YearMonth) -> String {
    format!("{}?month={}", endpoints::EXPENSES_VIEW, month.query_value())
}

fn expenses_view(
    month: YearMonth,
    next_month: Option<YearMonth>,
    total: Decimal,
    rows: &[ExpenseRow<'_>],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::EXPENSES_VIEW).into_html();

    let category_cell = |row: &ExpenseRow<'_>| match row.category {
        Some(category) => category_badge(category.name.as_ref(), category.color.as_ref()),
        None => html!(span class="text-gray-400" { "Unknown" }),
    };

    let table_row = |row: &ExpenseRow<'_>| {
        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE) { (row.expense.created_at.date()) }
                td class=(TABLE_CELL_STYLE) { (category_cell(row)) }
                td class=(TABLE_CELL_STYLE)
                {
                    (row.expense.description.as_deref().unwrap_or(""))
                }
                td class="px-6 py-4 text-right tabular-nums"
                {
                    (format_currency(row.expense.amount.as_decimal()))
                }
                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        (edit_delete_action_links(
                            &row.edit_url,
                            &row.delete_url,
                            "Are you sure you want to delete this expense?",
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
                    h1 class="text-xl font-bold" { "Expenses" }

                    a href=(endpoints::NEW_EXPENSE_VIEW) class=(LINK_STYLE) { "Log Expense" }
                }

                nav class="flex items-center justify-between" aria-label="Month"
                {
                    a href=(month_url(month.previous())) class=(LINK_STYLE) data-previous-month
                    { "← " (month.previous().label()) }

                    h2 class="text-lg font-semibold" data-month-label { (month.label()) }

                    @if let Some(next_month) = next_month {
                        a href=(month_url(next_month)) class=(LINK_STYLE) data-next-month
                        { (next_month.label()) " →" }
                    } @else {
                        span {}
                    }
                }

                p class="text-sm text-gray-600 dark:text-gray-400"
                {
                    "Total spent: "
                    span class="font-semibold" data-month-total { (format_currency(total)) }
                }

                div class="overflow-x-auto dark:bg-gray-800"
                {
                    table class="w-full text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                th scope="col" class="px-6 py-4 text-right" { "Amount" }
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
                                        colspan="5"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No expenses logged this month. "
                                        a href=(endpoints::NEW_EXPENSE_VIEW) class=(LINK_STYLE)
                                        {
                                            "Log an expense"
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Expenses", &[], &content)
}

#[cfg(test)]
mod tests {
    use axum::{
        Extension,
        extract::{Query, State},
        http::StatusCode,
    };
    use rust_decimal::Decimal;
    use scraper::{Html, Selector};
    use time::{Month, OffsetDateTime, macros::datetime};

    use crate::{
        Error,
        category::test_category,
        expense::{ExpenseAmount, NewExpense, create_expense},
        test_utils::{assert_valid_html, parse_html_document, test_db_with_user},
    };

    use super::{ExpensesPageState, ExpensesQuery, YearMonth, get_expenses_page};

    fn select_attr(html: &Html, selector: &str, attribute: &str) -> Option<String> {
        html.select(&Selector::parse(selector).unwrap())
            .next()
            .and_then(|element| element.value().attr(attribute))
            .map(str::to_owned)
    }

    #[test]
    fn parses_month_query() {
        assert_eq!(
            YearMonth::parse("2024-03"),
            Ok(YearMonth {
                year: 2024,
                month: Month::March
            })
        );
        assert!(YearMonth::parse("2024-13").is_err());
        assert!(YearMonth::parse("March").is_err());
    }

    #[test]
    fn wraps_around_year_boundaries() {
        let january = YearMonth {
            year: 2024,
            month: Month::January,
        };

        assert_eq!(january.previous().query_value(), "2023-12");
        assert_eq!(january.previous().next(), january);
        assert_eq!(january.label(), "January 2024");
    }

    #[tokio::test]
    async fn shows_selected_month_only() {
        let (connection, user) = test_db_with_user();
        {
            let connection = connection.lock().unwrap();
            let category = test_category(user.id, "Groceries", &connection);
            for (cents, created_at) in [
                (1000, datetime!(2024-01-05 10:00 UTC)),
                (2550, datetime!(2024-01-20 10:00 UTC)),
                (9900, datetime!(2024-02-01 10:00 UTC)),
            ] {
                create_expense(
                    NewExpense {
                        user_id: user.id,
                        category_id: category.id,
                        amount: ExpenseAmount::new(Decimal::new(cents, 2)).unwrap(),
                        description: None,
                        created_at,
                    },
                    &connection,
                )
                .unwrap();
            }
        }
        let state = ExpensesPageState {
            db_connection: connection,
        };

        let response = get_expenses_page(
            State(state),
            Extension(user.id),
            Query(ExpensesQuery {
                month: Some("2024-01".to_owned()),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_eq!(
            html.select(&Selector::parse("tbody tr").unwrap()).count(),
            2
        );
        let total = html
            .select(&Selector::parse("[data-month-total]").unwrap())
            .next()
            .unwrap()
            .text()
            .collect::<String>();
        assert_eq!(total, "$35.50");
        assert_eq!(
            select_attr(&html, "[data-previous-month]", "href").as_deref(),
            Some("/expenses?month=2023-12")
        );
        assert_eq!(
            select_attr(&html, "[data-next-month]", "href").as_deref(),
            Some("/expenses?month=2024-02")
        );
    }

    #[tokio::test]
    async fn current_month_has_no_next_link() {
        let (connection, user) = test_db_with_user();
        let state = ExpensesPageState {
            db_connection: connection,
        };

        let response = get_expenses_page(
            State(state),
            Extension(user.id),
            Query(ExpensesQuery::default()),
        )
        .await
        .unwrap();

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_eq!(select_attr(&html, "[data-next-month]", "href"), None);
        let today = OffsetDateTime::now_utc().date();
        let heading = html
            .select(&Selector::parse("[data-month-label]").unwrap())
            .next()
            .unwrap()
            .text()
            .collect::<String>();
        assert_eq!(heading, format!("{} {}", today.month(), today.year()));
    }

    #[tokio::test]
    async fn invalid_month_is_an_error() {
        let (connection, user) = test_db_with_user();
        let state = ExpensesPageState {
            db_connection: connection,
        };

        let result = get_expenses_page(
            State(state),
            Extension(user.id),
            Query(ExpensesQuery {
                month: Some("2024-00".to_owned()),
            }),
        )
        .await;

        assert!(matches!(result, Err(Error::InvalidDate(_))));
    }
}

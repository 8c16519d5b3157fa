//! The page and endpoint for logging a new expense.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    auth::UserID,
    category::{Category, get_categories},
    endpoints,
    expense::{
        NewExpense, create_expense,
        domain::ExpenseFormData,
        form::{ExpenseFormDefaults, expense_form_fields},
    },
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, dollar_input_styles},
    navigation::NavBar,
};

/// The state needed to create an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the page for logging a new expense.
pub async fn get_new_expense_page(
    State(state): State<CreateExpenseState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_categories(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    let today = OffsetDateTime::now_utc().date();
    let defaults = ExpenseFormDefaults {
        category_id: None,
        amount: None,
        date: today,
        description: None,
        max_date: today,
    };

    let nav_bar = NavBar::new(endpoints::NEW_EXPENSE_VIEW).into_html();
    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="mb-4 text-xl font-bold" { "Log Expense" }
            (new_expense_form_view(&defaults, &categories, ""))
        }
    };

    Ok(base("Log Expense", &[dollar_input_styles()], &content).into_response())
}

/// Handle the new expense form, redirecting to the expenses page on success.
///
/// The expense is timestamped with the chosen date and the current UTC time of day.
pub async fn create_expense_endpoint(
    State(state): State<CreateExpenseState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<ExpenseFormData>,
) -> Response {
    let now = OffsetDateTime::now_utc();

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let (amount, description) = match form.validate(now.date()) {
        Ok(fields) => fields,
        Err(Error::FutureDate(date)) => {
            tracing::error!("Tried to create an expense with the future date {date}");
            return Error::FutureDate(date).into_alert_response();
        }
        Err(error) => {
            let categories = match get_categories(user_id, &connection) {
                Ok(categories) => categories,
                Err(error) => return error.into_alert_response(),
            };
            let defaults = ExpenseFormDefaults {
                category_id: Some(form.category_id),
                amount: Some(form.amount),
                date: form.date,
                description: form.description.as_deref(),
                max_date: now.date(),
            };

            return new_expense_form_view(&defaults, &categories, &format!("Error: {error}"))
                .into_response();
        }
    };

    let expense = NewExpense {
        user_id,
        category_id: form.category_id,
        amount,
        description,
        created_at: now.replace_date(form.date),
    };

    match create_expense(expense, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::EXPENSES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("could not create expense: {error}");
            error.into_alert_response()
        }
    }
}

fn new_expense_form_view(
    defaults: &ExpenseFormDefaults<'_>,
    categories: &[Category],
    error_message: &str,
) -> Markup {
    html! {
        form
            hx-post=(endpoints::POST_EXPENSE)
            hx-target-error="#alert-container"
            hx-swap="outerHTML"
            class="w-full space-y-4 md:space-y-6"
        {
            (expense_form_fields(defaults, categories))

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400" data-form-error
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Log Expense" }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{Extension, extract::State, http::StatusCode};
    use axum_extra::extract::Form;
    use rust_decimal::Decimal;
    use scraper::Selector;
    use time::{Duration, OffsetDateTime};

    use crate::{
        category::test_category,
        endpoints,
        expense::{domain::ExpenseFormData, get_expenses_by_category},
        test_utils::{
            assert_form_input, assert_form_submit_button, assert_hx_endpoint, assert_hx_redirect,
            assert_valid_html, create_other_user, must_get_form, parse_html_document,
            parse_html_fragment, test_db_with_user,
        },
    };

    use super::{CreateExpenseState, create_expense_endpoint, get_new_expense_page};

    #[tokio::test]
    async fn render_page() {
        let (connection, user) = test_db_with_user();
        test_category(user.id, "Groceries", &connection.lock().unwrap());
        let state = CreateExpenseState {
            db_connection: connection,
        };

        let response = get_new_expense_page(State(state), Extension(user.id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::POST_EXPENSE, "hx-post");
        assert_form_input(&form, "amount", "number");
        assert_form_input(&form, "date", "date");
        assert_form_submit_button(&form);
        let options = form
            .select(&Selector::parse("select[name=category_id] option").unwrap())
            .count();
        assert_eq!(options, 2);
    }

    #[tokio::test]
    async fn can_create_expense() {
        let (connection, user) = test_db_with_user();
        let category = test_category(user.id, "Groceries", &connection.lock().unwrap());
        let state = CreateExpenseState {
            db_connection: connection,
        };
        let today = OffsetDateTime::now_utc().date();
        let form = ExpenseFormData {
            category_id: category.id,
            amount: Decimal::new(4250, 2),
            description: Some(" Weekly shop ".to_owned()),
            date: today,
        };

        let response =
            create_expense_endpoint(State(state.clone()), Extension(user.id), Form(form)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::EXPENSES_VIEW);
        let expenses =
            get_expenses_by_category(category.id, user.id, &state.db_connection.lock().unwrap())
                .unwrap();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].amount.as_decimal(), Decimal::new(4250, 2));
        assert_eq!(expenses[0].description.as_deref(), Some("Weekly shop"));
        assert_eq!(expenses[0].created_at.date(), today);
    }

    #[tokio::test]
    async fn rejects_zero_amount_with_form_error() {
        let (connection, user) = test_db_with_user();
        let category = test_category(user.id, "Groceries", &connection.lock().unwrap());
        let state = CreateExpenseState {
            db_connection: connection,
        };
        let form = ExpenseFormData {
            category_id: category.id,
            amount: Decimal::ZERO,
            description: None,
            date: OffsetDateTime::now_utc().date(),
        };

        let response = create_expense_endpoint(State(state), Extension(user.id), Form(form)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let error = html
            .select(&Selector::parse("[data-form-error]").unwrap())
            .next()
            .expect("No error message found")
            .text()
            .collect::<String>();
        assert_eq!(error.trim(), "Error: Amount must be greater than zero");
    }

    #[tokio::test]
    async fn rejects_amount_above_limit_with_form_error() {
        let (connection, user) = test_db_with_user();
        let category = test_category(user.id, "Groceries", &connection.lock().unwrap());
        let state = CreateExpenseState {
            db_connection: connection,
        };
        let form = ExpenseFormData {
            category_id: category.id,
            amount: Decimal::MAX,
            description: None,
            date: OffsetDateTime::now_utc().date(),
        };

        let response =
            create_expense_endpoint(State(state.clone()), Extension(user.id), Form(form)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let error = html
            .select(&Selector::parse("[data-form-error]").unwrap())
            .next()
            .expect("No error message found")
            .text()
            .collect::<String>();
        assert_eq!(error.trim(), "Error: Amount cannot be more than 1,000,000,000");
        let expenses =
            get_expenses_by_category(category.id, user.id, &state.db_connection.lock().unwrap())
                .unwrap();
        assert!(expenses.is_empty());
    }

    #[tokio::test]
    async fn rejects_future_date() {
        let (connection, user) = test_db_with_user();
        let category = test_category(user.id, "Groceries", &connection.lock().unwrap());
        let state = CreateExpenseState {
            db_connection: connection,
        };
        let form = ExpenseFormData {
            category_id: category.id,
            amount: Decimal::ONE,
            description: None,
            date: OffsetDateTime::now_utc().date() + Duration::days(2),
        };

        let response = create_expense_endpoint(State(state), Extension(user.id), Form(form)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn rejects_other_users_category() {
        let (connection, user) = test_db_with_user();
        let other_user = create_other_user(&connection.lock().unwrap()).id;
        let category = test_category(other_user, "Groceries", &connection.lock().unwrap());
        let state = CreateExpenseState {
            db_connection: connection,
        };
        let form = ExpenseFormData {
            category_id: category.id,
            amount: Decimal::ONE,
            description: None,
            date: OffsetDateTime::now_utc().date(),
        };

        let response = create_expense_endpoint(State(state), Extension(user.id), Form(form)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

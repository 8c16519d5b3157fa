//! The page and endpoint for editing an expense.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
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
        ExpenseId, NewExpense,
        domain::ExpenseFormData,
        form::{ExpenseFormDefaults, expense_form_fields},
        get_expense, update_expense,
    },
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, dollar_input_styles},
    navigation::NavBar,
};

/// The state needed for the edit expense page and endpoint.
#[derive(Debug, Clone)]
pub struct EditExpenseState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the edit page for one of the user's expenses.
pub async fn get_edit_expense_page(
    Path(expense_id): Path<ExpenseId>,
    State(state): State<EditExpenseState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let expense = get_expense(expense_id, user_id, &connection)?;
    let categories = get_categories(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    let defaults = ExpenseFormDefaults {
        category_id: Some(expense.category_id),
        amount: Some(expense.amount.as_decimal()),
        date: expense.created_at.date(),
        description: expense.description.as_deref(),
        max_date: OffsetDateTime::now_utc().date(),
    };

    let nav_bar = NavBar::new(endpoints::EXPENSES_VIEW).into_html();
    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="mb-4 text-xl font-bold" { "Edit Expense" }
            (edit_expense_form_view(expense_id, &defaults, &categories, ""))
        }
    };

    Ok(base("Edit Expense", &[dollar_input_styles()], &content).into_response())
}

/// Handle the edit expense form.
///
/// The time of day of the original expense is kept when the date changes.
pub async fn update_expense_endpoint(
    Path(expense_id): Path<ExpenseId>,
    State(state): State<EditExpenseState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<ExpenseFormData>,
) -> Response {
    let today = OffsetDateTime::now_utc().date();

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let (amount, description) = match form.validate(today) {
        Ok(fields) => fields,
        Err(Error::FutureDate(date)) => return Error::FutureDate(date).into_alert_response(),
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
                max_date: today,
            };

            return edit_expense_form_view(
                expense_id,
                &defaults,
                &categories,
                &format!("Error: {error}"),
            )
            .into_response();
        }
    };

    let existing = match get_expense(expense_id, user_id, &connection) {
        Ok(expense) => expense,
        Err(Error::NotFound) => return Error::UpdateMissingExpense.into_alert_response(),
        Err(error) => {
            tracing::error!("could not get expense {expense_id}: {error}");
            return error.into_alert_response();
        }
    };

    let expense = NewExpense {
        user_id,
        category_id: form.category_id,
        amount,
        description,
        created_at: existing.created_at.replace_date(form.date),
    };

    match update_expense(expense_id, expense, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::EXPENSES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("could not update expense {expense_id}: {error}");
            error.into_alert_response()
        }
    }
}

fn edit_expense_form_view(
    expense_id: ExpenseId,
    defaults: &ExpenseFormDefaults<'_>,
    categories: &[Category],
    error_message: &str,
) -> Markup {
    let update_url = endpoints::format_endpoint(endpoints::PUT_EXPENSE, expense_id);

    html! {
        form
            hx-put=(update_url)
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

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save Expense" }
        }
    }
}

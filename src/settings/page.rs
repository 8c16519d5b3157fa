//! The settings page and the endpoint for changing the monthly income.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        dollar_input_styles,
    },
    navigation::NavBar,
    settings::{MonthlyIncome, get_monthly_income, set_monthly_income},
};

/// The state needed for the settings page and endpoint.
#[derive(Debug, Clone)]
pub struct SettingsState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SettingsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for the monthly income form.
#[derive(Debug, Deserialize)]
pub struct MonthlyIncomeForm {
    pub monthly_income: Decimal,
}

/// Render the settings page.
pub async fn get_settings_page(
    State(state): State<SettingsState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let monthly_income = get_monthly_income(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve monthly income: {error}"))?;

    let nav_bar = NavBar::new(endpoints::SETTINGS_VIEW).into_html();
    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="mb-4 text-xl font-bold" { "Settings" }
            (income_form_view(monthly_income, ""))
        }
    };

    Ok(base("Settings", &[dollar_input_styles()], &content).into_response())
}

/// Handle the monthly income form submission.
pub async fn update_monthly_income_endpoint(
    State(state): State<SettingsState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<MonthlyIncomeForm>,
) -> Response {
    let income = match MonthlyIncome::new(form.monthly_income) {
        Ok(income) => income,
        Err(error) => {
            return income_form_view(form.monthly_income, &format!("Error: {error}"))
                .into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match set_monthly_income(user_id, income, &connection) {
        Ok(()) => (
            HxRedirect(endpoints::BUDGET_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not set the monthly income for user {user_id}: {error}");
            error.into_alert_response()
        }
    }
}

fn income_form_view(monthly_income: Decimal, error_message: &str) -> Markup {
    html! {
        form
            hx-put=(endpoints::PUT_MONTHLY_INCOME)
            hx-target-error="#alert-container"
            hx-swap="outerHTML"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="monthly_income" class=(FORM_LABEL_STYLE) { "Monthly income" }

                div class="input-wrapper"
                {
                    input
                        id="monthly_income"
                        type="number"
                        name="monthly_income"
                        step="0.01"
                        min="0"
                        required
                        value=(monthly_income)
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400" { (error_message) }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save" }
        }
    }
}

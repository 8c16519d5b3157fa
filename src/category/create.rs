//! Category creation page and endpoint.

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

use crate::{
    AppState, Error,
    auth::UserID,
    category::{
        CategoryColor, NewCategory, create_category, domain::CategoryFormData,
        form::category_form_fields,
    },
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, dollar_input_styles},
    navigation::NavBar,
};

/// The state needed for creating a category.
#[derive(Debug, Clone)]
pub struct CreateCategoryEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateCategoryEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the category creation page.
pub async fn get_new_category_page() -> Response {
    new_category_view().into_response()
}

/// Handle category creation form submission.
pub async fn create_category_endpoint(
    State(state): State<CreateCategoryEndpointState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<CategoryFormData>,
) -> Response {
    let (name, color, budget_amount) = match form.validate() {
        Ok(fields) => fields,
        Err(error) => {
            return new_category_form_view(&form, &format!("Error: {error}")).into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let new_category = NewCategory {
        user_id,
        name,
        color,
        budget_amount,
    };

    match create_category(new_category, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::BUDGET_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a category: {error}");

            error.into_alert_response()
        }
    }
}

fn new_category_view() -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_CATEGORY_VIEW).into_html();
    let form = new_category_form_view(
        &CategoryFormData {
            name: String::new(),
            color: CategoryColor::DEFAULT.to_owned(),
            budget_amount: Decimal::ZERO,
        },
        "",
    );

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="mb-4 text-xl font-bold" { "New Category" }
            (form)
        }
    };

    base("Create Category", &[dollar_input_styles()], &content)
}

fn new_category_form_view(form: &CategoryFormData, error_message: &str) -> Markup {
    html! {
        form
            hx-post=(endpoints::POST_CATEGORY)
            hx-target-error="#alert-container"
            hx-swap="outerHTML"
            class="w-full space-y-4 md:space-y-6"
        {
            (category_form_fields(&form.name, &form.color, form.budget_amount))

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Category" }
        }
    }
}

#[cfg(test)]
mod new_category_page_tests {
    use axum::http::StatusCode;

    use crate::{
        category::get_new_category_page,
        endpoints,
        test_utils::{
            assert_form_input, assert_form_submit_button, assert_hx_endpoint, assert_valid_html,
            must_get_form, parse_html_document,
        },
    };

    #[tokio::test]
    async fn render_page() {
        let response = get_new_category_page().await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::POST_CATEGORY, "hx-post");
        assert_form_input(&form, "name", "text");
        assert_form_input(&form, "color", "radio");
        assert_form_input(&form, "budget_amount", "number");
        assert_form_submit_button(&form);
    }
}

#[cfg(test)]
mod create_category_endpoint_tests {
    use axum::{Extension, Form, extract::State, http::StatusCode};
    use rust_decimal::Decimal;

    use crate::{
        category::{create_category_endpoint, domain::CategoryFormData, get_categories},
        endpoints,
        test_utils::{
            assert_form_error_message, assert_hx_redirect, assert_valid_html, must_get_form,
            parse_html_fragment, test_db_with_user,
        },
    };

    use super::CreateCategoryEndpointState;

    #[tokio::test]
    async fn can_create_category() {
        let (connection, user) = test_db_with_user();
        let state = CreateCategoryEndpointState {
            db_connection: connection,
        };
        let form = CategoryFormData {
            name: "Groceries".to_owned(),
            color: "#10B981".to_owned(),
            budget_amount: Decimal::new(40050, 2),
        };

        let response =
            create_category_endpoint(State(state.clone()), Extension(user.id), Form(form)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::BUDGET_VIEW);
        let categories = get_categories(user.id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name.as_ref(), "Groceries");
        assert_eq!(categories[0].color.as_ref(), "#10b981");
        assert_eq!(categories[0].budget_amount.as_decimal(), Decimal::new(40050, 2));
        assert_eq!(categories[0].user_id, user.id);
    }

    #[tokio::test]
    async fn create_category_fails_on_empty_name() {
        let (connection, user) = test_db_with_user();
        let state = CreateCategoryEndpointState {
            db_connection: connection,
        };
        let form = CategoryFormData {
            name: " ".to_owned(),
            color: "#10b981".to_owned(),
            budget_amount: Decimal::ZERO,
        };

        let response = create_category_endpoint(State(state), Extension(user.id), Form(form)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Error: Category name cannot be empty");
    }

    #[tokio::test]
    async fn create_category_fails_on_negative_budget() {
        let (connection, user) = test_db_with_user();
        let state = CreateCategoryEndpointState {
            db_connection: connection,
        };
        let form = CategoryFormData {
            name: "Rent".to_owned(),
            color: "#3b82f6".to_owned(),
            budget_amount: Decimal::new(-5, 0),
        };

        let response = create_category_endpoint(State(state), Extension(user.id), Form(form)).await;

        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Error: Budget amount cannot be negative");
    }
}

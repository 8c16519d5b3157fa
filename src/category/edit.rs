//! Category editing page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    category::{
        CategoryId, domain::CategoryFormData, form::category_form_fields, get_category,
        update_category,
    },
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, dollar_input_styles},
    navigation::NavBar,
};

/// The state needed for the edit category page and endpoint.
#[derive(Debug, Clone)]
pub struct EditCategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the category editing page.
///
/// Categories that do not exist, or belong to another user, get the 404 page.
pub async fn get_edit_category_page(
    Path(category_id): Path<CategoryId>,
    State(state): State<EditCategoryState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let category = get_category(category_id, user_id, &connection).inspect_err(|error| {
        if *error != Error::NotFound {
            tracing::error!("Failed to retrieve category {category_id}: {error}");
        }
    })?;

    let form = CategoryFormData {
        name: category.name.to_string(),
        color: category.color.to_string(),
        budget_amount: category.budget_amount.as_decimal(),
    };

    Ok(edit_category_view(category_id, &form).into_response())
}

/// Handle category update form submission.
pub async fn update_category_endpoint(
    Path(category_id): Path<CategoryId>,
    State(state): State<EditCategoryState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<CategoryFormData>,
) -> Response {
    let (name, color, budget_amount) = match form.validate() {
        Ok(fields) => fields,
        Err(error) => {
            return edit_category_form_view(category_id, &form, &format!("Error: {error}"))
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

    match update_category(category_id, user_id, name, color, budget_amount, &connection) {
        Ok(()) => (
            HxRedirect(endpoints::BUDGET_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(Error::UpdateMissingCategory) => Error::UpdateMissingCategory.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating category {category_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

fn edit_category_view(category_id: CategoryId, form: &CategoryFormData) -> Markup {
    let edit_endpoint = endpoints::format_endpoint(endpoints::EDIT_CATEGORY_VIEW, category_id);
    let nav_bar = NavBar::new(&edit_endpoint).into_html();

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="mb-4 text-xl font-bold" { "Edit Category" }
            (edit_category_form_view(category_id, form, ""))
        }
    };

    base("Edit Category", &[dollar_input_styles()], &content)
}

fn edit_category_form_view(
    category_id: CategoryId,
    form: &CategoryFormData,
    error_message: &str,
) -> Markup {
    let update_endpoint = endpoints::format_endpoint(endpoints::PUT_CATEGORY, category_id);

    html! {
        form
            hx-put=(update_endpoint)
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

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Update Category" }
        }
    }
}

#[cfg(test)]
mod edit_category_page_tests {
    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };

    use crate::{
        Error,
        auth::UserID,
        category::{get_edit_category_page, test_category},
        endpoints::{self, format_endpoint},
        test_utils::{
            assert_form_input_with_value, assert_hx_endpoint, assert_valid_html, must_get_form,
            parse_html_document, test_db_with_user,
        },
    };

    use super::EditCategoryState;

    #[tokio::test]
    async fn render_page_with_category_values() {
        let (connection, user) = test_db_with_user();
        let category = test_category(user.id, "Groceries", &connection.lock().unwrap());
        let state = EditCategoryState {
            db_connection: connection,
        };

        let response = get_edit_category_page(Path(category.id), State(state), Extension(user.id))
            .await
            .expect("Could not render page");

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(
            &form,
            &format_endpoint(endpoints::PUT_CATEGORY, category.id),
            "hx-put",
        );
        assert_form_input_with_value(&form, "name", "text", "Groceries");
        assert_form_input_with_value(&form, "budget_amount", "number", "100");
    }

    #[tokio::test]
    async fn other_users_category_is_not_found() {
        let (connection, user) = test_db_with_user();
        let category = test_category(user.id, "Groceries", &connection.lock().unwrap());
        let state = EditCategoryState {
            db_connection: connection,
        };

        let result = get_edit_category_page(
            Path(category.id),
            State(state),
            Extension(UserID::new(user.id.as_i64() + 1)),
        )
        .await;

        assert_eq!(result.err(), Some(Error::NotFound));
    }
}

//! Endpoint for adding the preset categories to a user's budget.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error, alert::Alert, auth::UserID, category::db::add_preset_categories, endpoints,
};

/// The state needed for adding preset categories.
#[derive(Debug, Clone)]
pub struct PresetCategoriesState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for PresetCategoriesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Add every preset category the user is missing, then reload the budget page.
pub async fn add_preset_categories_endpoint(
    State(state): State<PresetCategoriesState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match add_preset_categories(user_id, &connection) {
        Ok(0) => Alert::SuccessSimple {
            message: "Your budget already has every preset category".to_owned(),
        }
        .into_response(),
        Ok(added) => {
            tracing::info!("Added {added} preset categories for user {user_id}");
            (
                HxRedirect(endpoints::BUDGET_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("Could not add preset categories: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{Extension, extract::State, http::StatusCode};

    use crate::{
        category::{PRESET_CATEGORIES, get_categories},
        endpoints,
        test_utils::{assert_hx_redirect, test_db_with_user},
    };

    use super::{PresetCategoriesState, add_preset_categories_endpoint};

    #[tokio::test]
    async fn adds_presets_then_reports_nothing_to_add() {
        let (connection, user) = test_db_with_user();
        let state = PresetCategoriesState {
            db_connection: connection,
        };

        let response = add_preset_categories_endpoint(State(state.clone()), Extension(user.id)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::BUDGET_VIEW);
        assert_eq!(
            get_categories(user.id, &state.db_connection.lock().unwrap())
                .unwrap()
                .len(),
            PRESET_CATEGORIES.len()
        );

        let response = add_preset_categories_endpoint(State(state), Extension(user.id)).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("hx-redirect").is_none());
    }
}

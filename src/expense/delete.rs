//! Expense deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    auth::UserID,
    expense::{ExpenseId, delete_expense},
};

/// The state needed for deleting an expense.
#[derive(Debug, Clone)]
pub struct DeleteExpenseState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle expense deletion. Returns success alert or error.
pub async fn delete_expense_endpoint(
    Path(expense_id): Path<ExpenseId>,
    State(state): State<DeleteExpenseState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_expense(expense_id, user_id, &connection) {
        Ok(()) => Alert::SuccessSimple {
            message: "Expense deleted successfully".to_owned(),
        }
        .into_response(),
        Err(Error::DeleteMissingExpense) => Error::DeleteMissingExpense.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting expense {expense_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };
    use rust_decimal::Decimal;
    use time::OffsetDateTime;

    use crate::{
        Error,
        auth::UserID,
        category::test_category,
        expense::{ExpenseAmount, NewExpense, create_expense, get_expense},
        test_utils::test_db_with_user,
    };

    use super::{DeleteExpenseState, delete_expense_endpoint};

    #[tokio::test]
    async fn deletes_expense() {
        let (connection, user) = test_db_with_user();
        let expense = {
            let connection = connection.lock().unwrap();
            let category = test_category(user.id, "Groceries", &connection);
            create_expense(
                NewExpense {
                    user_id: user.id,
                    category_id: category.id,
                    amount: ExpenseAmount::new(Decimal::ONE).unwrap(),
                    description: None,
                    created_at: OffsetDateTime::now_utc(),
                },
                &connection,
            )
            .unwrap()
        };
        let state = DeleteExpenseState {
            db_connection: connection,
        };

        let response =
            delete_expense_endpoint(Path(expense.id), State(state.clone()), Extension(user.id))
                .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            get_expense(expense.id, user.id, &state.db_connection.lock().unwrap()),
            Err(Error::NotFound)
        );
    }

    #[tokio::test]
    async fn cannot_delete_other_users_expense() {
        let (connection, user) = test_db_with_user();
        let expense = {
            let connection = connection.lock().unwrap();
            let category = test_category(user.id, "Groceries", &connection);
            create_expense(
                NewExpense {
                    user_id: user.id,
                    category_id: category.id,
                    amount: ExpenseAmount::new(Decimal::ONE).unwrap(),
                    description: None,
                    created_at: OffsetDateTime::now_utc(),
                },
                &connection,
            )
            .unwrap()
        };
        let state = DeleteExpenseState {
            db_connection: connection,
        };

        let response = delete_expense_endpoint(
            Path(expense.id),
            State(state.clone()),
            Extension(UserID::new(user.id.as_i64() + 1)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(get_expense(expense.id, user.id, &state.db_connection.lock().unwrap()).is_ok());
    }
}

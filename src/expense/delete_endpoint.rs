//! Defines the endpoint for deleting an expense.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde_json::{Value, json};

use crate::{
    Error,
    app_state::LedgerState,
    db::lock_connection,
    expense::{core::delete_expense, parse_expense_id},
    user::UserId,
};

/// A route handler for deleting an expense.
///
/// Expenses owned by other users are reported as not found.
pub async fn remove_expense_endpoint(
    State(state): State<LedgerState>,
    Extension(user_id): Extension<UserId>,
    Path(expense_id): Path<String>,
) -> Result<Json<Value>, Error> {
    let expense_id = parse_expense_id(&expense_id)?;
    let connection = lock_connection(&state.db_connection)?;

    delete_expense(&user_id, expense_id, &connection)?;
    tracing::debug!("User {user_id} removed expense {expense_id}");

    Ok(Json(json!({
        "message": format!("Expense with ID {expense_id} removed successfully")
    })))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::{
        endpoints::{self, format_endpoint},
        test_utils::{get_test_server, log_in},
    };

    #[tokio::test]
    async fn removes_expense_and_restores_balance() {
        let server = get_test_server();
        let cookie = log_in(&server, "alice").await;
        server
            .post(endpoints::ADD_FUNDS)
            .add_cookie(cookie.clone())
            .json(&json!({ "amount": 100, "method": "cash" }))
            .await
            .assert_status_ok();
        let id = server
            .post(endpoints::ADD_EXPENSE)
            .add_cookie(cookie.clone())
            .json(&json!({
                "date": "2025-03-14",
                "descr": "Groceries",
                "amount": 40,
                "method": "cash",
                "category": "Food",
                "type": "Need",
            }))
            .await
            .json::<Value>()["id"]
            .as_i64()
            .expect("created expense should have an integer id");

        let response = server
            .post(&format_endpoint(endpoints::REMOVE_EXPENSE, id))
            .add_cookie(cookie.clone())
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({
            "message": format!("Expense with ID {id} removed successfully")
        }));
        server
            .get(endpoints::GET_EXPENSES)
            .add_cookie(cookie.clone())
            .await
            .assert_json(&json!([]));
        server
            .get(endpoints::GET_BALANCE)
            .add_cookie(cookie.clone())
            .await
            .assert_json(&json!({
                "cash_balance": "100.00",
                "checking_balance": "0.00",
                "total_balance": "100.00",
            }));

        server
            .post(&format_endpoint(endpoints::REMOVE_EXPENSE, id))
            .add_cookie(cookie)
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn other_users_expense_is_not_found() {
        let server = get_test_server();
        let alice = log_in(&server, "alice").await;
        let bob = log_in(&server, "bob").await;
        let id = server
            .post(endpoints::ADD_EXPENSE)
            .add_cookie(alice.clone())
            .json(&json!({
                "date": "2025-03-14",
                "descr": "Groceries",
                "amount": 40,
                "method": "cash",
                "category": "Food",
                "type": "Need",
            }))
            .await
            .json::<Value>()["id"]
            .as_i64()
            .expect("created expense should have an integer id");

        server
            .post(&format_endpoint(endpoints::REMOVE_EXPENSE, id))
            .add_cookie(bob)
            .await
            .assert_status_not_found();

        let expenses = server
            .get(endpoints::GET_EXPENSES)
            .add_cookie(alice)
            .await
            .json::<Value>();
        assert_eq!(expenses.as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn malformed_id_is_not_found() {
        let server = get_test_server();
        let cookie = log_in(&server, "alice").await;

        server
            .post(&format_endpoint(endpoints::REMOVE_EXPENSE, "first"))
            .add_cookie(cookie)
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn requires_session() {
        let server = get_test_server();

        server
            .post(&format_endpoint(endpoints::REMOVE_EXPENSE, 1))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}

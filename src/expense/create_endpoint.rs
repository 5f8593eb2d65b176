//! Defines the endpoint for recording a new expense.

use axum::{Extension, Json, extract::State};
use rusqlite::Connection;

use crate::{
    Error,
    app_state::LedgerState,
    balance::{Account, get_balance},
    db::lock_connection,
    expense::{
        Expense, ExpenseFields,
        core::create_expense,
        form::ExpenseForm,
    },
    json::JsonBody,
    user::UserId,
};

/// A route handler for recording a new expense, responds with the created expense.
///
/// When the server requires sufficient funds, an expense paid by cash or
/// checking that is larger than that account's balance is rejected.
pub async fn add_expense_endpoint(
    State(state): State<LedgerState>,
    Extension(user_id): Extension<UserId>,
    JsonBody(form): JsonBody<ExpenseForm>,
) -> Result<Json<Expense>, Error> {
    let fields = form.validate()?;
    let connection = lock_connection(&state.db_connection)?;

    if state.ledger_options.require_sufficient_funds {
        check_sufficient_funds(&user_id, &fields, &connection)?;
    }

    let expense = create_expense(&user_id, fields, &connection)?;
    tracing::debug!("User {user_id} recorded expense {}", expense.id);

    Ok(Json(expense))
}

fn check_sufficient_funds(
    user_id: &UserId,
    fields: &ExpenseFields,
    connection: &Connection,
) -> Result<(), Error> {
    let Some(account) = Account::from_method(&fields.method) else {
        return Ok(());
    };

    let balance = get_balance(user_id, connection)?;

    if fields.amount.as_decimal() > balance.of(account) {
        return Err(Error::Validation(format!("Insufficient {account} funds!")));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::{
        app_state::LedgerOptions,
        endpoints,
        test_utils::{get_test_server, get_test_server_with_options, log_in},
    };

    fn groceries(amount: Value, method: &str) -> Value {
        json!({
            "date": "2025-03-14",
            "descr": "Groceries",
            "amount": amount,
            "method": method,
            "category": "Food",
            "type": "Need",
        })
    }

    #[tokio::test]
    async fn creates_expense() {
        let server = get_test_server();
        let cookie = log_in(&server, "alice").await;

        let response = server
            .post(endpoints::ADD_EXPENSE)
            .add_cookie(cookie)
            .json(&groceries(json!(40), "cash"))
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.json::<Value>(),
            json!({
                "id": 1,
                "date": "2025-03-14",
                "descr": "Groceries",
                "amount": "40.00",
                "method": "cash",
                "category": "Food",
                "type": "Need",
            })
        );
    }

    #[tokio::test]
    async fn rejects_invalid_amount_without_storing() {
        let server = get_test_server();
        let cookie = log_in(&server, "alice").await;

        for amount in [json!("abc"), json!(0), json!(-5)] {
            let response = server
                .post(endpoints::ADD_EXPENSE)
                .add_cookie(cookie.clone())
                .json(&groceries(amount, "cash"))
                .await;

            response.assert_status_bad_request();
            assert!(response.json::<Value>()["message"].is_string());
        }

        server
            .get(endpoints::GET_EXPENSES)
            .add_cookie(cookie)
            .await
            .assert_json(&json!([]));
    }

    #[tokio::test]
    async fn rejects_invalid_date() {
        let server = get_test_server();
        let cookie = log_in(&server, "alice").await;
        let mut body = groceries(json!(1), "cash");
        body["date"] = json!("2025-13-01");

        let response = server
            .post(endpoints::ADD_EXPENSE)
            .add_cookie(cookie)
            .json(&body)
            .await;

        response.assert_status_bad_request();
        response.assert_json(&json!({
            "message": "Date must be a valid calendar date in the format YYYY-MM-DD."
        }));
    }

    #[tokio::test]
    async fn rejects_malformed_json() {
        let server = get_test_server();
        let cookie = log_in(&server, "alice").await;

        let response = server
            .post(endpoints::ADD_EXPENSE)
            .add_cookie(cookie)
            .text("{not json")
            .content_type("application/json")
            .await;

        response.assert_status_bad_request();
        assert!(response.json::<Value>()["message"].is_string());
    }

    #[tokio::test]
    async fn requires_session() {
        let server = get_test_server();

        server
            .post(endpoints::ADD_EXPENSE)
            .json(&groceries(json!(1), "cash"))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn allows_overdraft_by_default() {
        let server = get_test_server();
        let cookie = log_in(&server, "alice").await;

        server
            .post(endpoints::ADD_EXPENSE)
            .add_cookie(cookie)
            .json(&groceries(json!(40), "cash"))
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn rejects_overdraft_when_funds_are_required() {
        let server = get_test_server_with_options(LedgerOptions {
            require_sufficient_funds: true,
        });
        let cookie = log_in(&server, "alice").await;
        server
            .post(endpoints::ADD_FUNDS)
            .add_cookie(cookie.clone())
            .json(&json!({ "amount": "30", "method": "cash" }))
            .await
            .assert_status_ok();

        let response = server
            .post(endpoints::ADD_EXPENSE)
            .add_cookie(cookie.clone())
            .json(&groceries(json!("30.01"), "cash"))
            .await;
        response.assert_status_bad_request();
        response.assert_json(&json!({ "message": "Insufficient cash funds!" }));

        let response = server
            .post(endpoints::ADD_EXPENSE)
            .add_cookie(cookie.clone())
            .json(&groceries(json!(1), "Checking"))
            .await;
        response.assert_status_bad_request();
        response.assert_json(&json!({ "message": "Insufficient checking funds!" }));

        server
            .post(endpoints::ADD_EXPENSE)
            .add_cookie(cookie.clone())
            .json(&groceries(json!(30), "cash"))
            .await
            .assert_status_ok();
        server
            .post(endpoints::ADD_EXPENSE)
            .add_cookie(cookie)
            .json(&groceries(json!(500), "credit"))
            .await
            .assert_status_ok();
    }
}

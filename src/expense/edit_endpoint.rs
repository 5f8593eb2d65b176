//! Defines the endpoint for editing an expense.

use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::{
    Error,
    app_state::LedgerState,
    db::lock_connection,
    expense::{Expense, core::update_expense, form::ExpenseForm, parse_expense_id},
    json::JsonBody,
    user::UserId,
};

/// A route handler for replacing every field of an expense, responds with the
/// updated expense.
///
/// Expenses owned by other users are reported as not found.
pub async fn edit_expense_endpoint(
    State(state): State<LedgerState>,
    Extension(user_id): Extension<UserId>,
    Path(expense_id): Path<String>,
    JsonBody(form): JsonBody<ExpenseForm>,
) -> Result<Json<Expense>, Error> {
    let expense_id = parse_expense_id(&expense_id)?;
    let fields = form.validate()?;
    let connection = lock_connection(&state.db_connection)?;

    let expense = update_expense(&user_id, expense_id, fields, &connection)?;
    tracing::debug!("User {user_id} edited expense {expense_id}");

    Ok(Json(expense))
}

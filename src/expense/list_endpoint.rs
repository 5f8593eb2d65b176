//! Defines the endpoint for listing a user's expenses.

use axum::{Extension, Json, extract::State};

use crate::{
    Error,
    app_state::LedgerState,
    db::lock_connection,
    expense::{Expense, core::list_expenses},
    user::UserId,
};

/// A route handler for listing the user's expenses, newest first.
pub async fn get_expenses_endpoint(
    State(state): State<LedgerState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Json<Vec<Expense>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    list_expenses(&user_id, &connection).map(Json)
}

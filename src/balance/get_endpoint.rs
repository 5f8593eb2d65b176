//! Defines the endpoint for getting a user's balance.

use axum::{Extension, Json, extract::State};

use crate::{
    Error,
    app_state::LedgerState,
    balance::core::{Balance, get_balance},
    db::lock_connection,
    user::UserId,
};

/// A route handler for getting the user's cash, checking and total balance.
pub async fn get_balance_endpoint(
    State(state): State<LedgerState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Json<Balance>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_balance(&user_id, &connection).map(Json)
}

//! Defines the endpoint for clearing a user's balance.

use axum::{Extension, Json, extract::State};
use serde_json::{Value, json};

use crate::{
    Error, app_state::LedgerState, balance::core::clear_balance, db::lock_connection,
    user::UserId,
};

/// A route handler for zeroing the user's cash and checking balance.
///
/// The user's expenses are kept.
pub async fn clear_balance_endpoint(
    State(state): State<LedgerState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Json<Value>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let reset = clear_balance(&user_id, &connection)?;
    tracing::debug!(
        "User {user_id} cleared their balance (cash offset {} cents, checking offset {} cents)",
        reset.cash_offset_cents,
        reset.checking_offset_cents
    );

    Ok(Json(json!({ "message": "Balance cleared successfully!" })))
}

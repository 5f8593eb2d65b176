//! Defines the endpoint for adding funds to an account.

use axum::{Extension, Json, extract::State};
use serde::Deserialize;

use crate::{
    Error,
    amount::RawAmount,
    app_state::LedgerState,
    balance::core::{Account, FundsAddition, add_funds},
    db::lock_connection,
    json::JsonBody,
    user::UserId,
};

pub const INVALID_METHOD_MSG: &str = "Method must be either cash or checking.";

/// The JSON body of an add funds request.
#[derive(Debug, Deserialize)]
pub struct FundsForm {
    pub amount: Option<RawAmount>,
    pub method: Option<String>,
}

/// A route handler for adding funds to the cash or checking account, responds
/// with the recorded funds addition.
pub async fn add_funds_endpoint(
    State(state): State<LedgerState>,
    Extension(user_id): Extension<UserId>,
    JsonBody(form): JsonBody<FundsForm>,
) -> Result<Json<FundsAddition>, Error> {
    let amount = form
        .amount
        .ok_or_else(|| Error::Validation("Amount is required.".to_owned()))?
        .parse()?;
    let account = form
        .method
        .as_deref()
        .and_then(Account::from_method)
        .ok_or_else(|| Error::Validation(INVALID_METHOD_MSG.to_owned()))?;

    let connection = lock_connection(&state.db_connection)?;
    let funds = add_funds(&user_id, amount, account, &connection)?;
    tracing::debug!("User {user_id} added {amount} to {account}");

    Ok(Json(funds))
}

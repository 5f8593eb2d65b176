//! The 50/30/20 breakdown of a user's spending.
//!
//! Each expense type ("Need", "Want", "Savings and Debt") is reported as a
//! percentage of the user's total funds, i.e. what they have left plus what
//! they have spent.

use axum::{Extension, Json, extract::State};
use rusqlite::Connection;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::{
    Error,
    amount::{cents_to_decimal, checked_sum},
    app_state::LedgerState,
    balance::get_balance,
    db::lock_connection,
    expense::sum_expenses_by_type,
    user::UserId,
};

const NEED: &str = "Need";
const WANT: &str = "Want";
const SAVINGS_AND_DEBT: &str = "Savings and Debt";
const PERCENTAGE_SCALE: u32 = 2;

/// How a user's spending splits across needs, wants and savings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpenseAnalysis {
    /// The current balance plus all expenses.
    pub total_funds: Decimal,
    /// The current cash and checking balance.
    pub total_balance: Decimal,
    /// The sum of all expenses, whatever their payment method.
    pub total_expenses: Decimal,
    pub needs_percentage: Decimal,
    pub wants_percentage: Decimal,
    pub savings_percentage: Decimal,
}

/// Break down `user_id`'s spending by expense type.
///
/// Types are matched ignoring case and surrounding whitespace. Other types
/// only count towards the total. All percentages are zero when the total
/// funds are not positive.
///
/// # Errors
/// This function will return a:
/// - [Error::SqlError] if there is an SQL error,
/// - or [Error::Overflow] if a total does not fit in an `i64` of cents.
pub fn analyze_expenses(user_id: &UserId, connection: &Connection) -> Result<ExpenseAnalysis, Error> {
    let balance = get_balance(user_id, connection)?;

    let mut total_cents = 0;
    let (mut need_cents, mut want_cents, mut savings_cents) = (0, 0, 0);

    for (kind, cents) in sum_expenses_by_type(user_id, connection)? {
        total_cents = checked_sum(total_cents, cents)?;

        let kind = kind.trim();
        if kind.eq_ignore_ascii_case(NEED) {
            need_cents = checked_sum(need_cents, cents)?;
        } else if kind.eq_ignore_ascii_case(WANT) {
            want_cents = checked_sum(want_cents, cents)?;
        } else if kind.eq_ignore_ascii_case(SAVINGS_AND_DEBT) {
            savings_cents = checked_sum(savings_cents, cents)?;
        }
    }

    let total_expenses = cents_to_decimal(total_cents);
    let total_funds = balance
        .total_balance
        .checked_add(total_expenses)
        .ok_or(Error::Overflow)?;
    let percentage_of_funds = |cents: i64| {
        let mut percentage = if total_funds > Decimal::ZERO {
            (cents_to_decimal(cents) / total_funds * Decimal::ONE_HUNDRED)
                .round_dp_with_strategy(PERCENTAGE_SCALE, RoundingStrategy::MidpointAwayFromZero)
        } else {
            Decimal::ZERO
        };
        percentage.rescale(PERCENTAGE_SCALE);
        percentage
    };

    Ok(ExpenseAnalysis {
        total_funds,
        total_balance: balance.total_balance,
        total_expenses,
        needs_percentage: percentage_of_funds(need_cents),
        wants_percentage: percentage_of_funds(want_cents),
        savings_percentage: percentage_of_funds(savings_cents),
    })
}

/// A route handler for the 50/30/20 breakdown of the user's expenses.
pub async fn analyze_expenses_endpoint(
    State(state): State<LedgerState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Json<ExpenseAnalysis>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    analyze_expenses(&user_id, &connection).map(Json)
}

//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/edit_expense/{expense_id}', use [format_endpoint].

/// The route for exchanging an identity token for a session.
pub const LOG_IN: &str = "/login";
/// The route for ending the current session.
pub const LOG_OUT: &str = "/logout";
/// The route for checking whether the client holds a valid session.
pub const CHECK_AUTH: &str = "/check_auth";
/// The route for listing the user's expenses.
pub const GET_EXPENSES: &str = "/get_expenses";
/// The route for recording a new expense.
pub const ADD_EXPENSE: &str = "/add_expense";
/// The route for replacing the fields of an expense.
pub const EDIT_EXPENSE: &str = "/edit_expense/{expense_id}";
/// The route for deleting an expense.
pub const REMOVE_EXPENSE: &str = "/remove_expense/{expense_id}";
/// The route for getting the user's cash, checking and total balance.
pub const GET_BALANCE: &str = "/get_balance";
/// The route for adding funds to the cash or checking account.
pub const ADD_FUNDS: &str = "/add_funds";
/// The route for zeroing the user's balance.
pub const CLEAR_BALANCE: &str = "/clear_balance";
/// The route for the 50/30/20 breakdown of the user's expenses.
pub const ANALYZE_EXPENSES: &str = "/analyze_expenses";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter starts with a left brace and ends with a right brace, e.g.
/// '{expense_id}' in '/edit_expense/{expense_id}'. Only the first parameter is
/// replaced. If there is no parameter the original `endpoint_path` is returned.
#[cfg(test)]
pub fn format_endpoint(endpoint_path: &str, id: impl std::fmt::Display) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map_or(endpoint_path.len(), |offset| param_start + offset + 1);

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

//! Expense management: the expense model, its database queries and the
//! routes for listing, adding, editing and removing expenses.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod form;
mod list_endpoint;

pub use core::{
    Expense, ExpenseFields, create_expense, create_expense_table, sum_expenses_by_method,
    sum_expenses_by_type,
};
pub use create_endpoint::add_expense_endpoint;
pub use delete_endpoint::remove_expense_endpoint;
pub use edit_endpoint::edit_expense_endpoint;
pub use list_endpoint::get_expenses_endpoint;

#[cfg(test)]
pub use core::{delete_expense, update_expense};

use crate::{Error, database_id::ExpenseId};

/// Parse an expense ID from a URL path.
///
/// An ID that is not an integer cannot refer to an expense, so it is reported
/// as [Error::NotFound].
fn parse_expense_id(raw_id: &str) -> Result<ExpenseId, Error> {
    raw_id.parse().map_err(|_| Error::NotFound)
}

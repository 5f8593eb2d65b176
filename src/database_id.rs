//! Database ID type definitions.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;
/// The ID of an expense, unique across all users' expenses.
pub type ExpenseId = DatabaseId;
/// The ID of a funds addition.
pub type FundsId = DatabaseId;

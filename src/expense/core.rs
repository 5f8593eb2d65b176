//! Defines the core data models and database queries for expenses.

use rusqlite::{Connection, Row, params};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, amount::Amount, database_id::ExpenseId, user::UserId};

// ============================================================================
// MODELS
// ============================================================================

pub(crate) mod date_format {
    //! Serializes a [time::Date] as an ISO 8601 calendar date, e.g. "2025-01-15".
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

    pub const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

    pub fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = date
            .format(DATE_FORMAT)
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Date::parse(&s, DATE_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Money spent by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// The ID of the expense.
    pub id: ExpenseId,
    /// When the money was spent.
    #[serde(with = "date_format")]
    pub date: Date,
    /// A text description of what the money was spent on.
    #[serde(rename = "descr")]
    pub description: String,
    /// How much was spent.
    pub amount: Amount,
    /// How the expense was paid, e.g. "cash" or "checking".
    pub method: String,
    /// What the expense was for, e.g. "groceries" or "rent".
    pub category: String,
    /// The budget bucket under the 50/30/20 rule, e.g. "Need", "Want" or "Savings and Debt".
    #[serde(rename = "type")]
    pub kind: String,
}

/// The fields of an expense a user can set.
///
/// Creating and editing an expense both take a complete set of fields, so an
/// edit replaces every field at once.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseFields {
    /// When the money was spent.
    pub date: Date,
    /// What the money was spent on.
    pub description: String,
    /// How much was spent.
    pub amount: Amount,
    /// How the expense was paid.
    pub method: String,
    /// What the expense was for.
    pub category: String,
    /// The budget bucket under the 50/30/20 rule.
    pub kind: String,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the expense table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS expense (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                date TEXT NOT NULL,
                description TEXT NOT NULL,
                amount_cents INTEGER NOT NULL CHECK (amount_cents > 0),
                method TEXT NOT NULL,
                category TEXT NOT NULL,
                type TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_expense_user_date ON expense(user_id, date);",
        (),
    )?;

    Ok(())
}

const EXPENSE_COLUMNS: &str = "id, date, description, amount_cents, method, category, type";

/// Record a new expense for `user_id`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error,
/// e.g. `user_id` does not refer to a registered user.
pub fn create_expense(
    user_id: &UserId,
    fields: ExpenseFields,
    connection: &Connection,
) -> Result<Expense, Error> {
    let expense = connection
        .prepare(&format!(
            "INSERT INTO expense (user_id, date, description, amount_cents, method, category, type)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING {EXPENSE_COLUMNS}"
        ))?
        .query_row(
            params![
                user_id,
                fields.date,
                fields.description,
                fields.amount,
                fields.method,
                fields.category,
                fields.kind,
            ],
            map_expense_row,
        )?;

    Ok(expense)
}

/// Retrieve one of `user_id`'s expenses by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to an expense owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
#[cfg(test)]
pub fn get_expense(
    user_id: &UserId,
    id: ExpenseId,
    connection: &Connection,
) -> Result<Expense, Error> {
    let expense = connection
        .prepare(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expense WHERE id = ?1 AND user_id = ?2"
        ))?
        .query_one(params![id, user_id], map_expense_row)?;

    Ok(expense)
}

/// Get all of `user_id`'s expenses, newest first.
///
/// Expenses on the same date are listed in the order they were recorded.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn list_expenses(user_id: &UserId, connection: &Connection) -> Result<Vec<Expense>, Error> {
    connection
        .prepare(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expense WHERE user_id = :user_id ORDER BY date DESC, id ASC"
        ))?
        .query_map(&[(":user_id", user_id)], map_expense_row)?
        .map(|maybe_expense| maybe_expense.map_err(Error::from))
        .collect()
}

/// Replace every editable field of the expense `id` owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to an expense owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_expense(
    user_id: &UserId,
    id: ExpenseId,
    fields: ExpenseFields,
    connection: &Connection,
) -> Result<Expense, Error> {
    let expense = connection
        .prepare(&format!(
            "UPDATE expense
             SET date = ?1, description = ?2, amount_cents = ?3, method = ?4, category = ?5, type = ?6
             WHERE id = ?7 AND user_id = ?8
             RETURNING {EXPENSE_COLUMNS}"
        ))?
        .query_row(
            params![
                fields.date,
                fields.description,
                fields.amount,
                fields.method,
                fields.category,
                fields.kind,
                id,
                user_id,
            ],
            map_expense_row,
        )?;

    Ok(expense)
}

/// Delete the expense `id` owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to an expense owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_expense(user_id: &UserId, id: ExpenseId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM expense WHERE id = ?1 AND user_id = ?2",
        params![id, user_id],
    )?;

    match rows_affected {
        0 => Err(Error::NotFound),
        _ => Ok(()),
    }
}

/// The total amount in cents of `user_id`'s expenses for each payment method,
/// exactly as the methods were entered.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn sum_expenses_by_method(
    user_id: &UserId,
    connection: &Connection,
) -> Result<Vec<(String, i64)>, Error> {
    sum_expenses_grouped_by("method", user_id, connection)
}

/// The total amount in cents of `user_id`'s expenses for each expense type.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn sum_expenses_by_type(
    user_id: &UserId,
    connection: &Connection,
) -> Result<Vec<(String, i64)>, Error> {
    sum_expenses_grouped_by("type", user_id, connection)
}

fn sum_expenses_grouped_by(
    column: &'static str,
    user_id: &UserId,
    connection: &Connection,
) -> Result<Vec<(String, i64)>, Error> {
    connection
        .prepare(&format!(
            "SELECT {column}, SUM(amount_cents) FROM expense WHERE user_id = :user_id GROUP BY {column}"
        ))?
        .query_map(&[(":user_id", user_id)], |row| Ok((row.get(0)?, row.get(1)?)))?
        .map(|maybe_sum| maybe_sum.map_err(Error::from))
        .collect()
}

/// Map a database row to an Expense.
pub fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    let id = row.get(0)?;
    let date = row.get(1)?;
    let description = row.get(2)?;
    let amount = row.get(3)?;
    let method = row.get(4)?;
    let category = row.get(5)?;
    let kind = row.get(6)?;

    Ok(Expense {
        id,
        date,
        description,
        amount,
        method,
        category,
        kind,
    })
}

// ============================================================================
// TESTS
// ============================================================================

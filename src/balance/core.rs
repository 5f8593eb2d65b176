//! Funds, balance resets and the balance calculation.
//!
//! Balances are never stored. They are summed from a user's funds additions,
//! expenses and balance resets each time they are requested.

use std::fmt::Display;

use rusqlite::{Connection, Row, Transaction, TransactionBehavior, params};
use rust_decimal::Decimal;
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    Error,
    amount::{Amount, cents_to_decimal, checked_sum},
    database_id::{DatabaseId, FundsId},
    expense::sum_expenses_by_method,
    user::UserId,
};

// ============================================================================
// MODELS
// ============================================================================

/// An account that payment methods draw from and funds are added to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Account {
    /// Money on hand.
    Cash,
    /// Money in the bank.
    Checking,
}

impl Account {
    /// The account a payment method refers to.
    ///
    /// Methods are matched ignoring case and surrounding whitespace. Any
    /// method other than cash or checking, e.g. "credit", has no account and
    /// returns `None`.
    pub fn from_method(method: &str) -> Option<Self> {
        let method = method.trim();

        if method.eq_ignore_ascii_case("cash") {
            Some(Account::Cash)
        } else if method.eq_ignore_ascii_case("checking") {
            Some(Account::Checking)
        } else {
            None
        }
    }

    /// The canonical method name for the account.
    pub fn as_str(self) -> &'static str {
        match self {
            Account::Cash => "cash",
            Account::Checking => "checking",
        }
    }
}

impl Display for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Money added to one of a user's accounts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FundsAddition {
    /// The ID of the funds addition.
    pub id: FundsId,
    /// How much was added.
    pub amount: Amount,
    /// The canonical name of the account the funds were added to.
    pub method: String,
    /// When the funds were added.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The record left by clearing a user's balance.
///
/// The offsets are added to the account balances computed from funds and
/// expenses, so the balance reads zero right after the reset.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceReset {
    pub id: DatabaseId,
    pub cash_offset_cents: i64,
    pub checking_offset_cents: i64,
    pub created_at: OffsetDateTime,
}

/// How much money a user has in each account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Balance {
    pub cash_balance: Decimal,
    pub checking_balance: Decimal,
    /// The sum of the cash and checking balances.
    pub total_balance: Decimal,
}

impl Balance {
    fn from_cents(cents: AccountCents) -> Result<Self, Error> {
        Ok(Self {
            cash_balance: cents_to_decimal(cents.cash),
            checking_balance: cents_to_decimal(cents.checking),
            total_balance: cents_to_decimal(checked_sum(cents.cash, cents.checking)?),
        })
    }

    /// The balance of a single account.
    pub fn of(&self, account: Account) -> Decimal {
        match account {
            Account::Cash => self.cash_balance,
            Account::Checking => self.checking_balance,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct AccountCents {
    cash: i64,
    checking: i64,
}

impl AccountCents {
    fn add(&mut self, method: &str, cents: i64) -> Result<(), Error> {
        match Account::from_method(method) {
            Some(Account::Cash) => self.cash = checked_sum(self.cash, cents)?,
            Some(Account::Checking) => self.checking = checked_sum(self.checking, cents)?,
            None => {}
        }

        Ok(())
    }
}

fn checked_negate(cents: i64) -> Result<i64, Error> {
    cents.checked_neg().ok_or(Error::Overflow)
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the table recording funds added by users.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_funds_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS funds (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                amount_cents INTEGER NOT NULL CHECK (amount_cents > 0),
                method TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_funds_user ON funds(user_id);",
        (),
    )?;

    Ok(())
}

/// Create the table recording balance resets.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_balance_reset_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS balance_reset (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                cash_offset_cents INTEGER NOT NULL,
                checking_offset_cents INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_balance_reset_user ON balance_reset(user_id);",
        (),
    )?;

    Ok(())
}

/// Add `amount` to `user_id`'s `account`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn add_funds(
    user_id: &UserId,
    amount: Amount,
    account: Account,
    connection: &Connection,
) -> Result<FundsAddition, Error> {
    let funds = connection
        .prepare(
            "INSERT INTO funds (user_id, amount_cents, method, created_at)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, amount_cents, method, created_at",
        )?
        .query_row(
            params![
                user_id,
                amount,
                account.as_str(),
                OffsetDateTime::now_utc()
            ],
            map_funds_row,
        )?;

    Ok(funds)
}

/// Get every funds addition made by `user_id`, oldest first.
#[cfg(test)]
pub fn list_funds(user_id: &UserId, connection: &Connection) -> Result<Vec<FundsAddition>, Error> {
    connection
        .prepare(
            "SELECT id, amount_cents, method, created_at FROM funds
             WHERE user_id = :user_id ORDER BY id ASC",
        )?
        .query_map(&[(":user_id", user_id)], map_funds_row)?
        .map(|maybe_funds| maybe_funds.map_err(Error::from))
        .collect()
}

/// Calculate `user_id`'s current balance.
///
/// # Errors
/// This function will return a:
/// - [Error::SqlError] if there is an SQL error,
/// - or [Error::Overflow] if a balance does not fit in an `i64` of cents.
pub fn get_balance(user_id: &UserId, connection: &Connection) -> Result<Balance, Error> {
    get_account_cents(user_id, connection).and_then(Balance::from_cents)
}

/// Zero `user_id`'s balance by recording offsets that cancel out the current
/// cash and checking balances.
///
/// Expenses and funds additions are kept.
///
/// # Errors
/// This function will return a:
/// - [Error::SqlError] if there is an SQL error,
/// - or [Error::Overflow] if a balance does not fit in an `i64` of cents.
pub fn clear_balance(user_id: &UserId, connection: &Connection) -> Result<BalanceReset, Error> {
    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    let current = get_account_cents(user_id, &transaction)?;
    let cash_offset = checked_negate(current.cash)?;
    let checking_offset = checked_negate(current.checking)?;
    let reset = transaction
        .prepare(
            "INSERT INTO balance_reset (user_id, cash_offset_cents, checking_offset_cents, created_at)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, cash_offset_cents, checking_offset_cents, created_at",
        )?
        .query_row(
            params![
                user_id,
                cash_offset,
                checking_offset,
                OffsetDateTime::now_utc()
            ],
            |row| {
                Ok(BalanceReset {
                    id: row.get(0)?,
                    cash_offset_cents: row.get(1)?,
                    checking_offset_cents: row.get(2)?,
                    created_at: row.get(3)?,
                })
            },
        )?;

    transaction.commit()?;

    Ok(reset)
}

fn get_account_cents(user_id: &UserId, connection: &Connection) -> Result<AccountCents, Error> {
    let mut cents = AccountCents::default();

    let funds_by_method: Vec<(String, i64)> = connection
        .prepare(
            "SELECT method, SUM(amount_cents) FROM funds WHERE user_id = :user_id GROUP BY method",
        )?
        .query_map(&[(":user_id", user_id)], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<_, _>>()?;

    for (method, total) in funds_by_method {
        cents.add(&method, total)?;
    }

    for (method, total) in sum_expenses_by_method(user_id, connection)? {
        cents.add(&method, checked_negate(total)?)?;
    }

    let (cash_offset, checking_offset): (i64, i64) = connection
        .prepare(
            "SELECT COALESCE(SUM(cash_offset_cents), 0), COALESCE(SUM(checking_offset_cents), 0)
             FROM balance_reset WHERE user_id = :user_id",
        )?
        .query_row(&[(":user_id", user_id)], |row| Ok((row.get(0)?, row.get(1)?)))?;

    cents.cash = checked_sum(cents.cash, cash_offset)?;
    cents.checking = checked_sum(cents.checking, checking_offset)?;

    Ok(cents)
}

fn map_funds_row(row: &Row) -> Result<FundsAddition, rusqlite::Error> {
    Ok(FundsAddition {
        id: row.get(0)?,
        amount: row.get(1)?,
        method: row.get(2)?,
        created_at: row.get(3)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod balance_tests {
    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use time::macros::date;

    use crate::{
        Error,
        amount::Amount,
        balance::core::{Account, Balance, add_funds, clear_balance, get_balance, list_funds},
        db::initialize,
        expense::{ExpenseFields, create_expense, delete_expense, update_expense},
        user::{UserId, ensure_user},
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        ensure_user(&UserId::new("alice"), &conn).unwrap();
        ensure_user(&UserId::new("bob"), &conn).unwrap();
        conn
    }

    fn cents(value: i64) -> Amount {
        Amount::from_cents(value).unwrap()
    }

    fn expense(value: i64, method: &str) -> ExpenseFields {
        ExpenseFields {
            date: date!(2025 - 03 - 14),
            description: "Groceries".to_owned(),
            amount: cents(value),
            method: method.to_owned(),
            category: "Food".to_owned(),
            kind: "Need".to_owned(),
        }
    }

    fn balance(cash: i64, checking: i64) -> Balance {
        Balance {
            cash_balance: Decimal::new(cash, 2),
            checking_balance: Decimal::new(checking, 2),
            total_balance: Decimal::new(cash + checking, 2),
        }
    }

    #[test]
    fn overflowing_balance_is_an_error() {
        let conn = get_test_connection();
        for method in ["cash", "checking"] {
            conn.execute(
                "INSERT INTO funds (user_id, amount_cents, method, created_at)
                 VALUES ('alice', ?1, ?2, '2025-03-14T00:00:00Z')",
                (i64::MAX, method),
            )
            .unwrap();
        }

        assert_eq!(get_balance(&UserId::new("alice"), &conn), Err(Error::Overflow));
    }

    #[test]
    fn new_user_has_zero_balance() {
        let conn = get_test_connection();

        assert_eq!(get_balance(&UserId::new("alice"), &conn), Ok(balance(0, 0)));
    }

    #[test]
    fn expenses_are_deducted_from_matching_account() {
        let conn = get_test_connection();
        let alice = UserId::new("alice");
        add_funds(&alice, cents(100_00), Account::Cash, &conn).unwrap();
        create_expense(&alice, expense(40_00, "cash"), &conn).unwrap();

        assert_eq!(get_balance(&alice, &conn), Ok(balance(60_00, 0)));
    }

    #[test]
    fn methods_match_ignoring_case() {
        let conn = get_test_connection();
        let alice = UserId::new("alice");
        add_funds(&alice, cents(50_00), Account::Checking, &conn).unwrap();
        create_expense(&alice, expense(12_50, " Checking"), &conn).unwrap();

        assert_eq!(get_balance(&alice, &conn), Ok(balance(0, 37_50)));
    }

    #[test]
    fn other_methods_do_not_affect_balance() {
        let conn = get_test_connection();
        let alice = UserId::new("alice");
        add_funds(&alice, cents(10_00), Account::Cash, &conn).unwrap();
        create_expense(&alice, expense(99_00, "credit"), &conn).unwrap();

        assert_eq!(get_balance(&alice, &conn), Ok(balance(10_00, 0)));
    }

    #[test]
    fn balance_can_go_negative() {
        let conn = get_test_connection();
        let alice = UserId::new("alice");
        create_expense(&alice, expense(5_00, "cash"), &conn).unwrap();

        assert_eq!(get_balance(&alice, &conn), Ok(balance(-5_00, 0)));
    }

    #[test]
    fn balance_only_counts_own_records() {
        let conn = get_test_connection();
        add_funds(&UserId::new("bob"), cents(10_00), Account::Cash, &conn).unwrap();

        assert_eq!(get_balance(&UserId::new("alice"), &conn), Ok(balance(0, 0)));
    }

    #[test]
    fn removing_expense_restores_balance() {
        let conn = get_test_connection();
        let alice = UserId::new("alice");
        add_funds(&alice, cents(100_00), Account::Cash, &conn).unwrap();
        let groceries = create_expense(&alice, expense(40_00, "cash"), &conn).unwrap();

        delete_expense(&alice, groceries.id, &conn).unwrap();

        assert_eq!(get_balance(&alice, &conn), Ok(balance(100_00, 0)));
    }

    #[test]
    fn clear_balance_zeroes_balance_and_keeps_history() {
        let conn = get_test_connection();
        let alice = UserId::new("alice");
        add_funds(&alice, cents(100_00), Account::Cash, &conn).unwrap();
        add_funds(&alice, cents(20_00), Account::Checking, &conn).unwrap();
        create_expense(&alice, expense(40_00, "cash"), &conn).unwrap();

        let reset = clear_balance(&alice, &conn).unwrap();

        assert_eq!(reset.cash_offset_cents, -60_00);
        assert_eq!(reset.checking_offset_cents, -20_00);
        assert_eq!(get_balance(&alice, &conn), Ok(balance(0, 0)));
        assert_eq!(list_funds(&alice, &conn).unwrap().len(), 2);
    }

    #[test]
    fn balance_moves_from_zero_after_clear() {
        let conn = get_test_connection();
        let alice = UserId::new("alice");
        add_funds(&alice, cents(100_00), Account::Cash, &conn).unwrap();
        let groceries = create_expense(&alice, expense(40_00, "cash"), &conn).unwrap();
        clear_balance(&alice, &conn).unwrap();

        update_expense(&alice, groceries.id, expense(30_00, "cash"), &conn).unwrap();
        add_funds(&alice, cents(5_00), Account::Checking, &conn).unwrap();

        assert_eq!(get_balance(&alice, &conn), Ok(balance(10_00, 5_00)));
    }

    #[test]
    fn clear_balance_twice_is_harmless() {
        let conn = get_test_connection();
        let alice = UserId::new("alice");
        add_funds(&alice, cents(1_00), Account::Cash, &conn).unwrap();

        clear_balance(&alice, &conn).unwrap();
        let second = clear_balance(&alice, &conn).unwrap();

        assert_eq!(second.cash_offset_cents, 0);
        assert_eq!(get_balance(&alice, &conn), Ok(balance(0, 0)));
    }

    #[test]
    fn balance_reads_one_account() {
        let value = balance(1_00, 2_00);

        assert_eq!(value.of(Account::Cash), Decimal::new(1_00, 2));
        assert_eq!(value.of(Account::Checking), Decimal::new(2_00, 2));
        assert_eq!(value.total_balance, Decimal::new(3_00, 2));
    }
}

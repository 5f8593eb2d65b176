use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::macros::date;

use wisepenny::{
    Account, Amount, ExpenseFields, UserId, add_funds, create_expense, ensure_user, initialize_db,
};

/// A utility for creating a test database for the REST API server of WisePenny.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// The identity provider's user ID for the demo user, i.e. the `sub` claim
    /// of the tokens you will log in with.
    #[arg(long, short, default_value = "demo-user")]
    user_id: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    if output_path
        .extension()
        .is_none_or(|extension| extension.is_empty())
    {
        eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
        exit(1);
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user {}...", args.user_id);
    let user_id = UserId::new(args.user_id);
    ensure_user(&user_id, &conn)?;

    println!("Adding funds...");
    add_funds(&user_id, Amount::from_cents(500_00)?, Account::Cash, &conn)?;
    add_funds(&user_id, Amount::from_cents(2_500_00)?, Account::Checking, &conn)?;

    println!("Adding expenses...");
    let expenses = [
        (date!(2025 - 01 - 01), "Rent", 1_200_00, "checking", "Housing", "Need"),
        (date!(2025 - 01 - 03), "Groceries", 85_40, "cash", "Food", "Need"),
        (date!(2025 - 01 - 04), "Cinema", 18_00, "cash", "Entertainment", "Want"),
        (date!(2025 - 01 - 05), "Savings transfer", 300_00, "checking", "Savings", "Savings and Debt"),
        (date!(2025 - 01 - 07), "Concert tickets", 120_00, "credit", "Entertainment", "Want"),
    ];

    for (date, description, cents, method, category, kind) in expenses {
        create_expense(
            &user_id,
            ExpenseFields {
                date,
                description: description.to_owned(),
                amount: Amount::from_cents(cents)?,
                method: method.to_owned(),
                category: category.to_owned(),
                kind: kind.to_owned(),
            },
            &conn,
        )?;
    }

    println!("Success!");

    Ok(())
}

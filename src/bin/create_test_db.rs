use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use daywise_ledger::{
    NewTransaction, PasswordHash, TransactionType, ValidatedPassword, create_transaction,
    create_user, initialize_db,
};

/// A utility for creating a test database for the Day Wise Ledger server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user(&"test@example.com".parse()?, password_hash, &conn)?;

    println!("Creating test transactions...");

    let today = OffsetDateTime::now_utc().date();
    let sample_rows = [
        (TransactionType::Income, "3200.00", "Salary", Some("Salary"), 70),
        (TransactionType::Expense, "1200.00", "Rent", Some("Housing"), 68),
        (TransactionType::Expense, "84.70", "Weekly groceries", Some("Food"), 65),
        (TransactionType::Income, "3200.00", "Salary", Some("Salary"), 40),
        (TransactionType::Expense, "1200.00", "Rent", Some("Housing"), 38),
        (TransactionType::Expense, "59.99", "New headphones", None, 33),
        (TransactionType::Income, "3200.00", "Salary", Some("Salary"), 9),
        (TransactionType::Expense, "1200.00", "Rent", Some("Housing"), 7),
        (TransactionType::Expense, "12.30", "Lunch", Some("Food"), 0),
    ];

    for (transaction_type, amount, description, category, days_ago) in sample_rows {
        let new_transaction = NewTransaction::new(
            transaction_type,
            amount.parse()?,
            description,
            category,
            today - Duration::days(days_ago),
            user.id,
        )?;
        create_transaction(new_transaction, &conn)?;
    }

    println!("Success!");

    Ok(())
}

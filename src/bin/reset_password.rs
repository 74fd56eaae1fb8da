use std::{error::Error, path::Path, process::exit};

use clap::Parser;
use rusqlite::Connection;

use daywise_ledger::{PasswordHash, ValidatedPassword, get_user_by_email, update_user_password};

/// A utility for changing the password of a registered user.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The email address of the user to reset the password for.
    #[arg(long)]
    email: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let db_path = Path::new(&args.db_path);
    validate_db_path(db_path);

    let conn = Connection::open(db_path)
        .unwrap_or_else(|_| panic!("Could not open the database at {db_path:?}"));

    let email = args.email.parse()?;
    let user = get_user_by_email(&email, &conn)?;
    println!("Resetting password for {}", user.email);

    let password_hash = match prompt_new_password_hash()? {
        Some(password_hash) => password_hash,
        None => return Ok(()),
    };

    update_user_password(user.id, password_hash, &conn)?;
    println!("Success!");

    Ok(())
}

fn validate_db_path(db_path: &Path) {
    match db_path.extension() {
        None => {
            eprintln!("Database path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Database path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if !db_path.is_file() {
        eprintln!("File does not exist at {db_path:#?}!");
        exit(1);
    }
}

/// Prompt for a new password twice and hash it.
///
/// Returns `Ok(None)` if the two entries do not match or the password is too
/// weak, after printing why.
fn prompt_new_password_hash() -> Result<Option<PasswordHash>, Box<dyn Error>> {
    let password = rpassword::prompt_password("New password: ")?;
    let confirm_password = rpassword::prompt_password("Confirm new password: ")?;

    if password != confirm_password {
        eprintln!("Passwords do not match.");
        return Ok(None);
    }

    let validated_password = match ValidatedPassword::new(&password) {
        Ok(validated_password) => validated_password,
        Err(error) => {
            eprintln!("{error}");
            return Ok(None);
        }
    };

    let password_hash = PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST)?;

    Ok(Some(password_hash))
}

//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row,
    types::Type,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use unicode_segmentation::UnicodeSegmentation;

use crate::{Error, auth::UserID, database_id::TransactionId};

/// The maximum amount of money a single transaction can record.
const MAX_AMOUNT_CENTS: i64 = 99_999_999_999; // $999,999,999.99

/// The maximum length of a transaction description, counted in graphemes.
const MAX_DESCRIPTION_LENGTH: usize = 200;

/// The maximum length of a transaction category, counted in graphemes.
const MAX_CATEGORY_LENGTH: usize = 100;

// ============================================================================
// MODELS
// ============================================================================

/// Whether a transaction records money that was earned or spent.
///
/// The direction of the money flow is carried here: transaction amounts are
/// always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money coming in, e.g. a salary payment.
    Income,
    /// Money going out, e.g. a grocery shop.
    Expense,
}

impl TransactionType {
    /// The string stored in the database for this transaction type.
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The error returned when a string is not a valid transaction type.
#[derive(Debug, thiserror::Error, PartialEq)]
#[error("\"{0}\" is not a valid transaction type")]
pub struct ParseTransactionTypeError(String);

impl FromStr for TransactionType {
    type Err = ParseTransactionTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(ParseTransactionTypeError(other.to_owned())),
        }
    }
}

/// An income or expense, i.e. an event where money was either earned or spent.
///
/// Rows are only ever read and written for the user that owns them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that recorded the transaction.
    pub user_id: UserID,
    /// Whether the transaction is income or an expense.
    pub transaction_type: TransactionType,
    /// The amount of money earned or spent, always positive.
    pub amount: Decimal,
    /// A text description of what the transaction was for.
    pub description: String,
    /// An optional free-form category, e.g. "Food".
    pub category: Option<String>,
    /// The day the transaction was recorded.
    pub date: Date,
    /// When the row was inserted. Used only to break ties when ordering
    /// transactions that share a date.
    pub created_at: OffsetDateTime,
}

/// A validated transaction that has not been inserted into the database yet.
///
/// Constructing a `NewTransaction` with [NewTransaction::new] performs all of
/// the entry form's validation, reporting the first violated rule only.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    transaction_type: TransactionType,
    amount: Decimal,
    description: String,
    category: Option<String>,
    date: Date,
    user_id: UserID,
}

impl NewTransaction {
    /// Validate the fields of a new transaction.
    ///
    /// The description and category are trimmed of surrounding whitespace.
    /// A category that is empty after trimming is treated as absent.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule as one of:
    /// - [Error::AmountNotPositive] if `amount` is zero or negative,
    /// - [Error::AmountTooLarge] if `amount` is over 999,999,999.99,
    /// - [Error::EmptyDescription] if `description` is empty after trimming,
    /// - [Error::DescriptionTooLong] if the trimmed description is over 200 characters,
    /// - [Error::CategoryTooLong] if the trimmed category is over 100 characters.
    pub fn new(
        transaction_type: TransactionType,
        amount: Decimal,
        description: &str,
        category: Option<&str>,
        date: Date,
        user_id: UserID,
    ) -> Result<Self, Error> {
        if amount <= Decimal::ZERO {
            return Err(Error::AmountNotPositive(amount));
        }

        if amount > Decimal::new(MAX_AMOUNT_CENTS, 2) {
            return Err(Error::AmountTooLarge(amount));
        }

        let description = description.trim();
        if description.is_empty() {
            return Err(Error::EmptyDescription);
        }

        let description_length = description.graphemes(true).count();
        if description_length > MAX_DESCRIPTION_LENGTH {
            return Err(Error::DescriptionTooLong(description_length));
        }

        let category = category
            .map(str::trim)
            .filter(|category| !category.is_empty());

        if let Some(category) = category {
            let category_length = category.graphemes(true).count();
            if category_length > MAX_CATEGORY_LENGTH {
                return Err(Error::CategoryTooLong(category_length));
            }
        }

        Ok(Self {
            transaction_type,
            amount,
            description: description.to_owned(),
            category: category.map(str::to_owned),
            date,
            user_id,
        })
    }

    /// The category after trimming, if any.
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction in the database.
///
/// The insertion timestamp is assigned here, not by the caller.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn create_transaction(
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let created_at = OffsetDateTime::now_utc();

    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\" (user_id, type, amount, description, category, date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id, user_id, type, amount, description, category, date, created_at",
        )?
        .query_row(
            (
                new_transaction.user_id.as_i64(),
                new_transaction.transaction_type.as_str(),
                new_transaction.amount.to_string(),
                &new_transaction.description,
                &new_transaction.category,
                new_transaction.date,
                created_at,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve a transaction owned by `user_id` from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, user_id, type, amount, description, category, date, created_at
             FROM \"transaction\" WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve all transactions owned by `user_id`, most recent first.
///
/// Rows are ordered by date descending, with the insertion timestamp breaking
/// ties between rows that share a date.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn get_transactions_for_user(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, type, amount, description, category, date, created_at
             FROM \"transaction\" WHERE user_id = :user_id
             ORDER BY date DESC, created_at DESC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// The number of rows affected by a delete.
pub type RowsAffected = usize;

/// Delete a transaction owned by `user_id` by its `id`.
///
/// Returns the number of rows deleted; zero means no transaction with `id`
/// belongs to `user_id`. The same-day rule is enforced by the delete endpoint,
/// not here, so that fixtures and maintenance tools can remove any row.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn delete_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "DELETE FROM \"transaction\" WHERE id = :id AND user_id = :user_id",
            &[(":id", &id), (":user_id", &user_id.as_i64())],
        )
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                type TEXT NOT NULL,
                amount TEXT NOT NULL,
                description TEXT NOT NULL,
                category TEXT,
                date TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Covers the per-user listing ordered by date.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a [Transaction].
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let user_id = UserID::new(row.get(1)?);

    let raw_type: String = row.get(2)?;
    let transaction_type = TransactionType::from_str(&raw_type)
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(error)))?;

    let raw_amount: String = row.get(3)?;
    let amount = Decimal::from_str(&raw_amount)
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(error)))?;

    let description = row.get(4)?;
    let category = row.get(5)?;
    let date = row.get(6)?;
    let created_at = row.get(7)?;

    Ok(Transaction {
        id,
        user_id,
        transaction_type,
        amount,
        description,
        category,
        date,
        created_at,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
pub(crate) mod test_utils {
    use rusqlite::Connection;

    use crate::{auth::PasswordHash, auth::UserID, auth::create_user, db::initialize};

    /// Create an in-memory database with one registered user.
    pub(crate) fn get_test_connection() -> (Connection, UserID) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        let user = create_user(
            &"test@example.com".parse().unwrap(),
            PasswordHash::new_unchecked("hunter2"),
            &conn,
        )
        .unwrap();

        (conn, user.id)
    }
}

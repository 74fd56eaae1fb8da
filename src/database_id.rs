//! Database ID type definitions.

/// The ID of a row in the transaction table.
pub type TransactionId = i64;

//! Transaction management for the ledger application.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `NewTransaction` validation
//! - Database functions for storing, querying, and deleting transactions
//! - The entry form, list view, and the endpoints behind them

pub(crate) mod core;
mod create_endpoint;
mod delete_endpoint;
mod form;
mod list;

pub use self::core::{
    NewTransaction, Transaction, TransactionType, create_transaction, create_transaction_table,
};
pub(crate) use self::core::get_transactions_for_user;
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub(crate) use form::add_transaction_form;
pub(crate) use list::transaction_list;

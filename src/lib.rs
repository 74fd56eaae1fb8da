//! Day Wise Ledger is a web app for tracking your daily income and expenses.
//!
//! This library provides a server that directly serves HTML pages: users log
//! in, record transactions, see monthly summaries on the dashboard, and
//! browse their full history grouped by month.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use rust_decimal::Decimal;
use time::Date;
use tokio::signal;

mod alert;
mod app_state;
mod auth;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod history;
mod html;
mod internal_server_error;
mod logging;
mod navigation;
mod not_found;
mod routing;
mod timezone;
mod transaction;

pub use app_state::AppState;
pub use auth::{
    PasswordHash, User, UserID, ValidatedPassword, create_user, get_user_by_email, get_user_by_id,
    update_user_password,
};
pub use db::initialize as initialize_db;
pub use logging::logging_middleware;
pub use routing::build_router;
pub use transaction::{NewTransaction, Transaction, TransactionType, create_transaction};

use crate::{
    alert::AlertTemplate, html::render, internal_server_error::render_internal_server_error,
    not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an invalid combination of email and password.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The auth token cookie is missing from the cookie jar in the request.
    #[error("no auth cookie in the cookie jar :(")]
    CookieMissing,

    /// The auth token has passed its expiry date-time.
    #[error("the auth token has expired")]
    TokenExpired,

    /// The auth token could not be serialized to or parsed from its cookie.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("could not (de)serialize auth token: {0}")]
    TokenSerializationError(String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The string used to register is not a valid email address.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// The email used to register already belongs to an account.
    #[error("the email \"{0}\" is already registered")]
    DuplicateEmail(String),

    /// A transaction amount was zero or negative.
    ///
    /// Amounts are always positive, the direction of the money flow is
    /// carried by the transaction type.
    #[error("the amount {0} is not greater than zero")]
    AmountNotPositive(Decimal),

    /// A transaction amount was above the maximum the app accepts.
    #[error("the amount {0} is above the maximum allowed amount")]
    AmountTooLarge(Decimal),

    /// A transaction description was empty after trimming whitespace.
    #[error("the description cannot be empty")]
    EmptyDescription,

    /// A transaction description exceeded the maximum length.
    #[error("the description is {0} characters long, which is over the limit")]
    DescriptionTooLong(usize),

    /// A transaction category exceeded the maximum length.
    #[error("the category is {0} characters long, which is over the limit")]
    CategoryTooLong(usize),

    /// Tried to delete a transaction dated before today.
    ///
    /// Only transactions created on the current day can be deleted.
    #[error("the transaction dated {0} can no longer be deleted")]
    TransactionLocked(Date),

    /// Tried to delete a transaction that does not exist.
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("user.email") =>
            {
                Error::DuplicateEmail(String::new())
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezoneError(timezone) => render_internal_server_error(
                "Invalid Timezone Settings",
                &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to a valid, canonical timezone string."
                ),
            ),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                render_internal_server_error(
                    "Sorry, something went wrong.",
                    "Try again later or check the server logs.",
                )
            }
        }
    }
}

impl Error {
    /// Render the error as an alert partial for htmx endpoints.
    ///
    /// The alert is swapped into the alert container of the current page so
    /// the form the user submitted keeps its inputs.
    fn into_alert_response(self) -> Response {
        match self {
            Error::AmountNotPositive(_) => render(
                StatusCode::UNPROCESSABLE_ENTITY,
                AlertTemplate::error(
                    "Invalid amount",
                    "The amount must be a positive number greater than zero.",
                ),
            ),
            Error::AmountTooLarge(_) => render(
                StatusCode::UNPROCESSABLE_ENTITY,
                AlertTemplate::error(
                    "Invalid amount",
                    "The amount must be no more than $999,999,999.99.",
                ),
            ),
            Error::EmptyDescription => render(
                StatusCode::UNPROCESSABLE_ENTITY,
                AlertTemplate::error(
                    "Missing description",
                    "Enter a short description of what the transaction was for.",
                ),
            ),
            Error::DescriptionTooLong(_) => render(
                StatusCode::UNPROCESSABLE_ENTITY,
                AlertTemplate::error(
                    "Description too long",
                    "Descriptions are limited to 200 characters.",
                ),
            ),
            Error::CategoryTooLong(_) => render(
                StatusCode::UNPROCESSABLE_ENTITY,
                AlertTemplate::error(
                    "Category too long",
                    "Categories are limited to 100 characters.",
                ),
            ),
            Error::TransactionLocked(date) => render(
                StatusCode::FORBIDDEN,
                AlertTemplate::error(
                    "Could not delete transaction",
                    &format!(
                        "Only today's transactions can be deleted. \
                        This transaction is dated {date}."
                    ),
                ),
            ),
            Error::DeleteMissingTransaction => render(
                StatusCode::NOT_FOUND,
                AlertTemplate::error(
                    "Could not delete transaction",
                    "The transaction could not be found. \
                    Try refreshing the page to see if the transaction has already been deleted.",
                ),
            ),
            _ => render(
                StatusCode::INTERNAL_SERVER_ERROR,
                AlertTemplate::error(
                    "Something went wrong",
                    "An unexpected error occurred, check the server logs for more details.",
                ),
            ),
        }
    }
}

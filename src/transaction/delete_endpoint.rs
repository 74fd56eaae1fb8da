//! Defines the endpoint for deleting a transaction.
//!
//! Deletion is a same-day affordance: a transaction can only be deleted on
//! the day it was recorded. The rule is enforced here, server-side, in
//! addition to the list view only offering the delete button for today's
//! rows.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    auth::UserID,
    database_id::TransactionId,
    timezone::{get_local_offset, local_date_today},
    transaction::core::{delete_transaction, get_transaction},
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A route handler for deleting a transaction, redirects to the dashboard on success.
///
/// Requests for rows that are not dated today are rejected with a visible
/// alert rather than forwarded to the store.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Response {
    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        return Error::InvalidTimezoneError(state.local_timezone).into_alert_response();
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let transaction = match get_transaction(transaction_id, user_id, &connection) {
        Ok(transaction) => transaction,
        Err(Error::NotFound) => {
            return Error::DeleteMissingTransaction.into_alert_response();
        }
        Err(error) => {
            tracing::error!("could not get transaction {transaction_id}: {error}");
            return error.into_alert_response();
        }
    };

    // "Today" is evaluated per request so the window closes at midnight.
    let today = local_date_today(local_offset);
    if transaction.date != today {
        return Error::TransactionLocked(transaction.date).into_alert_response();
    }

    match delete_transaction(transaction_id, user_id, &connection) {
        Ok(0) => Error::DeleteMissingTransaction.into_alert_response(),
        Ok(_) => (
            HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("could not delete transaction {transaction_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use axum_htmx::HX_REDIRECT;
    use time::{Duration, OffsetDateTime};

    use crate::{
        auth::UserID,
        transaction::core::{get_transactions_for_user, test_utils::get_test_connection},
    };

    use super::{DeleteTransactionState, delete_transaction_endpoint};

    fn get_test_state() -> (DeleteTransactionState, UserID) {
        let (conn, user_id) = get_test_connection();
        (
            DeleteTransactionState {
                db_connection: Arc::new(Mutex::new(conn)),
                local_timezone: "Etc/UTC".to_owned(),
            },
            user_id,
        )
    }

    fn insert_transaction_dated(
        state: &DeleteTransactionState,
        user_id: UserID,
        date: time::Date,
    ) -> i64 {
        let connection = state.db_connection.lock().unwrap();
        connection
            .execute(
                "INSERT INTO \"transaction\" (user_id, type, amount, description, category, date, created_at)
                 VALUES (?1, 'expense', '12.30', 'test', NULL, ?2, ?3)",
                (user_id.as_i64(), date, OffsetDateTime::now_utc()),
            )
            .unwrap();
        connection.last_insert_rowid()
    }

    #[tokio::test]
    async fn deletes_transaction_dated_today() {
        let (state, user_id) = get_test_state();
        let today = OffsetDateTime::now_utc().date();
        let transaction_id = insert_transaction_dated(&state, user_id, today);

        let response = delete_transaction_endpoint(
            State(state.clone()),
            Extension(user_id),
            Path(transaction_id),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(HX_REDIRECT).unwrap(), "/dashboard");

        let connection = state.db_connection.lock().unwrap();
        let transactions = get_transactions_for_user(user_id, &connection).unwrap();
        assert!(
            transactions.is_empty(),
            "the deleted transaction should be absent from the next listing"
        );
    }

    #[tokio::test]
    async fn rejects_transaction_dated_yesterday() {
        let (state, user_id) = get_test_state();
        let yesterday = OffsetDateTime::now_utc().date() - Duration::days(1);
        let transaction_id = insert_transaction_dated(&state, user_id, yesterday);

        let response = delete_transaction_endpoint(
            State(state.clone()),
            Extension(user_id),
            Path(transaction_id),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let connection = state.db_connection.lock().unwrap();
        let transactions = get_transactions_for_user(user_id, &connection).unwrap();
        assert_eq!(transactions.len(), 1, "the row must be left untouched");
    }

    #[tokio::test]
    async fn rejects_missing_transaction() {
        let (state, user_id) = get_test_state();

        let response =
            delete_transaction_endpoint(State(state), Extension(user_id), Path(1337))
                .await
                .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn rejects_other_users_transaction() {
        let (state, user_id) = get_test_state();
        let today = OffsetDateTime::now_utc().date();
        let transaction_id = insert_transaction_dated(&state, user_id, today);

        let other_user = UserID::new(user_id.as_i64() + 1);
        let response = delete_transaction_endpoint(
            State(state.clone()),
            Extension(other_user),
            Path(transaction_id),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let connection = state.db_connection.lock().unwrap();
        let transactions = get_transactions_for_user(user_id, &connection).unwrap();
        assert_eq!(transactions.len(), 1, "the row must be left untouched");
    }
}

//! Defines the endpoint for creating a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    AppState, Error, endpoints,
    auth::UserID,
    timezone::{get_local_offset, local_date_today},
    transaction::{NewTransaction, TransactionType, core::create_transaction},
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The form data for creating a transaction.
///
/// There is no date field: the server stamps new transactions with the
/// current day in its configured timezone.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    /// Whether the transaction is income or an expense.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The value of the transaction in dollars.
    pub amount: Decimal,
    /// Text detailing the transaction.
    pub description: String,
    /// An optional free-form category.
    #[serde(default)]
    pub category: Option<String>,
}

/// A route handler for creating a new transaction, redirects to the dashboard on success.
///
/// Validation failures are reported one at a time, as alerts, and leave the
/// submitted form untouched.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        return Error::InvalidTimezoneError(state.local_timezone).into_alert_response();
    };

    let today = local_date_today(local_offset);

    let new_transaction = match NewTransaction::new(
        form.transaction_type,
        form.amount,
        &form.description,
        form.category.as_deref(),
        today,
        user_id,
    ) {
        Ok(new_transaction) => new_transaction,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = create_transaction(new_transaction, &connection) {
        tracing::error!("could not create transaction: {error}");

        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, body::Body, extract::State, http::Response, response::IntoResponse};
    use axum_extra::extract::Form;
    use axum_htmx::HX_REDIRECT;
    use rust_decimal::Decimal;

    use crate::transaction::{
        core::{get_transactions_for_user, test_utils::get_test_connection},
        create_endpoint::{CreateTransactionState, TransactionForm},
        create_transaction_endpoint,
    };

    use super::TransactionType;

    fn dec(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    fn get_test_state() -> (CreateTransactionState, crate::auth::UserID) {
        let (conn, user_id) = get_test_connection();
        (
            CreateTransactionState {
                db_connection: Arc::new(Mutex::new(conn)),
                local_timezone: "Etc/UTC".to_owned(),
            },
            user_id,
        )
    }

    #[tokio::test]
    async fn can_create_transaction() {
        let (state, user_id) = get_test_state();

        let form = TransactionForm {
            transaction_type: TransactionType::Expense,
            amount: dec("12.30"),
            description: "test transaction".to_string(),
            category: Some("Food".to_owned()),
        };

        let response =
            create_transaction_endpoint(State(state.clone()), Extension(user_id), Form(form))
                .await
                .into_response();

        assert_redirects_to_dashboard(response);

        let connection = state.db_connection.lock().unwrap();
        let transactions = get_transactions_for_user(user_id, &connection).unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].amount, dec("12.30"));
        assert_eq!(transactions[0].description, "test transaction");
        assert_eq!(transactions[0].category.as_deref(), Some("Food"));
    }

    #[tokio::test]
    async fn invalid_amount_creates_nothing() {
        let (state, user_id) = get_test_state();

        let form = TransactionForm {
            transaction_type: TransactionType::Expense,
            amount: Decimal::ZERO,
            description: "test transaction".to_string(),
            category: None,
        };

        let response =
            create_transaction_endpoint(State(state.clone()), Extension(user_id), Form(form))
                .await
                .into_response();

        assert_eq!(
            response.status(),
            axum::http::StatusCode::UNPROCESSABLE_ENTITY
        );

        let connection = state.db_connection.lock().unwrap();
        let transactions = get_transactions_for_user(user_id, &connection).unwrap();
        assert!(transactions.is_empty());
    }

    #[tokio::test]
    async fn new_transaction_is_dated_today() {
        let (state, user_id) = get_test_state();

        let form = TransactionForm {
            transaction_type: TransactionType::Income,
            amount: dec("1000.00"),
            description: "salary".to_string(),
            category: None,
        };

        create_transaction_endpoint(State(state.clone()), Extension(user_id), Form(form))
            .await
            .into_response();

        let connection = state.db_connection.lock().unwrap();
        let transactions = get_transactions_for_user(user_id, &connection).unwrap();
        assert_eq!(
            transactions[0].date,
            time::OffsetDateTime::now_utc().date()
        );
    }

    #[test]
    fn form_decodes_from_urlencoded() {
        let form: TransactionForm =
            serde_html_form::from_str("type=income&amount=12.30&description=Salary&category=")
                .unwrap();

        assert_eq!(form.transaction_type, TransactionType::Income);
        assert_eq!(form.amount, dec("12.30"));
        assert_eq!(form.description, "Salary");
        // An empty category field arrives as an empty string and is
        // normalized to "absent" during validation.
        assert_eq!(form.category.as_deref(), Some(""));
    }

    #[track_caller]
    fn assert_redirects_to_dashboard(response: Response<Body>) {
        let location = response
            .headers()
            .get(HX_REDIRECT)
            .expect("expected response to have the header hx-redirect");
        assert_eq!(
            location, "/dashboard",
            "got redirect to {location:?}, want redirect to /dashboard"
        );
    }
}

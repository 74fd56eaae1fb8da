//! Dashboard HTTP handlers and view rendering.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    auth::UserID,
    dashboard::{
        aggregation::{Totals, transaction_totals, transactions_in_month},
        cards::summary_cards,
        month::SelectedMonth,
    },
    endpoints,
    html::{base, dollar_input_styles},
    navigation::NavBar,
    timezone::{get_local_offset, local_date_today},
    transaction::{Transaction, add_transaction_form, get_transactions_for_user, transaction_list},
};

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query parameters accepted by the dashboard page.
#[derive(Debug, Default, Deserialize)]
pub struct MonthQuery {
    /// The selected month as `YYYY-MM`. Defaults to the current month.
    pub month: Option<String>,
}

/// Display the dashboard: the month cursor, the summary cards for the
/// selected month, the entry form, and the transaction list.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<MonthQuery>,
) -> Result<Response, Error> {
    let local_offset = get_local_offset(&state.local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        Error::InvalidTimezoneError(state.local_timezone.clone())
    })?;
    let today = local_date_today(local_offset);

    // An unparseable month falls back to the current month; a future month is
    // clamped back to it.
    let selected = query
        .month
        .as_deref()
        .and_then(SelectedMonth::parse)
        .map(|selected| selected.clamp_to(today))
        .unwrap_or_else(|| SelectedMonth::for_date(today));

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = get_transactions_for_user(user_id, &connection)
        .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?;
    drop(connection);

    let monthly_transactions = transactions_in_month(&transactions, selected);
    let totals = transaction_totals(&monthly_transactions);

    Ok(dashboard_view(selected, today, &totals, &transactions).into_response())
}

fn month_nav_link(label: &str, target: SelectedMonth) -> Markup {
    let url = format!(
        "{}?month={}",
        endpoints::DASHBOARD_VIEW,
        target.query_value()
    );

    html! {
        a
            href=(url)
            class="px-3 py-2 rounded border border-gray-300 dark:border-gray-600
                text-gray-900 dark:text-white hover:bg-gray-100 dark:hover:bg-gray-700"
        {
            (label)
        }
    }
}

/// The month cursor controls: previous always works, next is dropped once
/// the selected month is the current one.
fn month_nav(selected: SelectedMonth, today: Date) -> Markup {
    let is_current = selected.is_current(today);
    let subtitle = if is_current {
        "Current Month"
    } else {
        "Historical Data"
    };

    html! {
        div class="flex items-center justify-center gap-4"
        {
            (month_nav_link("←", selected.previous()))

            div class="text-center min-w-[200px]"
            {
                h2 class="text-2xl font-bold" { (selected.title()) }
                p class="text-sm text-gray-500 dark:text-gray-400" { (subtitle) }
            }

            @if is_current {
                span
                    aria-disabled="true"
                    class="px-3 py-2 rounded border border-gray-200 dark:border-gray-700
                        text-gray-400 dark:text-gray-600"
                {
                    "→"
                }
            } @else {
                (month_nav_link("→", selected.next(today)))
            }
        }
    }
}

fn dashboard_view(
    selected: SelectedMonth,
    today: Date,
    totals: &Totals,
    transactions: &[Transaction],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();

    let content = html!(
        (nav_bar)

        div class="flex flex-col gap-6 px-4 py-8 mx-auto max-w-screen-xl text-gray-900 dark:text-white"
        {
            (month_nav(selected, today))

            (summary_cards(totals, "This month"))

            div class="grid gap-6 md:grid-cols-2 items-start"
            {
                (add_transaction_form())
                (transaction_list(transactions, today))
            }
        }
    );

    base("Dashboard", &[dollar_input_styles()], &content)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        body::Body,
        extract::{Query, State},
        http::{Response, StatusCode},
    };
    use scraper::{Html, Selector};
    use time::{Duration, OffsetDateTime};

    use crate::{
        auth::UserID,
        dashboard::month::SelectedMonth,
        transaction::core::test_utils::get_test_connection,
    };

    use super::{DashboardState, MonthQuery, get_dashboard_page};

    fn get_test_state() -> (DashboardState, UserID) {
        let (conn, user_id) = get_test_connection();
        (
            DashboardState {
                db_connection: Arc::new(Mutex::new(conn)),
                local_timezone: "Etc/UTC".to_owned(),
            },
            user_id,
        )
    }

    fn insert_transaction(
        state: &DashboardState,
        user_id: UserID,
        transaction_type: &str,
        amount: &str,
        date: time::Date,
    ) {
        let connection = state.db_connection.lock().unwrap();
        connection
            .execute(
                "INSERT INTO \"transaction\" (user_id, type, amount, description, category, date, created_at)
                 VALUES (?1, ?2, ?3, 'test', NULL, ?4, ?5)",
                (
                    user_id.as_i64(),
                    transaction_type,
                    amount,
                    date,
                    OffsetDateTime::now_utc(),
                ),
            )
            .unwrap();
    }

    async fn parse_html(response: Response<Body>) -> Html {
        let body = response.into_body();
        let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        let text = String::from_utf8_lossy(&body).to_string();

        Html::parse_document(&text)
    }

    #[tokio::test]
    async fn dashboard_shows_current_month_totals() {
        let (state, user_id) = get_test_state();
        let today = OffsetDateTime::now_utc().date();
        insert_transaction(&state, user_id, "income", "1000.00", today);
        insert_transaction(&state, user_id, "expense", "250.50", today);

        let response = get_dashboard_page(
            State(state),
            Extension(user_id),
            Query(MonthQuery::default()),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html(response).await;
        assert!(html.errors.is_empty(), "got HTML errors: {:?}", html.errors);

        let text: String = html.root_element().text().collect();
        assert!(text.contains("$1000.00"));
        assert!(text.contains("$250.50"));
        assert!(text.contains("$749.50"));
        assert!(text.contains("Current Month"));
    }

    #[tokio::test]
    async fn dashboard_excludes_other_months_from_totals() {
        let (state, user_id) = get_test_state();
        let today = OffsetDateTime::now_utc().date();
        // 40 days back is always in a different calendar month.
        let past = today - Duration::days(40);
        insert_transaction(&state, user_id, "expense", "999.00", past);
        insert_transaction(&state, user_id, "expense", "250.50", today);

        let response = get_dashboard_page(
            State(state),
            Extension(user_id),
            Query(MonthQuery::default()),
        )
        .await
        .unwrap();

        let html = parse_html(response).await;
        let text: String = html.root_element().text().collect();

        assert!(text.contains("$250.50"));
        assert!(
            !text.contains("$999.00"),
            "other months' transactions must not be in this month's totals"
        );
    }

    #[tokio::test]
    async fn current_month_has_no_forward_navigation() {
        let (state, user_id) = get_test_state();

        let response = get_dashboard_page(
            State(state),
            Extension(user_id),
            Query(MonthQuery::default()),
        )
        .await
        .unwrap();

        let html = parse_html(response).await;

        let today = OffsetDateTime::now_utc().date();
        let next_month_value = SelectedMonth::for_date(today).query_value();
        let forward_selector = Selector::parse("a[href*='month=']").unwrap();
        let has_forward_link = html.select(&forward_selector).any(|link| {
            link.value()
                .attr("href")
                .is_some_and(|href| href.contains(&next_month_value))
        });
        assert!(
            !has_forward_link,
            "no link may point at or past the current month"
        );
    }

    #[tokio::test]
    async fn past_month_has_forward_and_backward_navigation() {
        let (state, user_id) = get_test_state();
        let today = OffsetDateTime::now_utc().date();
        let selected = SelectedMonth::for_date(today).previous().previous();

        let response = get_dashboard_page(
            State(state),
            Extension(user_id),
            Query(MonthQuery {
                month: Some(selected.query_value()),
            }),
        )
        .await
        .unwrap();

        let html = parse_html(response).await;
        let text: String = html.root_element().text().collect();
        assert!(text.contains("Historical Data"));

        let previous_url = format!("/dashboard?month={}", selected.previous().query_value());
        let next_url = format!(
            "/dashboard?month={}",
            selected.next(today).query_value()
        );
        let previous_selector = Selector::parse(&format!("a[href='{previous_url}']")).unwrap();
        let next_selector = Selector::parse(&format!("a[href='{next_url}']")).unwrap();
        assert!(html.select(&previous_selector).next().is_some());
        assert!(html.select(&next_selector).next().is_some());
    }

    #[tokio::test]
    async fn future_month_query_is_clamped_to_current() {
        let (state, user_id) = get_test_state();

        let response = get_dashboard_page(
            State(state),
            Extension(user_id),
            Query(MonthQuery {
                month: Some("2099-01".to_owned()),
            }),
        )
        .await
        .unwrap();

        let html = parse_html(response).await;
        let text: String = html.root_element().text().collect();

        let today = OffsetDateTime::now_utc().date();
        assert!(text.contains(&SelectedMonth::for_date(today).title()));
        assert!(text.contains("Current Month"));
    }

    #[tokio::test]
    async fn unparseable_month_query_falls_back_to_current() {
        let (state, user_id) = get_test_state();

        let response = get_dashboard_page(
            State(state),
            Extension(user_id),
            Query(MonthQuery {
                month: Some("not-a-month".to_owned()),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html(response).await;
        let text: String = html.root_element().text().collect();
        assert!(text.contains("Current Month"));
    }
}

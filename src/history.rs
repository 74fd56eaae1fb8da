//! The history page: all of the user's transactions grouped by month.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::{format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    AppState, Error,
    auth::UserID,
    dashboard::aggregation::{MonthGroup, group_by_month},
    endpoints,
    html::{
        AMOUNT_EXPENSE_STYLE, AMOUNT_INCOME_STYLE, CARD_STYLE, CATEGORY_BADGE_STYLE, base,
        format_currency, link,
    },
    navigation::NavBar,
    transaction::{Transaction, TransactionType, get_transactions_for_user},
};

/// Date format for history rows, e.g. "Mon, Jul 14, 2025".
const ROW_DATE_FORMAT: &[BorrowedFormatItem] =
    format_description!("[weekday repr:short], [month repr:short] [day padding:none], [year]");

/// The state needed for the history page.
#[derive(Debug, Clone)]
pub struct HistoryState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for HistoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Display the user's full transaction history, grouped by calendar month,
/// most recent month first.
pub async fn get_history_page(
    State(state): State<HistoryState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = get_transactions_for_user(user_id, &connection)
        .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?;
    drop(connection);

    let groups = group_by_month(transactions);

    Ok(history_view(&groups).into_response())
}

fn history_transaction_row(transaction: &Transaction) -> Markup {
    let (amount, amount_style) = match transaction.transaction_type {
        TransactionType::Income => (
            format!("+{}", format_currency(transaction.amount)),
            AMOUNT_INCOME_STYLE,
        ),
        TransactionType::Expense => (
            format!("-{}", format_currency(transaction.amount)),
            AMOUNT_EXPENSE_STYLE,
        ),
    };
    let date_text = transaction
        .date
        .format(ROW_DATE_FORMAT)
        .unwrap_or_else(|_| transaction.date.to_string());

    html! {
        div class="flex items-center justify-between p-3 border border-gray-200 dark:border-gray-700 rounded-lg"
        {
            div class="flex-1 min-w-0"
            {
                div class="flex items-center gap-2"
                {
                    span class={"font-semibold " (amount_style)} { (amount) }

                    @if let Some(category) = &transaction.category {
                        span class=(CATEGORY_BADGE_STYLE) { (category) }
                    }
                }

                p class="text-sm text-gray-500 dark:text-gray-400 truncate" { (transaction.description) }
                p class="text-xs text-gray-500 dark:text-gray-400" { (date_text) }
            }
        }
    }
}

fn month_group_card(group: &MonthGroup) -> Markup {
    let balance = group.totals.balance();
    let balance_style = if balance.is_sign_negative() && !balance.is_zero() {
        AMOUNT_EXPENSE_STYLE
    } else {
        AMOUNT_INCOME_STYLE
    };

    html! {
        div class=(CARD_STYLE)
        {
            div class="p-6 bg-gray-50 dark:bg-gray-700/50 rounded-t-lg"
            {
                div class="flex justify-between items-start"
                {
                    div
                    {
                        h2 class="text-2xl font-bold" { (group.title()) }
                        p class="text-sm text-gray-500 dark:text-gray-400 mt-1"
                        {
                            (group.transactions.len()) " transaction(s)"
                        }
                    }

                    div class="text-right"
                    {
                        div class="text-sm text-gray-500 dark:text-gray-400" { "Balance" }
                        div class={"text-2xl font-bold " (balance_style)}
                        {
                            (format_currency(balance))
                        }
                    }
                }

                div class="grid grid-cols-2 gap-4 mt-4"
                {
                    div class="bg-green-50 dark:bg-green-950/20 p-3 rounded-lg"
                    {
                        div class="text-xs text-gray-500 dark:text-gray-400" { "Income" }
                        div class={"text-lg font-semibold " (AMOUNT_INCOME_STYLE)}
                        {
                            "+" (format_currency(group.totals.income))
                        }
                    }

                    div class="bg-red-50 dark:bg-red-950/20 p-3 rounded-lg"
                    {
                        div class="text-xs text-gray-500 dark:text-gray-400" { "Expenses" }
                        div class={"text-lg font-semibold " (AMOUNT_EXPENSE_STYLE)}
                        {
                            "-" (format_currency(group.totals.expenses))
                        }
                    }
                }
            }

            div class="p-6 space-y-2"
            {
                @for transaction in &group.transactions {
                    (history_transaction_row(transaction))
                }
            }
        }
    }
}

fn history_view(groups: &[MonthGroup]) -> Markup {
    let nav_bar = NavBar::new(endpoints::HISTORY_VIEW).into_html();

    let content = html!(
        (nav_bar)

        div class="flex flex-col gap-6 px-4 py-8 mx-auto max-w-screen-lg text-gray-900 dark:text-white"
        {
            div
            {
                h1 class="text-4xl font-bold" { "Transaction History" }
                p class="text-gray-500 dark:text-gray-400" { "View all your past transactions by month" }
            }

            @if groups.is_empty() {
                div class=(CARD_STYLE)
                {
                    p class="py-12 text-center text-gray-500 dark:text-gray-400"
                    {
                        "No transaction history yet. Record your first one on the "
                        (link(endpoints::DASHBOARD_VIEW, "dashboard"))
                        "."
                    }
                }
            } @else {
                @for group in groups {
                    (month_group_card(group))
                }
            }
        }
    );

    base("History", &[], &content)
}

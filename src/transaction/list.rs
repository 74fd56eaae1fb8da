//! The transaction list shown on the dashboard.

use maud::{Markup, html};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    endpoints::{DELETE_TRANSACTION, format_endpoint},
    html::{
        AMOUNT_EXPENSE_STYLE, AMOUNT_INCOME_STYLE, BUTTON_DELETE_STYLE, CARD_STYLE,
        CATEGORY_BADGE_STYLE, format_currency,
    },
    transaction::{Transaction, TransactionType},
};

/// The max number of graphemes to display for a description before truncating
/// and displaying ellipses.
const MAX_DESCRIPTION_GRAPHEMES: usize = 32;

/// Date format for list rows, e.g. "Mon, Jul 14, 2025".
const ROW_DATE_FORMAT: &[BorrowedFormatItem] =
    format_description!("[weekday repr:short], [month repr:short] [day padding:none], [year]");

fn amount_text(transaction: &Transaction) -> (String, &'static str) {
    match transaction.transaction_type {
        TransactionType::Income => (
            format!("+{}", format_currency(transaction.amount)),
            AMOUNT_INCOME_STYLE,
        ),
        TransactionType::Expense => (
            format!("-{}", format_currency(transaction.amount)),
            AMOUNT_EXPENSE_STYLE,
        ),
    }
}

fn truncate_description(description: &str) -> String {
    let graphemes: Vec<&str> = description.graphemes(true).collect();

    if graphemes.len() <= MAX_DESCRIPTION_GRAPHEMES {
        description.to_owned()
    } else {
        format!("{}…", graphemes[..MAX_DESCRIPTION_GRAPHEMES].concat())
    }
}

fn transaction_row(transaction: &Transaction, today: Date) -> Markup {
    let (amount, amount_style) = amount_text(transaction);
    let date_text = transaction
        .date
        .format(ROW_DATE_FORMAT)
        .unwrap_or_else(|_| transaction.date.to_string());
    let is_deletable = transaction.date == today;

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

                p class="text-sm text-gray-500 dark:text-gray-400 truncate"
                {
                    (truncate_description(&transaction.description))
                }

                p class="text-xs text-gray-500 dark:text-gray-400" { (date_text) }
            }

            @if is_deletable {
                button
                    type="button"
                    hx-delete=(format_endpoint(DELETE_TRANSACTION, transaction.id))
                    hx-target-error="#alert-container"
                    aria-label="Delete transaction"
                    class=(BUTTON_DELETE_STYLE)
                {
                    "Delete"
                }
            }
        }
    }
}

/// The list of transactions, as given by the caller (most recent first).
///
/// A delete button is rendered only for rows dated `today`; all other rows
/// are immutable from this view.
pub fn transaction_list(transactions: &[Transaction], today: Date) -> Markup {
    html! {
        div class=(CARD_STYLE)
        {
            div class="p-6 space-y-3"
            {
                h2 class="text-xl font-bold text-gray-900 dark:text-white" { "Recent Transactions" }

                @if transactions.is_empty() {
                    p class="text-center text-gray-500 dark:text-gray-400 py-8" { "No transactions yet" }
                } @else {
                    @for transaction in transactions {
                        (transaction_row(transaction, today))
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use scraper::{Html, Selector};
    use time::{Duration, OffsetDateTime, macros::date};

    use crate::{
        auth::UserID,
        transaction::{Transaction, TransactionType},
    };

    use super::{transaction_list, truncate_description};

    fn test_transaction(id: i64, date: time::Date) -> Transaction {
        Transaction {
            id,
            user_id: UserID::new(1),
            transaction_type: TransactionType::Expense,
            amount: Decimal::new(1230, 2),
            description: "Lunch".to_owned(),
            category: Some("Food".to_owned()),
            date,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    fn render(transactions: &[Transaction], today: time::Date) -> Html {
        Html::parse_fragment(&transaction_list(transactions, today).into_string())
    }

    #[test]
    fn shows_empty_state_without_transactions() {
        let html = render(&[], date!(2025 - 07 - 14));

        let text: String = html.root_element().text().collect();
        assert!(text.contains("No transactions yet"));
    }

    #[test]
    fn todays_row_has_delete_button() {
        let today = date!(2025 - 07 - 14);
        let html = render(&[test_transaction(1, today)], today);

        let selector = Selector::parse("button[hx-delete='/api/transactions/1']").unwrap();
        assert!(html.select(&selector).next().is_some());
    }

    #[test]
    fn older_row_has_no_delete_button() {
        let today = date!(2025 - 07 - 14);
        let yesterday = today - Duration::days(1);
        let html = render(&[test_transaction(1, yesterday)], today);

        let selector = Selector::parse("button[hx-delete]").unwrap();
        assert!(
            html.select(&selector).next().is_none(),
            "rows dated before today must not offer deletion"
        );
    }

    #[test]
    fn expense_amount_is_negative_and_income_positive() {
        let today = date!(2025 - 07 - 14);
        let mut income = test_transaction(1, today);
        income.transaction_type = TransactionType::Income;
        let expense = test_transaction(2, today);

        let html = render(&[income, expense], today);
        let text: String = html.root_element().text().collect();

        assert!(text.contains("+$12.30"));
        assert!(text.contains("-$12.30"));
    }

    #[test]
    fn truncates_long_descriptions() {
        let long = "a".repeat(64);

        let truncated = truncate_description(&long);

        assert!(truncated.ends_with('…'));
        assert!(truncated.chars().count() <= 33);
    }

    #[test]
    fn keeps_short_descriptions() {
        assert_eq!(truncate_description("Lunch"), "Lunch");
    }
}

//! The summary cards shown at the top of the dashboard.

use maud::{Markup, html};
use rust_decimal::Decimal;

use crate::{
    dashboard::aggregation::Totals,
    html::{AMOUNT_EXPENSE_STYLE, AMOUNT_INCOME_STYLE, CARD_STYLE, format_currency},
};

fn balance_style(balance: Decimal) -> &'static str {
    if balance.is_sign_negative() && !balance.is_zero() {
        AMOUNT_EXPENSE_STYLE
    } else {
        AMOUNT_INCOME_STYLE
    }
}

fn summary_card(title: &str, value: &str, value_style: &str, subtitle: &str) -> Markup {
    html! {
        div class=(CARD_STYLE)
        {
            div class="p-6"
            {
                h3 class="text-sm font-medium text-gray-500 dark:text-gray-400" { (title) }

                div class={"text-2xl font-bold " (value_style)} { (value) }

                p class="text-xs text-gray-500 dark:text-gray-400" { (subtitle) }
            }
        }
    }
}

/// The income, expenses, and balance cards for one month's transactions.
pub fn summary_cards(totals: &Totals, subtitle: &str) -> Markup {
    let balance = totals.balance();

    html! {
        div class="grid gap-4 md:grid-cols-3"
        {
            (summary_card(
                "Total Income",
                &format_currency(totals.income),
                AMOUNT_INCOME_STYLE,
                subtitle,
            ))

            (summary_card(
                "Total Expenses",
                &format_currency(totals.expenses),
                AMOUNT_EXPENSE_STYLE,
                subtitle,
            ))

            (summary_card(
                "Balance",
                &format_currency(balance),
                balance_style(balance),
                subtitle,
            ))
        }
    }
}

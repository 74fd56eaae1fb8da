//! Pure aggregation over transaction lists.
//!
//! These functions turn the flat per-user transaction list into the derived
//! views the pages render: a single month's subset with its totals for the
//! dashboard, and most-recent-first month groups for the history page.
//! Amounts are summed as [Decimal]s, so totals are exact; rounding to cents
//! happens at presentation time only.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use time::Month;

use crate::{
    dashboard::month::SelectedMonth,
    transaction::{Transaction, TransactionType},
};

/// The income and expense sums over a list of transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    /// The sum of all income amounts.
    pub income: Decimal,
    /// The sum of all expense amounts, as a positive number.
    pub expenses: Decimal,
}

impl Totals {
    /// Income minus expenses.
    pub fn balance(&self) -> Decimal {
        self.income - self.expenses
    }
}

/// Sum the income and expense amounts of `transactions`.
pub fn transaction_totals(transactions: &[Transaction]) -> Totals {
    let mut totals = Totals::default();

    for transaction in transactions {
        match transaction.transaction_type {
            TransactionType::Income => totals.income += transaction.amount,
            TransactionType::Expense => totals.expenses += transaction.amount,
        }
    }

    totals
}

/// The subset of `transactions` whose date falls within `month`.
///
/// The boundaries are calendar month boundaries, not rolling windows. An
/// empty result just means there were no transactions that month.
pub fn transactions_in_month(
    transactions: &[Transaction],
    month: SelectedMonth,
) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|transaction| SelectedMonth::for_date(transaction.date) == month)
        .cloned()
        .collect()
}

/// All transactions of one calendar month, with their totals.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthGroup {
    /// The calendar year of the group.
    pub year: i32,
    /// The calendar month of the group.
    pub month: Month,
    /// The transactions of this month, in the order they were given.
    pub transactions: Vec<Transaction>,
    /// The income and expense sums over [MonthGroup::transactions].
    pub totals: Totals,
}

impl MonthGroup {
    /// The heading for this group, e.g. "July 2025".
    pub fn title(&self) -> String {
        SelectedMonth {
            year: self.year,
            month: self.month,
        }
        .title()
    }
}

/// Partition `transactions` into one group per distinct calendar month.
///
/// The grouping key derives solely from the year and month of each
/// transaction's date, so group membership does not depend on the input
/// order. Groups are returned most recent first: year descending, then month
/// descending by calendar position.
pub fn group_by_month(transactions: Vec<Transaction>) -> Vec<MonthGroup> {
    let mut groups: BTreeMap<(i32, u8), Vec<Transaction>> = BTreeMap::new();

    for transaction in transactions {
        groups
            .entry(SelectedMonth::for_date(transaction.date).key())
            .or_default()
            .push(transaction);
    }

    groups
        .into_iter()
        .rev()
        .map(|((year, month_number), transactions)| {
            let totals = transaction_totals(&transactions);

            MonthGroup {
                year,
                // The key is built from `Month`, so it always converts back.
                month: Month::try_from(month_number).expect("month key out of range"),
                transactions,
                totals,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rust_decimal::Decimal;
    use time::{Month, OffsetDateTime, macros::date};

    use crate::{
        auth::UserID,
        dashboard::month::SelectedMonth,
        transaction::{Transaction, TransactionType},
    };

    use super::{group_by_month, transaction_totals, transactions_in_month};

    fn dec(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    fn test_transaction(
        id: i64,
        transaction_type: TransactionType,
        amount: &str,
        date: time::Date,
    ) -> Transaction {
        Transaction {
            id,
            user_id: UserID::new(1),
            transaction_type,
            amount: dec(amount),
            description: format!("transaction {id}"),
            category: None,
            date,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn totals_split_income_and_expenses() {
        let transactions = vec![
            test_transaction(1, TransactionType::Income, "1000.00", date!(2025 - 07 - 01)),
            test_transaction(2, TransactionType::Expense, "250.50", date!(2025 - 07 - 02)),
        ];

        let totals = transaction_totals(&transactions);

        assert_eq!(totals.income, dec("1000.00"));
        assert_eq!(totals.expenses, dec("250.50"));
        assert_eq!(totals.balance(), dec("749.50"));
    }

    #[test]
    fn totals_balance_is_exact_over_many_cents() {
        // 0.10 cannot be represented exactly as a float; one thousand of them
        // must still sum to exactly 100.00.
        let transactions: Vec<Transaction> = (0..1000)
            .map(|id| test_transaction(id, TransactionType::Income, "0.10", date!(2025 - 07 - 01)))
            .collect();

        let totals = transaction_totals(&transactions);

        assert_eq!(totals.income, dec("100.00"));
        assert_eq!(totals.balance(), dec("100.00"));
    }

    #[test]
    fn totals_of_empty_list_are_zero() {
        let totals = transaction_totals(&[]);

        assert_eq!(totals.income, Decimal::ZERO);
        assert_eq!(totals.expenses, Decimal::ZERO);
        assert_eq!(totals.balance(), Decimal::ZERO);
    }

    #[test]
    fn month_filter_uses_calendar_boundaries() {
        let last_of_june = test_transaction(
            1,
            TransactionType::Expense,
            "10.00",
            date!(2025 - 06 - 30),
        );
        let first_of_july =
            test_transaction(2, TransactionType::Expense, "20.00", date!(2025 - 07 - 01));
        let transactions = vec![last_of_june, first_of_july];

        let june = SelectedMonth {
            year: 2025,
            month: Month::June,
        };
        let july = SelectedMonth {
            year: 2025,
            month: Month::July,
        };

        let june_transactions = transactions_in_month(&transactions, june);
        let july_transactions = transactions_in_month(&transactions, july);

        assert_eq!(june_transactions.len(), 1);
        assert_eq!(june_transactions[0].id, 1);
        assert_eq!(july_transactions.len(), 1);
        assert_eq!(july_transactions[0].id, 2);
    }

    #[test]
    fn month_filter_allows_empty_result() {
        let transactions = vec![test_transaction(
            1,
            TransactionType::Expense,
            "10.00",
            date!(2025 - 06 - 30),
        )];

        let result = transactions_in_month(
            &transactions,
            SelectedMonth {
                year: 2025,
                month: Month::December,
            },
        );

        assert!(result.is_empty());
    }

    #[test]
    fn grouping_orders_most_recent_first() {
        let transactions = vec![
            test_transaction(1, TransactionType::Expense, "1.00", date!(2024 - 12 - 15)),
            test_transaction(2, TransactionType::Expense, "1.00", date!(2025 - 01 - 02)),
            test_transaction(3, TransactionType::Expense, "1.00", date!(2024 - 01 - 20)),
        ];

        let groups = group_by_month(transactions);

        let keys: Vec<(i32, Month)> = groups
            .iter()
            .map(|group| (group.year, group.month))
            .collect();
        assert_eq!(
            keys,
            vec![
                (2025, Month::January),
                (2024, Month::December),
                (2024, Month::January),
            ]
        );
    }

    #[test]
    fn grouping_is_a_partition() {
        let transactions = vec![
            test_transaction(1, TransactionType::Income, "1.00", date!(2025 - 07 - 01)),
            test_transaction(2, TransactionType::Expense, "2.00", date!(2025 - 07 - 31)),
            test_transaction(3, TransactionType::Expense, "3.00", date!(2025 - 06 - 30)),
            test_transaction(4, TransactionType::Income, "4.00", date!(2024 - 07 - 15)),
        ];
        let input_ids: HashSet<i64> = transactions.iter().map(|transaction| transaction.id).collect();

        let groups = group_by_month(transactions);

        let output_ids: Vec<i64> = groups
            .iter()
            .flat_map(|group| group.transactions.iter().map(|transaction| transaction.id))
            .collect();
        assert_eq!(
            output_ids.len(),
            input_ids.len(),
            "every transaction must appear exactly once"
        );
        let output_ids: HashSet<i64> = output_ids.into_iter().collect();
        assert_eq!(input_ids, output_ids);
    }

    #[test]
    fn grouping_key_ignores_day_of_month() {
        let transactions = vec![
            test_transaction(1, TransactionType::Expense, "1.00", date!(2025 - 07 - 01)),
            test_transaction(2, TransactionType::Expense, "1.00", date!(2025 - 07 - 31)),
        ];

        let groups = group_by_month(transactions);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].transactions.len(), 2);
    }

    #[test]
    fn groups_carry_their_own_totals() {
        let transactions = vec![
            test_transaction(1, TransactionType::Income, "1000.00", date!(2025 - 07 - 01)),
            test_transaction(2, TransactionType::Expense, "250.50", date!(2025 - 07 - 14)),
            test_transaction(3, TransactionType::Expense, "99.99", date!(2025 - 06 - 14)),
        ];

        let groups = group_by_month(transactions);

        assert_eq!(groups.len(), 2);

        let july = &groups[0];
        assert_eq!(july.totals.income, dec("1000.00"));
        assert_eq!(july.totals.expenses, dec("250.50"));
        assert_eq!(july.totals.balance(), dec("749.50"));

        let june = &groups[1];
        assert_eq!(june.totals.income, Decimal::ZERO);
        assert_eq!(june.totals.expenses, dec("99.99"));
        assert_eq!(june.totals.balance(), dec("-99.99"));
    }

    #[test]
    fn grouping_handles_empty_input() {
        assert!(group_by_month(Vec::new()).is_empty());
    }

    #[test]
    fn group_title_is_month_and_year() {
        let transactions = vec![test_transaction(
            1,
            TransactionType::Expense,
            "1.00",
            date!(2025 - 07 - 14),
        )];

        let groups = group_by_month(transactions);

        assert_eq!(groups[0].title(), "July 2025");
    }
}

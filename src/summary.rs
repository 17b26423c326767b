//! Derived views over the transaction list.
//!
//! Summary and stats are recomputed from a full scan on every call. At the
//! expected scale (a personal tracker with at most a few thousand records)
//! this is the right tradeoff; there is no caching or invalidation layer.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::transaction::{Transaction, TransactionType};

/// Income and expense totals for a set of transactions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    /// The sum of all income amounts.
    pub total_income: f64,
    /// The sum of all expense amounts.
    pub total_expense: f64,
    /// `total_income - total_expense`.
    pub balance: f64,
}

impl Summary {
    /// Classify the balance by its sign.
    pub fn balance_tag(&self) -> BalanceTag {
        if self.balance > 0.0 {
            BalanceTag::Positive
        } else if self.balance < 0.0 {
            BalanceTag::Negative
        } else {
            BalanceTag::Neutral
        }
    }
}

/// The classification tag derived from the sign of a [Summary]'s balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceTag {
    /// More income than expenses.
    Positive,
    /// More expenses than income.
    Negative,
    /// Income and expenses are exactly equal (including the empty store).
    Neutral,
}

impl fmt::Display for BalanceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            BalanceTag::Positive => "positive",
            BalanceTag::Negative => "negative",
            BalanceTag::Neutral => "neutral",
        };
        f.write_str(tag)
    }
}

/// Sum income and expenses over `transactions`.
pub fn summarize(transactions: &[Transaction]) -> Summary {
    let mut total_income = 0.0;
    let mut total_expense = 0.0;

    for transaction in transactions {
        match transaction.kind {
            TransactionType::Income => total_income += transaction.amount,
            TransactionType::Expense => total_expense += transaction.amount,
        }
    }

    Summary {
        total_income,
        total_expense,
        balance: total_income - total_expense,
    }
}

/// Aggregate statistics over a set of transactions.
#[derive(Debug, Clone, PartialEq)]
pub struct Stats {
    /// The total number of records of either type.
    pub count: usize,
    /// The expense record with the largest amount, or `None` when there are
    /// no expense records. Ties go to the first record in store order.
    pub biggest_expense: Option<Transaction>,
    /// The category with the most expense records, or `None` when there are
    /// no expense records.
    pub top_category: Option<TopCategory>,
}

/// The expense category that occurs most often.
///
/// Categories are grouped case-insensitively; the reported name keeps the
/// casing of the category's first occurrence. Ties go to the category that
/// appears first in store order.
#[derive(Debug, Clone, PartialEq)]
pub struct TopCategory {
    /// The category label as it was first entered.
    pub name: String,
    /// How many expense records carry this category.
    pub count: usize,
}

/// Compute [Stats] over `transactions`.
pub fn compute_stats(transactions: &[Transaction]) -> Stats {
    let mut biggest_expense: Option<&Transaction> = None;
    // Per lowercased category: (label at first occurrence, expense count),
    // in first-occurrence order.
    let mut categories: Vec<(String, String, usize)> = Vec::new();
    let mut category_index: HashMap<String, usize> = HashMap::new();

    for transaction in transactions {
        if transaction.kind != TransactionType::Expense {
            continue;
        }

        if biggest_expense.is_none_or(|biggest| transaction.amount > biggest.amount) {
            biggest_expense = Some(transaction);
        }

        let key = transaction.category.to_lowercase();
        match category_index.get(&key) {
            Some(&index) => categories[index].2 += 1,
            None => {
                category_index.insert(key.clone(), categories.len());
                categories.push((key, transaction.category.clone(), 1));
            }
        }
    }

    let mut top_category: Option<TopCategory> = None;
    for (_, name, count) in categories {
        if top_category
            .as_ref()
            .is_none_or(|current| count > current.count)
        {
            top_category = Some(TopCategory { name, count });
        }
    }

    Stats {
        count: transactions.len(),
        biggest_expense: biggest_expense.cloned(),
        top_category,
    }
}


#[cfg(test)]
mod stats_tests {
    use time::macros::date;

    use crate::transaction::{Transaction, TransactionId, TransactionType};

    use super::compute_stats;

    fn transaction(kind: TransactionType, amount: f64, category: &str) -> Transaction {
        Transaction::build(kind, amount, category, date!(2024 - 01 - 01))
            .finalize(TransactionId::new(), 0)
            .unwrap()
    }

    #[test]
    fn counts_all_records() {
        let transactions = vec![
            transaction(TransactionType::Income, 1.0, "a"),
            transaction(TransactionType::Expense, 2.0, "b"),
        ];

        assert_eq!(compute_stats(&transactions).count, 2);
    }

    #[test]
    fn biggest_expense_ignores_income() {
        let transactions = vec![
            transaction(TransactionType::Income, 9000.0, "Salary"),
            transaction(TransactionType::Expense, 1200.0, "Rent"),
            transaction(TransactionType::Expense, 300.0, "Food"),
        ];

        let stats = compute_stats(&transactions);

        let biggest = stats.biggest_expense.expect("want a biggest expense");
        assert_eq!(biggest.category, "Rent");
        assert_eq!(biggest.amount, 1200.0);
    }

    #[test]
    fn biggest_expense_tie_goes_to_first_record() {
        let transactions = vec![
            transaction(TransactionType::Expense, 50.0, "first"),
            transaction(TransactionType::Expense, 50.0, "second"),
        ];

        let stats = compute_stats(&transactions);

        assert_eq!(stats.biggest_expense.unwrap().category, "first");
    }

    #[test]
    fn no_expenses_means_no_biggest_expense() {
        let transactions = vec![transaction(TransactionType::Income, 100.0, "Salary")];

        let stats = compute_stats(&transactions);

        assert_eq!(stats.biggest_expense, None);
        assert_eq!(stats.top_category, None);
    }

    #[test]
    fn top_category_counts_expense_records() {
        let transactions = vec![
            transaction(TransactionType::Expense, 1.0, "Food"),
            transaction(TransactionType::Expense, 1.0, "Transport"),
            transaction(TransactionType::Expense, 1.0, "Food"),
            transaction(TransactionType::Income, 9000.0, "Salary"),
        ];

        let stats = compute_stats(&transactions);

        let top = stats.top_category.expect("want a top category");
        assert_eq!(top.name, "Food");
        assert_eq!(top.count, 2);
    }

    #[test]
    fn top_category_groups_case_insensitively() {
        let transactions = vec![
            transaction(TransactionType::Expense, 1.0, "food"),
            transaction(TransactionType::Expense, 1.0, "FOOD"),
            transaction(TransactionType::Expense, 1.0, "Rent"),
        ];

        let stats = compute_stats(&transactions);

        let top = stats.top_category.expect("want a top category");
        assert_eq!(top.name, "food", "label should keep first-seen casing");
        assert_eq!(top.count, 2);
    }

    #[test]
    fn top_category_tie_goes_to_first_seen() {
        let transactions = vec![
            transaction(TransactionType::Expense, 1.0, "Bills"),
            transaction(TransactionType::Expense, 1.0, "Travel"),
        ];

        let stats = compute_stats(&transactions);

        assert_eq!(stats.top_category.unwrap().name, "Bills");
    }
}

//! Filtering of the transaction list for display.

use time::Date;

use crate::transaction::{Transaction, TransactionType};

/// Restricts a filtered view to one transaction type, or neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
    /// Keep both income and expense records.
    #[default]
    All,
    /// Keep only income records.
    Income,
    /// Keep only expense records.
    Expense,
}

impl TypeFilter {
    fn admits(&self, kind: TransactionType) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Income => kind == TransactionType::Income,
            TypeFilter::Expense => kind == TransactionType::Expense,
        }
    }
}

/// The criteria for a filtered view of the transaction list.
///
/// All criteria combine with logical AND; a criterion left at its default
/// imposes no constraint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    /// Keep records of this type only.
    pub type_filter: TypeFilter,
    /// Case-insensitive substring match against a record's category and
    /// description. Surrounding whitespace is ignored; a blank search
    /// matches everything.
    pub search_text: Option<String>,
    /// Keep records dated on or after this date.
    pub from_date: Option<Date>,
    /// Keep records dated on or before this date.
    pub to_date: Option<Date>,
}

impl TransactionFilter {
    /// Whether `transaction` satisfies every criterion.
    pub fn matches(&self, transaction: &Transaction) -> bool {
        if !self.type_filter.admits(transaction.kind) {
            return false;
        }

        if let Some(search) = &self.search_text {
            let needle = search.trim().to_lowercase();
            if !needle.is_empty() {
                let haystack = format!("{} {}", transaction.category, transaction.description)
                    .to_lowercase();
                if !haystack.contains(&needle) {
                    return false;
                }
            }
        }

        if let Some(from) = self.from_date
            && transaction.date < from
        {
            return false;
        }

        if let Some(to) = self.to_date
            && transaction.date > to
        {
            return false;
        }

        true
    }
}

/// Return the transactions satisfying `filter`, in store order.
pub fn filter_transactions(
    transactions: &[Transaction],
    filter: &TransactionFilter,
) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|transaction| filter.matches(transaction))
        .cloned()
        .collect()
}

//! The core transaction model.
//!
//! This module contains the [Transaction] record, the [TransactionBuilder]
//! used to validate and create transactions, the [TransactionUpdate] type for
//! partial edits, and the display sort order.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use crate::Error;

/// The unique identifier assigned to a [Transaction] when it is created.
///
/// IDs are opaque and never reused; the store generates a fresh one per
/// created transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(Uuid);

impl TransactionId {
    /// Generate a fresh, random transaction ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TransactionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Whether a transaction is money earned or money spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money coming in, e.g. salary.
    Income,
    /// Money going out, e.g. rent.
    Expense,
}

impl TransactionType {
    /// A human-readable label for display in lists.
    pub fn label(&self) -> &'static str {
        match self {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
        }
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
///
/// The serialized form uses the field names `type` and `createdAt` so that
/// the persisted blob, exports and imports all share one wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// Whether this transaction is income or an expense.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// The amount of money spent or earned in this transaction.
    /// Always positive; the direction is carried by `kind`.
    pub amount: f64,
    /// A free-text label grouping similar transactions, e.g. "Rent".
    pub category: String,
    /// A text description of what the transaction was for. May be empty.
    pub description: String,
    /// When the transaction happened.
    pub date: Date,
    /// When the transaction was recorded, as unix-epoch milliseconds.
    /// Used only as an ordering aid, never shown as a primary sort key.
    #[serde(rename = "createdAt")]
    pub created_at: i64,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        kind: TransactionType,
        amount: f64,
        category: &str,
        date: Date,
    ) -> TransactionBuilder {
        TransactionBuilder {
            kind,
            amount,
            category: category.to_owned(),
            date,
            description: String::new(),
        }
    }

    /// Check this record against the store invariants.
    ///
    /// Used when accepting records wholesale, e.g. on import.
    ///
    /// # Errors
    /// Returns [Error::InvalidAmount] or [Error::EmptyCategory] for the first
    /// field that fails.
    pub fn validate(&self) -> Result<(), Error> {
        validate_amount(self.amount)?;
        validate_category(&self.category)
    }
}

/// A builder for creating [Transaction] instances.
///
/// Holds the user-supplied fields; the store supplies the ID and creation
/// timestamp when it calls [TransactionBuilder::finalize].
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// Whether the transaction is income or an expense.
    pub kind: TransactionType,
    /// The monetary amount of the transaction. Must be finite and positive.
    pub amount: f64,
    /// The category label. Must not be empty after trimming.
    pub category: String,
    /// The date when the transaction occurred.
    pub date: Date,
    /// An optional free-text description.
    pub description: String,
}

impl TransactionBuilder {
    /// Set the description for the transaction.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }

    /// Build the final [Transaction] instance.
    ///
    /// Category and description are trimmed of surrounding whitespace, the
    /// way the entry form trims its inputs.
    ///
    /// # Errors
    /// Returns [Error::InvalidAmount] if `amount` is not a finite positive
    /// number, or [Error::EmptyCategory] if `category` is empty after
    /// trimming. On error nothing is created.
    pub fn finalize(self, id: TransactionId, created_at: i64) -> Result<Transaction, Error> {
        validate_amount(self.amount)?;
        let category = self.category.trim();
        validate_category(category)?;

        Ok(Transaction {
            id,
            kind: self.kind,
            amount: self.amount,
            category: category.to_owned(),
            description: self.description.trim().to_owned(),
            date: self.date,
            created_at,
        })
    }
}

/// A partial set of field changes for [crate::TransactionStore::update].
///
/// Fields left as `None` are kept unchanged. The transaction's ID and
/// creation timestamp can never be changed.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TransactionUpdate {
    /// Replace the transaction type.
    pub kind: Option<TransactionType>,
    /// Replace the amount. Must be finite and positive.
    pub amount: Option<f64>,
    /// Replace the category. Must not be empty after trimming.
    pub category: Option<String>,
    /// Replace the date.
    pub date: Option<Date>,
    /// Replace the description.
    pub description: Option<String>,
}

impl TransactionUpdate {
    /// Check every supplied field against the same rules as
    /// [TransactionBuilder::finalize].
    ///
    /// # Errors
    /// Returns [Error::InvalidAmount] or [Error::EmptyCategory] for the first
    /// supplied field that fails.
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(amount) = self.amount {
            validate_amount(amount)?;
        }

        if let Some(category) = &self.category {
            validate_category(category.trim())?;
        }

        Ok(())
    }

    /// Apply the supplied fields to `transaction`.
    ///
    /// Callers must run [TransactionUpdate::validate] first; this method
    /// performs no checks of its own so that a failed validation never leaves
    /// a record partially updated.
    pub fn apply_to(&self, transaction: &mut Transaction) {
        if let Some(kind) = self.kind {
            transaction.kind = kind;
        }

        if let Some(amount) = self.amount {
            transaction.amount = amount;
        }

        if let Some(category) = &self.category {
            transaction.category = category.trim().to_owned();
        }

        if let Some(date) = self.date {
            transaction.date = date;
        }

        if let Some(description) = &self.description {
            transaction.description = description.trim().to_owned();
        }
    }
}

/// Sort transactions into the order they are presented to the user: by date,
/// most recent first.
///
/// The sort is stable, so records sharing a date keep their relative order in
/// the store. This is the only sort order the application ever displays.
pub fn display_order(mut transactions: Vec<Transaction>) -> Vec<Transaction> {
    transactions.sort_by(|a, b| b.date.cmp(&a.date));
    transactions
}

fn validate_amount(amount: f64) -> Result<(), Error> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount(amount));
    }

    Ok(())
}

fn validate_category(category: &str) -> Result<(), Error> {
    if category.is_empty() {
        return Err(Error::EmptyCategory);
    }

    Ok(())
}

#[cfg(test)]
mod transaction_builder_tests {
    use time::macros::date;

    use crate::Error;

    use super::{Transaction, TransactionId, TransactionType};

    #[test]
    fn finalize_succeeds_with_valid_fields() {
        let id = TransactionId::new();

        let result = Transaction::build(
            TransactionType::Expense,
            45.99,
            "Food & Dining",
            date!(2024 - 01 - 15),
        )
        .description("Coffee shop purchase")
        .finalize(id, 1_700_000_000_000);

        match result {
            Ok(transaction) => {
                assert_eq!(transaction.id, id);
                assert_eq!(transaction.kind, TransactionType::Expense);
                assert_eq!(transaction.amount, 45.99);
                assert_eq!(transaction.category, "Food & Dining");
                assert_eq!(transaction.description, "Coffee shop purchase");
                assert_eq!(transaction.date, date!(2024 - 01 - 15));
                assert_eq!(transaction.created_at, 1_700_000_000_000);
            }
            Err(error) => panic!("Unexpected error: {error}"),
        }
    }

    #[test]
    fn finalize_fails_on_zero_amount() {
        let result = Transaction::build(
            TransactionType::Income,
            0.0,
            "Salary",
            date!(2024 - 01 - 01),
        )
        .finalize(TransactionId::new(), 0);

        assert_eq!(result, Err(Error::InvalidAmount(0.0)));
    }

    #[test]
    fn finalize_fails_on_negative_amount() {
        let result = Transaction::build(
            TransactionType::Expense,
            -12.5,
            "Rent",
            date!(2024 - 01 - 01),
        )
        .finalize(TransactionId::new(), 0);

        assert_eq!(result, Err(Error::InvalidAmount(-12.5)));
    }

    #[test]
    fn finalize_fails_on_non_finite_amount() {
        let result = Transaction::build(
            TransactionType::Expense,
            f64::NAN,
            "Rent",
            date!(2024 - 01 - 01),
        )
        .finalize(TransactionId::new(), 0);

        assert!(
            matches!(result, Err(Error::InvalidAmount(amount)) if amount.is_nan()),
            "want InvalidAmount(NaN), got {result:?}"
        );
    }

    #[test]
    fn finalize_fails_on_blank_category() {
        let result =
            Transaction::build(TransactionType::Expense, 10.0, "  ", date!(2024 - 01 - 01))
                .finalize(TransactionId::new(), 0);

        assert_eq!(result, Err(Error::EmptyCategory));
    }

    #[test]
    fn finalize_trims_category_and_description() {
        let transaction = Transaction::build(
            TransactionType::Expense,
            10.0,
            "  Transport ",
            date!(2024 - 01 - 01),
        )
        .description(" bus fare ")
        .finalize(TransactionId::new(), 0)
        .unwrap();

        assert_eq!(transaction.category, "Transport");
        assert_eq!(transaction.description, "bus fare");
    }
}

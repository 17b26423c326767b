//! Budget Buster is a small personal finance tracker.
//!
//! This library provides the transaction store: an owned, in-memory list of
//! income and expense records that is mirrored to a durable key-value slot
//! after every mutation, plus the derived views (summary, stats, filtered and
//! sorted lists) computed fresh from the current records on each call.
//!
//! Presentation layers (such as the bundled CLI) are plain consumers of
//! [TransactionStore] and never touch the storage slot directly.

#![warn(missing_docs)]

mod filter;
mod slot;
mod store;
mod summary;
mod transaction;

pub use filter::{TransactionFilter, TypeFilter, filter_transactions};
pub use slot::{FileSlot, MemorySlot, StorageSlot};
pub use store::{STORAGE_KEY, TransactionStore, export_file_name};
pub use summary::{BalanceTag, Stats, Summary, TopCategory, compute_stats, summarize};
pub use transaction::{
    Transaction, TransactionBuilder, TransactionId, TransactionType, TransactionUpdate,
    display_order,
};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// An empty (or whitespace-only) string was used for a transaction
    /// category.
    #[error("category must not be empty")]
    EmptyCategory,

    /// A non-positive or non-finite number was used for a transaction amount.
    #[error("amount must be a positive number, got {0}")]
    InvalidAmount(f64),

    /// Tried to update a transaction that is not in the store.
    #[error("no transaction with ID {0}")]
    TransactionNotFound(TransactionId),

    /// The imported data could not be accepted.
    ///
    /// Either the text was not valid JSON, the top-level value was not an
    /// array, or a record failed validation. The message names the offending
    /// record and field where one exists.
    #[error("invalid import data: {0}")]
    ImportFormat(String),

    /// The durable storage slot could not be read or written.
    ///
    /// The underlying error is carried as a string so that this enum stays
    /// comparable in tests.
    #[error("storage error: {0}")]
    Storage(String),
}

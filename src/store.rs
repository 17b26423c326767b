//! The transaction store.
//!
//! [TransactionStore] owns the authoritative in-memory transaction list,
//! loads it from a [StorageSlot] once at startup, and writes the full list
//! back synchronously after every mutation. There is no incremental diffing
//! and no write batching; every mutation is immediately durable.

use std::collections::HashSet;

use time::{Date, OffsetDateTime};

use crate::{
    Error,
    filter::{TransactionFilter, filter_transactions},
    slot::StorageSlot,
    summary::{Stats, Summary, compute_stats, summarize},
    transaction::{
        Transaction, TransactionBuilder, TransactionId, TransactionUpdate, display_order,
    },
};

/// The well-known key the transaction list is persisted under.
///
/// Must stay stable across releases so stored data survives upgrades.
pub const STORAGE_KEY: &str = "budgetBusterTransactions";

/// The deterministic filename offered for an exported snapshot taken on
/// `date`, e.g. `budget_buster_2024-01-15.json`.
pub fn export_file_name(date: Date) -> String {
    format!("budget_buster_{date}.json")
}

/// Owns the transaction list and mediates all reads and writes to durable
/// storage.
///
/// Every mutating operation runs validate, mutate, persist to completion
/// before returning; a validation failure leaves the store in its last-good
/// state.
#[derive(Debug)]
pub struct TransactionStore<S: StorageSlot> {
    slot: S,
    transactions: Vec<Transaction>,
}

impl<S: StorageSlot> TransactionStore<S> {
    /// Create a store over `slot` and load the persisted transaction list.
    ///
    /// An absent value initializes an empty store. A value that does not
    /// parse as a transaction array is treated as corruption: the store
    /// resets to empty and the condition is logged, never propagated, so a
    /// bad blob can never prevent startup.
    ///
    /// # Errors
    /// Returns [Error::Storage] only if the slot itself cannot be read.
    pub fn load(slot: S) -> Result<Self, Error> {
        let mut store = Self {
            slot,
            transactions: Vec::new(),
        };

        let Some(text) = store.slot.read(STORAGE_KEY)? else {
            return Ok(store);
        };

        match serde_json::from_str::<Vec<Transaction>>(&text) {
            Ok(transactions) => store.transactions = transactions,
            Err(error) => {
                tracing::error!("discarding corrupt transaction data: {error}");
            }
        }

        Ok(store)
    }

    /// The current transaction list, in insertion order.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Validate and append a new transaction, assigning it a fresh ID and
    /// creation timestamp, then persist.
    ///
    /// # Errors
    /// Returns [Error::InvalidAmount] or [Error::EmptyCategory] without
    /// mutating the store, or [Error::Storage] if persisting fails.
    pub fn create(&mut self, builder: TransactionBuilder) -> Result<Transaction, Error> {
        let transaction = builder.finalize(TransactionId::new(), now_unix_millis())?;
        self.transactions.push(transaction.clone());
        self.persist()?;

        Ok(transaction)
    }

    /// Apply `changes` to the transaction with `id`, then persist.
    ///
    /// All supplied fields are validated before anything is mutated, so a
    /// failed update never leaves a record partially changed. The ID and
    /// creation timestamp are never touched.
    ///
    /// # Errors
    /// Returns [Error::TransactionNotFound] if `id` is not in the store,
    /// [Error::InvalidAmount] or [Error::EmptyCategory] if a supplied field
    /// fails validation, or [Error::Storage] if persisting fails.
    pub fn update(
        &mut self,
        id: TransactionId,
        changes: &TransactionUpdate,
    ) -> Result<Transaction, Error> {
        changes.validate()?;

        let transaction = self
            .transactions
            .iter_mut()
            .find(|transaction| transaction.id == id)
            .ok_or(Error::TransactionNotFound(id))?;

        changes.apply_to(transaction);
        let updated = transaction.clone();
        self.persist()?;

        Ok(updated)
    }

    /// Remove the transaction with `id` if present, then persist.
    ///
    /// Deleting an absent ID is a no-op rather than an error, so a UI that
    /// races a double-click stays safe. Returns whether a record was
    /// removed.
    ///
    /// # Errors
    /// Returns [Error::Storage] if persisting fails.
    pub fn delete(&mut self, id: TransactionId) -> Result<bool, Error> {
        let count_before = self.transactions.len();
        self.transactions.retain(|transaction| transaction.id != id);

        if self.transactions.len() == count_before {
            return Ok(false);
        }

        self.persist()?;
        Ok(true)
    }

    /// Unconditionally empty the store, then persist.
    ///
    /// # Errors
    /// Returns [Error::Storage] if persisting fails.
    pub fn clear_all(&mut self) -> Result<(), Error> {
        self.transactions.clear();
        self.persist()
    }

    /// Replace the entire store contents with `records`, then persist.
    ///
    /// Every record is validated against the store invariants (positive
    /// amount, non-empty category, unique ID) and the whole batch is
    /// rejected on the first failure, leaving the store unchanged. Returns
    /// the number of records accepted.
    ///
    /// # Errors
    /// Returns [Error::ImportFormat] naming the offending record, or
    /// [Error::Storage] if persisting fails.
    pub fn replace_all(&mut self, records: Vec<Transaction>) -> Result<usize, Error> {
        let mut seen_ids = HashSet::new();

        for (index, record) in records.iter().enumerate() {
            record
                .validate()
                .map_err(|error| Error::ImportFormat(format!("record {index}: {error}")))?;

            if !seen_ids.insert(record.id) {
                return Err(Error::ImportFormat(format!(
                    "record {index}: duplicate ID {}",
                    record.id
                )));
            }
        }

        self.transactions = records;
        self.persist()?;

        Ok(self.transactions.len())
    }

    /// Parse `text` as a transaction array and replace the store contents
    /// with it.
    ///
    /// # Errors
    /// Returns [Error::ImportFormat] if `text` is not valid JSON, the
    /// top-level value is not an array, or a record fails validation; the
    /// store is left unchanged in every failure case.
    pub fn import_json(&mut self, text: &str) -> Result<usize, Error> {
        let value: serde_json::Value = serde_json::from_str(text)
            .map_err(|error| Error::ImportFormat(error.to_string()))?;

        if !value.is_array() {
            return Err(Error::ImportFormat(
                "expected a top-level array of transactions".to_owned(),
            ));
        }

        let records: Vec<Transaction> = serde_json::from_value(value)
            .map_err(|error| Error::ImportFormat(error.to_string()))?;

        self.replace_all(records)
    }

    /// The full current transaction list serialized in the persisted shape,
    /// pretty-printed for hand-off to a file download.
    ///
    /// # Errors
    /// Returns [Error::Storage] if serialization fails.
    pub fn export_snapshot(&self) -> Result<String, Error> {
        serialize_transactions(&self.transactions)
    }

    /// Income and expense totals over the current list.
    pub fn summary(&self) -> Summary {
        summarize(&self.transactions)
    }

    /// Aggregate statistics over the current list.
    pub fn stats(&self) -> Stats {
        compute_stats(&self.transactions)
    }

    /// The records satisfying `filter`, in store order.
    pub fn filter(&self, filter: &TransactionFilter) -> Vec<Transaction> {
        filter_transactions(&self.transactions, filter)
    }

    /// The records satisfying `filter`, sorted for display (most recent
    /// date first).
    pub fn list(&self, filter: &TransactionFilter) -> Vec<Transaction> {
        display_order(self.filter(filter))
    }

    /// Serialize the full current list and overwrite the slot value.
    ///
    /// Runs at the end of every mutating operation.
    fn persist(&mut self) -> Result<(), Error> {
        let text = serialize_transactions(&self.transactions)?;
        self.slot.write(STORAGE_KEY, &text)
    }
}

fn serialize_transactions(transactions: &[Transaction]) -> Result<String, Error> {
    serde_json::to_string_pretty(transactions).map_err(|error| Error::Storage(error.to_string()))
}

fn now_unix_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

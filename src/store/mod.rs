//! The transaction store: an ordered, newest-first list of transactions mirrored to a blob.

mod blob;
mod memory;

pub use blob::FileBlobStore;
pub use memory::MemoryBlobStore;

use crate::model::{NewTransaction, Transaction};
use crate::Result;
use anyhow::Context;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, trace, warn};
use uuid::Uuid;

/// An opaque key-value store that holds serialized snapshots.
#[async_trait::async_trait]
pub trait BlobStore {
    /// Returns the blob stored under `key`, or `None` if nothing has been stored.
    async fn read(&mut self, key: &str) -> Result<Option<String>>;

    /// Replaces whatever is stored under `key` with `data`.
    async fn write(&mut self, key: &str, data: &str) -> Result<()>;
}

/// What `TransactionStore::add` hands back: the stored transaction, id included.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Receipt {
    transaction: Transaction,
}

impl Receipt {
    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    /// The confirmation shown after adding, e.g. `Spent ₹250`.
    pub fn message(&self, currency_symbol: &str) -> String {
        format!(
            "{} {}",
            self.transaction.r#type().verb(),
            self.transaction.amount().format_with(currency_symbol)
        )
    }
}

/// Owns the transactions and keeps the blob under `key` in step with them. Every mutation
/// overwrites the whole snapshot.
pub struct TransactionStore {
    blob: Box<dyn BlobStore + Send>,
    key: String,
    transactions: Vec<Transaction>,
}

impl TransactionStore {
    /// Loads the snapshot stored under `key`.
    ///
    /// A missing or unreadable snapshot gives an empty store; the problem is logged and
    /// otherwise ignored. Entries repeating an earlier id are dropped.
    ///
    /// # Errors
    /// - Returns an error only if the blob store itself fails.
    pub async fn load(mut blob: Box<dyn BlobStore + Send>, key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        let raw = blob
            .read(&key)
            .await
            .with_context(|| format!("Unable to read the snapshot '{key}'"))?;

        let transactions = match raw {
            None => {
                debug!("No snapshot stored under '{key}', starting empty");
                Vec::new()
            }
            Some(text) => match serde_json::from_str::<Option<Vec<Transaction>>>(&text) {
                Ok(parsed) => dedupe(parsed.unwrap_or_default()),
                Err(e) => {
                    warn!("Ignoring the snapshot stored under '{key}': {e}");
                    Vec::new()
                }
            },
        };
        debug!("Loaded {} transactions", transactions.len());

        Ok(Self {
            blob,
            key,
            transactions,
        })
    }

    /// The transactions, newest insertion first.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn get(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id() == id)
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Assigns a fresh id to `new`, puts it at the front and persists.
    pub async fn add(&mut self, new: NewTransaction) -> Result<Receipt> {
        let id = self.fresh_id();
        let transaction = new.with_id(id);
        trace!("add {transaction:?}");
        self.transactions.insert(0, transaction.clone());
        if let Err(e) = self.save().await {
            self.transactions.remove(0);
            return Err(e);
        }
        Ok(Receipt { transaction })
    }

    /// Removes the transaction with `id` and persists. An unknown id changes nothing and is not
    /// an error; `None` is returned in that case.
    pub async fn delete(&mut self, id: &str) -> Result<Option<Transaction>> {
        let position = self.transactions.iter().position(|t| t.id() == id);
        let removed = position.map(|ix| (ix, self.transactions.remove(ix)));
        if removed.is_none() {
            debug!("No transaction with id '{id}'");
        }
        if let Err(e) = self.save().await {
            if let Some((ix, t)) = removed {
                self.transactions.insert(ix, t);
            }
            return Err(e);
        }
        Ok(removed.map(|(_, t)| t))
    }

    /// Removes every transaction and persists. Returns how many were removed. Asking for
    /// confirmation is up to the caller.
    pub async fn clear(&mut self) -> Result<usize> {
        let previous = std::mem::take(&mut self.transactions);
        if let Err(e) = self.save().await {
            self.transactions = previous;
            return Err(e);
        }
        Ok(previous.len())
    }

    async fn save(&mut self) -> Result<()> {
        let json = serde_json::to_string(&self.transactions)
            .context("Unable to serialize the transactions")?;
        self.blob
            .write(&self.key, &json)
            .await
            .with_context(|| format!("Unable to save the snapshot '{}'", self.key))
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }
}

fn dedupe(transactions: Vec<Transaction>) -> Vec<Transaction> {
    let mut seen = HashSet::new();
    let before = transactions.len();
    let kept: Vec<Transaction> = transactions
        .into_iter()
        .filter(|t| seen.insert(t.id().to_string()))
        .collect();
    if kept.len() < before {
        warn!("Dropped {} transactions with repeated ids", before - kept.len());
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, Category, TransactionType};
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    const KEY: &str = "voice-expenses-v3";

    fn new_tx(amount: i64, r#type: TransactionType, note: &str) -> NewTransaction {
        NewTransaction {
            amount: Amount::new(Decimal::from(amount)),
            r#type,
            category: Category::Food,
            date: Utc.with_ymd_and_hms(2026, 10, 19, 6, 0, 0).unwrap(),
            note: note.to_string(),
        }
    }

    async fn empty_store() -> (MemoryBlobStore, TransactionStore) {
        let blob = MemoryBlobStore::default();
        let store = TransactionStore::load(Box::new(blob.clone()), KEY)
            .await
            .unwrap();
        (blob, store)
    }

    /// A `BlobStore` whose writes always fail.
    struct BrokenBlob;

    #[async_trait::async_trait]
    impl BlobStore for BrokenBlob {
        async fn read(&mut self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        async fn write(&mut self, _key: &str, _data: &str) -> Result<()> {
            anyhow::bail!("disk full")
        }
    }

    #[tokio::test]
    async fn test_add_inserts_at_front_and_persists() {
        let (blob, mut store) = empty_store().await;
        let first = store
            .add(new_tx(250, TransactionType::Expense, "first"))
            .await
            .unwrap();
        let second = store
            .add(new_tx(5000, TransactionType::Income, "second"))
            .await
            .unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.transactions()[0].note(), "second");
        assert_eq!(store.transactions()[1].note(), "first");
        assert_ne!(first.transaction().id(), second.transaction().id());
        assert_eq!(first.message("₹"), "Spent ₹250");
        assert_eq!(second.message("₹"), "Received ₹5,000");

        let saved: Vec<Transaction> = serde_json::from_str(&blob.get(KEY).unwrap()).unwrap();
        assert_eq!(saved, store.transactions());
    }

    #[tokio::test]
    async fn test_round_trip_through_fresh_load() {
        let (blob, mut store) = empty_store().await;
        store
            .add(new_tx(250, TransactionType::Expense, "pizza"))
            .await
            .unwrap();
        store
            .add(new_tx(40, TransactionType::Income, "refund"))
            .await
            .unwrap();

        let reloaded = TransactionStore::load(Box::new(blob), KEY).await.unwrap();
        assert_eq!(reloaded.transactions(), store.transactions());
    }

    #[tokio::test]
    async fn test_round_trip_keeps_every_digit() {
        let (blob, mut store) = empty_store().await;
        for amount in ["12345678901234567890", "1.23456789012345678", "0.1"] {
            let mut new = new_tx(1, TransactionType::Expense, amount);
            new.amount = amount.parse().unwrap();
            store.add(new).await.unwrap();
        }

        let reloaded = TransactionStore::load(Box::new(blob), KEY).await.unwrap();
        assert_eq!(reloaded.transactions(), store.transactions());
        assert_eq!(
            reloaded.transactions()[2].amount().value(),
            Decimal::from_str("12345678901234567890").unwrap()
        );
    }

    #[tokio::test]
    async fn test_delete_removes_and_persists() {
        let (blob, mut store) = empty_store().await;
        let receipt = store
            .add(new_tx(1, TransactionType::Expense, "a"))
            .await
            .unwrap();
        store
            .add(new_tx(2, TransactionType::Expense, "b"))
            .await
            .unwrap();

        let removed = store.delete(receipt.transaction().id()).await.unwrap();
        assert_eq!(removed.as_ref().map(|t| t.note()), Some("a"));
        assert_eq!(store.len(), 1);
        assert!(store.get(receipt.transaction().id()).is_none());
        let saved: Vec<Transaction> = serde_json::from_str(&blob.get(KEY).unwrap()).unwrap();
        assert_eq!(saved.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_noop() {
        let (_blob, mut store) = empty_store().await;
        store
            .add(new_tx(1, TransactionType::Expense, "a"))
            .await
            .unwrap();
        let before = store.transactions().to_vec();

        let removed = store.delete("not-an-id").await.unwrap();
        assert!(removed.is_none());
        assert_eq!(store.transactions(), before.as_slice());
    }

    #[tokio::test]
    async fn test_clear() {
        let (blob, mut store) = empty_store().await;
        store
            .add(new_tx(1, TransactionType::Expense, "a"))
            .await
            .unwrap();
        store
            .add(new_tx(2, TransactionType::Income, "b"))
            .await
            .unwrap();

        assert_eq!(store.clear().await.unwrap(), 2);
        assert!(store.is_empty());
        assert_eq!(blob.get(KEY).as_deref(), Some("[]"));
        assert_eq!(store.clear().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_invalid_snapshot_loads_empty() {
        for raw in ["{not json", "null", "{\"id\":1}", "[{\"id\":\"1\"}]"] {
            let blob = MemoryBlobStore::with_blob(KEY, raw);
            let store = TransactionStore::load(Box::new(blob), KEY).await.unwrap();
            assert!(store.is_empty(), "raw: {raw}");
        }
    }

    #[tokio::test]
    async fn test_load_reads_browser_snapshot() {
        let raw = r#"[
            {"amount":250,"category":"food","type":"expense","date":"2026-10-18T14:30:00.000Z","note":"spent 250 on pizza yesterday","id":"b"},
            {"amount":5000,"category":"other","type":"income","date":"2026-10-01T04:00:00.000Z","note":"received 5000 salary","id":"a"}
        ]"#;
        let blob = MemoryBlobStore::with_blob(KEY, raw);
        let store = TransactionStore::load(Box::new(blob), KEY).await.unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.transactions()[0].id(), "b");
        assert_eq!(store.get("a").unwrap().r#type(), TransactionType::Income);
    }

    #[tokio::test]
    async fn test_load_drops_repeated_ids() {
        let raw = r#"[
            {"amount":1,"category":"food","type":"expense","date":"2026-10-18T00:00:00Z","note":"keep","id":"same"},
            {"amount":2,"category":"food","type":"expense","date":"2026-10-18T00:00:00Z","note":"drop","id":"same"}
        ]"#;
        let blob = MemoryBlobStore::with_blob(KEY, raw);
        let store = TransactionStore::load(Box::new(blob), KEY).await.unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.transactions()[0].note(), "keep");
    }

    #[tokio::test]
    async fn test_failed_save_leaves_store_unchanged() {
        let mut store = TransactionStore::load(Box::new(BrokenBlob), KEY)
            .await
            .unwrap();
        assert!(store
            .add(new_tx(1, TransactionType::Expense, "a"))
            .await
            .is_err());
        assert!(store.is_empty());
        assert!(store.clear().await.is_err());
        assert!(store.delete("x").await.is_err());
    }
}

//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::model::{Amount, Category, NewTransaction, Transaction, TransactionType};
use crate::Config;
use chrono::{DateTime, Utc};
use std::str::FromStr;
use tempfile::TempDir;

/// Test environment that sets up an expenses home directory with a Config and an empty store.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    /// Creates a test environment with a freshly initialized Config.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("voice-expenses");
        let config = Config::create(&root).await.unwrap();
        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    /// What is currently persisted, newest first.
    pub async fn stored(&self) -> Vec<Transaction> {
        let store = self.config.open_store().await.unwrap();
        store.transactions().to_vec()
    }

    /// Adds a transaction directly through the store and returns it.
    pub async fn insert(
        &self,
        amount: &str,
        r#type: TransactionType,
        category: Category,
        date: DateTime<Utc>,
    ) -> Transaction {
        let mut store = self.config.open_store().await.unwrap();
        let receipt = store
            .add(NewTransaction {
                amount: Amount::from_str(amount).unwrap(),
                r#type,
                category,
                date,
                note: String::new(),
            })
            .await
            .unwrap();
        receipt.transaction().clone()
    }
}

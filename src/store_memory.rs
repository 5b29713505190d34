//! In-memory [`Catalog`] for tests and offline runs.
//!
//! Databases and their collections live in a `BTreeMap` behind
//! `std::sync::RwLock`, so listings come back sorted the way a MongoDB
//! deployment returns them. Every drop request is recorded, which lets tests
//! assert that the guard calls the primitive exactly once (or never).

use std::collections::{BTreeMap, BTreeSet};
use std::sync::RwLock;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;

use crate::catalog::Catalog;

type Collections = BTreeMap<String, u64>;

pub struct InMemoryCatalog {
    namespaces: RwLock<BTreeMap<String, Collections>>,
    drop_log: RwLock<Vec<String>>,
    failing_drops: BTreeSet<String>,
    failing_counts: BTreeSet<String>,
    listing_fails: bool,
    reachable: bool,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self {
            namespaces: RwLock::new(BTreeMap::new()),
            drop_log: RwLock::new(Vec::new()),
            failing_drops: BTreeSet::new(),
            failing_counts: BTreeSet::new(),
            listing_fails: false,
            reachable: true,
        }
    }

    /// Adds a database with `(collection, document count)` pairs.
    pub fn with_namespace(self, name: &str, collections: &[(&str, u64)]) -> Self {
        if let Ok(mut namespaces) = self.namespaces.write() {
            namespaces.insert(
                name.to_string(),
                collections
                    .iter()
                    .map(|(c, n)| (c.to_string(), *n))
                    .collect(),
            );
        }
        self
    }

    /// Makes every drop of `name` fail as if the connection dropped mid-call.
    pub fn fail_drops_of(mut self, name: &str) -> Self {
        self.failing_drops.insert(name.to_string());
        self
    }

    /// Makes `list_namespaces` fail while `ping` still succeeds.
    pub fn fail_listing(mut self) -> Self {
        self.listing_fails = true;
        self
    }

    /// Makes `count_documents` fail for every collection of `name`.
    pub fn fail_counts_in(mut self, name: &str) -> Self {
        self.failing_counts.insert(name.to_string());
        self
    }

    /// Makes `ping` fail.
    pub fn unreachable(mut self) -> Self {
        self.reachable = false;
        self
    }

    /// Every namespace passed to `drop_namespace`, in call order.
    pub fn drop_requests(&self) -> Vec<String> {
        self.drop_log
            .read()
            .map(|log| log.clone())
            .unwrap_or_default()
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: T) -> anyhow::Error {
    anyhow!("in-memory catalog lock poisoned")
}

#[async_trait]
impl Catalog for InMemoryCatalog {
    async fn ping(&self) -> Result<()> {
        if !self.reachable {
            bail!("server selection timeout: no servers available");
        }
        Ok(())
    }

    async fn list_namespaces(&self) -> Result<Vec<String>> {
        if self.listing_fails {
            bail!("listDatabases failed: not primary");
        }
        let namespaces = self.namespaces.read().map_err(poisoned)?;
        Ok(namespaces.keys().cloned().collect())
    }

    async fn list_collections(&self, namespace: &str) -> Result<Vec<String>> {
        let namespaces = self.namespaces.read().map_err(poisoned)?;
        Ok(namespaces
            .get(namespace)
            .map(|c| c.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn count_documents(&self, namespace: &str, collection: &str) -> Result<u64> {
        if self.failing_counts.contains(namespace) {
            bail!("count on '{}.{}' interrupted", namespace, collection);
        }
        let namespaces = self.namespaces.read().map_err(poisoned)?;
        Ok(namespaces
            .get(namespace)
            .and_then(|c| c.get(collection))
            .copied()
            .unwrap_or(0))
    }

    async fn drop_namespace(&self, namespace: &str) -> Result<()> {
        self.drop_log
            .write()
            .map_err(poisoned)?
            .push(namespace.to_string());

        if self.failing_drops.contains(namespace) {
            bail!("connection closed while dropping '{}'", namespace);
        }

        // Like MongoDB, dropping an absent database succeeds.
        self.namespaces.write().map_err(poisoned)?.remove(namespace);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn drop_removes_and_logs() {
        let catalog = InMemoryCatalog::new()
            .with_namespace("shop", &[("orders", 1)])
            .with_namespace("test", &[]);

        catalog.drop_namespace("shop").await.unwrap();
        assert_eq!(catalog.list_namespaces().await.unwrap(), vec!["test"]);
        assert_eq!(catalog.drop_requests(), vec!["shop"]);
    }

    #[tokio::test]
    async fn failing_drop_leaves_data() {
        let catalog = InMemoryCatalog::new()
            .with_namespace("shop", &[("orders", 1)])
            .fail_drops_of("shop");

        assert!(catalog.drop_namespace("shop").await.is_err());
        assert_eq!(catalog.list_namespaces().await.unwrap(), vec!["shop"]);
    }

    #[tokio::test]
    async fn listing_failure_keeps_ping_working() {
        let catalog = InMemoryCatalog::new()
            .with_namespace("shop", &[("orders", 1)])
            .fail_listing();

        assert!(catalog.ping().await.is_ok());
        assert!(catalog.list_namespaces().await.is_err());
    }

    #[tokio::test]
    async fn unreachable_fails_ping() {
        assert!(InMemoryCatalog::new().unreachable().ping().await.is_err());
        assert!(InMemoryCatalog::new().ping().await.is_ok());
    }
}

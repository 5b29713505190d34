//! MongoDB-backed [`Catalog`].

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use mongodb::bson::{doc, Document};
use mongodb::options::ClientOptions;
use mongodb::Client;

use crate::catalog::Catalog;

pub struct MongoCatalog {
    client: Client,
}

impl MongoCatalog {
    /// Parses `uri` and builds a client. No network round-trip happens until
    /// the first command, so callers must [`ping`](Catalog::ping) before use.
    pub async fn connect(uri: &str, selection_timeout: Duration) -> Result<Self> {
        let mut options = ClientOptions::parse(uri)
            .await
            .with_context(|| format!("invalid connection string: {}", uri))?;
        options.server_selection_timeout = Some(selection_timeout);
        options.app_name = Some(env!("CARGO_PKG_NAME").to_string());

        let client = Client::with_options(options)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Catalog for MongoCatalog {
    async fn ping(&self) -> Result<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }

    async fn list_namespaces(&self) -> Result<Vec<String>> {
        Ok(self.client.list_database_names().await?)
    }

    async fn list_collections(&self, namespace: &str) -> Result<Vec<String>> {
        Ok(self
            .client
            .database(namespace)
            .list_collection_names()
            .await?)
    }

    async fn count_documents(&self, namespace: &str, collection: &str) -> Result<u64> {
        Ok(self
            .client
            .database(namespace)
            .collection::<Document>(collection)
            .count_documents(doc! {})
            .await?)
    }

    async fn drop_namespace(&self, namespace: &str) -> Result<()> {
        self.client.database(namespace).drop().await?;
        Ok(())
    }
}

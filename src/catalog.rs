//! Catalog browsing over an abstract document store.
//!
//! The [`Catalog`] trait is the seam between the cleanup workflow and the
//! database driver. [`MongoCatalog`](crate::store_mongo::MongoCatalog) talks
//! to a live deployment; [`InMemoryCatalog`](crate::store_memory::InMemoryCatalog)
//! backs tests.
//!
//! Nothing here caches. Every helper re-queries the store, so a database
//! dropped a moment ago is gone from the next listing.
//!
//! # Operations
//!
//! | Method | Purpose |
//! |--------|---------|
//! | [`ping`](Catalog::ping) | Liveness check |
//! | [`list_namespaces`](Catalog::list_namespaces) | All database names, reserved ones included |
//! | [`list_collections`](Catalog::list_collections) | Collection names in one database |
//! | [`count_documents`](Catalog::count_documents) | Document count of one collection |
//! | [`drop_namespace`](Catalog::drop_namespace) | Irreversibly drop a database |

use anyhow::Result;
use async_trait::async_trait;

use crate::models::CollectionInfo;

#[async_trait]
pub trait Catalog: Send + Sync {
    async fn ping(&self) -> Result<()>;

    async fn list_namespaces(&self) -> Result<Vec<String>>;

    async fn list_collections(&self, namespace: &str) -> Result<Vec<String>>;

    async fn count_documents(&self, namespace: &str, collection: &str) -> Result<u64>;

    /// Drops the database and every collection in it.
    async fn drop_namespace(&self, namespace: &str) -> Result<()>;
}

/// Result of inspecting one database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Browse {
    /// The database exists but holds no collections.
    Empty,
    Collections(Vec<CollectionInfo>),
}

/// Database names with the reserved ones filtered out, in store order.
pub async fn visible_namespaces(catalog: &dyn Catalog, reserved: &[String]) -> Result<Vec<String>> {
    let names = catalog.list_namespaces().await?;
    Ok(names
        .into_iter()
        .filter(|n| !reserved.iter().any(|r| r == n))
        .collect())
}

/// Exact, case-sensitive membership in the unfiltered live listing.
pub async fn namespace_exists(catalog: &dyn Catalog, namespace: &str) -> Result<bool> {
    let names = catalog.list_namespaces().await?;
    Ok(names.iter().any(|n| n == namespace))
}

/// Lists the collections in `namespace` with a live count for each.
pub async fn browse_namespace(catalog: &dyn Catalog, namespace: &str) -> Result<Browse> {
    let names = catalog.list_collections(namespace).await?;
    if names.is_empty() {
        return Ok(Browse::Empty);
    }

    let mut collections = Vec::with_capacity(names.len());
    for name in names {
        let count = catalog.count_documents(namespace, &name).await?;
        collections.push(CollectionInfo { name, count });
    }
    Ok(Browse::Collections(collections))
}

pub fn render_namespaces(names: &[String]) -> String {
    let mut out = String::from("\nAvailable databases:\n");
    for name in names {
        out.push_str(&format!("- {}\n", name));
    }
    out
}

pub fn render_browse(namespace: &str, browse: &Browse) -> String {
    match browse {
        Browse::Empty => format!("No collections found in database '{}'\n", namespace),
        Browse::Collections(collections) => {
            let mut out = format!("\nCollections in database '{}':\n", namespace);
            for c in collections {
                out.push_str(&format!("- {} ({} documents)\n", c.name, c.count));
            }
            out
        }
    }
}

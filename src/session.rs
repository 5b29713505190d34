//! Connection setup for the cleanup tool.
//!
//! The user is asked for a connection string; a blank answer uses the
//! configured default. The resulting catalog is pinged before it is handed
//! back, and any failure comes back as [`TidyError::Connectivity`], which
//! the binary treats as fatal.

use std::future::Future;
use std::time::Duration;

use crate::catalog::Catalog;
use crate::config::StoreConfig;
use crate::error::TidyError;
use crate::prompt::Prompter;
use crate::store_mongo::MongoCatalog;

/// The answer to the connection prompt, or `default` when it is blank.
pub fn resolve_uri(answer: Option<String>, default: &str) -> String {
    match answer {
        Some(a) if !a.trim().is_empty() => a.trim().to_string(),
        _ => default.to_string(),
    }
}

/// Prompts for an address, builds a catalog with `open`, and pings it.
pub async fn establish<C, F, Fut>(
    prompter: &mut dyn Prompter,
    default_uri: &str,
    open: F,
) -> Result<C, TidyError>
where
    C: Catalog,
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = anyhow::Result<C>>,
{
    let answer = prompter.ask(&format!(
        "Enter your MongoDB connection string (default: {}): ",
        default_uri
    ))?;
    let uri = resolve_uri(answer, default_uri);
    tracing::debug!(%uri, "connecting");

    let connectivity = |e: anyhow::Error| TidyError::Connectivity {
        uri: uri.clone(),
        cause: format!("{:#}", e),
    };

    let catalog = open(uri.clone()).await.map_err(connectivity)?;
    catalog.ping().await.map_err(connectivity)?;

    prompter.say("Connected successfully to MongoDB!\n")?;
    tracing::info!(%uri, "connected");
    Ok(catalog)
}

/// [`establish`] against a live MongoDB deployment.
pub async fn connect_mongo(
    config: &StoreConfig,
    prompter: &mut dyn Prompter,
) -> Result<MongoCatalog, TidyError> {
    let timeout = Duration::from_secs(config.server_selection_timeout_secs);
    establish(prompter, &config.default_uri, |uri| async move {
        MongoCatalog::connect(&uri, timeout).await
    })
    .await
}

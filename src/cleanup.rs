//! The interactive cleanup loop (`tidy cleanup`).
//!
//! After the session is established the loop lists visible databases, then
//! repeatedly asks for a database name. A known name gets its collections
//! listed and goes through the [`guard`](crate::guard). `q` (any case) or
//! end of input ends the loop. Every failure inside an iteration is printed
//! and the loop continues.

use anyhow::Result;

use crate::catalog::{self, Catalog};
use crate::error::TidyError;
use crate::guard::{self, GuardOutcome};
use crate::prompt::Prompter;

pub const TITLE: &str = "MongoDB Database Cleanup Tool";

const QUIT: &str = "q";

/// What happened during one cleanup session.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanupSummary {
    pub dropped: Vec<String>,
    pub cancelled: usize,
    pub failed: usize,
    pub not_found: usize,
}

pub fn print_banner(prompter: &mut dyn Prompter) -> Result<()> {
    prompter.say(&format!("{}\n{}\n", TITLE, "=".repeat(TITLE.len())))?;
    Ok(())
}

/// Runs the prompt loop until the user quits.
///
/// `Err` means the terminal itself failed; store errors are reported to the
/// user and never end the loop.
pub async fn run_cleanup(
    catalog: &dyn Catalog,
    prompter: &mut dyn Prompter,
    reserved: &[String],
) -> Result<CleanupSummary> {
    let mut summary = CleanupSummary::default();

    match catalog::visible_namespaces(catalog, reserved).await {
        Ok(names) => prompter.say(&format!("{}\n", catalog::render_namespaces(&names)))?,
        Err(e) => prompter.say(&format!("Error listing databases: {:#}\n\n", e))?,
    }

    loop {
        let Some(name) = prompter.ask("Enter the name of the database to examine (or 'q' to quit): ")?
        else {
            break;
        };
        if name.to_lowercase() == QUIT {
            break;
        }

        if let Err(e) = examine(catalog, prompter, &name, &mut summary).await {
            match e {
                TidyError::Io(io) => return Err(io.into()),
                other => prompter.say(&format!("{}\n", other))?,
            }
        }
    }

    prompter.say(&format!("\nThank you for using the {}!\n", TITLE))?;
    tracing::info!(
        dropped = summary.dropped.len(),
        cancelled = summary.cancelled,
        failed = summary.failed,
        "cleanup session finished"
    );
    Ok(summary)
}

/// One loop iteration: existence check, listing, then the guard.
async fn examine(
    catalog: &dyn Catalog,
    prompter: &mut dyn Prompter,
    name: &str,
    summary: &mut CleanupSummary,
) -> Result<(), TidyError> {
    let query_error = |e: anyhow::Error| TidyError::Query {
        namespace: name.to_string(),
        cause: format!("{:#}", e),
    };

    if !catalog::namespace_exists(catalog, name)
        .await
        .map_err(query_error)?
    {
        summary.not_found += 1;
        return Err(TidyError::NotFound(name.to_string()));
    }

    let browse = catalog::browse_namespace(catalog, name)
        .await
        .map_err(query_error)?;
    prompter.say(&format!("{}\n", catalog::render_browse(name, &browse)))?;

    let outcome = guard::run_guard(catalog, prompter, name)
        .await
        .map_err(|e| match e.downcast::<std::io::Error>() {
            Ok(io) => TidyError::Io(io),
            Err(other) => query_error(other),
        })?;

    match &outcome {
        GuardOutcome::Dropped => summary.dropped.push(name.to_string()),
        GuardOutcome::Cancelled(_) => summary.cancelled += 1,
        GuardOutcome::Failed(_) => summary.failed += 1,
    }
    prompter.say(&format!("{}\n", outcome.message(name)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::LinePrompter;
    use crate::store_memory::InMemoryCatalog;

    fn reserved() -> Vec<String> {
        vec!["admin".into(), "config".into(), "local".into()]
    }

    fn shop_and_test() -> InMemoryCatalog {
        InMemoryCatalog::new()
            .with_namespace("admin", &[("system.version", 1)])
            .with_namespace("shop", &[("orders", 3), ("products", 12)])
            .with_namespace("test", &[("scratch", 0)])
    }

    async fn session(catalog: &InMemoryCatalog, input: &'static str) -> (CleanupSummary, String) {
        let mut prompter = LinePrompter::new(input.as_bytes(), Vec::new());
        let summary = run_cleanup(catalog, &mut prompter, &reserved())
            .await
            .unwrap();
        (summary, String::from_utf8(prompter.into_writer()).unwrap())
    }

    #[tokio::test]
    async fn exact_confirmation_drops_database() {
        let catalog = shop_and_test();
        let (summary, out) = session(&catalog, "shop\nyes\nshop\nq\n").await;

        assert_eq!(summary.dropped, vec!["shop"]);
        assert!(out.contains("- orders (3 documents)"));
        assert!(out.contains("Database 'shop' has been dropped successfully!"));
        assert!(out.contains("Thank you for using the MongoDB Database Cleanup Tool!"));

        let visible = catalog::visible_namespaces(&catalog, &reserved()).await.unwrap();
        assert_eq!(visible, vec!["test"]);
    }

    #[tokio::test]
    async fn case_mismatch_keeps_database() {
        let catalog = shop_and_test();
        let (summary, out) = session(&catalog, "shop\nyes\nShop\nq\n").await;

        assert!(summary.dropped.is_empty());
        assert_eq!(summary.cancelled, 1);
        assert!(out.contains("Database name did not match. Operation cancelled."));
        assert!(catalog::namespace_exists(&catalog, "shop").await.unwrap());
        assert!(catalog.drop_requests().is_empty());
    }

    #[tokio::test]
    async fn unknown_database_never_prompts() {
        let catalog = shop_and_test();
        let (summary, out) = session(&catalog, "nope\nq\n").await;

        assert_eq!(summary.not_found, 1);
        assert!(out.contains("Database 'nope' does not exist."));
        assert!(!out.contains("DROP"));
        assert!(catalog.drop_requests().is_empty());
    }

    #[tokio::test]
    async fn authorization_does_not_carry_over() {
        let catalog = shop_and_test();
        // First attempt authorizes and drops `shop`; second names `test` and
        // only answers the intent prompt before the input ends.
        let (summary, _) = session(&catalog, "shop\nyes\nshop\ntest\nyes\n").await;

        assert_eq!(summary.dropped, vec!["shop"]);
        assert_eq!(catalog.drop_requests(), vec!["shop"]);
        assert!(catalog::namespace_exists(&catalog, "test").await.unwrap());
    }

    #[tokio::test]
    async fn dropped_database_is_gone_on_next_attempt() {
        let catalog = shop_and_test();
        let (summary, out) = session(&catalog, "shop\nyes\nshop\nshop\nq\n").await;

        assert_eq!(summary.dropped, vec!["shop"]);
        assert_eq!(summary.not_found, 1);
        assert!(out.contains("Database 'shop' does not exist."));
    }

    #[tokio::test]
    async fn drop_failure_keeps_loop_running() {
        let catalog = shop_and_test().fail_drops_of("shop");
        let (summary, out) = session(&catalog, "shop\nyes\nshop\ntest\nno\nQ\n").await;

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.cancelled, 1);
        assert!(out.contains("Error dropping database 'shop':"));
        assert!(out.contains("Operation cancelled."));
        assert!(out.contains("Thank you for using"));
    }

    #[tokio::test]
    async fn listing_hides_reserved() {
        let catalog = shop_and_test();
        let (_, out) = session(&catalog, "q\n").await;

        assert!(out.contains("Available databases:\n- shop\n- test\n"));
        assert!(!out.contains("- admin"));
    }

    #[tokio::test]
    async fn empty_database_listed_distinctly() {
        let catalog = InMemoryCatalog::new().with_namespace("empty", &[]);
        let (_, out) = session(&catalog, "empty\nno\nq\n").await;

        assert!(out.contains("No collections found in database 'empty'"));
        assert!(out.contains("Operation cancelled."));
    }

    #[tokio::test]
    async fn listing_failure_is_reported_and_loop_continues() {
        let catalog = shop_and_test().fail_listing();
        let (summary, out) = session(&catalog, "shop\nq\n").await;

        assert!(out.contains("Error listing databases: listDatabases failed"));
        assert!(out.contains("Error querying database 'shop': listDatabases failed"));
        assert!(out.contains("Thank you for using"));
        assert_eq!(summary, CleanupSummary::default());
        assert!(catalog.drop_requests().is_empty());
    }

    #[tokio::test]
    async fn count_failure_skips_guard_and_loop_continues() {
        let catalog = shop_and_test().fail_counts_in("shop");
        let (summary, out) = session(&catalog, "shop\ntest\nyes\ntest\nq\n").await;

        assert!(out.contains("Error querying database 'shop': count on 'shop.orders' interrupted"));
        assert_eq!(summary.dropped, vec!["test"]);
        assert_eq!(catalog.drop_requests(), vec!["test"]);
    }
}

//! # store-tidy
//!
//! Two small tools behind one binary (`tidy`):
//!
//! - **Cleanup** (`tidy cleanup`): connect to a MongoDB deployment, list its
//!   databases and collections, and drop a database after a two-step
//!   confirmation.
//! - **Viewer** (`tidy view`, `tidy serve`): read selected files or a whole
//!   folder and present their text as one document for copying or download,
//!   on the terminal, as an HTML file, or in the browser.
//!
//! ## Architecture
//!
//! ```text
//! cleanup:  session ──▶ catalog ──▶ guard ──▶ Catalog::drop_namespace
//!                          ▲
//!              MongoCatalog / InMemoryCatalog
//!
//! viewer:   ingest ──▶ FileBatch ──▶ present ──▶ stdout / file / HTTP
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration with built-in defaults |
//! | [`error`] | Error taxonomy |
//! | [`models`] | Collections, file records, batches, sentinels |
//! | [`catalog`] | `Catalog` trait and listing helpers |
//! | [`store_mongo`] | MongoDB catalog |
//! | [`store_memory`] | In-memory catalog |
//! | [`session`] | Connection prompt and liveness check |
//! | [`guard`] | Confirmation state machine in front of drops |
//! | [`cleanup`] | Interactive cleanup loop |
//! | [`prompt`] | Line-oriented prompting |
//! | [`ingest`] | File and folder ingestion |
//! | [`progress`] | Ingestion progress reporting |
//! | [`present`] | Combined document, download link, HTML |
//! | [`view`] | `tidy view` command |
//! | [`server`] | Browser viewer over HTTP |
//! | [`logging`] | `tracing` subscriber setup |

pub mod catalog;
pub mod cleanup;
pub mod config;
pub mod error;
pub mod guard;
pub mod ingest;
pub mod logging;
pub mod models;
pub mod present;
pub mod progress;
pub mod prompt;
pub mod server;
pub mod session;
pub mod store_memory;
pub mod store_mongo;
pub mod view;

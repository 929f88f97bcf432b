//! # indexping-core
//!
//! Core library for indexping - an IndexNow change notifier.
//!
//! This library provides:
//! - Key provisioning and validation
//! - Event qualification for content saves and trashes
//! - URL collection, payload building and submission
//! - One-shot error reporting for operators
//! - Option storage with SQLite, configuration and logging
//!
//! ## Architecture
//!
//! A content event flows through four steps:
//! - **Qualify:** the [`Notifier`] drops local sites, revisions, unpublished
//!   items and unsupported types
//! - **Collect:** the [`UrlCollector`] gathers the item's address and its term
//!   listing addresses
//! - **Build:** [`build_payload`] pairs the URLs with the site host and key
//! - **Submit:** the [`Submitter`] POSTs the payload once and records failures
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use indexping_core::{
//!     key, Config, ContentItem, ContentSaved, Notifier, Origin, PostStatus, SqliteStore,
//!     StaticContentStore,
//! };
//!
//! # async fn run() -> indexping_core::Result<()> {
//! let config = Config::load()?;
//! let store = Arc::new(SqliteStore::open(&Config::store_path())?);
//! key::provision(store.as_ref())?;
//!
//! let content = Arc::new(StaticContentStore::new());
//! let notifier = Notifier::new(&config, store, content)?;
//!
//! let item = ContentItem::new(42, "post", PostStatus::Publish);
//! let event = ContentSaved { id: 42, item, update: false };
//! let outcome = notifier.on_content_saved(&event, Origin::Admin).await;
//! println!("{:?}", outcome);
//! # Ok(())
//! # }
//! ```

// Re-export commonly used items at the crate root
pub use client::{IndexNowClient, KeyFileStatus};
pub use collector::{UrlCollector, UrlSet};
pub use config::Config;
pub use content::{ContentId, ContentItem, ContentKind, ContentStore, PostStatus, StaticContentStore, Term};
pub use error::{Error, Result};
pub use hooks::{Hooks, NoopHooks, RequestOptions};
pub use notify::{
    ContentSaved, ContentTrashed, Notifier, Origin, Outcome, SkipReason, Submitter, SyncNotifier,
};
pub use payload::{build_payload, SubmissionPayload};
pub use report::{ErrorReporter, LastError};
pub use site::Site;
pub use store::{MemoryStore, OptionStore, SqliteStore};

// Public modules
pub mod client;
pub mod collector;
pub mod config;
pub mod content;
pub mod error;
pub mod hooks;
pub mod key;
pub mod logging;
pub mod notify;
pub mod payload;
pub mod report;
pub mod site;
pub mod store;

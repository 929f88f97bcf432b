//! Event handling and submission
//!
//! The host system reports content changes as [`ContentSaved`] and
//! [`ContentTrashed`] events. The [`Notifier`] decides whether an event
//! qualifies, collects the affected URLs and hands them to the [`Submitter`].
//!
//! ## Delivery
//!
//! Notification never fails the content operation that triggered it: every
//! entry point returns an [`Outcome`] instead of an error. Three ways to run the
//! pipeline:
//! - `on_content_saved` / `on_content_trashed` await delivery, bounded by the
//!   request timeout
//! - `dispatch_saved` / `dispatch_trashed` spawn the pipeline onto the current
//!   tokio runtime and return at once
//! - [`SyncNotifier`] blocks on a private runtime for hosts without one

mod notifier;
mod submitter;

pub use notifier::{Notifier, SyncNotifier};
pub use submitter::Submitter;

use crate::content::{ContentId, ContentItem};

/// A content item was created or updated
#[derive(Debug, Clone)]
pub struct ContentSaved {
    pub id: ContentId,
    /// Snapshot after the save
    pub item: ContentItem,
    /// False for the first save of a new item
    pub update: bool,
}

/// A content item was moved to the trash
#[derive(Debug, Clone, Copy)]
pub struct ContentTrashed {
    pub id: ContentId,
}

/// Where the triggering operation came from
///
/// Failures are only recorded for operators when the change was made from the
/// administrative interface, where the record will later be displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Admin,
    Public,
}

/// Why an event produced no submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// A hook declined the notification
    Vetoed,
    /// The site is not publicly reachable
    LocalSite,
    /// Revision or autosave snapshot
    Revision,
    /// The item is not published
    NotPublished,
    /// The content type is not announced
    UnsupportedType(String),
    /// The content store does not know the item
    NotFound(ContentId),
    /// No identification key is configured
    MissingKey,
    /// No URL was left to submit
    NoUrls,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vetoed => write!(f, "vetoed by hook"),
            Self::LocalSite => write!(f, "site is local"),
            Self::Revision => write!(f, "revision or autosave"),
            Self::NotPublished => write!(f, "not published"),
            Self::UnsupportedType(t) => write!(f, "unsupported content type {}", t),
            Self::NotFound(id) => write!(f, "item {} not found", id),
            Self::MissingKey => write!(f, "no key configured"),
            Self::NoUrls => write!(f, "no URLs to submit"),
        }
    }
}

/// Result of running the pipeline for one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing was sent
    Skipped(SkipReason),
    /// The endpoint accepted the submission
    Accepted { status: u16, urls: usize },
    /// Delivery failed; `message` is what operators see
    Failed { message: String },
}

impl Outcome {
    /// Whether a request was made
    pub fn was_sent(&self) -> bool {
        !matches!(self, Self::Skipped(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_was_sent() {
        assert!(!Outcome::Skipped(SkipReason::NoUrls).was_sent());
        assert!(Outcome::Accepted { status: 200, urls: 1 }.was_sent());
        assert!(Outcome::Failed {
            message: "boom".to_string()
        }
        .was_sent());
    }

    #[test]
    fn test_skip_reason_display() {
        assert_eq!(
            SkipReason::UnsupportedType("attachment".to_string()).to_string(),
            "unsupported content type attachment"
        );
        assert_eq!(SkipReason::NotFound(42).to_string(), "item 42 not found");
    }
}

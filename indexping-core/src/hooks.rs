//! Extension points
//!
//! Every method has an identity or no-op default, so implementors only
//! override what they need. Hooks are injected once when the notifier is built
//! and may be called from a spawned task, hence `Send + Sync`.

use crate::content::ContentItem;
use crate::error::Error;
use crate::payload::SubmissionPayload;
use std::time::Duration;

/// Outbound request parameters that hooks may adjust
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    /// Per-request timeout
    pub timeout: Duration,
    /// Extra headers added to the request
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            headers: Vec::new(),
        }
    }
}

/// Hooks into the notification pipeline
#[allow(unused_variables)]
pub trait Hooks: Send + Sync {
    /// Veto a notification for a saved item
    fn should_ping_on_save(&self, item: &ContentItem, update: bool) -> bool {
        true
    }

    /// Veto a notification for a trashed item
    fn should_ping_on_trash(&self, item: &ContentItem) -> bool {
        true
    }

    /// Adjust the content types that trigger notifications
    fn supported_types(&self, types: Vec<String>) -> Vec<String> {
        types
    }

    /// Adjust the taxonomies whose listing pages are announced for an item
    fn taxonomies(&self, item: &ContentItem, taxonomies: Vec<String>) -> Vec<String> {
        taxonomies
    }

    /// Add, remove or replace collected URLs
    fn filter_urls(&self, item: &ContentItem, urls: Vec<String>) -> Vec<String> {
        urls
    }

    /// Adjust the URL list right before the payload is built
    fn before_build(&self, urls: Vec<String>) -> Vec<String> {
        urls
    }

    /// Override the key file location; `None` or an empty string omits it
    fn key_location(&self, location: Option<String>) -> Option<String> {
        location
    }

    /// Override the submission endpoint
    fn endpoint(&self, endpoint: String) -> String {
        endpoint
    }

    /// Override outbound request parameters
    fn request_options(&self, options: RequestOptions) -> RequestOptions {
        options
    }

    /// Observe the payload right before it is sent
    fn before_send(&self, payload: &SubmissionPayload, endpoint: &str) {}

    /// Observe an accepted submission
    fn on_success(&self, payload: &SubmissionPayload, status: u16) {}

    /// Observe a failed submission
    fn on_failure(&self, payload: &SubmissionPayload, error: &Error) {}
}

/// Hooks that change nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

impl Hooks for NoopHooks {}

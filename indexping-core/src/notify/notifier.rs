//! Event qualification and the notification pipeline

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::collector::{UrlCollector, UrlSet};
use crate::config::Config;
use crate::content::{ContentItem, ContentStore, PostStatus};
use crate::error::{Error, Result};
use crate::hooks::{Hooks, NoopHooks};
use crate::site::Site;
use crate::store::OptionStore;

use super::submitter::Submitter;
use super::{ContentSaved, ContentTrashed, Origin, Outcome, SkipReason};

/// Turns content events into IndexNow submissions
pub struct Notifier {
    submitter: Submitter,
    content: Arc<dyn ContentStore>,
    collector: UrlCollector,
    supported_types: Vec<String>,
    hooks: Arc<dyn Hooks>,
}

impl Notifier {
    /// Create a notifier with no hooks
    ///
    /// Fails when `site.url` is missing or invalid.
    pub fn new(
        config: &Config,
        store: Arc<dyn OptionStore>,
        content: Arc<dyn ContentStore>,
    ) -> Result<Self> {
        Self::with_hooks(config, store, content, Arc::new(NoopHooks))
    }

    /// Create a notifier with custom hooks
    pub fn with_hooks(
        config: &Config,
        store: Arc<dyn OptionStore>,
        content: Arc<dyn ContentStore>,
        hooks: Arc<dyn Hooks>,
    ) -> Result<Self> {
        config.validate()?;
        let site = Site::parse(config.site_url()?)?;
        let submitter = Submitter::new(site, &config.indexnow, store, hooks.clone())?;

        Ok(Self {
            submitter,
            content,
            collector: UrlCollector::from_config(&config.content),
            supported_types: config.content.supported_types.clone(),
            hooks,
        })
    }

    pub fn site(&self) -> &Site {
        self.submitter.site()
    }

    pub fn submitter(&self) -> &Submitter {
        &self.submitter
    }

    /// Content types that trigger notifications, after hooks
    pub fn supported_types(&self) -> Vec<String> {
        self.hooks.supported_types(self.supported_types.clone())
    }

    fn is_supported(&self, content_type: &str) -> bool {
        self.supported_types().iter().any(|t| t == content_type)
    }

    /// Decide whether a save should be announced
    pub fn qualify_saved(&self, event: &ContentSaved) -> std::result::Result<(), SkipReason> {
        let item = &event.item;
        if !self.hooks.should_ping_on_save(item, event.update) {
            return Err(SkipReason::Vetoed);
        }
        if self.site().is_local() {
            return Err(SkipReason::LocalSite);
        }
        if item.is_revision_or_autosave() {
            return Err(SkipReason::Revision);
        }
        if item.status != PostStatus::Publish {
            return Err(SkipReason::NotPublished);
        }
        if !self.is_supported(&item.content_type) {
            return Err(SkipReason::UnsupportedType(item.content_type.clone()));
        }
        Ok(())
    }

    /// Decide whether trashing `item` should be announced
    ///
    /// Status and revision checks do not apply: a trashed item's URLs are
    /// resubmitted so the endpoint learns they are gone.
    pub fn qualify_trashed(&self, item: &ContentItem) -> std::result::Result<(), SkipReason> {
        if !self.hooks.should_ping_on_trash(item) {
            return Err(SkipReason::Vetoed);
        }
        if self.site().is_local() {
            return Err(SkipReason::LocalSite);
        }
        if !self.is_supported(&item.content_type) {
            return Err(SkipReason::UnsupportedType(item.content_type.clone()));
        }
        Ok(())
    }

    /// URLs affected by a change to `item`
    pub fn collect(&self, item: &ContentItem) -> UrlSet {
        self.collector
            .collect(item, self.content.as_ref(), self.hooks.as_ref())
    }

    /// Handle a save and wait for delivery
    pub async fn on_content_saved(&self, event: &ContentSaved, origin: Origin) -> Outcome {
        if let Err(reason) = self.qualify_saved(event) {
            tracing::debug!(item = event.id, reason = %reason, "Save not announced");
            return Outcome::Skipped(reason);
        }
        self.collect_and_submit(&event.item, origin).await
    }

    /// Handle a trash and wait for delivery
    pub async fn on_content_trashed(&self, event: &ContentTrashed, origin: Origin) -> Outcome {
        let Some(item) = self.content.item(event.id) else {
            tracing::debug!(item = event.id, "Trashed item not found");
            return Outcome::Skipped(SkipReason::NotFound(event.id));
        };
        if let Err(reason) = self.qualify_trashed(&item) {
            tracing::debug!(item = event.id, reason = %reason, "Trash not announced");
            return Outcome::Skipped(reason);
        }
        self.collect_and_submit(&item, origin).await
    }

    /// Submit arbitrary URLs, still honouring the localhost guard
    pub async fn submit_urls(&self, urls: &[String], origin: Origin) -> Outcome {
        if self.site().is_local() {
            tracing::debug!("Site is local, not submitting");
            return Outcome::Skipped(SkipReason::LocalSite);
        }
        self.submitter.submit(urls, origin).await
    }

    async fn collect_and_submit(&self, item: &ContentItem, origin: Origin) -> Outcome {
        let urls = self.collect(item);
        if urls.is_empty() {
            tracing::debug!(item = item.id, "No URLs collected");
            return Outcome::Skipped(SkipReason::NoUrls);
        }
        self.submitter.submit(urls.as_slice(), origin).await
    }

    /// Handle a save in the background
    ///
    /// Returns `None` when called outside a tokio runtime; the event is then
    /// dropped with a warning.
    pub fn dispatch_saved(
        self: &Arc<Self>,
        event: ContentSaved,
        origin: Origin,
    ) -> Option<JoinHandle<Outcome>> {
        let handle = runtime_handle()?;
        let notifier = Arc::clone(self);
        Some(handle.spawn(async move { notifier.on_content_saved(&event, origin).await }))
    }

    /// Handle a trash in the background
    pub fn dispatch_trashed(
        self: &Arc<Self>,
        event: ContentTrashed,
        origin: Origin,
    ) -> Option<JoinHandle<Outcome>> {
        let handle = runtime_handle()?;
        let notifier = Arc::clone(self);
        Some(handle.spawn(async move { notifier.on_content_trashed(&event, origin).await }))
    }
}

fn runtime_handle() -> Option<tokio::runtime::Handle> {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::warn!(error = %e, "No async runtime available, notification dropped");
            None
        }
    }
}

/// Synchronous wrapper for Notifier
///
/// Provides blocking methods for hosts that do not run an async runtime. The
/// request timeout bounds how long a content operation can be held up.
pub struct SyncNotifier {
    inner: Notifier,
    runtime: tokio::runtime::Runtime,
}

impl SyncNotifier {
    pub fn new(notifier: Notifier) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::Config(format!("failed to create runtime: {}", e)))?;

        Ok(Self {
            inner: notifier,
            runtime,
        })
    }

    pub fn notifier(&self) -> &Notifier {
        &self.inner
    }

    /// Handle a save (blocking)
    pub fn on_content_saved(&self, event: &ContentSaved, origin: Origin) -> Outcome {
        self.runtime
            .block_on(self.inner.on_content_saved(event, origin))
    }

    /// Handle a trash (blocking)
    pub fn on_content_trashed(&self, event: &ContentTrashed, origin: Origin) -> Outcome {
        self.runtime
            .block_on(self.inner.on_content_trashed(event, origin))
    }

    /// Submit arbitrary URLs (blocking)
    pub fn submit_urls(&self, urls: &[String], origin: Origin) -> Outcome {
        self.runtime.block_on(self.inner.submit_urls(urls, origin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentKind, StaticContentStore};
    use crate::store::{MemoryStore, ACTIVE_KEY};

    fn config(site: &str) -> Config {
        let mut config = Config::default();
        config.site.url = Some(site.to_string());
        // Unroutable; these tests never get as far as sending
        config.indexnow.endpoint = "http://127.0.0.1:9/indexnow".to_string();
        config
    }

    fn content() -> Arc<StaticContentStore> {
        let mut store = StaticContentStore::new();
        store
            .insert(ContentItem::new(1, "post", PostStatus::Publish), Some("https://example.com/p/"))
            .insert(ContentItem::new(2, "attachment", PostStatus::Publish), Some("https://example.com/a/"))
            .insert(ContentItem::new(3, "post", PostStatus::Publish), None);
        Arc::new(store)
    }

    fn notifier(site: &str) -> Notifier {
        let store = Arc::new(MemoryStore::new());
        store.set(ACTIVE_KEY, "0123456789abcdef").unwrap();
        Notifier::new(&config(site), store, content()).unwrap()
    }

    fn saved(item: ContentItem) -> ContentSaved {
        ContentSaved {
            id: item.id,
            item,
            update: true,
        }
    }

    #[test]
    fn test_requires_site_url() {
        let result = Notifier::new(
            &Config::default(),
            Arc::new(MemoryStore::new()),
            content(),
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_qualify_saved() {
        let notifier = notifier("https://example.com/");

        let post = ContentItem::new(1, "post", PostStatus::Publish);
        assert_eq!(notifier.qualify_saved(&saved(post.clone())), Ok(()));

        let page = ContentItem::new(4, "page", PostStatus::Publish);
        assert_eq!(notifier.qualify_saved(&saved(page)), Ok(()));

        let draft = ContentItem::new(1, "post", PostStatus::Draft);
        assert_eq!(
            notifier.qualify_saved(&saved(draft)),
            Err(SkipReason::NotPublished)
        );

        let mut revision = post.clone();
        revision.kind = ContentKind::Revision;
        assert_eq!(
            notifier.qualify_saved(&saved(revision)),
            Err(SkipReason::Revision)
        );

        let mut autosave = post;
        autosave.kind = ContentKind::Autosave;
        assert_eq!(
            notifier.qualify_saved(&saved(autosave)),
            Err(SkipReason::Revision)
        );

        let attachment = ContentItem::new(2, "attachment", PostStatus::Publish);
        assert_eq!(
            notifier.qualify_saved(&saved(attachment)),
            Err(SkipReason::UnsupportedType("attachment".to_string()))
        );
    }

    #[test]
    fn test_qualify_trashed_ignores_status() {
        let notifier = notifier("https://example.com/");

        let trashed = ContentItem::new(1, "post", PostStatus::Trash);
        assert_eq!(notifier.qualify_trashed(&trashed), Ok(()));

        let attachment = ContentItem::new(2, "attachment", PostStatus::Trash);
        assert!(notifier.qualify_trashed(&attachment).is_err());
    }

    #[test]
    fn test_local_site_blocks_everything() {
        let notifier = notifier("http://127.0.0.1/");
        let post = ContentItem::new(1, "post", PostStatus::Publish);

        assert_eq!(
            notifier.qualify_saved(&saved(post.clone())),
            Err(SkipReason::LocalSite)
        );
        assert_eq!(notifier.qualify_trashed(&post), Err(SkipReason::LocalSite));
    }

    struct OnlyNewPages;

    impl Hooks for OnlyNewPages {
        fn should_ping_on_save(&self, _item: &ContentItem, update: bool) -> bool {
            !update
        }

        fn should_ping_on_trash(&self, _item: &ContentItem) -> bool {
            false
        }

        fn supported_types(&self, _types: Vec<String>) -> Vec<String> {
            vec!["page".to_string()]
        }
    }

    #[test]
    fn test_hooks_gate_events() {
        let notifier = Notifier::with_hooks(
            &config("http://localhost/"),
            Arc::new(MemoryStore::new()),
            content(),
            Arc::new(OnlyNewPages),
        )
        .unwrap();

        // The veto runs before the localhost guard
        let post = ContentItem::new(1, "post", PostStatus::Publish);
        assert_eq!(notifier.qualify_saved(&saved(post.clone())), Err(SkipReason::Vetoed));
        assert_eq!(notifier.qualify_trashed(&post), Err(SkipReason::Vetoed));
        assert_eq!(notifier.supported_types(), vec!["page"]);
    }

    #[tokio::test]
    async fn test_trashed_unknown_item() {
        let notifier = notifier("https://example.com/");
        let outcome = notifier
            .on_content_trashed(&ContentTrashed { id: 99 }, Origin::Admin)
            .await;
        assert_eq!(outcome, Outcome::Skipped(SkipReason::NotFound(99)));
    }

    #[tokio::test]
    async fn test_saved_without_urls() {
        let notifier = notifier("https://example.com/");
        let item = ContentItem::new(3, "post", PostStatus::Publish);
        let outcome = notifier.on_content_saved(&saved(item), Origin::Admin).await;
        assert_eq!(outcome, Outcome::Skipped(SkipReason::NoUrls));
    }

    #[tokio::test]
    async fn test_submit_urls_local_site() {
        let notifier = notifier("http://localhost:8080/");
        let outcome = notifier
            .submit_urls(&["http://localhost:8080/".to_string()], Origin::Admin)
            .await;
        assert_eq!(outcome, Outcome::Skipped(SkipReason::LocalSite));
    }

    #[test]
    fn test_dispatch_outside_runtime() {
        let notifier = Arc::new(notifier("https://example.com/"));
        let event = saved(ContentItem::new(1, "post", PostStatus::Publish));
        assert!(notifier.dispatch_saved(event, Origin::Admin).is_none());
    }

    #[test]
    fn test_sync_notifier_skips_without_network() {
        let sync = SyncNotifier::new(notifier("https://example.com/")).unwrap();
        let draft = ContentItem::new(1, "post", PostStatus::Draft);
        assert_eq!(
            sync.on_content_saved(&saved(draft), Origin::Admin),
            Outcome::Skipped(SkipReason::NotPublished)
        );
        assert_eq!(
            sync.on_content_trashed(&ContentTrashed { id: 42 }, Origin::Admin),
            Outcome::Skipped(SkipReason::NotFound(42))
        );
    }
}

//! URL collection
//!
//! Derives the addresses affected by a change to one content item: the item's
//! own canonical address followed by the listing pages of its taxonomy terms.

use crate::config::ContentConfig;
use crate::content::{ContentItem, ContentStore};
use crate::hooks::Hooks;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Ordered set of absolute addresses
///
/// Empty strings are dropped and duplicates (exact, case-sensitive match) keep
/// their first position.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct UrlSet {
    urls: Vec<String>,
    #[serde(skip)]
    seen: HashSet<String>,
}

impl UrlSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an address; returns false if it was empty or already present
    pub fn insert(&mut self, url: impl Into<String>) -> bool {
        let url = url.into();
        if url.trim().is_empty() || self.seen.contains(&url) {
            return false;
        }
        self.seen.insert(url.clone());
        self.urls.push(url);
        true
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.urls
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.urls.iter()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.urls
    }
}

impl PartialEq for UrlSet {
    fn eq(&self, other: &Self) -> bool {
        self.urls == other.urls
    }
}

impl Eq for UrlSet {}

impl<S: Into<String>> FromIterator<S> for UrlSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = UrlSet::new();
        set.extend(iter);
        set
    }
}

impl<S: Into<String>> Extend<S> for UrlSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for url in iter {
            self.insert(url);
        }
    }
}

impl IntoIterator for UrlSet {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.urls.into_iter()
    }
}

/// Collects the URLs to announce for a content item
#[derive(Debug, Clone)]
pub struct UrlCollector {
    /// Taxonomy names per content type
    taxonomies: BTreeMap<String, Vec<String>>,
}

impl Default for UrlCollector {
    fn default() -> Self {
        Self::from_config(&ContentConfig::default())
    }
}

impl UrlCollector {
    pub fn new(taxonomies: BTreeMap<String, Vec<String>>) -> Self {
        Self { taxonomies }
    }

    pub fn from_config(config: &ContentConfig) -> Self {
        Self::new(config.taxonomies.clone())
    }

    /// Configured taxonomies for a content type
    pub fn taxonomies_for(&self, content_type: &str) -> &[String] {
        self.taxonomies
            .get(content_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Collect the URLs affected by a change to `item`
    ///
    /// Term lookups that fail are skipped; the result may be empty.
    pub fn collect(
        &self,
        item: &ContentItem,
        content: &dyn ContentStore,
        hooks: &dyn Hooks,
    ) -> UrlSet {
        let mut urls = UrlSet::new();

        if let Some(permalink) = content.permalink(item) {
            urls.insert(permalink);
        }

        let taxonomies = hooks.taxonomies(item, self.taxonomies_for(&item.content_type).to_vec());
        for taxonomy in &taxonomies {
            let terms = match content.terms(item, taxonomy) {
                Ok(terms) => terms,
                Err(e) => {
                    tracing::debug!(item = item.id, taxonomy = %taxonomy, error = %e, "Skipping taxonomy");
                    continue;
                }
            };

            for term in &terms {
                match content.term_link(term) {
                    Ok(link) => {
                        urls.insert(link);
                    }
                    Err(e) => {
                        tracing::debug!(item = item.id, term = %term.slug, error = %e, "Skipping term");
                    }
                }
            }
        }

        let filtered: UrlSet = hooks.filter_urls(item, urls.into_vec()).into_iter().collect();
        tracing::debug!(item = item.id, count = filtered.len(), "Collected URLs");
        filtered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{PostStatus, StaticContentStore, Term};
    use crate::error::{Error, Result};
    use crate::hooks::NoopHooks;

    fn hello_world_store() -> StaticContentStore {
        let mut store = StaticContentStore::new();
        store
            .insert(
                ContentItem::new(1, "post", PostStatus::Publish),
                Some("https://example.com/hello-world/"),
            )
            .attach(1, "post_tag", "news")
            .attach(1, "post_tag", "tech")
            .term_url("post_tag", "news", "https://example.com/tag/news/")
            .term_url("post_tag", "tech", "https://example.com/tag/tech/");
        store
    }

    #[test]
    fn test_url_set_equality_is_by_order() {
        let a: UrlSet = ["https://example.com/a/", "https://example.com/b/"].into_iter().collect();
        let b: UrlSet = ["https://example.com/a/", "", "https://example.com/b/", "https://example.com/a/"]
            .into_iter()
            .collect();
        let reversed: UrlSet = ["https://example.com/b/", "https://example.com/a/"].into_iter().collect();

        assert_eq!(a, b);
        assert_ne!(a, reversed);
    }

    #[test]
    fn test_url_set_dedup_and_order() {
        let mut set = UrlSet::new();
        assert!(set.insert("https://a.example/"));
        assert!(set.insert("https://b.example/"));
        assert!(!set.insert("https://a.example/"));
        assert!(!set.insert(""));
        assert!(!set.insert("   "));
        // Case-sensitive
        assert!(set.insert("https://A.example/"));

        assert_eq!(
            set.as_slice(),
            ["https://a.example/", "https://b.example/", "https://A.example/"]
        );
    }

    #[test]
    fn test_collect_post_with_tags() {
        let store = hello_world_store();
        let item = store.item(1).unwrap();

        let urls = UrlCollector::default().collect(&item, &store, &NoopHooks);
        assert_eq!(
            urls.into_vec(),
            vec![
                "https://example.com/hello-world/",
                "https://example.com/tag/news/",
                "https://example.com/tag/tech/",
            ]
        );
    }

    #[test]
    fn test_collect_dedups_across_taxonomies() {
        let mut store = hello_world_store();
        store
            .attach(1, "category", "news")
            .attach(1, "category", "misc")
            .term_url("category", "news", "https://example.com/tag/news/")
            .term_url("category", "misc", "https://example.com/hello-world/");
        let item = store.item(1).unwrap();

        let urls = UrlCollector::default().collect(&item, &store, &NoopHooks);
        assert_eq!(urls.len(), 3);
        assert_eq!(urls.as_slice()[0], "https://example.com/hello-world/");
        assert_eq!(
            urls.iter()
                .filter(|u| *u == "https://example.com/hello-world/")
                .count(),
            1
        );
    }

    #[test]
    fn test_collect_skips_failed_term_lookups() {
        let mut store = hello_world_store();
        store.attach(1, "post_tag", "orphan");
        let item = store.item(1).unwrap();

        let urls = UrlCollector::default().collect(&item, &store, &NoopHooks);
        assert_eq!(urls.len(), 3);
    }

    #[test]
    fn test_collect_unmapped_type_only_permalink() {
        let mut store = StaticContentStore::new();
        store
            .insert(ContentItem::new(5, "page", PostStatus::Publish), Some("https://example.com/about/"))
            .attach(5, "post_tag", "news")
            .term_url("post_tag", "news", "https://example.com/tag/news/");
        let item = store.item(5).unwrap();

        let urls = UrlCollector::default().collect(&item, &store, &NoopHooks);
        assert_eq!(urls.into_vec(), vec!["https://example.com/about/"]);
    }

    #[test]
    fn test_collect_without_permalink() {
        let mut store = StaticContentStore::new();
        store.insert(ContentItem::new(9, "post", PostStatus::Publish), None);
        let item = store.item(9).unwrap();

        assert!(UrlCollector::default().collect(&item, &store, &NoopHooks).is_empty());
    }

    struct ErroringTerms;

    impl ContentStore for ErroringTerms {
        fn item(&self, _id: u64) -> Option<ContentItem> {
            None
        }
        fn permalink(&self, _item: &ContentItem) -> Option<String> {
            Some("https://example.com/p/".to_string())
        }
        fn terms(&self, _item: &ContentItem, taxonomy: &str) -> Result<Vec<Term>> {
            Err(Error::Content(format!("{} unavailable", taxonomy)))
        }
        fn term_link(&self, _term: &Term) -> Result<String> {
            unreachable!("no terms are ever returned")
        }
    }

    #[test]
    fn test_collect_survives_taxonomy_errors() {
        let item = ContentItem::new(1, "post", PostStatus::Publish);
        let urls = UrlCollector::default().collect(&item, &ErroringTerms, &NoopHooks);
        assert_eq!(urls.into_vec(), vec!["https://example.com/p/"]);
    }

    struct ExtraUrls;

    impl Hooks for ExtraUrls {
        fn taxonomies(&self, _item: &ContentItem, mut taxonomies: Vec<String>) -> Vec<String> {
            taxonomies.retain(|t| t != "post_tag");
            taxonomies
        }

        fn filter_urls(&self, _item: &ContentItem, mut urls: Vec<String>) -> Vec<String> {
            urls.push("https://example.com/".to_string());
            urls.push("https://example.com/hello-world/".to_string());
            urls.push(String::new());
            urls
        }
    }

    #[test]
    fn test_hooks_adjust_collection() {
        let store = hello_world_store();
        let item = store.item(1).unwrap();

        let urls = UrlCollector::default().collect(&item, &store, &ExtraUrls);
        assert_eq!(
            urls.into_vec(),
            vec!["https://example.com/hello-world/", "https://example.com/"]
        );
    }
}

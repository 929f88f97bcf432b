//! Content model and the content store collaborator
//!
//! Content lives in the host system. The pipeline only reads it through the
//! [`ContentStore`] trait: item snapshots, canonical addresses, taxonomy terms
//! and term listing addresses.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Identifier of a content item in the host system
pub type ContentId = u64;

/// Publication status of a content item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    /// Publicly visible
    Publish,
    Draft,
    Pending,
    Private,
    Future,
    Trash,
    /// Any status this crate does not model
    #[serde(other)]
    Other,
}

/// Whether an item is the real item or a stored copy of it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    #[default]
    Regular,
    /// Saved history entry of another item
    Revision,
    /// Automatic draft save
    Autosave,
}

/// Snapshot of a content item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: ContentId,
    /// Type tag, e.g. `post`, `page`, `product`
    #[serde(rename = "type")]
    pub content_type: String,
    pub status: PostStatus,
    #[serde(default)]
    pub kind: ContentKind,
}

impl ContentItem {
    /// Create a regular item
    pub fn new(id: ContentId, content_type: impl Into<String>, status: PostStatus) -> Self {
        Self {
            id,
            content_type: content_type.into(),
            status,
            kind: ContentKind::Regular,
        }
    }

    /// Whether this snapshot is a revision or autosave rather than the item itself
    pub fn is_revision_or_autosave(&self) -> bool {
        self.kind != ContentKind::Regular
    }
}

/// A taxonomy term attached to an item
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Term {
    pub taxonomy: String,
    pub slug: String,
}

impl Term {
    pub fn new(taxonomy: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            taxonomy: taxonomy.into(),
            slug: slug.into(),
        }
    }
}

/// Read access to the host's content
pub trait ContentStore: Send + Sync {
    /// Current snapshot of an item, `None` if it does not exist
    fn item(&self, id: ContentId) -> Option<ContentItem>;

    /// Canonical address of an item, `None` when it has none
    fn permalink(&self, item: &ContentItem) -> Option<String>;

    /// Terms of `taxonomy` attached to the item
    fn terms(&self, item: &ContentItem, taxonomy: &str) -> Result<Vec<Term>>;

    /// Listing address of a term
    fn term_link(&self, term: &Term) -> Result<String>;
}

/// One item in a content manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestItem {
    #[serde(flatten)]
    pub item: ContentItem,
    #[serde(default)]
    pub permalink: Option<String>,
    /// Term slugs per taxonomy
    #[serde(default)]
    pub terms: BTreeMap<String, Vec<String>>,
}

/// Serialized form of a [`StaticContentStore`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub items: Vec<ManifestItem>,
    /// Listing address per taxonomy, then per slug
    #[serde(default)]
    pub term_links: BTreeMap<String, BTreeMap<String, String>>,
}

/// Content store over a fixed set of items
///
/// Used by the CLI (loaded from a JSON manifest) and by tests.
#[derive(Debug, Default, Clone)]
pub struct StaticContentStore {
    items: HashMap<ContentId, ManifestItem>,
    term_links: BTreeMap<String, BTreeMap<String, String>>,
}

impl StaticContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON manifest from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a JSON manifest
    pub fn from_json(json: &str) -> Result<Self> {
        let manifest: Manifest = serde_json::from_str(json)?;
        Ok(Self::from_manifest(manifest))
    }

    pub fn from_manifest(manifest: Manifest) -> Self {
        Self {
            items: manifest
                .items
                .into_iter()
                .map(|entry| (entry.item.id, entry))
                .collect(),
            term_links: manifest.term_links,
        }
    }

    /// Add or replace an item with its canonical address
    pub fn insert(&mut self, item: ContentItem, permalink: Option<&str>) -> &mut Self {
        self.items.insert(
            item.id,
            ManifestItem {
                item,
                permalink: permalink.map(str::to_string),
                terms: BTreeMap::new(),
            },
        );
        self
    }

    /// Attach a term to an existing item
    pub fn attach(&mut self, id: ContentId, taxonomy: &str, slug: &str) -> &mut Self {
        if let Some(entry) = self.items.get_mut(&id) {
            entry
                .terms
                .entry(taxonomy.to_string())
                .or_default()
                .push(slug.to_string());
        }
        self
    }

    /// Register the listing address of a term
    pub fn term_url(&mut self, taxonomy: &str, slug: &str, url: &str) -> &mut Self {
        self.term_links
            .entry(taxonomy.to_string())
            .or_default()
            .insert(slug.to_string(), url.to_string());
        self
    }

    /// Update an item's status, e.g. when it moves to the trash
    pub fn set_status(&mut self, id: ContentId, status: PostStatus) -> &mut Self {
        if let Some(entry) = self.items.get_mut(&id) {
            entry.item.status = status;
        }
        self
    }
}

impl ContentStore for StaticContentStore {
    fn item(&self, id: ContentId) -> Option<ContentItem> {
        self.items.get(&id).map(|entry| entry.item.clone())
    }

    fn permalink(&self, item: &ContentItem) -> Option<String> {
        self.items
            .get(&item.id)
            .and_then(|entry| entry.permalink.clone())
    }

    fn terms(&self, item: &ContentItem, taxonomy: &str) -> Result<Vec<Term>> {
        let entry = self
            .items
            .get(&item.id)
            .ok_or_else(|| Error::Content(format!("item {} not found", item.id)))?;

        Ok(entry
            .terms
            .get(taxonomy)
            .map(|slugs| slugs.iter().map(|s| Term::new(taxonomy, s.clone())).collect())
            .unwrap_or_default())
    }

    fn term_link(&self, term: &Term) -> Result<String> {
        self.term_links
            .get(&term.taxonomy)
            .and_then(|links| links.get(&term.slug))
            .cloned()
            .ok_or_else(|| {
                Error::Content(format!("no link for term {}/{}", term.taxonomy, term.slug))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manifest() {
        let json = r#"{
            "items": [
                {
                    "id": 7,
                    "type": "post",
                    "status": "publish",
                    "permalink": "https://example.com/hello-world/",
                    "terms": { "post_tag": ["news", "tech"] }
                },
                { "id": 8, "type": "page", "status": "inherit", "kind": "revision" }
            ],
            "term_links": {
                "post_tag": { "news": "https://example.com/tag/news/" }
            }
        }"#;
        let store = StaticContentStore::from_json(json).unwrap();

        let post = store.item(7).unwrap();
        assert_eq!(post.content_type, "post");
        assert_eq!(post.status, PostStatus::Publish);
        assert_eq!(post.kind, ContentKind::Regular);
        assert_eq!(
            store.permalink(&post).as_deref(),
            Some("https://example.com/hello-world/")
        );

        let tags = store.terms(&post, "post_tag").unwrap();
        assert_eq!(tags, vec![Term::new("post_tag", "news"), Term::new("post_tag", "tech")]);
        assert!(store.terms(&post, "category").unwrap().is_empty());

        assert_eq!(store.term_link(&tags[0]).unwrap(), "https://example.com/tag/news/");
        assert!(store.term_link(&tags[1]).is_err());

        let revision = store.item(8).unwrap();
        assert_eq!(revision.status, PostStatus::Other);
        assert!(revision.is_revision_or_autosave());
        assert!(store.permalink(&revision).is_none());
    }

    #[test]
    fn test_builder() {
        let mut store = StaticContentStore::new();
        store
            .insert(ContentItem::new(1, "product", PostStatus::Publish), Some("https://example.com/shop/widget/"))
            .attach(1, "product_cat", "tools")
            .term_url("product_cat", "tools", "https://example.com/shop/tools/")
            .set_status(1, PostStatus::Trash);

        let item = store.item(1).unwrap();
        assert_eq!(item.status, PostStatus::Trash);
        let terms = store.terms(&item, "product_cat").unwrap();
        assert_eq!(store.term_link(&terms[0]).unwrap(), "https://example.com/shop/tools/");
        assert!(store.item(2).is_none());
    }
}

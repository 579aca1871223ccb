//! A catalog held in memory, optionally loaded from a JSON snapshot file.
//!
//! ```json
//! {
//!   "site_url": "https://rusdecor.info",
//!   "categories": [{ "slug": "sofas", "updated_at": "2024-01-15T00:00:00Z" }],
//!   "products": [{ "id": "abc123", "updated_at": "2024-01-16T00:00:00Z", "category_slug": "sofas" }],
//!   "blog_posts": [{ "slug": "hello-world", "published_at": "2024-01-10T00:00:00Z", "is_published": true }]
//! }
//! ```

use std::path::Path;

use async_trait::async_trait;
use data_model_smap::models::{BlogPostEntry, CategoryEntry, ProductEntry};
use serde::{Deserialize, Serialize};

use crate::errors::SourceError;
use crate::source::SitemapSource;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub site_url: Option<String>,
    #[serde(default)]
    pub categories: Vec<CategoryEntry>,
    #[serde(default)]
    pub products: Vec<ProductEntry>,
    #[serde(default)]
    pub blog_posts: Vec<BlogPostEntry>,
}

/// Serves a [`Snapshot`] as a catalog source.
#[derive(Debug, Clone, Default)]
pub struct SnapshotSource {
    snapshot: Snapshot,
}

impl SnapshotSource {
    pub fn new(snapshot: Snapshot) -> Self {
        SnapshotSource { snapshot }
    }

    /// Reads and parses a JSON snapshot file.
    pub async fn from_file(path: &Path) -> Result<Self, SourceError> {
        let content = tokio::fs::read_to_string(path).await?;
        let snapshot: Snapshot = serde_json::from_str(&content)?;
        tracing::debug!(
            "Loaded snapshot '{}': {} categories, {} products, {} blog posts",
            path.display(),
            snapshot.categories.len(),
            snapshot.products.len(),
            snapshot.blog_posts.len()
        );
        Ok(SnapshotSource { snapshot })
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}

#[async_trait]
impl SitemapSource for SnapshotSource {
    async fn fetch_categories(&self) -> Result<Vec<CategoryEntry>, SourceError> {
        Ok(self.snapshot.categories.clone())
    }

    async fn fetch_products(&self) -> Result<Vec<ProductEntry>, SourceError> {
        Ok(self.snapshot.products.clone())
    }

    async fn fetch_blog_posts(&self) -> Result<Vec<BlogPostEntry>, SourceError> {
        Ok(self.snapshot.blog_posts.clone())
    }

    async fn fetch_site_url(&self) -> Result<Option<String>, SourceError> {
        Ok(self.snapshot.site_url.clone())
    }
}

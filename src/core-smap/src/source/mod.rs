pub mod postgres;
pub mod snapshot;

use async_trait::async_trait;
use data_model_smap::models::{BlogPostEntry, CategoryEntry, ProductEntry};

pub use postgres::PgSource;
pub use snapshot::{Snapshot, SnapshotSource};

use crate::errors::SourceError;

/// Read-only access to the catalog collections a sitemap run needs.
///
/// Implementations may return rows in any order; the aggregator orders them.
#[async_trait]
pub trait SitemapSource: Send + Sync {
    async fn fetch_categories(&self) -> Result<Vec<CategoryEntry>, SourceError>;

    /// Every product, with `category_slug` left empty when the category does not resolve.
    async fn fetch_products(&self) -> Result<Vec<ProductEntry>, SourceError>;

    /// Published posts. Unpublished rows that slip through are skipped by the builder.
    async fn fetch_blog_posts(&self) -> Result<Vec<BlogPostEntry>, SourceError>;

    /// The configured public site URL, if one is stored.
    async fn fetch_site_url(&self) -> Result<Option<String>, SourceError>;
}

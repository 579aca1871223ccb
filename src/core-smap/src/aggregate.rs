//! Fetches the catalog collections and partitions them into the four sitemap documents.

use chrono::{DateTime, Utc};

use crate::builder::{DEFAULT_STATIC_PAGES, Entity, SkipReason, StaticPage, build};
use crate::errors::{Collection, Error, Result};
use crate::publish::ArtifactName;
use crate::record::{BaseUrl, Location, SitemapRef, UrlRecord};
use crate::source::SitemapSource;

/// Options for one generation run.
#[derive(Debug, Clone)]
pub struct SitemapOptions {
    /// Fixed pages listed ahead of the categories.
    pub static_pages: Vec<StaticPage>,
    /// Timestamp written into every index entry. Defaults to the moment of aggregation.
    pub generated_at: Option<DateTime<Utc>>,
}

impl Default for SitemapOptions {
    fn default() -> Self {
        Self {
            static_pages: DEFAULT_STATIC_PAGES.to_vec(),
            generated_at: None,
        }
    }
}

impl SitemapOptions {
    /// Creates a new builder for SitemapOptions.
    pub fn builder() -> SitemapOptionsBuilder {
        SitemapOptionsBuilder::default()
    }
}

/// Builder for SitemapOptions.
#[derive(Debug, Clone, Default)]
pub struct SitemapOptionsBuilder {
    static_pages: Option<Vec<StaticPage>>,
    generated_at: Option<DateTime<Utc>>,
}

impl SitemapOptionsBuilder {
    /// Replaces the default static page list.
    pub fn static_pages(mut self, pages: Vec<StaticPage>) -> Self {
        self.static_pages = Some(pages);
        self
    }

    /// Pins the generation timestamp (otherwise taken at aggregation time).
    pub fn generated_at(mut self, at: DateTime<Utc>) -> Self {
        self.generated_at = Some(at);
        self
    }

    /// Builds the SitemapOptions.
    pub fn build(self) -> SitemapOptions {
        SitemapOptions {
            static_pages: self.static_pages.unwrap_or_else(|| DEFAULT_STATIC_PAGES.to_vec()),
            generated_at: self.generated_at,
        }
    }
}

/// The four documents of one run. Built once, never mutated.
#[derive(Debug, Clone)]
pub struct SitemapSet {
    pub base_url: BaseUrl,
    pub generated_at: DateTime<Utc>,
    /// Static pages followed by categories.
    pub categories: Vec<UrlRecord>,
    pub products: Vec<UrlRecord>,
    pub blog: Vec<UrlRecord>,
}

impl SitemapSet {
    /// Exactly three references, ordered categories, products, blog, each stamped with the
    /// generation time.
    pub fn index_refs(&self) -> Result<Vec<SitemapRef>> {
        [ArtifactName::Categories, ArtifactName::Products, ArtifactName::Blog]
            .iter()
            .map(|artifact| {
                Ok(SitemapRef {
                    location: Location::new(self.base_url.join(&format!("/{}", artifact.file_name())))?,
                    last_modified: self.generated_at,
                })
            })
            .collect()
    }

    /// The URL records of a non-index document.
    pub fn records(&self, artifact: ArtifactName) -> Option<&[UrlRecord]> {
        match artifact {
            ArtifactName::Categories => Some(&self.categories),
            ArtifactName::Products => Some(&self.products),
            ArtifactName::Blog => Some(&self.blog),
            ArtifactName::Index => None,
        }
    }
}

/// Entities left out of the run, per document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipCounts {
    pub categories: usize,
    pub products: usize,
    pub blog: usize,
}

impl SkipCounts {
    pub fn total(&self) -> usize {
        self.categories + self.products + self.blog
    }
}

/// A built set plus what was skipped while building it.
#[derive(Debug, Clone)]
pub struct Aggregation {
    pub set: SitemapSet,
    pub skipped: SkipCounts,
}

/// Fetches the three collections concurrently, orders each most recently changed first,
/// and maps them into the sitemap set.
///
/// Any fetch failure fails the whole aggregation.
pub async fn aggregate<S: SitemapSource + ?Sized>(
    source: &S,
    base_url: &BaseUrl,
    options: &SitemapOptions,
) -> Result<Aggregation> {
    let (mut categories, mut products, mut blog_posts) = tokio::try_join!(
        fetch(Collection::Categories, source.fetch_categories()),
        fetch(Collection::Products, source.fetch_products()),
        fetch(Collection::BlogPosts, source.fetch_blog_posts()),
    )?;
    tracing::info!(
        "Fetched {} categories, {} products, {} blog posts",
        categories.len(),
        products.len(),
        blog_posts.len()
    );

    // Stable sorts: rows with equal timestamps keep the source's order.
    categories.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    products.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    blog_posts.sort_by_key(|post| std::cmp::Reverse(post.last_modified()));

    let mut skipped = SkipCounts::default();

    let category_records = options
        .static_pages
        .iter()
        .map(Entity::StaticPage)
        .chain(categories.iter().map(Entity::Category));
    let categories = build_all(category_records, base_url, &mut skipped.categories);
    let products = build_all(products.iter().map(Entity::Product), base_url, &mut skipped.products);
    let blog = build_all(blog_posts.iter().map(Entity::BlogPost), base_url, &mut skipped.blog);

    if skipped.total() > 0 {
        tracing::warn!(
            "Skipped {} entities ({} categories, {} products, {} blog posts)",
            skipped.total(),
            skipped.categories,
            skipped.products,
            skipped.blog
        );
    }

    let set = SitemapSet {
        base_url: base_url.clone(),
        generated_at: options.generated_at.unwrap_or_else(Utc::now),
        categories,
        products,
        blog,
    };

    Ok(Aggregation { set, skipped })
}

async fn fetch<T, F>(collection: Collection, future: F) -> Result<T>
where
    F: std::future::Future<Output = std::result::Result<T, crate::errors::SourceError>>,
{
    future
        .await
        .map_err(|source| Error::SourceFetch { collection, source })
}

fn build_all<'a>(
    entities: impl Iterator<Item = Entity<'a>>,
    base_url: &BaseUrl,
    skipped: &mut usize,
) -> Vec<UrlRecord> {
    entities
        .filter_map(|entity| match build(entity, base_url) {
            Ok(record) => Some(record),
            Err(reason) => {
                log_skip(&reason);
                *skipped += 1;
                None
            }
        })
        .collect()
}

fn log_skip(reason: &SkipReason) {
    tracing::warn!("[SKIP] {}", reason);
}
